//! Raw, string-valued shot tables, as produced by the data provider or read from a CSV file.
//!
//! A [ShotTable] keeps every column it was given so that an export reproduces the source
//! verbatim. Typed [ShotEvent]s are extracted on demand; only the columns named by [Column]
//! are interpreted.

use std::io::{Read, Write};
use std::ops::RangeInclusive;
use std::str::FromStr;

use csv::{ReaderBuilder, WriterBuilder};
use serde_json::{Map, Value};
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

use crate::shot::{ShotEvent, ShotResult};

/// Coordinates and xG are normalised to this range.
const UNIT_RANGE: RangeInclusive<f64> = 0.0..=1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Column {
    #[strum(serialize = "player")]
    Player,

    #[strum(serialize = "season")]
    Season,

    #[strum(serialize = "X")]
    X,

    #[strum(serialize = "Y")]
    Y,

    #[strum(serialize = "xG")]
    Xg,

    #[strum(serialize = "result")]
    Result,
}

impl Column {
    /// Columns without which no shot can be derived.
    pub const REQUIRED: [Column; 4] = [Column::X, Column::Y, Column::Xg, Column::Result];

    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing column '{0}'")]
    MissingColumn(Column),

    #[error("invalid {column} value '{value}' in row {row}")]
    InvalidValue {
        column: Column,
        row: usize,
        value: String,
    },

    #[error("row {row} has {actual} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ShotTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: vec![],
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), SchemaError> {
        if row.len() != self.headers.len() {
            return Err(SchemaError::RaggedRow {
                row: self.rows.len() + 1,
                expected: self.headers.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: Column) -> Option<usize> {
        self.headers.iter().position(|header| header == column.name())
    }

    /// The value of `column` in the first row, if both exist.
    pub fn first_value(&self, column: Column) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.first().map(|row| row[index].as_str())
    }

    /// Retains only the rows whose `season` cell equals `season`, keeping every column.
    pub fn filter_season(&self, season: &str) -> Result<ShotTable, SchemaError> {
        let index = self
            .column_index(Column::Season)
            .ok_or(SchemaError::MissingColumn(Column::Season))?;
        let rows = self
            .rows
            .iter()
            .filter(|row| row[index] == season)
            .cloned()
            .collect();
        Ok(ShotTable {
            headers: self.headers.clone(),
            rows,
        })
    }

    /// Builds a table from JSON objects, one row per object. Headers are the union of keys in
    /// order of first appearance; keys missing from an object produce empty cells.
    pub fn from_json_records(records: &[Map<String, Value>]) -> Self {
        let mut headers: Vec<String> = vec![];
        for record in records {
            for key in record.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|header| record.get(header).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn read_csv(reader: impl Read) -> Result<Self, SchemaError> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader.headers()?.iter().map(ToString::to_string).collect();
        let mut table = ShotTable::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(ToString::to_string).collect())?;
        }
        Ok(table)
    }

    /// Writes the header row followed by every row, comma-delimited.
    pub fn write_csv(&self, writer: impl Write) -> Result<(), csv::Error> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut buf = vec![];
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    /// Extracts typed shot events. The coordinate, xG and result columns must be present and
    /// parseable; `player` and `season` default to empty strings when absent.
    pub fn to_events(&self) -> Result<Vec<ShotEvent>, SchemaError> {
        let mut indexes = [0; 4];
        for (slot, column) in Column::REQUIRED.into_iter().enumerate() {
            indexes[slot] = self
                .column_index(column)
                .ok_or(SchemaError::MissingColumn(column))?;
        }
        let [x_index, y_index, xg_index, result_index] = indexes;
        let player_index = self.column_index(Column::Player);
        let season_index = self.column_index(Column::Season);

        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| -> Result<ShotEvent, SchemaError> {
                let row_number = row_index + 1;
                let text = |index: Option<usize>| {
                    index.map(|index| row[index].clone()).unwrap_or_default()
                };
                Ok(ShotEvent {
                    player: text(player_index),
                    season: text(season_index),
                    x: parse_number(row, x_index, Column::X, row_number)?,
                    y: parse_number(row, y_index, Column::Y, row_number)?,
                    xg: parse_number(row, xg_index, Column::Xg, row_number)?,
                    result: parse_result(row, result_index, row_number)?,
                })
            })
            .collect()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(str) => str.clone(),
        other => other.to_string(),
    }
}

/// Parses a normalised value, which must lie in `[0, 1]`.
fn parse_number(row: &[String], index: usize, column: Column, row_number: usize) -> Result<f64, SchemaError> {
    let value = &row[index];
    match value.trim().parse::<f64>() {
        Ok(number) if UNIT_RANGE.contains(&number) => Ok(number),
        _ => Err(SchemaError::InvalidValue {
            column,
            row: row_number,
            value: value.clone(),
        }),
    }
}

fn parse_result(row: &[String], index: usize, row_number: usize) -> Result<ShotResult, SchemaError> {
    let value = row[index].trim();
    if value.is_empty() {
        return Err(SchemaError::InvalidValue {
            column: Column::Result,
            row: row_number,
            value: value.into(),
        });
    }
    Ok(ShotResult::from_str(value).unwrap_or_else(|_| ShotResult::Other(value.into())))
}
