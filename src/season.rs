//! Seasons covered by the shot data provider.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

/// Seasons for which shot data is available, identified by the year the season starts in.
pub const SEASONS: RangeInclusive<u16> = 2014..=2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Season(u16);

impl Season {
    pub fn try_year(year: u16) -> Result<Self, SeasonParseError> {
        if !SEASONS.contains(&year) {
            return Err(SeasonParseError::OutOfRange(year));
        }
        Ok(Self(year))
    }

    pub fn year(&self) -> u16 {
        self.0
    }

    /// The season's label as it appears in the provider's `season` column.
    pub fn label(&self) -> String {
        self.0.to_string()
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeasonParseError {
    #[error("season '{0}' is not a year")]
    NotAYear(String),

    #[error("season {0} is outside {start}-{end}", start = SEASONS.start(), end = SEASONS.end())]
    OutOfRange(u16),
}

impl FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s
            .trim()
            .parse::<u16>()
            .map_err(|_| SeasonParseError::NotAYear(s.into()))?;
        Self::try_year(year)
    }
}
