//! Shot map requests: loading a player's shots from a provider or a CSV file, resolving the
//! labels shown on the map, and exporting the results.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::file;
use crate::layout::{comparison, layout, DrawInstruction, Subject, Variant};
use crate::provider::{PlayerId, ProviderError, ShotProvider};
use crate::render::{render_png, Fonts, RenderConfig, RenderError};
use crate::season::Season;
use crate::stats;
use crate::stats::Derivation;
use crate::table::{Column, SchemaError, ShotTable};

/// Player label used when a table has no `player` value.
pub const DEFAULT_PLAYER_LABEL: &str = "Player";

/// Season label used when an imported table has no `season` value.
pub const UNKNOWN_SEASON_LABEL: &str = "Unknown";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl RequestError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> RequestError + '_ {
        move |source| RequestError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where a player's shots come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Download { player_id: PlayerId, season: Season },
    File(PathBuf),
}

/// Which row of a downloaded table the player label is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRow {
    /// The first row of the requested season. Maps use this.
    FirstInSeason,

    /// The first row across all seasons, so that an empty season still names its player.
    /// Exports use this.
    FirstOverall,
}

/// A player's shots, ready to be derived and laid out, with the labels to show for them.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedShots {
    pub player_label: String,
    pub season_label: String,
    pub table: ShotTable,
}

impl LoadedShots {
    /// Narrows a provider's table, which spans every season, to `season`. The player label is
    /// taken from the row chosen by `label_row`, or is `fallback_player` if there is none.
    pub fn from_download(
        table: &ShotTable,
        season: Season,
        fallback_player: &str,
        label_row: LabelRow,
    ) -> Result<Self, SchemaError> {
        let filtered = table.filter_season(&season.label())?;
        let labelled = match label_row {
            LabelRow::FirstInSeason => &filtered,
            LabelRow::FirstOverall => table,
        };
        let player_label = labelled
            .first_value(Column::Player)
            .filter(|player| !player.is_empty())
            .unwrap_or(fallback_player)
            .to_string();
        Ok(Self {
            player_label,
            season_label: season.label(),
            table: filtered,
        })
    }

    /// Labels an imported table from its first row. Imported tables are taken as they are,
    /// without season filtering.
    pub fn from_import(table: ShotTable, fallback_player: &str) -> Self {
        let label = |column, fallback: &str| {
            table
                .first_value(column)
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let player_label = label(Column::Player, fallback_player);
        let season_label = label(Column::Season, UNKNOWN_SEASON_LABEL);
        Self {
            player_label,
            season_label,
            table,
        }
    }

    pub fn derive(&self) -> Result<Derivation, SchemaError> {
        let events = self.table.to_events()?;
        Ok(stats::derive(&events))
    }

    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", file_stem(&self.player_label, &self.season_label))
    }

    pub fn png_file_name(&self) -> String {
        format!("{}.png", file_stem(&self.player_label, &self.season_label))
    }
}

fn file_stem(player_label: &str, season_label: &str) -> String {
    format!("{}_{season_label}", player_label.replace(' ', "_"))
}

pub fn comparison_png_file_name(top: &LoadedShots, bottom: &LoadedShots) -> String {
    format!(
        "{}_vs_{}.png",
        file_stem(&top.player_label, &top.season_label),
        file_stem(&bottom.player_label, &bottom.season_label)
    )
}

/// Loads the shots named by `source`, labelling a player without a name `fallback_player`.
/// `label_row` only applies to downloads.
pub async fn load(
    provider: &impl ShotProvider,
    source: &Source,
    fallback_player: &str,
    label_row: LabelRow,
) -> Result<LoadedShots, RequestError> {
    let loaded = match source {
        Source::Download { player_id, season } => {
            let table = provider.get_shot_events(player_id).await?;
            debug!("downloaded {} shots across all seasons", table.len());
            LoadedShots::from_download(&table, *season, fallback_player, label_row)?
        }
        Source::File(path) => {
            let file = File::open(path).map_err(RequestError::io(path))?;
            let table = ShotTable::read_csv(file)?;
            LoadedShots::from_import(table, fallback_player)
        }
    };
    info!(
        "loaded {} shots for {} in season {}",
        loaded.table.len(),
        loaded.player_label,
        loaded.season_label
    );
    Ok(loaded)
}

/// A player's laid-out shot map.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotMap {
    pub derivation: Derivation,
    pub instructions: Vec<DrawInstruction>,
}

pub fn single_map(loaded: &LoadedShots) -> Result<ShotMap, SchemaError> {
    let derivation = loaded.derive()?;
    let instructions = layout(
        &loaded.player_label,
        &loaded.season_label,
        &derivation.shots,
        &derivation.stats,
        Variant::Single,
    );
    Ok(ShotMap {
        derivation,
        instructions,
    })
}

/// Lays out `top` and `bottom` facing each other. The derivations are returned in the same
/// order.
pub fn comparison_map(top: &LoadedShots, bottom: &LoadedShots) -> Result<(Vec<DrawInstruction>, [Derivation; 2]), SchemaError> {
    let derivations = [top.derive()?, bottom.derive()?];
    let instructions = comparison(
        &Subject {
            player_label: &top.player_label,
            season_label: &top.season_label,
            derivation: &derivations[0],
        },
        &Subject {
            player_label: &bottom.player_label,
            season_label: &bottom.season_label,
            derivation: &derivations[1],
        },
    );
    Ok((instructions, derivations))
}

/// Writes the loaded table verbatim into `dir`, returning the path written.
pub fn export_csv(loaded: &LoadedShots, dir: &Path) -> Result<PathBuf, RequestError> {
    let path = dir.join(loaded.csv_file_name());
    let bytes = loaded.table.to_csv_bytes()?;
    file::write_atomic(&path, &bytes).map_err(RequestError::io(&path))?;
    info!("exported {} shots to {}", loaded.table.len(), path.display());
    Ok(path)
}

/// Renders `instructions` and writes the PNG to `path`. Nothing is written if rendering fails.
pub fn export_png(
    instructions: &[DrawInstruction],
    config: &RenderConfig,
    fonts: Option<&Fonts>,
    path: &Path,
) -> Result<(), RequestError> {
    let png = render_png(instructions, config, fonts)?;
    file::write_atomic(path, &png).map_err(RequestError::io(path))?;
    info!("rendered shot map to {}", path.display());
    Ok(())
}

/// Writes `instructions` to `path` as pretty-printed JSON.
pub fn dump_instructions(instructions: &[DrawInstruction], path: &Path) -> Result<(), RequestError> {
    file::write_json(path, instructions).map_err(RequestError::io(path))?;
    debug!("dumped {} instructions to {}", instructions.len(), path.display());
    Ok(())
}
