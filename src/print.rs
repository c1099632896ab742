//! Console tabulation of shot tables and summary statistics.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::stats::SummaryStats;
use crate::table::ShotTable;

/// Tabulates every row of `table` under its original headers.
pub fn tabulate_shots(table: &ShotTable) -> Table {
    let mut tabulated = Table::default()
        .with_cols(
            table
                .headers()
                .iter()
                .map(|_| Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Left)))
                .collect(),
        )
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            table.headers().iter().map(|header| header.clone().into()).collect(),
        ));
    for row in table.rows() {
        tabulated.push_row(Row::new(
            Styles::default(),
            row.iter().map(|cell| cell.clone().into()).collect(),
        ));
    }
    tabulated
}

/// Tabulates summary statistics side by side, one column per `(player, stats)` pair.
pub fn tabulate_stats(subjects: &[(&str, &SummaryStats)]) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(18))
                    .with(HAlign::Left),
            )];
            for _ in subjects {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(12)).with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["".into()];
            for (player, _) in subjects {
                header_cells.push((*player).into());
            }
            Row::new(Styles::default().with(Header(true)), header_cells)
        });

    let readouts: [(&str, fn(&SummaryStats) -> String); 6] = [
        ("Shots", |stats| stats.total_shots.to_string()),
        ("Goals", |stats| stats.total_goals.to_string()),
        ("xG", |stats| format!("{:.2}", stats.total_xg)),
        ("xG/Shot", |stats| format!("{:.2}", stats.xg_per_shot)),
        ("Mean x", |stats| format!("{:.1}", stats.mean_x_coordinate)),
        ("Avg. distance (m)", |stats| format!("{:.1}", stats.average_shot_distance_m)),
    ];
    for (label, readout) in readouts {
        let mut row_cells = vec![label.into()];
        for (_, stats) in subjects {
            row_cells.push(readout(stats).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}
