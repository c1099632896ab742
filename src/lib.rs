//! Season shot maps for football players.
//!
//! Shots are fetched from Understat (or imported from CSV), narrowed to a season, rescaled to
//! pitch-length units and summarised by [stats::derive]. [layout::layout] then turns them into
//! an ordered, deterministic list of draw instructions, which [render::render_png] executes
//! on a raster canvas.

#![allow(clippy::too_many_arguments)]

pub mod file;
pub mod layout;
pub mod print;
pub mod provider;
pub mod render;
pub mod request;
pub mod season;
pub mod shot;
pub mod stats;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
