//! Outbreak Atlas
//!
//! Aggregates per-county epidemiological events (confirmed cases and
//! deaths, by reporting day, sex and age group) into a nation → state →
//! county hierarchy with totals, population-normalized rates and lazily
//! computed cumulative day series.
//!
//! This crate provides the engine and the `outbreak-atlas` CLI.
//!
//! ## Getting Started
//!
//! ```bash
//! outbreak-atlas aggregate --meta meta.json --data data.json --summary
//! outbreak-atlas series --meta meta.json --data data.json --area state:5
//! ```

pub mod aggregator;
pub mod commands;
pub mod model;
pub mod output;
pub mod parser;
pub mod utils;
