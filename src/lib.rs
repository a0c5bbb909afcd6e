//! Position-group predictions for motorsport race results.
//!
//! A trained classifier buckets every race entry into one of five finishing
//! groups (1-3, 4-6, 7-9, 10-14, 15+); each prediction is scored against the
//! actual finishing order and summarised per race.
//!
//! ```no_run
//! use position_groups::adapters::csv_source::parse_records;
//! use position_groups::{predict_groups, RandomForest};
//!
//! let model = RandomForest::from_file("demos/grid_forest.json")?;
//! let records = parse_records(&std::fs::read("demos/races.csv")?, b',')?;
//! for report in &predict_groups(&model, &records)? {
//!     println!("{}: {} correct", report.race, report.correct_count);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;
pub mod web;

#[cfg(feature = "cli")]
pub use config::{CliConfig, WebConfig};

pub use adapters::{CsvEntrySource, ForestLoader, LocalStorage, RandomForest, ReportExporter};
pub use core::{engine::PredictionEngine, predictor::predict_groups};
pub use domain::model::{PositionGroup, PredictionResult, RaceEntry, RaceReport, RaceReports, Record};
pub use domain::ports::BatchClassifier;
pub use utils::error::{ModelError, PredictorError, Result};
