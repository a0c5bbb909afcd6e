pub mod engine;
pub mod predictor;

pub use crate::domain::model::{
    Column, PositionGroup, PredictionResult, RaceEntry, RaceReport, RaceReports, Record,
};
pub use crate::domain::ports::{BatchClassifier, EntrySource, ModelLoader, Storage};
pub use crate::utils::error::Result;
