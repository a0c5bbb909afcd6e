use crate::core::predictor::predict_groups;
use crate::domain::model::{Column, RaceReports, Record};
use crate::domain::ports::{BatchClassifier, ModelLoader};
use crate::utils::error::{PredictorError, Result};
use std::path::{Path, PathBuf};

/// Loads the model and runs the predictor for one request.
pub struct PredictionEngine<L: ModelLoader> {
    loader: L,
    model_path: PathBuf,
}

impl<L: ModelLoader> PredictionEngine<L> {
    pub fn new(loader: L, model_path: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            model_path: model_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Re-reads the model artifact on every call.
    pub fn run(&self, records: &[Record]) -> Result<RaceReports> {
        tracing::debug!("Loading model from {}", self.model_path.display());
        let model = self.loader.load(&self.model_path)?;
        self.run_with(&model, records)
    }

    pub fn run_with<M: BatchClassifier + ?Sized>(
        &self,
        model: &M,
        records: &[Record],
    ) -> Result<RaceReports> {
        tracing::info!("Predicting position groups for {} rows", records.len());
        let reports = predict_groups(model, records)?;
        for report in &reports {
            tracing::info!(
                "🏁 {}: {}/{} correct in the first 20 positions",
                report.race,
                report.correct_count,
                report.result_table.iter().filter(|r| r.is_scored()).count()
            );
        }
        Ok(reports)
    }
}

/// Selects the rows of one race, optionally narrowed to one driver.
///
/// Fails with `NotFoundError` when the race or driver has no rows.
pub fn select_rows(records: &[Record], race: &str, driver: Option<&str>) -> Result<Vec<Record>> {
    let race_rows: Vec<Record> = records
        .iter()
        .filter(|r| r.text(Column::Race).as_deref() == Some(race))
        .cloned()
        .collect();
    if race_rows.is_empty() {
        return Err(PredictorError::NotFoundError {
            what: format!("race '{}'", race),
        });
    }

    let Some(driver) = driver else {
        return Ok(race_rows);
    };
    let driver_rows: Vec<Record> = race_rows
        .into_iter()
        .filter(|r| r.text(Column::Driver).as_deref() == Some(driver))
        .collect();
    if driver_rows.is_empty() {
        return Err(PredictorError::NotFoundError {
            what: format!("driver '{}' in race '{}'", driver, race),
        });
    }
    Ok(driver_rows)
}

/// Distinct race ids in first-seen order.
pub fn race_ids(records: &[Record]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.text(Column::Race)))
}

/// Distinct drivers of one race in first-seen order.
pub fn drivers_for(records: &[Record], race: &str) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|r| r.text(Column::Race).as_deref() == Some(race))
            .filter_map(|r| r.text(Column::Driver)),
    )
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
