//! Grouped-position prediction and scoring.
//!
//! [`predict_groups`] validates raw rows, splits them by race, asks the
//! classifier for one batch of labels per race and scores every label against
//! the actual finishing order.

use crate::domain::model::{
    Column, PositionGroup, PredictionResult, RaceEntry, RaceReport, RaceReports, Record,
};
use crate::domain::ports::BatchClassifier;
use crate::utils::error::{ModelError, PredictorError, Result};
use chrono::NaiveDate;
use serde_json::Value;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Predict a position group for every row and score it, race by race.
///
/// Every record is checked for all required columns before the model is
/// touched. Races come back in first-seen order with their rows in input order.
pub fn predict_groups<M>(model: &M, records: &[Record]) -> Result<RaceReports>
where
    M: BatchClassifier + ?Sized,
{
    validate_schema(records)?;
    let entries = records
        .iter()
        .map(to_race_entry)
        .collect::<Result<Vec<_>>>()?;

    let mut reports = RaceReports::new();
    for (race, rows) in partition_by_race(&entries) {
        let labels = model.predict(&rows)?;
        if labels.len() != rows.len() {
            return Err(ModelError::LabelCount {
                expected: rows.len(),
                got: labels.len(),
            }
            .into());
        }

        let result_table = rows
            .iter()
            .zip(labels)
            .map(|(entry, label)| {
                let group = PositionGroup::from_label(label).ok_or(ModelError::UnknownLabel(label))?;
                Ok(PredictionResult::new(entry, group))
            })
            .collect::<Result<Vec<_>>>()?;

        let report = RaceReport::new(race, result_table);
        tracing::debug!(
            "Race {}: {} rows, {} correct in the first 20",
            report.race,
            report.result_table.len(),
            report.correct_count
        );
        reports.push(report);
    }

    Ok(reports)
}

/// Fails on the first missing column, scanning rows in input order.
pub fn validate_schema(records: &[Record]) -> Result<()> {
    for record in records {
        for column in Column::ALL {
            if matches!(record.get(column), None | Some(Value::Null)) {
                return Err(PredictorError::SchemaError {
                    field: column.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn partition_by_race(entries: &[RaceEntry]) -> Vec<(String, Vec<RaceEntry>)> {
    let mut partitions: Vec<(String, Vec<RaceEntry>)> = Vec::new();
    for entry in entries {
        match partitions.iter_mut().find(|(race, _)| *race == entry.race) {
            Some((_, rows)) => rows.push(entry.clone()),
            None => partitions.push((entry.race.clone(), vec![entry.clone()])),
        }
    }
    partitions
}

pub fn to_race_entry(record: &Record) -> Result<RaceEntry> {
    Ok(RaceEntry {
        race: text_field(record, Column::Race)?,
        driver: text_field(record, Column::Driver)?,
        constructor: text_field(record, Column::Constructor)?,
        circuit: text_field(record, Column::Circuit)?,
        grid: int_field(record, Column::Grid)?,
        laps: int_field(record, Column::Laps)?,
        rank: int_field(record, Column::Rank)?,
        year: int_field(record, Column::Year)?,
        date: date_field(record, Column::Date)?,
        position_order: int_field(record, Column::PositionOrder)?,
    })
}

fn require(record: &Record, column: Column) -> Result<&Value> {
    match record.get(column) {
        None | Some(Value::Null) => Err(PredictorError::SchemaError {
            field: column.name().to_string(),
        }),
        Some(value) => Ok(value),
    }
}

fn invalid(column: Column, value: &Value, reason: &str) -> PredictorError {
    let value = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    PredictorError::InvalidFieldError {
        field: column.name().to_string(),
        value,
        reason: reason.to_string(),
    }
}

fn text_field(record: &Record, column: Column) -> Result<String> {
    match require(record, column)? {
        Value::String(s) => Ok(s.clone()),
        value @ Value::Number(_) => Ok(value.to_string()),
        value => Err(invalid(column, value, "expected text")),
    }
}

fn int_field(record: &Record, column: Column) -> Result<i64> {
    let value = require(record, column)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    };
    parsed.ok_or_else(|| invalid(column, value, "expected an integer"))
}

/// Integral floats that fit an `i64`; `i64::MAX as f64` rounds up to 2^63.
fn whole_number(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn date_field(record: &Record, column: Column) -> Result<NaiveDate> {
    let value = require(record, column)?;
    let Value::String(s) = value else {
        return Err(invalid(column, value, "expected a date string"));
    };
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s.trim(), format).ok())
        .ok_or_else(|| invalid(column, value, "expected YYYY-MM-DD"))
}
