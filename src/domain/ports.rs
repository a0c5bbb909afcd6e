use crate::domain::model::{RaceEntry, Record};
use crate::utils::error::{ModelError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Batch prediction capability of a trained model.
///
/// Given N rows it returns N raw labels, expected to lie in 1..=5.
pub trait BatchClassifier: Send + Sync {
    fn predict(&self, entries: &[RaceEntry]) -> std::result::Result<Vec<i64>, ModelError>;
}

impl<T: BatchClassifier + ?Sized> BatchClassifier for Box<T> {
    fn predict(&self, entries: &[RaceEntry]) -> std::result::Result<Vec<i64>, ModelError> {
        (**self).predict(entries)
    }
}

impl<T: BatchClassifier + ?Sized> BatchClassifier for &T {
    fn predict(&self, entries: &[RaceEntry]) -> std::result::Result<Vec<i64>, ModelError> {
        (**self).predict(entries)
    }
}

/// Turns a model artifact on disk into a classifier.
pub trait ModelLoader: Send + Sync {
    type Model: BatchClassifier;

    fn load(&self, path: &Path) -> std::result::Result<Self::Model, ModelError>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Source of raw race-entry rows.
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn load(&self) -> Result<Vec<Record>>;
}
