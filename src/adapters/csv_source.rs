//! Delimited-text reader for race-entry rows.

use crate::core::{Column, EntrySource, Record, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Reads a header-first CSV/TSV file through a [`Storage`] backend.
pub struct CsvEntrySource<S: Storage> {
    storage: S,
    path: String,
    delimiter: u8,
}

impl<S: Storage> CsvEntrySource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl<S: Storage> EntrySource for CsvEntrySource<S> {
    async fn load(&self) -> Result<Vec<Record>> {
        tracing::debug!("Reading race entries from {}", self.path);
        let data = self.storage.read_file(&self.path).await?;
        let records = parse_records(&data, self.delimiter)?;
        tracing::info!("📥 Loaded {} rows from {}", records.len(), self.path);
        Ok(records)
    }
}

/// Parse delimited bytes into records keyed by header name.
///
/// Integer cells in numeric columns become JSON numbers; every other cell
/// stays text verbatim. Blank cells are left out so they read as missing
/// fields downstream.
pub fn parse_records(data: &[u8], delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if cell.is_empty() {
                continue;
            }
            record.data.insert(header.to_string(), cell_value(header, cell));
        }
        records.push(record);
    }
    Ok(records)
}

fn cell_value(header: &str, cell: &str) -> Value {
    let numeric = matches!(Column::from_name(header), Some(column) if column.is_numeric());
    match cell.parse::<i64>() {
        Ok(n) if numeric => Value::from(n),
        _ => Value::String(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const SAMPLE: &str = "\
Race,Driver,Constructor,Circuit,Grid,Laps,Rank,Year,Date,Position_Order
Bahrain 2021,Max Verstappen,Red Bull,Bahrain International Circuit,1,56,4,2021,2021-03-28,2
Bahrain 2021,Lewis Hamilton,Mercedes,Bahrain International Circuit,2,56,,2021,2021-03-28,1
";

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                crate::utils::error::PredictorError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_parse_records_types_cells() {
        let records = parse_records(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(Column::Grid), Some(&Value::from(1)));
        assert_eq!(
            records[0].get(Column::Driver),
            Some(&Value::String("Max Verstappen".to_string()))
        );
        assert_eq!(
            records[0].get(Column::Date),
            Some(&Value::String("2021-03-28".to_string()))
        );
        assert!(records[1].get(Column::Rank).is_none());
    }

    #[test]
    fn test_numeric_looking_ids_stay_verbatim() {
        let csv = "\
Race,Driver,Constructor,Circuit,Grid,Laps,Rank,Year,Date,Position_Order
007,+44,0033,01,3,56,2,2021,2021-03-28,05
";
        let records = parse_records(csv.as_bytes(), b',').unwrap();
        assert_eq!(records[0].get(Column::Race), Some(&Value::String("007".to_string())));
        assert_eq!(records[0].text(Column::Driver).as_deref(), Some("+44"));
        assert_eq!(records[0].text(Column::Constructor).as_deref(), Some("0033"));
        assert_eq!(records[0].text(Column::Circuit).as_deref(), Some("01"));
        assert_eq!(records[0].get(Column::Grid), Some(&Value::from(3)));
        assert_eq!(records[0].get(Column::PositionOrder), Some(&Value::from(5)));
    }

    #[test]
    fn test_parse_tab_delimited() {
        let tsv = SAMPLE.replace(',', "\t");
        let records = parse_records(tsv.as_bytes(), b'\t').unwrap();
        assert_eq!(records[1].text(Column::Race).as_deref(), Some("Bahrain 2021"));
    }

    #[test]
    fn test_source_reads_through_storage() {
        let storage = MockStorage::default();
        tokio_test::block_on(storage.write_file("races.csv", SAMPLE.as_bytes())).unwrap();

        let source = CsvEntrySource::new(storage.clone(), "races.csv");
        let records = tokio_test::block_on(source.load()).unwrap();
        assert_eq!(records.len(), 2);

        let missing = CsvEntrySource::new(storage, "other.csv");
        assert!(tokio_test::block_on(missing.load()).is_err());
    }
}
