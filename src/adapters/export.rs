use crate::core::{RaceReport, RaceReports, Storage};
use crate::utils::error::Result;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Writes one `results_<race>.csv` per race into a single zip archive.
pub struct ReportExporter<S: Storage> {
    storage: S,
    archive_name: String,
}

impl<S: Storage> ReportExporter<S> {
    pub fn new(storage: S, archive_name: impl Into<String>) -> Self {
        Self {
            storage,
            archive_name: archive_name.into(),
        }
    }

    pub async fn export(&self, reports: &RaceReports) -> Result<String> {
        tracing::debug!("Creating ZIP file with {} race files", reports.len());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            let mut taken = HashSet::new();
            for report in reports {
                let name = unique_file_name(&report.race, &mut taken);
                tracing::debug!("Adding {} for race {}", name, report.race);
                zip.start_file::<_, ()>(name, FileOptions::default())?;
                zip.write_all(&report_csv(report)?)?;
            }
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&self.archive_name, &zip_data).await?;
        Ok(self.archive_name.clone())
    }
}

/// File-system safe name for a race's CSV.
pub fn csv_file_name(race: &str) -> String {
    let slug: String = race
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("results_{}.csv", slug)
}

/// Like [`csv_file_name`], but appends `_2`, `_3`, ... when sanitizing maps
/// two races onto the same entry.
fn unique_file_name(race: &str, taken: &mut HashSet<String>) -> String {
    let base = csv_file_name(race);
    let stem = base.trim_end_matches(".csv");
    let mut name = base.clone();
    let mut n = 2;
    while !taken.insert(name.clone()) {
        name = format!("{}_{}.csv", stem, n);
        n += 1;
    }
    name
}

pub fn report_csv(report: &RaceReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Driver",
        "Position_Order",
        "Position_Description",
        "Correct_Prediction",
    ])?;
    for row in &report.result_table {
        let position_order = row.position_order.to_string();
        writer.write_record([
            row.driver.as_str(),
            position_order.as_str(),
            row.position_description.as_str(),
            if row.correct_prediction { "Yes" } else { "No" },
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}
