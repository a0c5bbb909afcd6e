//! Plain-text rendering of race reports for the terminal.

use crate::core::{RaceReport, RaceReports};
use std::fmt::Write;

const HEADERS: [&str; 4] = [
    "Driver",
    "Position_Order",
    "Position_Description",
    "Correct_Prediction",
];

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Left-aligned table with a header row, columns padded to their widest cell.
pub fn render_table(report: &RaceReport) -> String {
    let rows: Vec<[String; 4]> = report
        .result_table
        .iter()
        .map(|r| {
            [
                r.driver.clone(),
                r.position_order.to_string(),
                r.position_description.clone(),
                yes_no(r.correct_prediction).to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 4]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    };
    push_row(HEADERS);
    for row in &rows {
        push_row([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}

pub fn render_report(report: &RaceReport) -> String {
    format!(
        "Results for race: {}\n{}Correct predictions in the first 20 positions: {}\n",
        report.race,
        render_table(report),
        report.correct_count
    )
}

pub fn render_all(reports: &RaceReports) -> String {
    reports
        .iter()
        .map(render_report)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PositionGroup, PredictionResult};

    fn result(driver: &str, position_order: i64, group: PositionGroup) -> PredictionResult {
        PredictionResult {
            driver: driver.to_string(),
            position_order,
            group,
            position_description: group.description().to_string(),
            correct_prediction: group.contains(position_order),
        }
    }

    #[test]
    fn test_render_report() {
        let report = RaceReport::new(
            "Brazil 2019",
            vec![
                result("Max Verstappen", 1, PositionGroup::Podium),
                result("Lewis Hamilton", 7, PositionGroup::Podium),
            ],
        );

        let text = render_report(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Results for race: Brazil 2019");
        assert_eq!(
            lines[1],
            "Driver          Position_Order  Position_Description  Correct_Prediction"
        );
        assert_eq!(lines[2], "Max Verstappen  1               Position 1-3          Yes");
        assert_eq!(lines[3], "Lewis Hamilton  7               Position 1-3          No");
        assert_eq!(lines[4], "Correct predictions in the first 20 positions: 1");
    }
}
