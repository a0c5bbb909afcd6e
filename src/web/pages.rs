use super::PredictionMode;
use crate::core::RaceReport;
use crate::report::yes_no;
use crate::utils::error::PredictorError;
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; max-width: 900px; margin: 40px auto; padding: 0 20px; }
        h1 { border-bottom: 3px solid #e10600; padding-bottom: 10px; }
        form { margin: 16px 0; }
        table { border-collapse: collapse; width: 100%; }
        th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; }
        th { background: #f4f4f4; }
        .hit { color: #2e7d32; }
        .miss { color: #c62828; }
        .error { background: #fdecea; border-left: 4px solid #c62828; padding: 10px; }
"#;

pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn options(values: &[String], selected: Option<&str>) -> String {
    values
        .iter()
        .map(|v| {
            let mark = if Some(v.as_str()) == selected { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", escape(v), mark)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn result_table(report: &RaceReport) -> String {
    let mut rows = String::new();
    for r in &report.result_table {
        let class = if r.correct_prediction { "hit" } else { "miss" };
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>",
            escape(&r.driver),
            r.position_order,
            escape(&r.position_description),
            class,
            yes_no(r.correct_prediction)
        );
    }
    format!(
        r#"<h2>Results for {race}</h2>
<table>
<tr><th>Driver</th><th>Position_Order</th><th>Position_Description</th><th>Correct_Prediction</th></tr>
{rows}</table>
<p id="correct-count">Correct predictions: {count}</p>"#,
        race = escape(&report.race),
        rows = rows,
        count = report.correct_count
    )
}

/// What the form shows as chosen when it is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Selection<'a> {
    pub race: Option<&'a str>,
    pub mode: PredictionMode,
    pub driver: Option<&'a str>,
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

/// Race picker, prediction form and, after a submit, its outcome.
pub(super) fn form_page(
    races: &[String],
    drivers: &[String],
    selection: Selection<'_>,
    outcome: Option<&Result<RaceReport, PredictorError>>,
) -> String {
    let race_value = selection.race.map(escape).unwrap_or_default();
    let outcome = match outcome {
        Some(Ok(report)) => result_table(report),
        Some(Err(err)) => format!(
            "<div class=\"error\"><strong>{}</strong><br>{}</div>",
            escape(&err.user_friendly_message()),
            escape(err.recovery_suggestion())
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Race Position Group Predictions</title>
    <style>{style}</style>
</head>
<body>
    <h1>Position Group Predictions for Race Results</h1>
    <form method="get" action="/">
        <label for="race">Select a race</label>
        <select id="race" name="race">
{race_options}
        </select>
        <button type="submit">Select race</button>
    </form>
    <form method="post" action="/predict">
        <input type="hidden" name="race" value="{race_value}">
        <fieldset>
            <legend>Prediction type</legend>
            <label><input type="radio" name="mode" value="all"{all_checked}> All drivers</label>
            <label><input type="radio" name="mode" value="driver"{driver_checked}> Specific driver</label>
        </fieldset>
        <label for="driver">Select a driver</label>
        <select id="driver" name="driver">
{driver_options}
        </select>
        <button type="submit">Predict</button>
    </form>
    {outcome}
</body>
</html>
"#,
        style = STYLE,
        race_options = options(races, selection.race),
        race_value = race_value,
        all_checked = checked(selection.mode == PredictionMode::All),
        driver_checked = checked(selection.mode == PredictionMode::Driver),
        driver_options = options(drivers, selection.driver),
        outcome = outcome
    )
}
