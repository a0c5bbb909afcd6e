use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Untyped input row as handed over by a tabular source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: Column) -> Option<&serde_json::Value> {
        self.data.get(column.name())
    }

    /// String view of a cell, numbers rendered as text.
    pub fn text(&self, column: Column) -> Option<String> {
        match self.get(column)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// The ten columns every race entry must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Race,
    Driver,
    Constructor,
    Circuit,
    Grid,
    Laps,
    Rank,
    Year,
    Date,
    #[serde(rename = "Position_Order")]
    PositionOrder,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Race,
        Column::Driver,
        Column::Constructor,
        Column::Circuit,
        Column::Grid,
        Column::Laps,
        Column::Rank,
        Column::Year,
        Column::Date,
        Column::PositionOrder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Race => "Race",
            Column::Driver => "Driver",
            Column::Constructor => "Constructor",
            Column::Circuit => "Circuit",
            Column::Grid => "Grid",
            Column::Laps => "Laps",
            Column::Rank => "Rank",
            Column::Year => "Year",
            Column::Date => "Date",
            Column::PositionOrder => "Position_Order",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Integer-valued columns.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Column::Grid | Column::Laps | Column::Rank | Column::Year | Column::PositionOrder
        )
    }

    /// Free-text identifier columns, kept verbatim.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Column::Race | Column::Driver | Column::Constructor | Column::Circuit
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One driver's result in one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceEntry {
    pub race: String,
    pub driver: String,
    pub constructor: String,
    pub circuit: String,
    pub grid: i64,
    pub laps: i64,
    pub rank: i64,
    pub year: i64,
    pub date: NaiveDate,
    pub position_order: i64,
}

/// Predicted finishing bucket.
///
/// Each variant owns its label, its description and its inclusive position
/// range; the correctness check and the rendered text both read from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PositionGroup {
    Podium,
    Points,
    Midfield,
    Back,
    Tail,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 5] = [
        PositionGroup::Podium,
        PositionGroup::Points,
        PositionGroup::Midfield,
        PositionGroup::Back,
        PositionGroup::Tail,
    ];

    pub fn label(self) -> u8 {
        match self {
            PositionGroup::Podium => 1,
            PositionGroup::Points => 2,
            PositionGroup::Midfield => 3,
            PositionGroup::Back => 4,
            PositionGroup::Tail => 5,
        }
    }

    pub fn from_label(label: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|g| i64::from(g.label()) == label)
    }

    /// Inclusive bounds; `None` upper bound means open-ended.
    pub fn range(self) -> (i64, Option<i64>) {
        match self {
            PositionGroup::Podium => (1, Some(3)),
            PositionGroup::Points => (4, Some(6)),
            PositionGroup::Midfield => (7, Some(9)),
            PositionGroup::Back => (10, Some(14)),
            PositionGroup::Tail => (15, None),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PositionGroup::Podium => "Position 1-3",
            PositionGroup::Points => "Position 4-6",
            PositionGroup::Midfield => "Position 7-9",
            PositionGroup::Back => "Position 10-14",
            PositionGroup::Tail => "Position 15+",
        }
    }

    pub fn contains(self, position_order: i64) -> bool {
        let (low, high) = self.range();
        position_order >= low && high.map_or(true, |h| position_order <= h)
    }

    /// Bucket an actual finishing position falls into.
    pub fn for_position(position_order: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.contains(position_order))
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<PositionGroup> for u8 {
    fn from(group: PositionGroup) -> Self {
        group.label()
    }
}

impl TryFrom<u8> for PositionGroup {
    type Error = String;

    fn try_from(label: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_label(i64::from(label)).ok_or_else(|| format!("unknown position group {}", label))
    }
}

/// Positions beyond this rank are shown but not counted as hits.
pub const SCORED_POSITIONS: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Driver")]
    pub driver: String,
    #[serde(rename = "Position_Order")]
    pub position_order: i64,
    #[serde(rename = "Position_Group")]
    pub group: PositionGroup,
    #[serde(rename = "Position_Description")]
    pub position_description: String,
    #[serde(rename = "Correct_Prediction")]
    pub correct_prediction: bool,
}

impl PredictionResult {
    pub fn new(entry: &RaceEntry, group: PositionGroup) -> Self {
        Self {
            driver: entry.driver.clone(),
            position_order: entry.position_order,
            group,
            position_description: group.description().to_string(),
            correct_prediction: group.contains(entry.position_order),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.position_order <= SCORED_POSITIONS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceReport {
    pub race: String,
    pub result_table: Vec<PredictionResult>,
    pub correct_count: usize,
}

impl RaceReport {
    pub fn new(race: impl Into<String>, result_table: Vec<PredictionResult>) -> Self {
        let correct_count = result_table
            .iter()
            .filter(|r| r.is_scored() && r.correct_prediction)
            .count();
        Self {
            race: race.into(),
            result_table,
            correct_count,
        }
    }
}

/// Reports keyed by race id, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceReports {
    reports: Vec<RaceReport>,
}

impl RaceReports {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, report: RaceReport) {
        self.reports.push(report);
    }

    pub fn get(&self, race: &str) -> Option<&RaceReport> {
        self.reports.iter().find(|r| r.race == race)
    }

    pub fn races(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().map(|r| r.race.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RaceReport> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn total_correct(&self) -> usize {
        self.reports.iter().map(|r| r.correct_count).sum()
    }
}

impl<'a> IntoIterator for &'a RaceReports {
    type Item = &'a RaceReport;
    type IntoIter = std::slice::Iter<'a, RaceReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}
