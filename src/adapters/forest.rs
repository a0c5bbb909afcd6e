//! Random-forest classifier exported as JSON.
//!
//! The artifact lists the input features (a race-entry column plus how to turn
//! it into a number) and a set of decision trees whose leaves carry a position
//! group label. Prediction is a hard majority vote; ties go to the lowest label.

use crate::core::{BatchClassifier, Column, ModelLoader, PositionGroup, RaceEntry};
use crate::utils::error::ModelError;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORMAT_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Integer column used as-is.
    Numeric,
    /// Index into the level list, -1 when unseen.
    Categorical(Vec<String>),
    /// Days from the common era.
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub column: Column,
    pub encoding: Encoding,
}

impl Feature {
    fn encode(&self, entry: &RaceEntry) -> f64 {
        match &self.encoding {
            Encoding::Numeric => match self.column {
                Column::Grid => entry.grid as f64,
                Column::Laps => entry.laps as f64,
                Column::Rank => entry.rank as f64,
                Column::Year => entry.year as f64,
                Column::PositionOrder => entry.position_order as f64,
                _ => 0.0,
            },
            Encoding::Categorical(levels) => {
                let value = match self.column {
                    Column::Race => &entry.race,
                    Column::Driver => &entry.driver,
                    Column::Constructor => &entry.constructor,
                    Column::Circuit => &entry.circuit,
                    _ => return -1.0,
                };
                levels
                    .iter()
                    .position(|level| level == value)
                    .map_or(-1.0, |i| i as f64)
            }
            Encoding::Date => f64::from(entry.date.num_days_from_ce()),
        }
    }

    fn check(&self) -> Result<(), ModelError> {
        let ok = match self.encoding {
            Encoding::Numeric => self.column.is_numeric(),
            Encoding::Categorical(_) => self.column.is_text(),
            Encoding::Date => self.column == Column::Date,
        };
        if ok {
            Ok(())
        } else {
            Err(ModelError::InvalidFormat(format!(
                "column {} cannot use encoding {:?}",
                self.column, self.encoding
            )))
        }
    }
}

/// Split node when `feature_idx` is set, leaf when `leaf` is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_idx: Option<usize>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<u8>,
}

impl Node {
    pub fn split(feature_idx: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            feature_idx: Some(feature_idx),
            threshold,
            left,
            right,
            leaf: None,
        }
    }

    pub fn leaf(label: u8) -> Self {
        Self {
            leaf: Some(label),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walks from the root; `value <= threshold` goes left.
    fn evaluate(&self, features: &[f64]) -> u8 {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            if let Some(label) = node.leaf {
                return label;
            }
            let feature_idx = node.feature_idx.unwrap_or_default();
            idx = if features[feature_idx] <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
    }

    /// Children must point forward so traversal always terminates.
    fn check(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidFormat("tree has no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match (node.leaf, node.feature_idx) {
                (Some(label), _) => {
                    if PositionGroup::from_label(i64::from(label)).is_none() {
                        return Err(ModelError::InvalidFormat(format!(
                            "node {} has leaf label {} outside 1..=5",
                            idx, label
                        )));
                    }
                }
                (None, Some(feature_idx)) => {
                    if feature_idx >= n_features {
                        return Err(ModelError::InvalidFormat(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature_idx, n_features
                        )));
                    }
                    for child in [node.left, node.right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ModelError::InvalidFormat(format!(
                                "node {} has invalid child {}",
                                idx, child
                            )));
                        }
                    }
                }
                (None, None) => {
                    return Err(ModelError::InvalidFormat(format!(
                        "node {} is neither a split nor a leaf",
                        idx
                    )));
                }
            }
        }
        Ok(())
    }
}

/// On-disk layout of a forest, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub version: i32,
    pub features: Vec<Feature>,
    pub trees: Vec<Tree>,
}

/// A validated forest. Every way of building one runs [`RandomForest::validate`],
/// so traversal never leaves the node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForestArtifact")]
pub struct RandomForest {
    version: i32,
    features: Vec<Feature>,
    trees: Vec<Tree>,
}

impl TryFrom<ForestArtifact> for RandomForest {
    type Error = ModelError;

    fn try_from(artifact: ForestArtifact) -> Result<Self, ModelError> {
        let forest = Self {
            version: artifact.version,
            features: artifact.features,
            trees: artifact.trees,
        };
        forest.validate()?;
        Ok(forest)
    }
}

impl RandomForest {
    pub fn new(features: Vec<Feature>, trees: Vec<Tree>) -> Result<Self, ModelError> {
        Self::try_from(ForestArtifact {
            version: FORMAT_VERSION,
            features,
            trees,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_str(json)?;
        Self::try_from(artifact)
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.version != FORMAT_VERSION {
            return Err(ModelError::InvalidFormat(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.features.is_empty() {
            return Err(ModelError::InvalidFormat("no features".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::InvalidFormat("no trees".to_string()));
        }
        for feature in &self.features {
            feature.check()?;
        }
        for tree in &self.trees {
            tree.check(self.features.len())?;
        }
        Ok(())
    }

    pub fn feature_vector(&self, entry: &RaceEntry) -> Vec<f64> {
        self.features.iter().map(|f| f.encode(entry)).collect()
    }

    fn vote(&self, features: &[f64]) -> i64 {
        let mut votes = [0usize; 5];
        for tree in &self.trees {
            let label = tree.evaluate(features);
            votes[usize::from(label) - 1] += 1;
        }
        // max_by_key keeps the last maximum, so scan in reverse for the lowest label
        let (winner, _) = votes
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, count)| **count)
            .unwrap_or((0, &0));
        winner as i64 + 1
    }
}

impl BatchClassifier for RandomForest {
    fn predict(&self, entries: &[RaceEntry]) -> Result<Vec<i64>, ModelError> {
        Ok(entries
            .iter()
            .map(|entry| self.vote(&self.feature_vector(entry)))
            .collect())
    }
}

/// Loads [`RandomForest`] artifacts from JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForestLoader;

impl ModelLoader for ForestLoader {
    type Model = RandomForest;

    fn load(&self, path: &Path) -> Result<RandomForest, ModelError> {
        let forest = RandomForest::from_file(path)?;
        tracing::debug!(
            "Loaded forest with {} trees over {} features",
            forest.trees().len(),
            forest.features().len()
        );
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(grid: i64, constructor: &str) -> RaceEntry {
        RaceEntry {
            race: "Austria 2020".to_string(),
            driver: "driver".to_string(),
            constructor: constructor.to_string(),
            circuit: "Red Bull Ring".to_string(),
            grid,
            laps: 71,
            rank: 3,
            year: 2020,
            date: NaiveDate::from_ymd_opt(2020, 7, 5).unwrap(),
            position_order: 1,
        }
    }

    fn grid_stump(threshold: f64, low: u8, high: u8) -> Tree {
        Tree {
            nodes: vec![Node::split(0, threshold, 1, 2), Node::leaf(low), Node::leaf(high)],
        }
    }

    fn grid_feature() -> Feature {
        Feature {
            column: Column::Grid,
            encoding: Encoding::Numeric,
        }
    }

    #[test]
    fn test_majority_vote() {
        let forest = RandomForest::new(
            vec![grid_feature()],
            vec![grid_stump(3.0, 1, 4), grid_stump(5.0, 1, 4), grid_stump(10.0, 2, 5)],
        )
        .unwrap();

        assert_eq!(forest.predict(&[entry(2, "x"), entry(4, "x"), entry(12, "x")]).unwrap(), vec![1, 4, 4]);
    }

    #[test]
    fn test_tie_goes_to_lowest_label() {
        let forest = RandomForest::new(
            vec![grid_feature()],
            vec![Tree { nodes: vec![Node::leaf(3)] }, Tree { nodes: vec![Node::leaf(2)] }],
        )
        .unwrap();
        assert_eq!(forest.predict(&[entry(1, "x")]).unwrap(), vec![2]);
    }

    #[test]
    fn test_categorical_and_date_encoding() {
        let forest = RandomForest::from_json_str(
            r#"{
                "version": 1,
                "features": [
                    {"column": "Constructor", "encoding": {"categorical": ["Mercedes", "Ferrari"]}},
                    {"column": "Date", "encoding": "date"}
                ],
                "trees": [{"nodes": [
                    {"feature_idx": 0, "threshold": -0.5, "left": 1, "right": 2},
                    {"leaf": 5},
                    {"leaf": 1}
                ]}]
            }"#,
        )
        .unwrap();

        let known = forest.feature_vector(&entry(1, "Ferrari"));
        assert_eq!(known[0], 1.0);
        assert_eq!(known[1], f64::from(NaiveDate::from_ymd_opt(2020, 7, 5).unwrap().num_days_from_ce()));
        assert_eq!(forest.predict(&[entry(1, "Mercedes"), entry(1, "Haas")]).unwrap(), vec![1, 5]);
    }

    #[test]
    fn test_rejects_malformed_artifacts() {
        let bad_leaf = RandomForest::new(vec![grid_feature()], vec![Tree { nodes: vec![Node::leaf(6)] }]);
        assert!(matches!(bad_leaf, Err(ModelError::InvalidFormat(_))));

        let cycle = RandomForest::new(
            vec![grid_feature()],
            vec![Tree { nodes: vec![Node::split(0, 1.0, 0, 0)] }],
        );
        assert!(matches!(cycle, Err(ModelError::InvalidFormat(_))));

        let bad_feature = RandomForest::new(
            vec![grid_feature()],
            vec![Tree { nodes: vec![Node::split(3, 1.0, 1, 2), Node::leaf(1), Node::leaf(2)] }],
        );
        assert!(matches!(bad_feature, Err(ModelError::InvalidFormat(_))));

        let wrong_encoding = RandomForest::new(
            vec![Feature { column: Column::Driver, encoding: Encoding::Numeric }],
            vec![Tree { nodes: vec![Node::leaf(1)] }],
        );
        assert!(matches!(wrong_encoding, Err(ModelError::InvalidFormat(_))));

        assert!(matches!(RandomForest::from_json_str("{"), Err(ModelError::JsonError(_))));
    }

    #[test]
    fn test_direct_deserialize_validates() {
        let out_of_range = r#"{
            "version": 1,
            "features": [{"column": "Grid", "encoding": "numeric"}],
            "trees": [{"nodes": [{"feature_idx": 0, "threshold": 1.0, "left": 7, "right": 9}]}]
        }"#;
        let err = serde_json::from_str::<RandomForest>(out_of_range).unwrap_err();
        assert!(err.to_string().contains("invalid child"));

        let forest = RandomForest::new(vec![grid_feature()], vec![grid_stump(3.0, 1, 5)]).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let parsed: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version(), FORMAT_VERSION);
        assert_eq!(parsed.trees().len(), 1);
    }

    #[test]
    fn test_loader_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("forest.json");
        let forest = RandomForest::new(vec![grid_feature()], vec![grid_stump(3.0, 1, 5)]).unwrap();
        std::fs::write(&path, serde_json::to_string(&forest).unwrap()).unwrap();

        assert_eq!(ForestLoader.load(&path).unwrap(), forest);
        assert!(matches!(
            ForestLoader.load(&dir.path().join("missing.json")),
            Err(ModelError::IoError(_))
        ));
    }
}
