//! Native JSON model documents
//!
//! Plain-data exports of the model families the premium calculator serves:
//!
//! ```text
//! linear:         premium = intercept + Σ coefficient[f] × row[f]
//! tree_ensemble:  premium = base_score + aggregate(tree_1(row), ..., tree_n(row))
//! ```
//!
//! A single decision tree is an ensemble of one; a random forest averages
//! its trees (`"aggregation": "mean"`); gradient boosting sums them on top
//! of a base score (`"aggregation": "sum"`). Tree nodes are stored flat,
//! children always after their parent, and a split sends a row left when
//! `value < threshold`.

use super::Predictor;
use crate::schema::{feature_index, FeatureRow, FEATURE_COUNT};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ModelDocument {
    Linear {
        intercept: f64,
        coefficients: BTreeMap<String, f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeDocument>,
    },
}

#[derive(Debug, Deserialize)]
struct TreeDocument {
    nodes: Vec<NodeDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeDocument {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

/// Ordinary linear regression
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    weights: [f64; FEATURE_COUNT],
}

impl LinearModel {
    /// Build from named coefficients; fields without a coefficient weigh 0
    pub fn new(intercept: f64, coefficients: &BTreeMap<String, f64>) -> Result<Self> {
        let mut weights = [0.0; FEATURE_COUNT];
        for (name, weight) in coefficients {
            let index = feature_index(name)
                .with_context(|| format!("Coefficient for unknown feature '{}'", name))?;
            weights[index] = *weight;
        }
        Ok(Self { intercept, weights })
    }

    pub fn predict_row(&self, row: &FeatureRow) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(row.as_slice())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(index: usize, doc: TreeDocument) -> Result<Self> {
        if doc.nodes.is_empty() {
            bail!("Tree {} has no nodes", index);
        }

        let len = doc.nodes.len();
        let nodes = doc
            .nodes
            .into_iter()
            .enumerate()
            .map(|(position, node)| match node {
                NodeDocument::Leaf { leaf } => Ok(Node::Leaf(leaf)),
                NodeDocument::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let feature = feature_index(&feature).with_context(|| {
                        format!("Tree {} splits on unknown feature '{}'", index, feature)
                    })?;
                    for child in [left, right] {
                        if child <= position || child >= len {
                            bail!(
                                "Tree {} node {} has invalid child index {}",
                                index,
                                position,
                                child
                            );
                        }
                    }
                    Ok(Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { nodes })
    }

    /// Children always follow their parent, so the walk terminates
    fn evaluate(&self, row: &FeatureRow) -> f64 {
        let mut position = 0;
        loop {
            match self.nodes[position] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.value(feature).unwrap_or(f64::NAN);
                    position = if value < threshold { left } else { right };
                }
            }
        }
    }
}

/// Decision tree, random forest or gradient boosted ensemble
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    aggregation: Aggregation,
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_row(&self, row: &FeatureRow) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.evaluate(row)).sum();
        let combined = match self.aggregation {
            Aggregation::Sum => total,
            Aggregation::Mean => total / self.trees.len() as f64,
        };
        self.base_score + combined
    }
}

/// A model loaded from a native JSON document
#[derive(Debug, Clone, PartialEq)]
pub enum NativeModel {
    Linear(LinearModel),
    Trees(TreeEnsemble),
}

impl NativeModel {
    /// Parse and structurally check a model document
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let doc: ModelDocument =
            serde_json::from_slice(bytes).context("Failed to parse model document")?;

        match doc {
            ModelDocument::Linear {
                intercept,
                coefficients,
            } => Ok(NativeModel::Linear(LinearModel::new(intercept, &coefficients)?)),
            ModelDocument::TreeEnsemble {
                aggregation,
                base_score,
                trees,
            } => {
                if trees.is_empty() {
                    bail!("Tree ensemble has no trees");
                }
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(index, doc)| Tree::compile(index, doc))
                    .collect::<Result<Vec<_>>>()?;
                Ok(NativeModel::Trees(TreeEnsemble {
                    aggregation,
                    base_score,
                    trees,
                }))
            }
        }
    }
}

impl Predictor for NativeModel {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        Ok(match self {
            NativeModel::Linear(model) => model.predict_row(row),
            NativeModel::Trees(model) => model.predict_row(row),
        })
    }

    fn format(&self) -> &'static str {
        match self {
            NativeModel::Linear(_) => "json-linear",
            NativeModel::Trees(_) => "json-trees",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FeatureRecord;

    fn load(doc: &str) -> Result<NativeModel> {
        NativeModel::from_slice(doc.as_bytes())
    }

    /// Age split at 40, then BMI split at 30
    const STUMP: &str = r#"{"nodes": [
        {"feature": "Age", "threshold": 40, "left": 1, "right": 2},
        {"leaf": 1000.0},
        {"feature": "BMI", "threshold": 30, "left": 3, "right": 4},
        {"leaf": 2000.0},
        {"leaf": 3500.0}
    ]}"#;

    #[test]
    fn test_linear_prediction() {
        let model = load(
            r#"{"type": "linear", "intercept": 5000.0,
                "coefficients": {"Age": 100.0, "AnyTransplants": 7000.0, "AgeGroup_31-45": -250.0}}"#,
        )
        .unwrap();

        let row = FeatureRecord::default().to_row();
        // 5000 + 35*100 + 0*7000 - 250
        assert_eq!(model.predict(&row).unwrap(), 8250.0);
        assert_eq!(model.format(), "json-linear");
    }

    #[test]
    fn test_linear_unknown_coefficient() {
        let err = load(r#"{"type": "linear", "intercept": 0, "coefficients": {"Income": 1}}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Income"));
    }

    #[test]
    fn test_single_tree_paths() {
        let model = load(&format!(r#"{{"type": "tree_ensemble", "trees": [{STUMP}]}}"#)).unwrap();

        let mut record = FeatureRecord::default();
        assert_eq!(model.predict(&record.to_row()).unwrap(), 1000.0);

        record.age = 40;
        assert_eq!(model.predict(&record.to_row()).unwrap(), 2000.0);

        record.bmi = 30.0;
        assert_eq!(model.predict(&record.to_row()).unwrap(), 3500.0);
    }

    #[test]
    fn test_mean_aggregation() {
        let doc = format!(
            r#"{{"type": "tree_ensemble", "aggregation": "mean",
                 "trees": [{STUMP}, {{"nodes": [{{"leaf": 3000.0}}]}}]}}"#
        );
        let NativeModel::Trees(model) = load(&doc).unwrap() else {
            panic!("expected trees");
        };
        assert_eq!(model.aggregation(), Aggregation::Mean);
        assert_eq!(model.num_trees(), 2);
        assert_eq!(model.predict_row(&FeatureRecord::default().to_row()), 2000.0);
    }

    #[test]
    fn test_sum_aggregation_with_base_score() {
        let doc = format!(
            r#"{{"type": "tree_ensemble", "aggregation": "sum", "base_score": 500.0,
                 "trees": [{STUMP}, {{"nodes": [{{"leaf": -100.0}}]}}]}}"#
        );
        let model = load(&doc).unwrap();
        assert_eq!(model.predict(&FeatureRecord::default().to_row()).unwrap(), 1400.0);
    }

    #[test]
    fn test_rejects_backward_child_reference() {
        let doc = r#"{"type": "tree_ensemble", "trees": [{"nodes": [
            {"leaf": 1.0},
            {"feature": "Age", "threshold": 40, "left": 0, "right": 2},
            {"leaf": 2.0}
        ]}]}"#;
        let err = load(doc).unwrap_err();
        assert!(format!("{err:#}").contains("invalid child index"));
    }

    #[test]
    fn test_rejects_out_of_bounds_child() {
        let doc = r#"{"type": "tree_ensemble", "trees": [{"nodes": [
            {"feature": "Age", "threshold": 40, "left": 1, "right": 9},
            {"leaf": 2.0}
        ]}]}"#;
        assert!(load(doc).is_err());
    }

    #[test]
    fn test_rejects_unknown_split_feature() {
        let doc = r#"{"type": "tree_ensemble", "trees": [{"nodes": [
            {"feature": "Zip", "threshold": 1, "left": 1, "right": 2},
            {"leaf": 1.0}, {"leaf": 2.0}
        ]}]}"#;
        assert!(load(doc).is_err());
    }

    #[test]
    fn test_rejects_empty_ensemble_and_tree() {
        assert!(load(r#"{"type": "tree_ensemble", "trees": []}"#).is_err());
        assert!(load(r#"{"type": "tree_ensemble", "trees": [{"nodes": []}]}"#).is_err());
    }

    #[test]
    fn test_rejects_unknown_model_type() {
        assert!(load(r#"{"type": "svm", "support_vectors": []}"#).is_err());
    }
}
