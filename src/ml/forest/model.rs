use serde::{Deserialize, Serialize};

/// Current serialized forest layout.
pub const FOREST_MODEL_VERSION: i64 = 1;

/// Node of a fitted decision tree. Children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Route `feature <= threshold` to `left`, everything else to `right`.
    Split {
        feature: u16,
        threshold: f32,
        left: u32,
        right: u32,
    },
    /// Class frequencies of the training samples that reached this leaf.
    Leaf { distribution: Vec<f32> },
}

/// A single CART tree stored as a flat node list rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Class distribution of the leaf `features` falls into.
    pub fn leaf_distribution(&self, features: &[f32]) -> &[f32] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature as usize).copied().unwrap_or(0.0);
                    idx = if value <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
    }

    /// Longest root-to-leaf path, counted in splits.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left as usize).max(walk(nodes, *right as usize))
                }
            }
        }
        walk(&self.nodes, 0)
    }

    fn validate(&self, feature_len: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(format!(
                            "leaf {idx} has {} class weights but expected {n_classes}",
                            distribution.len()
                        ));
                    }
                }
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature as usize >= feature_len {
                        return Err(format!(
                            "node {idx} splits on feature {feature} but rows have {feature_len}"
                        ));
                    }
                    for child in [*left as usize, *right as usize] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child index {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Bagged ensemble of decision trees for multi-class classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    /// Model format version.
    pub model_version: i64,
    /// Number of `f32` values per feature vector.
    pub feature_len: usize,
    /// Ordered list of class identifiers.
    pub classes: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != FOREST_MODEL_VERSION {
            return Err(format!(
                "Unsupported forest model_version {} (expected {FOREST_MODEL_VERSION})",
                self.model_version
            ));
        }
        if self.classes.len() < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("Model contains no trees".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_len, self.classes.len())
                .map_err(|err| format!("Tree {tree_idx}: {err}"))?;
        }
        Ok(())
    }

    /// Mean class distribution over all trees.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        let mut sums = vec![0.0f64; self.classes.len()];
        for tree in &self.trees {
            for (sum, &p) in sums.iter_mut().zip(tree.leaf_distribution(features)) {
                *sum += p as f64;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        sums.into_iter().map(|sum| (sum / n_trees) as f32).collect()
    }

    /// Most probable class index. Ties go to the higher index, so with two
    /// classes the result is 1 exactly when `P(class 1) >= 0.5`.
    pub fn predict_class_index(&self, features: &[f32]) -> usize {
        most_probable_class(&self.predict_proba(features))
    }
}

/// Index of the largest probability; ties go to the higher index.
pub(crate) fn most_probable_class(values: &[f32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v >= best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f32, left: [f32; 2], right: [f32; 2]) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    distribution: left.to_vec(),
                },
                TreeNode::Leaf {
                    distribution: right.to_vec(),
                },
            ],
        }
    }

    fn forest(trees: Vec<DecisionTree>) -> RandomForestModel {
        RandomForestModel {
            model_version: FOREST_MODEL_VERSION,
            feature_len: 1,
            classes: vec!["notckd".into(), "ckd".into()],
            trees,
        }
    }

    #[test]
    fn split_routes_equal_values_left() {
        let tree = stump(1.5, [1.0, 0.0], [0.0, 1.0]);
        assert_eq!(tree.leaf_distribution(&[1.5]), &[1.0, 0.0]);
        assert_eq!(tree.leaf_distribution(&[1.6]), &[0.0, 1.0]);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn proba_averages_trees() {
        let model = forest(vec![
            stump(1.5, [1.0, 0.0], [0.0, 1.0]),
            stump(3.0, [1.0, 0.0], [0.5, 0.5]),
        ]);
        assert_eq!(model.predict_proba(&[2.0]), vec![0.5, 0.5]);
        assert_eq!(model.predict_proba(&[4.0]), vec![0.25, 0.75]);
        assert_eq!(model.predict_proba(&[0.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn even_split_predicts_positive_class() {
        let model = forest(vec![
            stump(1.5, [1.0, 0.0], [0.0, 1.0]),
            stump(3.0, [1.0, 0.0], [0.0, 1.0]),
        ]);
        assert_eq!(model.predict_proba(&[2.0]), vec![0.5, 0.5]);
        assert_eq!(model.predict_class_index(&[2.0]), 1);
        assert_eq!(model.predict_class_index(&[1.0]), 0);
    }

    #[test]
    fn validate_accepts_well_formed_forest() {
        assert!(forest(vec![stump(1.0, [1.0, 0.0], [0.0, 1.0])]).validate().is_ok());
    }

    #[test]
    fn validate_rejects_broken_structure() {
        assert!(forest(Vec::new()).validate().is_err());

        let mut backwards = stump(1.0, [1.0, 0.0], [0.0, 1.0]);
        backwards.nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(forest(vec![backwards]).validate().is_err());

        let mut wide = stump(1.0, [1.0, 0.0], [0.0, 1.0]);
        wide.nodes[0] = TreeNode::Split {
            feature: 3,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(forest(vec![wide]).validate().is_err());

        let short_leaf = DecisionTree {
            nodes: vec![TreeNode::Leaf {
                distribution: vec![1.0],
            }],
        };
        assert!(forest(vec![short_leaf]).validate().is_err());

        let mut old = forest(vec![stump(1.0, [1.0, 0.0], [0.0, 1.0])]);
        old.model_version = 0;
        assert!(old.validate().is_err());
    }
}
