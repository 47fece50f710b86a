use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};

use super::model::{DecisionTree, FOREST_MODEL_VERSION, RandomForestModel, TreeNode};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `feature_len` features (at least 1).
    pub fn resolve(self, feature_len: usize) -> usize {
        let count = match self {
            MaxFeatures::All => feature_len,
            MaxFeatures::Sqrt => (feature_len as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (feature_len as f64).log2().floor() as usize,
            MaxFeatures::Count(count) => count,
        };
        count.clamp(1, feature_len.max(1))
    }
}

/// Training hyperparameters for the forest.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Depth limit per tree; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Draw each tree's rows with replacement.
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// In-memory dataset used for training and evaluation.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    /// Number of `f32` values in each feature vector.
    pub feature_len: usize,
    /// Ordered list of class identifiers.
    pub classes: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f32>>,
    /// Class indices aligned with `x`.
    pub y: Vec<usize>,
}

/// Fit a random forest: bootstrap-sampled CART trees with Gini impurity and
/// a random feature subset searched at every split.
///
/// The result depends only on `dataset` and `options`, including the seed.
pub fn train_random_forest(
    dataset: &TrainDataset,
    options: &TrainOptions,
) -> Result<RandomForestModel, String> {
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if dataset.x.is_empty() {
        return Err("Empty dataset".to_string());
    }
    let n_classes = dataset.classes.len();
    if n_classes < 2 {
        return Err("Need at least 2 classes".to_string());
    }
    if options.n_trees == 0 {
        return Err("Need at least 1 tree".to_string());
    }
    if let Some(row_idx) = dataset.x.iter().position(|row| row.len() != dataset.feature_len) {
        return Err(format!(
            "Row {row_idx} has {} features but expected {}",
            dataset.x[row_idx].len(),
            dataset.feature_len
        ));
    }
    if let Some(&label) = dataset.y.iter().find(|&&label| label >= n_classes) {
        return Err(format!("Label {label} is out of range for {n_classes} classes"));
    }

    let n = dataset.x.len();
    let mut master = StdRng::seed_from_u64(options.seed);
    let mut trees = Vec::with_capacity(options.n_trees);
    for _ in 0..options.n_trees {
        let mut rng = StdRng::seed_from_u64(master.random::<u64>());
        let samples: Vec<usize> = if options.bootstrap {
            (0..n).map(|_| rng.random_range(0..n)).collect()
        } else {
            (0..n).collect()
        };
        let mut builder = TreeBuilder {
            dataset,
            options,
            n_classes,
            max_features: options.max_features.resolve(dataset.feature_len),
            rng,
            nodes: Vec::new(),
        };
        builder.grow(samples, 0);
        trees.push(DecisionTree {
            nodes: builder.nodes,
        });
    }

    Ok(RandomForestModel {
        model_version: FOREST_MODEL_VERSION,
        feature_len: dataset.feature_len,
        classes: dataset.classes.clone(),
        trees,
    })
}

struct TreeBuilder<'a> {
    dataset: &'a TrainDataset,
    options: &'a TrainOptions,
    n_classes: usize,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    impurity: f64,
    feature: usize,
    threshold: f32,
}

impl TreeBuilder<'_> {
    /// Append the subtree for `samples` and return its root index.
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> u32 {
        let node_idx = self.nodes.len();
        let counts = self.class_counts(&samples);
        self.nodes.push(leaf(&counts, samples.len()));

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.options.max_depth.is_some_and(|max| depth >= max);
        if is_pure || depth_reached || samples.len() < self.options.min_samples_split.max(2) {
            return node_idx as u32;
        }
        let Some(best) = self.find_split(&samples) else {
            return node_idx as u32;
        };

        let x = &self.dataset.x;
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| x[i][best.feature] <= best.threshold);
        let left_idx = self.grow(left, depth + 1);
        let right_idx = self.grow(right, depth + 1);
        self.nodes[node_idx] = TreeNode::Split {
            feature: best.feature as u16,
            threshold: best.threshold,
            left: left_idx,
            right: right_idx,
        };
        node_idx as u32
    }

    /// Visit features in random order until `max_features` non-constant ones
    /// have been searched, keeping the lowest weighted Gini impurity.
    fn find_split(&mut self, samples: &[usize]) -> Option<BestSplit> {
        let mut order: Vec<usize> = (0..self.dataset.feature_len).collect();
        order.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        let mut searched = 0usize;
        for feature in order {
            if searched >= self.max_features {
                break;
            }
            let mut column: Vec<(f32, usize)> = samples
                .iter()
                .map(|&i| (self.dataset.x[i][feature], self.dataset.y[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));
            if column.first().map(|c| c.0) == column.last().map(|c| c.0) {
                continue;
            }
            searched += 1;
            if let Some(split) = self.best_split_for_feature(&column, feature)
                && best.is_none_or(|current| split.impurity < current.impurity)
            {
                best = Some(split);
            }
        }
        best
    }

    fn best_split_for_feature(&self, column: &[(f32, usize)], feature: usize) -> Option<BestSplit> {
        let n = column.len();
        let min_leaf = self.options.min_samples_leaf.max(1);
        let mut total = vec![0usize; self.n_classes];
        for &(_, label) in column {
            total[label] += 1;
        }
        let mut left = vec![0usize; self.n_classes];
        let mut right = total.clone();

        let mut best: Option<BestSplit> = None;
        for i in 0..n - 1 {
            let (value, label) = column[i];
            left[label] += 1;
            right[label] -= 1;
            let next = column[i + 1].0;
            if value == next {
                continue;
            }
            let left_n = i + 1;
            let right_n = n - left_n;
            if left_n < min_leaf || right_n < min_leaf {
                continue;
            }
            let impurity = (left_n as f64 * gini(&left, left_n)
                + right_n as f64 * gini(&right, right_n))
                / n as f64;
            if best.is_none_or(|current| impurity < current.impurity) {
                best = Some(BestSplit {
                    impurity,
                    feature,
                    threshold: midpoint(value, next),
                });
            }
        }
        best
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in samples {
            counts[self.dataset.y[i]] += 1;
        }
        counts
    }
}

fn leaf(counts: &[usize], total: usize) -> TreeNode {
    let total = total.max(1) as f32;
    TreeNode::Leaf {
        distribution: counts.iter().map(|&c| c as f32 / total).collect(),
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Threshold between two adjacent distinct values; `lower` must go left.
fn midpoint(lower: f32, upper: f32) -> f32 {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper { lower } else { mid }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold_dataset() -> TrainDataset {
        // Feature 0 separates the classes at 1.5; feature 1 is noise.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let positive = i % 2 == 0;
            let creatinine = if positive {
                2.0 + i as f32 * 0.1
            } else {
                0.5 + i as f32 * 0.03
            };
            x.push(vec![creatinine, (i * 7 % 5) as f32]);
            y.push(usize::from(positive));
        }
        TrainDataset {
            feature_len: 2,
            classes: vec!["notckd".into(), "ckd".into()],
            x,
            y,
        }
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(24), 4);
        assert_eq!(MaxFeatures::Log2.resolve(24), 4);
        assert_eq!(MaxFeatures::All.resolve(24), 24);
        assert_eq!(MaxFeatures::Count(0).resolve(24), 1);
        assert_eq!(MaxFeatures::Count(99).resolve(24), 24);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn gini_matches_known_values() {
        assert_eq!(gini(&[5, 0], 5), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[0, 0], 0), 0.0);
    }

    #[test]
    fn midpoint_stays_below_upper() {
        assert_eq!(midpoint(1.0, 2.0), 1.5);
        let lower = 1.0f32;
        let upper = f32::from_bits(lower.to_bits() + 1);
        assert_eq!(midpoint(lower, upper), lower);
    }

    #[test]
    fn single_tree_without_bootstrap_fits_training_rows() {
        let dataset = threshold_dataset();
        let options = TrainOptions {
            n_trees: 1,
            bootstrap: false,
            max_features: MaxFeatures::All,
            ..TrainOptions::default()
        };
        let model = train_random_forest(&dataset, &options).unwrap();
        model.validate().unwrap();
        for (row, &label) in dataset.x.iter().zip(&dataset.y) {
            assert_eq!(model.predict_class_index(row), label);
        }
        assert_eq!(model.trees[0].depth(), 1);
    }

    #[test]
    fn forest_separates_threshold_rule() {
        let dataset = threshold_dataset();
        let model = train_random_forest(&dataset, &TrainOptions::default()).unwrap();
        model.validate().unwrap();
        assert_eq!(model.trees.len(), 100);
        assert_eq!(model.predict_class_index(&[4.0, 1.0]), 1);
        assert_eq!(model.predict_class_index(&[0.6, 1.0]), 0);
        let proba = model.predict_proba(&[4.0, 1.0]);
        assert!((proba.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn same_seed_gives_identical_model() {
        let dataset = threshold_dataset();
        let a = train_random_forest(&dataset, &TrainOptions::default()).unwrap();
        let b = train_random_forest(&dataset, &TrainOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn depth_limit_is_respected() {
        let dataset = threshold_dataset();
        let options = TrainOptions {
            n_trees: 10,
            max_depth: Some(0),
            ..TrainOptions::default()
        };
        let model = train_random_forest(&dataset, &options).unwrap();
        assert!(model.trees.iter().all(|tree| tree.nodes.len() == 1));
    }

    #[test]
    fn constant_features_produce_a_single_leaf() {
        let dataset = TrainDataset {
            feature_len: 1,
            classes: vec!["a".into(), "b".into()],
            x: vec![vec![1.0]; 4],
            y: vec![0, 1, 0, 1],
        };
        let options = TrainOptions {
            n_trees: 1,
            bootstrap: false,
            ..TrainOptions::default()
        };
        let model = train_random_forest(&dataset, &options).unwrap();
        assert_eq!(
            model.trees[0].nodes,
            vec![TreeNode::Leaf {
                distribution: vec![0.5, 0.5]
            }]
        );
    }

    #[test]
    fn rejects_invalid_inputs() {
        let mut dataset = threshold_dataset();
        let options = TrainOptions::default();
        dataset.y.pop();
        assert!(train_random_forest(&dataset, &options).is_err());

        let mut dataset = threshold_dataset();
        dataset.y[0] = 5;
        assert!(train_random_forest(&dataset, &options).is_err());

        let mut dataset = threshold_dataset();
        dataset.x[3].push(0.0);
        assert!(train_random_forest(&dataset, &options).is_err());

        let no_trees = TrainOptions {
            n_trees: 0,
            ..TrainOptions::default()
        };
        assert!(train_random_forest(&threshold_dataset(), &no_trees).is_err());
    }
}
