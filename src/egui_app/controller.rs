//! Form state and submit handling, kept free of egui types.

use crate::features::FeatureRow;
use crate::predictor::{Prediction, Predictor};

/// Owns the loaded model, the values currently in the form and the last result.
pub struct FormController {
    predictor: Predictor,
    /// Values bound to the form widgets.
    pub form: FeatureRow,
    last_prediction: Option<Prediction>,
}

impl FormController {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor,
            form: FeatureRow::default(),
            last_prediction: None,
        }
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.last_prediction.as_ref()
    }

    /// Clamp the form into its valid ranges and run one prediction on it.
    pub fn submit(&mut self) -> Prediction {
        self.form = self.form.clamped();
        let prediction = self.predictor.predict(&self.form);
        tracing::info!("Form submitted: {}", prediction.headline());
        self.last_prediction = Some(prediction);
        prediction
    }

    /// Restore form defaults and clear the shown result.
    pub fn reset(&mut self) {
        self.form = FeatureRow::default();
        self.last_prediction = None;
    }

    /// Drop a stale result once the form no longer matches what was predicted.
    pub fn form_edited(&mut self) {
        self.last_prediction = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ModelArtifact, TrainingSummary};
    use crate::features::{FEATURE_COUNT, Feature};
    use crate::ml::forest::{DecisionTree, FOREST_MODEL_VERSION, RandomForestModel, TreeNode};
    use crate::predictor::Diagnosis;

    fn controller() -> FormController {
        let forest = RandomForestModel {
            model_version: FOREST_MODEL_VERSION,
            feature_len: FEATURE_COUNT,
            classes: vec!["notckd".into(), "ckd".into()],
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: Feature::SerumCreatinine.index() as u16,
                        threshold: 1.5,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf {
                        distribution: vec![0.9, 0.1],
                    },
                    TreeNode::Leaf {
                        distribution: vec![0.2, 0.8],
                    },
                ],
            }],
        };
        let summary = TrainingSummary {
            dataset: "synthetic".into(),
            train_rows: 0,
            test_rows: 0,
            test_accuracy: 0.0,
            seed: 42,
            trained_at: String::new(),
        };
        FormController::new(Predictor::new(ModelArtifact::new(forest, "class", summary)))
    }

    #[test]
    fn submit_clamps_form_before_predicting() {
        let mut controller = controller();
        controller.form.serum_creatinine = 95.0;
        controller.form.age = 0.0;
        let prediction = controller.submit();
        assert_eq!(controller.form.serum_creatinine, 20.0);
        assert_eq!(controller.form.age, 1.0);
        assert_eq!(prediction.diagnosis, Diagnosis::CkdPresent);
        assert_eq!(controller.last_prediction(), Some(&prediction));
    }

    #[test]
    fn resubmitting_same_values_is_idempotent() {
        let mut controller = controller();
        controller.form.serum_creatinine = 1.2;
        let first = controller.submit();
        let second = controller.submit();
        assert_eq!(first, second);
        assert_eq!(first.probabilities, [0.9, 0.1]);
    }

    #[test]
    fn reset_and_edit_clear_result() {
        let mut controller = controller();
        controller.form.serum_creatinine = 3.0;
        controller.submit();
        controller.form_edited();
        assert!(controller.last_prediction().is_none());

        controller.submit();
        controller.reset();
        assert!(controller.last_prediction().is_none());
        assert_eq!(controller.form, FeatureRow::default());
    }
}
