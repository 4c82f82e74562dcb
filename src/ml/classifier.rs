use crate::error::{AppError, Result};
use crate::ml::models::{
    FraudPrediction, LogisticRegressionParams, ModelArtifact, ModelMetadata, ModelType,
    RandomForestParams, TreeParams,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Trait for binary classifiers
pub trait Classifier: Send + Sync {
    /// Predict class labels, one per row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;

    /// Predict class probabilities (n_samples × 2)
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Number of input columns the model expects
    fn n_features(&self) -> usize;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType;
}

/// Build the runtime classifier for a deserialized artifact
pub fn classifier_from_artifact(artifact: ModelArtifact) -> Result<Box<dyn Classifier>> {
    let classifier: Box<dyn Classifier> = match artifact {
        ModelArtifact::LogisticRegression(params) => {
            Box::new(LogisticRegressionClassifier::from_params(params)?)
        }
        ModelArtifact::RandomForest(params) => {
            Box::new(RandomForestClassifier::from_params(params)?)
        }
    };
    Ok(classifier)
}

fn check_columns(features: &Array2<f64>, expected: usize) -> Result<()> {
    if features.ncols() != expected {
        return Err(AppError::SchemaMismatch(format!(
            "input has {} columns, model expects {}",
            features.ncols(),
            expected
        )));
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}

/// Logistic Regression Classifier
#[derive(Debug, Clone)]
pub struct LogisticRegressionClassifier {
    metadata: ModelMetadata,
    coefficients: Array1<f64>,
    intercept: f64,
    threshold: f64,
}

impl LogisticRegressionClassifier {
    pub fn from_params(params: LogisticRegressionParams) -> Result<Self> {
        if params.coefficients.is_empty() {
            return Err(AppError::artifact_load("model", "logistic regression has no coefficients"));
        }
        if let Some(index) = params.coefficients.iter().position(|w| !w.is_finite()) {
            return Err(AppError::artifact_load(
                "model",
                format!("non-finite coefficient at index {}", index),
            ));
        }
        if !params.intercept.is_finite() {
            return Err(AppError::artifact_load("model", "non-finite intercept"));
        }
        if !(0.0..=1.0).contains(&params.threshold) {
            return Err(AppError::artifact_load(
                "model",
                format!("threshold {} not in [0, 1]", params.threshold),
            ));
        }

        Ok(Self {
            metadata: params.metadata,
            coefficients: Array1::from_vec(params.coefficients),
            intercept: params.intercept,
            threshold: params.threshold,
        })
    }

    fn positive_probabilities(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        check_columns(features, self.coefficients.len())?;
        let decision = features.dot(&self.coefficients) + self.intercept;
        Ok(decision.mapv(sigmoid))
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let positive = self.positive_probabilities(features)?;
        Ok(positive
            .iter()
            .map(|&p| usize::from(p > self.threshold))
            .collect())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let positive = self.positive_probabilities(features)?;
        let mut proba = Array2::zeros((positive.len(), 2));
        for (i, &p) in positive.iter().enumerate() {
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: [f64; 2],
    },
}

/// Decision tree validated so that every walk terminates at a leaf
#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn from_params(tree_index: usize, params: TreeParams, n_features: usize) -> Result<Self> {
        let invalid = |reason: String| {
            AppError::artifact_load("model", format!("tree {}: {}", tree_index, reason))
        };

        let n_nodes = params.children_left.len();
        if n_nodes == 0 {
            return Err(invalid("has no nodes".to_string()));
        }
        if params.children_right.len() != n_nodes
            || params.feature.len() != n_nodes
            || params.threshold.len() != n_nodes
            || params.value.len() != n_nodes
        {
            return Err(invalid("node arrays differ in length".to_string()));
        }

        let mut nodes = Vec::with_capacity(n_nodes);
        for i in 0..n_nodes {
            let left = params.children_left[i];
            let right = params.children_right[i];

            if left == -1 {
                if right != -1 {
                    return Err(invalid(format!("node {} has only one child", i)));
                }
                let [w0, w1] = params.value[i];
                let total = w0 + w1;
                if !(w0 >= 0.0 && w1 >= 0.0 && total > 0.0 && total.is_finite()) {
                    return Err(invalid(format!("leaf {} has invalid class weights", i)));
                }
                nodes.push(TreeNode::Leaf {
                    proba: [w0 / total, w1 / total],
                });
                continue;
            }

            // Children always follow their parent, so walks cannot cycle.
            let in_range = |child: i64| child > i as i64 && (child as usize) < n_nodes;
            if !in_range(left) || !in_range(right) {
                return Err(invalid(format!("node {} has out-of-order children", i)));
            }
            let feature = params.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(invalid(format!(
                    "node {} splits on feature {} of {}",
                    i, feature, n_features
                )));
            }
            let threshold = params.threshold[i];
            if threshold.is_nan() {
                return Err(invalid(format!("node {} has a NaN threshold", i)));
            }

            nodes.push(TreeNode::Split {
                feature: feature as usize,
                threshold,
                left: left as usize,
                right: right as usize,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_proba(&self, row: ArrayView1<f64>) -> [f64; 2] {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { proba } => return proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Random Forest Classifier
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    metadata: ModelMetadata,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn from_params(params: RandomForestParams) -> Result<Self> {
        if params.n_features == 0 {
            return Err(AppError::artifact_load("model", "random forest declares zero features"));
        }
        if params.trees.is_empty() {
            return Err(AppError::artifact_load("model", "random forest has no trees"));
        }

        let trees = params
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| DecisionTree::from_params(i, tree, params.n_features))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metadata: params.metadata,
            n_features: params.n_features,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForestClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(features)?;
        // Ties go to class 0, matching arg-max on the first maximum.
        Ok(proba
            .axis_iter(Axis(0))
            .map(|row| usize::from(row[1] > row[0]))
            .collect())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_columns(features, self.n_features)?;

        let n_trees = self.trees.len() as f64;
        let mut proba = Array2::zeros((features.nrows(), 2));
        for (i, row) in features.axis_iter(Axis(0)).enumerate() {
            let mut sum = [0.0, 0.0];
            for tree in &self.trees {
                let leaf = tree.leaf_proba(row);
                sum[0] += leaf[0];
                sum[1] += leaf[1];
            }
            proba[[i, 0]] = sum[0] / n_trees;
            proba[[i, 1]] = sum[1] / n_trees;
        }
        Ok(proba)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }
}

/// Single-application front for a boxed classifier
pub struct FraudClassifier {
    primary_model: Box<dyn Classifier>,
}

impl FraudClassifier {
    pub fn new(primary_model: Box<dyn Classifier>) -> Self {
        Self { primary_model }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        Ok(Self::new(classifier_from_artifact(artifact)?))
    }

    /// One `predict` call for the label and one `predict_proba` call for the probabilities
    pub fn predict_fraud(&self, features: &Array1<f64>) -> Result<FraudPrediction> {
        let features_array = features
            .clone()
            .into_shape((1, features.len()))
            .map_err(|e| AppError::Internal(format!("Failed to create feature array: {}", e)))?;

        let labels = self.primary_model.predict(&features_array)?;
        let proba = self.primary_model.predict_proba(&features_array)?;

        let label = *labels
            .first()
            .ok_or_else(|| AppError::Internal("Classifier returned no label".to_string()))?;
        if proba.nrows() != 1 || proba.ncols() != 2 {
            return Err(AppError::Internal(format!(
                "Classifier returned probabilities of shape {:?}",
                proba.shape()
            )));
        }

        let probabilities = [proba[[0, 0]], proba[[0, 1]]];
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(AppError::DegenerateInput(format!(
                "classifier produced probabilities {:?}",
                probabilities
            )));
        }

        Ok(FraudPrediction { label, probabilities })
    }

    pub fn n_features(&self) -> usize {
        self.primary_model.n_features()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.primary_model.metadata()
    }

    pub fn model_type(&self) -> ModelType {
        self.primary_model.model_type()
    }
}
