use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive fields shipped with every model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Training timestamp, when the exporter recorded one
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            trained_at: None,
        }
    }
}

/// Serialized classifier, tagged by model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegressionParams),
    RandomForest(RandomForestParams),
}

impl ModelArtifact {
    pub fn metadata(&self) -> &ModelMetadata {
        match self {
            ModelArtifact::LogisticRegression(params) => &params.metadata,
            ModelArtifact::RandomForest(params) => &params.metadata,
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            ModelArtifact::LogisticRegression(_) => ModelType::LogisticRegression,
            ModelArtifact::RandomForest(_) => ModelType::RandomForest,
        }
    }
}

/// Binary logistic regression: `p1 = sigmoid(coefficients · x + intercept)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    pub metadata: ModelMetadata,

    /// One coefficient per input feature, in feature-list order
    pub coefficients: Vec<f64>,

    pub intercept: f64,

    /// Fraud label is assigned when `p1 > threshold`
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Forest of binary decision trees whose leaf distributions are averaged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    pub metadata: ModelMetadata,

    /// Input dimensionality the trees were grown on
    pub n_features: usize,

    pub trees: Vec<TreeParams>,
}

/// One decision tree in parallel-array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go left. `value[i]` holds per-class
/// weights (counts or fractions) and is only read at leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

/// Model type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Logistic regression
    LogisticRegression,

    /// Random forest
    RandomForest,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::LogisticRegression => write!(f, "Logistic Regression"),
            ModelType::RandomForest => write!(f, "Random Forest"),
        }
    }
}

/// Label and class probabilities for one application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudPrediction {
    /// 1 = fraud, 0 = legitimate
    pub label: usize,

    /// `[p_legitimate, p_fraud]`
    pub probabilities: [f64; 2],
}

impl FraudPrediction {
    pub fn fraud_probability(&self) -> f64 {
        self.probabilities[1]
    }
}

fn default_threshold() -> f64 {
    0.5
}
