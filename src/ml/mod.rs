/// Fraud scoring pipeline
///
/// - Feature derivation from the raw application form
/// - Schema alignment against the classifier's training-time column order
/// - Artifact loading (JSON or bincode)
/// - Classifier families (logistic regression, random forest)
/// - The immutable predictor context tying them together

pub mod artifacts;
pub mod classifier;
pub mod features;
pub mod models;
pub mod schema;
pub mod service;

pub use artifacts::{load_feature_names, load_model, write_artifact, ArtifactFormat};
pub use classifier::{
    classifier_from_artifact, Classifier, FraudClassifier, LogisticRegressionClassifier,
    RandomForestClassifier,
};
pub use features::{ApplicationRecord, FeatureDeriver, HIGH_INTL_TXN_THRESHOLD};
pub use models::{
    FraudPrediction, LogisticRegressionParams, ModelArtifact, ModelMetadata, ModelType,
    RandomForestParams, TreeParams,
};
pub use schema::{align_features, CoverageReport, FeatureSchema, MissingOption};
pub use service::{FraudPredictor, PredictorInfo};
