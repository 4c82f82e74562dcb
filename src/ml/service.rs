use crate::config::{ArtifactsConfig, CoverageMode};
use crate::error::Result;
use crate::ml::artifacts::{load_feature_names, load_model};
use crate::ml::classifier::FraudClassifier;
use crate::ml::features::FeatureDeriver;
use crate::ml::models::{ModelMetadata, ModelType};
use crate::ml::schema::{CoverageReport, FeatureSchema};
use crate::models::{FraudAssessment, LoanApplication, Verdict};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Immutable inference context: the loaded classifier and its feature schema.
///
/// Built once at startup; every check that can fail without a request runs
/// in the constructor.
pub struct FraudPredictor {
    classifier: FraudClassifier,
    schema: FeatureSchema,
    coverage: CoverageReport,
}

impl FraudPredictor {
    /// Pair a classifier with its schema after the startup consistency checks
    pub fn new(
        classifier: FraudClassifier,
        schema: FeatureSchema,
        coverage_mode: CoverageMode,
    ) -> Result<Self> {
        schema.check_dimension(classifier.n_features())?;

        let coverage = schema.categorical_coverage();
        coverage.enforce(coverage_mode)?;

        Ok(Self {
            classifier,
            schema,
            coverage,
        })
    }

    /// Load both artifacts from disk
    pub fn load(config: &ArtifactsConfig) -> Result<Self> {
        info!(
            model = %config.model_path.display(),
            feature_columns = %config.feature_columns_path.display(),
            "Loading model artifacts"
        );

        let classifier = FraudClassifier::from_artifact(load_model(&config.model_path)?)?;
        let schema = FeatureSchema::new(load_feature_names(&config.feature_columns_path)?)?;

        let predictor = Self::new(classifier, schema, config.categorical_coverage)?;

        info!(
            model_name = %predictor.metadata().name,
            model_version = %predictor.metadata().version,
            model_type = %predictor.model_type(),
            n_features = predictor.schema.len(),
            uncovered_options = predictor.coverage.missing.len(),
            "Model artifacts loaded"
        );

        Ok(predictor)
    }

    /// Score one application: validate, derive, align, classify
    pub fn assess(&self, application: &LoanApplication) -> Result<FraudAssessment> {
        application.validate()?;

        let request_id = Uuid::new_v4();
        let (derived, record) = FeatureDeriver::build_record(application)?;
        let ignored_features = self.schema.unknown_keys(&record);
        let vector = self.schema.align(&record);

        debug!(
            %request_id,
            record_len = record.len(),
            ignored = ?ignored_features,
            "Aligned application record"
        );

        let prediction = self.classifier.predict_fraud(&vector)?;
        let verdict = Verdict::from_label(prediction.label);
        let fraud_probability = prediction.fraud_probability();

        info!(
            %request_id,
            %verdict,
            fraud_probability,
            "Application assessed"
        );

        Ok(FraudAssessment {
            request_id,
            verdict,
            fraud_probability,
            derived,
            ignored_features,
            model_name: self.metadata().name.clone(),
            assessed_at: Utc::now(),
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn coverage(&self) -> &CoverageReport {
        &self.coverage
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.classifier.metadata()
    }

    pub fn model_type(&self) -> ModelType {
        self.classifier.model_type()
    }

    /// Summary of the loaded artifacts
    pub fn info(&self) -> PredictorInfo {
        PredictorInfo {
            model: self.metadata().clone(),
            model_type: self.model_type(),
            n_features: self.schema.len(),
            feature_names: self.schema.names().to_vec(),
            coverage: self.coverage.clone(),
        }
    }
}

/// Loaded model and schema, as reported by the CLI and the API
#[derive(Debug, Clone, Serialize)]
pub struct PredictorInfo {
    pub model: ModelMetadata,
    pub model_type: ModelType,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub coverage: CoverageReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::ml::models::{LogisticRegressionParams, ModelArtifact};
    use crate::models::{all_attributes, CategoricalFeature, LoanType};

    fn columns() -> Vec<String> {
        let mut names: Vec<String> = [
            "loan_amount_requested",
            "monthly_income",
            "loan_to_income_ratio",
            "high_intl_txn",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        names.extend(
            all_attributes()
                .into_iter()
                .flat_map(|a| a.feature_names)
                .map(str::to_string),
        );
        names
    }

    fn classifier(n_features: usize, weights: &[(usize, f64)]) -> FraudClassifier {
        let mut coefficients = vec![0.0; n_features];
        for &(i, w) in weights {
            coefficients[i] = w;
        }
        FraudClassifier::from_artifact(ModelArtifact::LogisticRegression(
            LogisticRegressionParams {
                metadata: ModelMetadata::new("unit", "1"),
                coefficients,
                intercept: -1.0,
                threshold: 0.5,
            },
        ))
        .unwrap()
    }

    fn predictor(weights: &[(usize, f64)]) -> FraudPredictor {
        let names = columns();
        let classifier = classifier(names.len(), weights);
        FraudPredictor::new(
            classifier,
            FeatureSchema::new(names).unwrap(),
            CoverageMode::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let names = columns();
        let err = FraudPredictor::new(
            classifier(names.len() + 1, &[]),
            FeatureSchema::new(names).unwrap(),
            CoverageMode::Warn,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::SchemaMismatch(_)));
    }

    #[test]
    fn test_strict_coverage_is_fatal() {
        let names: Vec<String> = columns()
            .into_iter()
            .filter(|n| n != LoanType::Personal.feature_name())
            .collect();
        let n = names.len();

        let strict = FraudPredictor::new(
            classifier(n, &[]),
            FeatureSchema::new(names.clone()).unwrap(),
            CoverageMode::Strict,
        );
        assert!(matches!(strict, Err(AppError::CategoricalCoverage(_))));

        let lenient = FraudPredictor::new(
            classifier(n, &[]),
            FeatureSchema::new(names).unwrap(),
            CoverageMode::Warn,
        )
        .unwrap();
        assert_eq!(lenient.coverage().missing.len(), 1);
    }

    #[test]
    fn test_assess_legitimate_by_default() {
        let predictor = predictor(&[]);
        let assessment = predictor.assess(&LoanApplication::default()).unwrap();

        assert_eq!(assessment.verdict, Verdict::Legitimate);
        let expected = 1.0 / (1.0 + 1.0_f64.exp());
        assert!((assessment.fraud_probability - expected).abs() < 1e-12);
        assert!(assessment.ignored_features.contains(&"txn_count".to_string()));
        assert_eq!(assessment.model_name, "unit");
    }

    #[test]
    fn test_assess_uses_one_hot_columns() {
        let names = columns();
        let car = names
            .iter()
            .position(|n| n == LoanType::Car.feature_name())
            .unwrap();
        let predictor = predictor(&[(car, 5.0)]);

        let car_loan = LoanApplication {
            loan_type: LoanType::Car,
            ..Default::default()
        };
        assert_eq!(predictor.assess(&car_loan).unwrap().verdict, Verdict::Fraud);
        assert_eq!(
            predictor.assess(&LoanApplication::default()).unwrap().verdict,
            Verdict::Legitimate
        );
    }

    #[test]
    fn test_assess_rejects_invalid_form() {
        let predictor = predictor(&[]);
        let app = LoanApplication {
            applicant_age: 90,
            ..Default::default()
        };
        assert!(matches!(predictor.assess(&app), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_info() {
        let predictor = predictor(&[]);
        let info = predictor.info();
        assert_eq!(info.n_features, columns().len());
        assert_eq!(info.model_type, ModelType::LogisticRegression);
        assert!(info.coverage.is_complete());
    }
}
