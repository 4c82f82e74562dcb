use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::category::AgeGroup;

/// Binary outcome of a fraud check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Legitimate,
    Fraud,
}

impl Verdict {
    /// Map a classifier label (1 = fraud)
    pub fn from_label(label: usize) -> Self {
        if label == 1 {
            Verdict::Fraud
        } else {
            Verdict::Legitimate
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Verdict::Fraud)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Legitimate => write!(f, "legitimate"),
            Verdict::Fraud => write!(f, "fraud"),
        }
    }
}

/// Secondary features computed from the raw form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub loan_to_income_ratio: f64,
    pub emi_to_income_ratio: f64,
    pub interest_burden: f64,
    /// 1 when more than 40% of transactions were international
    pub high_intl_txn: u8,
    pub age_group: AgeGroup,
}

/// Result of scoring one application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub request_id: Uuid,
    pub verdict: Verdict,

    /// Probability of the fraud class, in [0, 1]
    pub fraud_probability: f64,

    pub derived: DerivedFeatures,

    /// Record keys the feature list did not consult
    pub ignored_features: Vec<String>,

    pub model_name: String,
    pub assessed_at: DateTime<Utc>,
}

impl FraudAssessment {
    /// User-facing one-line result, probability with two decimals
    pub fn summary(&self) -> String {
        if self.verdict.is_fraud() {
            format!("High Fraud Risk Detected! Probability: {:.2}", self.fraud_probability)
        } else {
            format!("Loan Looks Legitimate. Probability of Fraud: {:.2}", self.fraud_probability)
        }
    }
}
