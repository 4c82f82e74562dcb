use crate::error::{AppError, Result};
use crate::models::{AgeGroup, CategoricalFeature, DerivedFeatures, LoanApplication};
use std::collections::HashMap;

/// Share of international transactions above which an applicant is flagged
pub const HIGH_INTL_TXN_THRESHOLD: f64 = 0.4;

/// Sparse feature-name to value mapping for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationRecord {
    values: HashMap<String, f64>,
}

impl ApplicationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw numeric fields, derived ratios and one flag per categorical attribute
    pub fn from_application(application: &LoanApplication, derived: &DerivedFeatures) -> Self {
        let mut record = Self::new();

        for (name, value) in application.numeric_fields() {
            record.insert(name, value);
        }

        record.insert("loan_to_income_ratio", derived.loan_to_income_ratio);
        record.insert("emi_to_income_ratio", derived.emi_to_income_ratio);
        record.insert("interest_burden", derived.interest_burden);
        record.insert("high_intl_txn", f64::from(derived.high_intl_txn));

        record.set_one_hot(application.loan_type);
        record.set_one_hot(application.purpose_of_loan);
        record.set_one_hot(application.employment_status);
        record.set_one_hot(application.property_ownership_status);
        record.set_one_hot(application.gender);
        record.set_one_hot(derived.age_group);

        record
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    fn set_one_hot<C: CategoricalFeature>(&mut self, option: C) {
        self.insert(option.feature_name(), 1.0);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ApplicationRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// Computes the engineered features the classifier was trained with
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive ratios, the burden index, the international flag and the age bucket.
    ///
    /// Every ratio shares the `monthly_income + 1` denominator. An income of
    /// exactly -1 zeroes it and is rejected, as are non-finite raw fields and
    /// any non-finite result.
    pub fn derive(application: &LoanApplication) -> Result<DerivedFeatures> {
        for (name, value) in application.numeric_fields() {
            if !value.is_finite() {
                return Err(AppError::DegenerateInput(format!("{} is {}", name, value)));
            }
        }

        let denominator = application.monthly_income + 1.0;
        if denominator == 0.0 {
            return Err(AppError::DegenerateInput(
                "monthly_income of -1 leaves the income ratios undefined".to_string(),
            ));
        }

        let loan_to_income_ratio = application.loan_amount_requested / denominator;
        let emi_to_income_ratio = application.existing_emis_monthly / denominator;
        let interest_burden =
            (application.interest_rate_offered * application.loan_amount_requested) / denominator;

        for (name, value) in [
            ("loan_to_income_ratio", loan_to_income_ratio),
            ("emi_to_income_ratio", emi_to_income_ratio),
            ("interest_burden", interest_burden),
        ] {
            if !value.is_finite() {
                return Err(AppError::DegenerateInput(format!("{} evaluated to {}", name, value)));
            }
        }

        let high_intl_txn = if application.intl_txn_ratio > HIGH_INTL_TXN_THRESHOLD {
            1
        } else {
            0
        };

        Ok(DerivedFeatures {
            loan_to_income_ratio,
            emi_to_income_ratio,
            interest_burden,
            high_intl_txn,
            age_group: AgeGroup::from_age(application.applicant_age),
        })
    }

    /// Derive features and assemble the named record in one step
    pub fn build_record(
        application: &LoanApplication,
    ) -> Result<(DerivedFeatures, ApplicationRecord)> {
        let derived = Self::derive(application)?;
        let record = ApplicationRecord::from_application(application, &derived);
        Ok((derived, record))
    }
}
