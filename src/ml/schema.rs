use crate::config::CoverageMode;
use crate::error::{AppError, Result};
use crate::ml::features::ApplicationRecord;
use crate::models::all_attributes;
use ndarray::Array1;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// Ordered feature names the classifier was trained on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    names: Vec<String>,

    #[serde(skip)]
    index: HashSet<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty lists, blank names and duplicates
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(AppError::SchemaMismatch("feature list is empty".to_string()));
        }

        let mut index = HashSet::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(AppError::SchemaMismatch(format!(
                    "feature name at position {} is blank",
                    position
                )));
            }
            if !index.insert(name.clone()) {
                return Err(AppError::SchemaMismatch(format!(
                    "feature {:?} appears more than once",
                    name
                )));
            }
        }

        Ok(Self { names, index })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Dense vector in schema order; absent features are 0, unknown keys are dropped
    pub fn align(&self, record: &ApplicationRecord) -> Array1<f64> {
        align_features(&self.names, record)
    }

    /// Record keys the schema does not consult, sorted
    pub fn unknown_keys(&self, record: &ApplicationRecord) -> Vec<String> {
        let mut unknown: Vec<String> = record
            .keys()
            .filter(|key| !self.contains(key))
            .map(str::to_string)
            .collect();
        unknown.sort();
        unknown
    }

    /// The classifier must accept exactly one input per schema column
    pub fn check_dimension(&self, n_features: usize) -> Result<()> {
        if n_features != self.len() {
            return Err(AppError::SchemaMismatch(format!(
                "classifier expects {} features but the feature list has {}",
                n_features,
                self.len()
            )));
        }
        Ok(())
    }

    /// Which categorical options one-hot encode into a column this schema lacks
    pub fn categorical_coverage(&self) -> CoverageReport {
        let mut missing = Vec::new();
        for attribute in all_attributes() {
            for (option, feature_name) in attribute
                .options
                .iter()
                .copied()
                .zip(attribute.feature_names.iter().copied())
            {
                if !self.contains(feature_name) {
                    missing.push(MissingOption {
                        attribute: attribute.attribute,
                        option,
                        feature_name,
                    });
                }
            }
        }
        CoverageReport { missing }
    }
}

/// Reconcile a sparse record against an ordered name list.
pub fn align_features(names: &[String], record: &ApplicationRecord) -> Array1<f64> {
    names
        .iter()
        .map(|name| record.get(name).unwrap_or(0.0))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingOption {
    pub attribute: &'static str,
    pub option: &'static str,
    pub feature_name: &'static str,
}

/// Categorical options whose one-hot column is absent from the schema.
///
/// Selecting such an option has no effect on the classifier input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageReport {
    pub missing: Vec<MissingOption>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Log (warn mode) or fail (strict mode) when options are uncovered
    pub fn enforce(&self, mode: CoverageMode) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }

        let listing = self
            .missing
            .iter()
            .map(|m| m.feature_name)
            .collect::<Vec<_>>()
            .join(", ");

        match mode {
            CoverageMode::Strict => Err(AppError::CategoricalCoverage(format!(
                "no column for {}",
                listing
            ))),
            CoverageMode::Warn => {
                for m in &self.missing {
                    warn!(
                        attribute = m.attribute,
                        option = m.option,
                        feature = m.feature_name,
                        "Categorical option has no column in the feature list"
                    );
                }
                Ok(())
            }
        }
    }
}
