use crate::error::{AppError, Result};
use crate::models::category::{
    CategoricalFeature, EmploymentStatus, Gender, LoanType, PropertyOwnershipStatus, PurposeOfLoan,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Applicant and transaction attributes as collected by the input form.
///
/// Ranges mirror the form widgets. Validation is a surface concern; the
/// feature deriver only rejects inputs that make its formulas undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoanApplication {
    #[validate(range(min = 0.0))]
    pub loan_amount_requested: f64,

    #[validate(range(min = 6, max = 60))]
    pub loan_tenure_months: u32,

    /// Annual rate in percent
    #[validate(range(min = 1.0, max = 30.0))]
    pub interest_rate_offered: f64,

    #[validate(range(min = 0.0))]
    pub monthly_income: f64,

    #[validate(range(min = 0.0))]
    pub existing_emis_monthly: f64,

    #[validate(range(min = 0.0))]
    pub debt_to_income_ratio: f64,

    #[validate(range(min = 18, max = 70))]
    pub applicant_age: u32,

    #[validate(range(min = 0, max = 5))]
    pub number_of_dependents: u32,

    #[validate(range(min = 0.0))]
    pub avg_txn_amt: f64,

    #[validate(range(min = 0.0))]
    pub total_txn_amt: f64,

    #[validate(range(min = 0.0))]
    pub max_txn_amt: f64,

    #[validate(range(min = 0.0))]
    pub min_txn_amt: f64,

    #[validate(range(min = 0.0))]
    pub txn_count: f64,

    /// Fraction of transactions that were international
    #[validate(range(min = 0.0, max = 1.0))]
    pub intl_txn_ratio: f64,

    pub loan_type: LoanType,
    pub employment_status: EmploymentStatus,
    pub property_ownership_status: PropertyOwnershipStatus,
    pub gender: Gender,
    pub purpose_of_loan: PurposeOfLoan,
}

impl Default for LoanApplication {
    fn default() -> Self {
        Self {
            loan_amount_requested: 50000.0,
            loan_tenure_months: 24,
            interest_rate_offered: 12.0,
            monthly_income: 30000.0,
            existing_emis_monthly: 5000.0,
            debt_to_income_ratio: 0.3,
            applicant_age: 35,
            number_of_dependents: 1,
            avg_txn_amt: 10000.0,
            total_txn_amt: 50000.0,
            max_txn_amt: 20000.0,
            min_txn_amt: 500.0,
            txn_count: 10.0,
            intl_txn_ratio: 0.1,
            loan_type: LoanType::default(),
            employment_status: EmploymentStatus::default(),
            property_ownership_status: PropertyOwnershipStatus::default(),
            gender: Gender::default(),
            purpose_of_loan: PurposeOfLoan::default(),
        }
    }
}

impl LoanApplication {
    /// Decode a JSON form body.
    ///
    /// Categorical values are checked against their option tables first so an
    /// unknown option is reported as such rather than as a shape error.
    pub fn from_json(body: Value) -> Result<Self> {
        if let Some(fields) = body.as_object() {
            check_option::<LoanType>(fields)?;
            check_option::<EmploymentStatus>(fields)?;
            check_option::<PropertyOwnershipStatus>(fields)?;
            check_option::<Gender>(fields)?;
            check_option::<PurposeOfLoan>(fields)?;
        }

        serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Numeric form fields under the column names the classifier was trained on
    pub fn numeric_fields(&self) -> [(&'static str, f64); 14] {
        [
            ("loan_amount_requested", self.loan_amount_requested),
            ("loan_tenure_months", f64::from(self.loan_tenure_months)),
            ("interest_rate_offered", self.interest_rate_offered),
            ("monthly_income", self.monthly_income),
            ("existing_emis_monthly", self.existing_emis_monthly),
            ("debt_to_income_ratio", self.debt_to_income_ratio),
            ("applicant_age", f64::from(self.applicant_age)),
            ("number_of_dependents", f64::from(self.number_of_dependents)),
            ("avg_txn_amt", self.avg_txn_amt),
            ("total_txn_amt", self.total_txn_amt),
            ("max_txn_amt", self.max_txn_amt),
            ("min_txn_amt", self.min_txn_amt),
            ("txn_count", self.txn_count),
            ("intl_txn_ratio", self.intl_txn_ratio),
        ]
    }
}

fn check_option<C: CategoricalFeature>(fields: &Map<String, Value>) -> Result<()> {
    match fields.get(C::ATTRIBUTE) {
        Some(Value::String(raw)) => C::parse_option(raw).map(|_| ()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_form_defaults() {
        let app = LoanApplication::default();
        assert!(app.validate().is_ok());
        assert_eq!(app.loan_tenure_months, 24);
        assert_eq!(app.applicant_age, 35);
        assert_eq!(app.loan_type, LoanType::Business);
        assert_eq!(app.purpose_of_loan, PurposeOfLoan::Business);
    }

    #[test]
    fn test_range_validation() {
        let app = LoanApplication {
            applicant_age: 17,
            ..Default::default()
        };
        assert!(app.validate().is_err());

        let app = LoanApplication {
            intl_txn_ratio: 1.5,
            ..Default::default()
        };
        assert!(app.validate().is_err());

        let app = LoanApplication {
            monthly_income: -1.0,
            ..Default::default()
        };
        assert!(app.validate().is_err());

        let app = LoanApplication {
            loan_tenure_months: 61,
            ..Default::default()
        };
        assert!(app.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let app: LoanApplication = serde_json::from_str(
            r#"{"loan_amount_requested": 120000, "loan_type": "Car Loan", "gender": "Female"}"#,
        )
        .unwrap();

        assert_eq!(app.loan_amount_requested, 120000.0);
        assert_eq!(app.loan_type, LoanType::Car);
        assert_eq!(app.gender, Gender::Female);
        assert_eq!(app.monthly_income, 30000.0);
    }

    #[test]
    fn test_from_json_reports_unknown_option() {
        let err = LoanApplication::from_json(serde_json::json!({
            "loan_type": "Car Loan",
            "purpose_of_loan": "Holiday"
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::UnknownCategory { ref attribute, ref value }
                if attribute == "purpose_of_loan" && value == "Holiday"
        ));
    }

    #[test]
    fn test_from_json_shape_errors_are_validation() {
        let err = LoanApplication::from_json(serde_json::json!({ "applicant_age": "old" }))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = LoanApplication::from_json(serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let app = LoanApplication::from_json(serde_json::json!({ "gender": "female" })).unwrap();
        assert_eq!(app.gender, Gender::Female);
    }

    #[test]
    fn test_numeric_fields() {
        let app = LoanApplication::default();
        let fields = app.numeric_fields();
        assert_eq!(fields.len(), 14);
        assert_eq!(fields[0], ("loan_amount_requested", 50000.0));
        assert_eq!(fields[13], ("intl_txn_ratio", 0.1));
    }
}
