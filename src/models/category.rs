use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// A categorical form attribute whose options one-hot encode into fixed feature names.
pub trait CategoricalFeature: Copy + Sized + IntoEnumIterator + 'static {
    /// Attribute name, also the one-hot column prefix
    const ATTRIBUTE: &'static str;

    /// Option label as shown on the form
    fn label(self) -> &'static str;

    /// Column set to 1 when this option is selected
    fn feature_name(self) -> &'static str;

    /// Parse a form value, ignoring ASCII case
    fn parse_option(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Self::iter()
            .find(|option| option.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::UnknownCategory {
                attribute: Self::ATTRIBUTE.to_string(),
                value: value.to_string(),
            })
    }

    fn options() -> Vec<Self> {
        Self::iter().collect()
    }

    fn feature_names() -> Vec<&'static str> {
        Self::iter().map(Self::feature_name).collect()
    }
}

/// Declares a categorical attribute from its option table.
///
/// Each row maps a variant to its form label. The one-hot column name is
/// `<attribute>_<label>`, assembled at compile time.
macro_rules! categorical_attribute {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $attribute:literal {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
        pub enum $name {
            $( $variant, )+
        }

        impl CategoricalFeature for $name {
            const ATTRIBUTE: &'static str = $attribute;

            fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            fn feature_name(self) -> &'static str {
                match self {
                    $( $name::$variant => concat!($attribute, "_", $label), )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                <Self as CategoricalFeature>::parse_option(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                <Self as CategoricalFeature>::parse_option(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

categorical_attribute! {
    /// Product the applicant is asking for
    pub enum LoanType: "loan_type" {
        Business => "Business Loan",
        Car => "Car Loan",
        Education => "Education Loan",
        Personal => "Personal Loan",
    }
}

categorical_attribute! {
    pub enum EmploymentStatus: "employment_status" {
        Employed => "Employed",
        SelfEmployed => "Self-Employed",
        Unemployed => "Unemployed",
    }
}

categorical_attribute! {
    pub enum PropertyOwnershipStatus: "property_ownership_status" {
        Rented => "Rented",
        Owned => "Owned",
        Mortgaged => "Mortgaged",
    }
}

categorical_attribute! {
    pub enum Gender: "gender" {
        Male => "Male",
        Female => "Female",
    }
}

categorical_attribute! {
    /// Stated use of the funds
    pub enum PurposeOfLoan: "purpose_of_loan" {
        Business => "Business",
        Education => "Education",
        Personal => "Personal",
        Vehicle => "Vehicle",
    }
}

categorical_attribute! {
    /// Derived applicant age bucket
    pub enum AgeGroup: "age_group" {
        Young => "Young",
        MidAge => "Mid-Age",
        Senior => "Senior",
        Elder => "Elder",
    }
}

impl AgeGroup {
    /// Bucket an age; boundaries are inclusive on the upper end of each bucket.
    pub fn from_age(age: u32) -> Self {
        if age <= 30 {
            AgeGroup::Young
        } else if age <= 45 {
            AgeGroup::MidAge
        } else if age <= 60 {
            AgeGroup::Senior
        } else {
            AgeGroup::Elder
        }
    }
}

impl Default for LoanType {
    fn default() -> Self {
        LoanType::Business
    }
}

impl Default for EmploymentStatus {
    fn default() -> Self {
        EmploymentStatus::Employed
    }
}

impl Default for PropertyOwnershipStatus {
    fn default() -> Self {
        PropertyOwnershipStatus::Rented
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Male
    }
}

impl Default for PurposeOfLoan {
    fn default() -> Self {
        PurposeOfLoan::Business
    }
}

/// Options of one attribute together with their one-hot columns
#[derive(Debug, Clone, Serialize)]
pub struct AttributeOptions {
    pub attribute: &'static str,
    pub options: Vec<&'static str>,
    pub feature_names: Vec<&'static str>,
}

impl AttributeOptions {
    pub fn of<C: CategoricalFeature>() -> Self {
        Self {
            attribute: C::ATTRIBUTE,
            options: C::iter().map(C::label).collect(),
            feature_names: C::feature_names(),
        }
    }
}

/// Every one-hot encoded attribute, including the derived age group
pub fn all_attributes() -> Vec<AttributeOptions> {
    vec![
        AttributeOptions::of::<LoanType>(),
        AttributeOptions::of::<PurposeOfLoan>(),
        AttributeOptions::of::<EmploymentStatus>(),
        AttributeOptions::of::<PropertyOwnershipStatus>(),
        AttributeOptions::of::<Gender>(),
        AttributeOptions::of::<AgeGroup>(),
    ]
}
