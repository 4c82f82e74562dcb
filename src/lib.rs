//! Loan fraud scoring: derives engineered features from an application form,
//! aligns them to a pre-trained classifier's column order, and reports a
//! fraud/legitimate verdict with the fraud probability.

pub mod api;
pub mod config;
pub mod error;
pub mod ml;
pub mod models;
pub mod observability;

pub use error::{AppError, Result};
pub use ml::FraudPredictor;
