pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::FraudPredictor;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<FraudPredictor>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(predictor: Arc<FraudPredictor>) -> Self {
        Self {
            predictor,
            started_at: Instant::now(),
        }
    }
}
