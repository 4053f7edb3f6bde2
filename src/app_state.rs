use sqlx::PgPool;
use std::sync::Arc;

use crate::services::inference::InferenceClient;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub inference: Arc<InferenceClient>,
}

impl AppState {
    pub fn new(db: PgPool, inference: InferenceClient) -> Self {
        Self {
            db,
            inference: Arc::new(inference),
        }
    }
}
