use std::sync::Arc;

use analysis::ScoringEngine;
use storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: Arc<ScoringEngine>,
}
