pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;
pub mod jobs;

use std::sync::Arc;

use crate::domain::retention::RetentionPolicy;
use crate::infra::{clock::Clock, db::Db};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub clock: Arc<dyn Clock>,
    pub retention: RetentionPolicy,
}
