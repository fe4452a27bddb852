//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use axe_visa_core::ports::DatabaseService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Everything behind it is request/response only: there are no background
/// workers and no shared mutable state beyond the database pool itself.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
}
