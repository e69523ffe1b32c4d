//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use quiz_core::ports::{AnswerService, BadgeCatalogService, CategoryHierarchyService};
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub answers: Arc<dyn AnswerService>,
    pub badges: Arc<dyn BadgeCatalogService>,
    pub categories: Arc<dyn CategoryHierarchyService>,
    /// Held for the duration of an award pass.
    pub award_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Builds the state from one store that implements every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AnswerService + BadgeCatalogService + CategoryHierarchyService + 'static,
    {
        Self {
            answers: store.clone(),
            badges: store.clone(),
            categories: store,
            award_lock: Arc::new(Mutex::new(())),
        }
    }
}
