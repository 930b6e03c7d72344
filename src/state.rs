use crate::models::Student;
use crate::repository::Repository;
use crate::rest::RestSettings;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Wrapped in `Arc` and handed to handlers via Axum's State extraction.
#[derive(Clone)]
pub struct AppState {
    /// Student storage, shared with the exposed `students` resource
    pub students: Arc<dyn Repository<Student>>,

    /// Base path and CORS mapping registered at startup
    pub settings: Arc<RestSettings>,
}
