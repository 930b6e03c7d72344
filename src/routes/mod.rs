pub mod extract;
pub mod health;
pub mod resource;
mod router;
pub mod student_handlers;
pub mod types;

pub use router::create_router;

// Re-export AppState for convenience
pub use crate::state::AppState;
