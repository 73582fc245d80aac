//! Comment forest state and the operations that keep it in step with the backend.

/// Remote-aware operations with local fallback.
pub mod controller;
/// In-memory forest plus vote, collapse and cursor state.
pub mod store;
/// Iterative walks over nested replies.
pub mod tree;
