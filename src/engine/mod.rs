//! Derived views over the comment forest.

/// Top-level ordering by sort mode.
pub mod sort;
/// Flattened display rows.
pub mod view;
