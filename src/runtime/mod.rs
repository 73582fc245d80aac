//! Async ownership of a [`crate::core::controller::CommentController`].
//!
//! One task owns the controller; callers talk to it through a cloneable
//! handle and observe changes on a broadcast stream.

/// Broadcast payloads for state changes.
pub mod events;
/// Cloneable handle and the command loop behind it.
pub mod handle;
