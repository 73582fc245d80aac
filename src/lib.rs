//! Client-side comment threads with optimistic fallback to local state.
//!
//! The forest lives in a [`core::store::CommentStore`]. A
//! [`core::controller::CommentController`] pairs it with a remote
//! [`remote::CommentApi`]: every mutation is tried against the backend first
//! and applied locally when that call fails.
//!
//! # Examples
//!
//! Local-only usage with [`remote::offline::OfflineApi`]:
//! ```
//! use commentree::{
//!     config::ClientConfig,
//!     core::controller::CommentController,
//!     remote::{offline::OfflineApi, snapshot::StaticSnapshot},
//!     types::{SortMode, SyncSource, VoteDirection},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut comments = CommentController::new(
//!     Box::new(OfflineApi),
//!     Box::new(StaticSnapshot::bundled()),
//!     ClientConfig::default(),
//! );
//! comments.load().await.expect("load");
//!
//! let added = comments.add("hello", None).await.expect("add");
//! assert_eq!(added.source, SyncSource::LocalFallback);
//! assert_eq!(comments.store().comments()[0].text, "hello");
//!
//! comments.store_mut().vote(&added.id, VoteDirection::Up);
//! comments.store_mut().set_sort_mode(SortMode::New);
//! assert_eq!(comments.store().sorted()[0].id, added.id);
//! # }
//! ```
//!
//! Runtime usage against a live backend:
//! ```no_run
//! use commentree::{
//!     config::ClientConfig,
//!     core::controller::CommentController,
//!     runtime::handle::{spawn_comments, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let controller = CommentController::from_config(ClientConfig::from_env()).expect("config");
//! let handle = spawn_comments(controller, RuntimeConfig::default());
//! handle.load().await.expect("load");
//! let added = handle.add("First!", None).await.expect("add");
//! handle.update(added.id, "First, edited").await.expect("update");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Comment record and wire payloads.
pub mod comment;
/// Client configuration and environment overrides.
pub mod config;
/// Comment store, tree walks, and the sync controller.
pub mod core;
/// Sorting and display projections.
pub mod engine;
/// Remote API trait, HTTP client, and fallback sources.
pub mod remote;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
