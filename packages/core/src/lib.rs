//! Sober Core - Discussion Tree Engine
//!
//! This crate turns flat, parent-linked discussion bricks into annotated,
//! render-ready trees, and provides voting and group visibility on top of a
//! pluggable store.
//!
//! # Architecture
//!
//! - **Bricks**: a root thesis with typed responses (pro, contra, comment,
//!   question, improvement) forming a tree
//! - **Per-request trees**: every view materializes its tree from scratch into
//!   an id-keyed arena; nothing is cached between requests
//! - **Store abstraction**: persistence, vote ledger and group memberships sit
//!   behind the async [`db::BrickStore`] trait
//!
//! # Modules
//!
//! - [`models`] - Data structures (Brick, BrickType, Vote)
//! - [`tree`] - Materialization, title tags and subtree extraction
//! - [`services`] - BrickService, vote aggregation, visibility
//! - [`db`] - Store trait and in-memory implementation
//! - [`config`] - Engine settings
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use config::SoberConfig;
pub use models::*;
pub use services::{BrickService, BrickServiceError};
pub use tree::{BrickTree, BrickView, DepthBound, IncludedIds, MaterializedBrick};
