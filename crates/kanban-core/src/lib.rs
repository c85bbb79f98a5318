//! kanban-core library.
//!
//! A task board whose every mutation is recorded in an append-only audit log.
//! The log can be inspected, filtered, and replayed backwards to rebuild any
//! earlier task collection ("time travel"); rebuilding is itself logged, so
//! history is never lost.
//!
//! # Layout
//!
//! - [`model`]: tasks and partial-task patches.
//! - [`event`]: audit events, diffs, and read-only log views.
//! - [`mutate`]: create / update / delete / move on [`AppState`].
//! - [`replay`]: event reversal and time travel.
//! - [`import`]: payload import with duplicate-id resolution.
//! - [`validate`]: schema checks for persisted and imported JSON.
//! - [`query`]: the board search language.
//! - [`store`], [`board`]: persistence adapters and the facade that uses them.
//!
//! # Conventions
//!
//! - **Errors**: per-module `thiserror` enums, each mapping to an
//!   [`error::ErrorCode`]; `anyhow::Result` for config loading.
//! - **Logging**: `tracing` macros only; the binary installs the subscriber.

pub mod board;
pub mod config;
pub mod error;
pub mod event;
pub mod import;
pub mod lock;
pub mod model;
pub mod mutate;
pub mod query;
pub mod replay;
pub mod seed;
pub mod state;
pub mod store;
pub mod validate;

pub use board::{Board, FirstRun};
pub use state::AppState;
