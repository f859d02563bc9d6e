//! momentum - Personal Productivity Tracking Library
//!
//! This library provides the core functionality for the momentum CLI,
//! a personal productivity tracker: Kanban boards with ordered columns,
//! a task tree with arbitrary-depth subtasks, goals with derived
//! progress, daily check-ins, and a dashboard aggregate.
//!
//! # Core Concepts
//!
//! - **Boards**: per-user containers of ordered columns; every new board
//!   is provisioned with "To Do" / "In Progress" / "Done"
//! - **Tasks**: positioned in exactly one column and optionally under a
//!   parent task; the two axes move independently
//! - **Goals**: cross-cutting groupings whose progress is derived from
//!   the completion of their linked tasks
//! - **Dashboard**: a read-only aggregate over one fetch of a user's data
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `momentum.toml`
//! - `error`: error types and result aliases
//! - `ids`: prefixed ULID record identifiers
//! - `storage`: the database document, `Backend` abstraction, and the
//!   in-memory and file-backed engines
//! - `lock`: file locking and atomic writes for the file backend
//! - `user`: caller identity resolution
//! - `board`, `task`, `goal`, `checkin`, `dashboard`: the stores
//! - `output`: shared CLI output formatting

pub mod board;
pub mod checkin;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod goal;
pub mod ids;
pub mod lock;
pub mod output;
pub mod storage;
pub mod task;
pub mod user;

pub use error::{Error, Result};
