//! Command-line interface for momentum
//!
//! This module defines the CLI structure using clap derive macros.
//! Each resource's commands are implemented in their own submodule.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::FileBackend;

mod board;
mod checkin;
mod dashboard;
mod goal;
mod task;
mod user;

/// momentum - Personal Productivity Tracking
///
/// A CLI for Kanban boards, nested tasks, goals with derived progress,
/// and daily check-ins.
#[derive(Parser, Debug)]
#[command(name = "momentum")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the database document
    #[arg(long, global = true, env = "MOMENTUM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// User identity for every operation
    #[arg(long, global = true, env = "MOMENTUM_USER")]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Board management
    #[command(subcommand)]
    Board(BoardCommands),

    /// Column management
    #[command(subcommand)]
    Column(ColumnCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Goal management
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Daily check-ins
    #[command(subcommand)]
    Checkin(CheckinCommands),

    /// Show the dashboard aggregate
    Dashboard,

    /// Set or show user identity
    #[command(subcommand)]
    User(UserCommands),
}

/// Board subcommands
#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Create a board with the three default columns
    New {
        /// Board title
        title: String,
    },

    /// List all boards with their columns and tasks
    List,

    /// Show one board
    Show {
        /// Board id
        id: String,
    },
}

/// Column subcommands
#[derive(Subcommand, Debug)]
pub enum ColumnCommands {
    /// Add a column to a board
    Add {
        /// Board id
        board: String,

        /// Column title
        title: String,

        /// Position among columns (defaults to the end)
        #[arg(long)]
        order: Option<i64>,

        /// Completion state: active or done (defaults from the title)
        #[arg(long)]
        state: Option<String>,
    },

    /// Edit a column
    Edit {
        /// Column id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New position
        #[arg(long)]
        order: Option<i64>,

        /// New completion state: active or done
        #[arg(long)]
        state: Option<String>,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task in a column
    Add {
        /// Task title
        title: String,

        /// Column id the task starts in
        #[arg(long)]
        column: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high, urgent
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Parent task id (makes this a subtask)
        #[arg(long)]
        parent: Option<String>,

        /// Goal id to link to
        #[arg(long)]
        goal: Option<String>,
    },

    /// Show a task with its board, breadcrumb, and subtasks
    Show {
        /// Task id
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        /// New priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// New due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long, conflicts_with = "no_due")]
        due: Option<String>,

        /// Clear the due date
        #[arg(long)]
        no_due: bool,

        /// New parent task id
        #[arg(long, conflicts_with = "no_parent")]
        parent: Option<String>,

        /// Detach from the parent task
        #[arg(long)]
        no_parent: bool,

        /// Goal id to link to
        #[arg(long, conflicts_with = "no_goal")]
        goal: Option<String>,

        /// Unlink from the goal
        #[arg(long)]
        no_goal: bool,
    },

    /// Move a task to another column
    Move {
        /// Task id
        id: String,

        /// Destination column id
        #[arg(long)]
        to: String,

        /// Destination index (defaults to the end of the column)
        #[arg(long)]
        position: Option<i64>,
    },

    /// Delete a task (children are kept and promoted)
    Rm {
        /// Task id
        id: String,
    },
}

/// Goal subcommands
#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a goal
    Add {
        /// Goal title
        title: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Category (defaults to "general")
        #[arg(long)]
        category: Option<String>,

        /// Due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// List goals with linked tasks and derived progress
    List,

    /// Show one goal
    Show {
        /// Goal id
        id: String,
    },

    /// Edit a goal
    Edit {
        /// Goal id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// Stored progress (used while no tasks link here)
        #[arg(long)]
        progress: Option<u8>,

        /// New due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long, conflicts_with = "no_due")]
        due: Option<String>,

        /// Clear the due date
        #[arg(long)]
        no_due: bool,

        /// Replace the whole set of linked tasks (comma-separated ids)
        #[arg(long, value_delimiter = ',')]
        tasks: Option<Vec<String>>,
    },

    /// Delete a goal (linked tasks are unlinked)
    Rm {
        /// Goal id
        id: String,
    },
}

/// Check-in subcommands
#[derive(Subcommand, Debug)]
pub enum CheckinCommands {
    /// Record a check-in
    Add {
        /// Entry content
        content: String,

        /// Entry date (RFC 3339 or YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,

        /// Mood label
        #[arg(long)]
        mood: Option<String>,

        /// Tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Mark the entry public
        #[arg(long)]
        public: bool,

        /// Focused hours
        #[arg(long)]
        focused_hours: Option<f64>,

        /// Reflections
        #[arg(long)]
        reflections: Option<String>,
    },

    /// List check-ins, newest first
    List,

    /// Show one check-in
    Show {
        /// Check-in id
        id: String,
    },

    /// Edit a check-in
    Edit {
        /// Check-in id
        id: String,

        /// New content
        #[arg(long)]
        content: Option<String>,

        /// New date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New mood (empty string clears it)
        #[arg(long)]
        mood: Option<String>,

        /// Replace tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Mark public or private
        #[arg(long)]
        public: Option<bool>,

        /// Focused hours
        #[arg(long)]
        focused_hours: Option<f64>,

        /// New reflections (empty string clears them)
        #[arg(long)]
        reflections: Option<String>,
    },

    /// Delete a check-in
    Rm {
        /// Check-in id
        id: String,
    },
}

/// User identity subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Persist the user identity in the data dir
    Set {
        /// User id
        id: String,
    },

    /// Show the resolved user identity
    Show,
}

/// Everything a command needs: the opened backend, the configuration,
/// and the raw identity inputs.
pub(crate) struct Context {
    pub backend: FileBackend,
    pub config: Config,
    pub data_dir: PathBuf,
    pub cli_user: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl Context {
    /// Resolve the caller identity or fail with `Unauthorized`.
    pub fn require_user(&self) -> Result<String> {
        crate::user::resolve_user(&self.data_dir, self.cli_user.as_deref(), &self.config)
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load()?;
        let data_dir = config.resolve_data_dir(self.data_dir.clone())?;
        let ctx = Context {
            backend: FileBackend::new(&data_dir),
            config,
            data_dir,
            cli_user: self.user.clone(),
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Board(command) => board::run(&ctx, command),
            Commands::Column(command) => board::run_column(&ctx, command),
            Commands::Task(command) => task::run(&ctx, command),
            Commands::Goal(command) => goal::run(&ctx, command),
            Commands::Checkin(command) => checkin::run(&ctx, command),
            Commands::Dashboard => dashboard::run(&ctx),
            Commands::User(command) => user::run(&ctx, command),
        }
    }
}

/// Parse a date argument: RFC 3339, or a bare date taken as UTC midnight.
pub(crate) fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = input.parse::<DateTime<Utc>>() {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(parsed
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists")
            .and_utc());
    }
    Err(Error::InvalidInput(format!(
        "invalid date '{input}' (expected RFC 3339 or YYYY-MM-DD)"
    )))
}

/// Map an optional string to the clear-vs-set double option: empty
/// string means clear.
pub(crate) fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_both_forms() {
        let day = parse_date("2026-08-07").unwrap();
        assert_eq!(day.to_rfc3339(), "2026-08-07T00:00:00+00:00");

        let instant = parse_date("2026-08-07T12:30:00Z").unwrap();
        assert_eq!(instant.to_rfc3339(), "2026-08-07T12:30:00+00:00");

        assert!(parse_date("next tuesday").is_err());
    }

    #[test]
    fn clearable_maps_empty_to_clear() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some("".to_string())), Some(None));
        assert_eq!(
            clearable(Some("keep".to_string())),
            Some(Some("keep".to_string()))
        );
    }
}
