//! Board and column registry.
//!
//! Boards own an ordered set of columns. Every new board is provisioned
//! with the three default columns in a single atomic write. A column
//! carries an explicit completion state; "is this task done" is answered
//! by the state of its column, never by parsing the column title.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Entity, Error, Result};
use crate::ids::{self, IdKind};
use crate::storage::{Backend, Database};
use crate::task::TaskRecord;

/// Seed columns for a new board, in order.
pub const DEFAULT_COLUMNS: [(&str, ColumnState); 3] = [
    ("To Do", ColumnState::Active),
    ("In Progress", ColumnState::Active),
    ("Done", ColumnState::Done),
];

/// Completion classification of a column.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnState {
    #[default]
    Active,
    Done,
}

impl ColumnState {
    /// Legacy classification rule: a title containing "done" or
    /// "complete" (case-insensitive) marks a done column. Used when a
    /// column is created without an explicit state, and when migrating
    /// v1 documents.
    pub fn classify_title(title: &str) -> ColumnState {
        let lowered = title.to_lowercase();
        if lowered.contains("done") || lowered.contains("complete") {
            ColumnState::Done
        } else {
            ColumnState::Active
        }
    }
}

impl FromStr for ColumnState {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_lowercase().as_str() {
            "active" => Ok(ColumnState::Active),
            "done" => Ok(ColumnState::Done),
            other => Err(Error::InvalidInput(format!(
                "unknown column state '{other}' (expected active or done)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRecord {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub id: String,
    pub board_id: String,
    pub title: String,
    pub order: i64,
    #[serde(default)]
    pub state: ColumnState,
}

/// A board with its columns and their tasks, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub board: BoardRecord,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnView {
    pub column: ColumnRecord,
    pub tasks: Vec<TaskRecord>,
}

impl BoardView {
    /// First done column by order, if the board has one.
    pub fn done_column(&self) -> Option<&ColumnView> {
        self.columns
            .iter()
            .find(|view| view.column.state == ColumnState::Done)
    }

    /// First column by order; the fallback target for new tasks.
    pub fn default_column(&self) -> Option<&ColumnView> {
        self.columns.first()
    }
}

/// Partial update for a column.
#[derive(Debug, Clone, Default)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub order: Option<i64>,
    pub state: Option<ColumnState>,
}

#[derive(Debug, Clone)]
pub struct BoardStore<B> {
    backend: B,
}

impl<B: Backend> BoardStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Create a board with its three seed columns, all-or-nothing.
    pub fn create_board(&self, owner: &str, title: &str) -> Result<BoardView> {
        let title = require_title(title, "board")?;

        self.backend.update(|db| {
            let board = BoardRecord {
                id: ids::generate(IdKind::Board),
                owner: owner.to_string(),
                title,
                created_at: Utc::now(),
            };

            for (index, (column_title, state)) in DEFAULT_COLUMNS.iter().enumerate() {
                db.columns.push(ColumnRecord {
                    id: ids::generate(IdKind::Column),
                    board_id: board.id.clone(),
                    title: (*column_title).to_string(),
                    order: index as i64,
                    state: *state,
                });
            }

            db.boards.push(board.clone());
            tracing::debug!(board = %board.id, owner, "created board");
            Ok(board_view(db, &board))
        })
    }

    /// All boards of a user, each with nested columns and ordered tasks.
    pub fn boards(&self, owner: &str) -> Result<Vec<BoardView>> {
        let db = self.backend.snapshot()?;
        Ok(db
            .boards
            .iter()
            .filter(|board| board.owner == owner)
            .map(|board| board_view(&db, board))
            .collect())
    }

    /// One board, `NotFound` when missing or owned by someone else.
    pub fn board(&self, id: &str, owner: &str) -> Result<BoardView> {
        ids::expect(IdKind::Board, id)?;
        let db = self.backend.snapshot()?;
        let board = db
            .board_owned(id, owner)
            .ok_or(Error::NotFound(Entity::Board))?;
        Ok(board_view(&db, board))
    }

    /// Add a column to an owned board. Order defaults to append; state
    /// defaults to the legacy title classification.
    pub fn create_column(
        &self,
        owner: &str,
        board_id: &str,
        title: &str,
        order: Option<i64>,
        state: Option<ColumnState>,
    ) -> Result<ColumnRecord> {
        ids::expect(IdKind::Board, board_id)?;
        let title = require_title(title, "column")?;

        self.backend.update(|db| {
            db.board_owned(board_id, owner)
                .ok_or(Error::NotFound(Entity::Board))?;

            let order = order.unwrap_or_else(|| {
                db.columns
                    .iter()
                    .filter(|column| column.board_id == board_id)
                    .map(|column| column.order)
                    .max()
                    .map(|order| order + 1)
                    .unwrap_or(0)
            });

            let column = ColumnRecord {
                id: ids::generate(IdKind::Column),
                board_id: board_id.to_string(),
                title: title.clone(),
                order,
                state: state.unwrap_or_else(|| ColumnState::classify_title(&title)),
            };
            db.columns.push(column.clone());
            tracing::debug!(column = %column.id, board = board_id, "created column");
            Ok(column)
        })
    }

    /// Edit a column's title, order, or completion state.
    pub fn update_column(&self, owner: &str, id: &str, patch: ColumnPatch) -> Result<ColumnRecord> {
        ids::expect(IdKind::Column, id)?;

        self.backend.update(|db| {
            let owned = db
                .column_with_board(id)
                .map(|(_, board)| board.owner == owner)
                .unwrap_or(false);
            if !owned {
                return Err(Error::NotFound(Entity::Column));
            }

            let column = db
                .columns
                .iter_mut()
                .find(|column| column.id == id)
                .ok_or(Error::NotFound(Entity::Column))?;

            if let Some(title) = patch.title {
                column.title = require_title(&title, "column")?;
            }
            if let Some(order) = patch.order {
                column.order = order;
            }
            if let Some(state) = patch.state {
                column.state = state;
            }
            Ok(column.clone())
        })
    }
}

/// Assemble the nested view of one board from a database snapshot.
pub(crate) fn board_view(db: &Database, board: &BoardRecord) -> BoardView {
    let columns = db
        .columns_of(&board.id)
        .into_iter()
        .map(|column| ColumnView {
            column: column.clone(),
            tasks: db
                .tasks_in_column(&column.id)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect();
    BoardView {
        board: board.clone(),
        columns,
    }
}

fn require_title(title: &str, what: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{what} title cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> BoardStore<MemoryBackend> {
        BoardStore::new(MemoryBackend::new())
    }

    #[test]
    fn new_board_has_three_seed_columns() {
        let store = store();
        let view = store.create_board("user-a", "Work").unwrap();

        let titles: Vec<&str> = view
            .columns
            .iter()
            .map(|view| view.column.title.as_str())
            .collect();
        let orders: Vec<i64> = view.columns.iter().map(|view| view.column.order).collect();

        assert_eq!(titles, ["To Do", "In Progress", "Done"]);
        assert_eq!(orders, [0, 1, 2]);
        assert_eq!(view.columns[2].column.state, ColumnState::Done);
    }

    #[test]
    fn board_lookup_enforces_ownership() {
        let store = store();
        let view = store.create_board("user-a", "Work").unwrap();

        let err = store.board(&view.board.id, "user-b").unwrap_err();
        assert!(matches!(err, Error::NotFound(Entity::Board)));

        assert!(store.board(&view.board.id, "user-a").is_ok());
    }

    #[test]
    fn empty_title_is_rejected_before_any_write() {
        let store = store();
        assert!(store.create_board("user-a", "   ").is_err());
        assert!(store.boards("user-a").unwrap().is_empty());
    }

    #[test]
    fn created_column_appends_to_end() {
        let store = store();
        let view = store.create_board("user-a", "Work").unwrap();

        let column = store
            .create_column("user-a", &view.board.id, "Blocked", None, None)
            .unwrap();
        assert_eq!(column.order, 3);
        assert_eq!(column.state, ColumnState::Active);
    }

    #[test]
    fn column_state_defaults_from_legacy_title_rule() {
        let store = store();
        let view = store.create_board("user-a", "Work").unwrap();

        let column = store
            .create_column("user-a", &view.board.id, "Completed archive", None, None)
            .unwrap();
        assert_eq!(column.state, ColumnState::Done);

        let explicit = store
            .create_column(
                "user-a",
                &view.board.id,
                "Done someday",
                None,
                Some(ColumnState::Active),
            )
            .unwrap();
        assert_eq!(explicit.state, ColumnState::Active);
    }

    #[test]
    fn done_and_default_column_resolution() {
        let store = store();
        let view = store.create_board("user-a", "Work").unwrap();

        assert_eq!(view.default_column().unwrap().column.title, "To Do");
        assert_eq!(view.done_column().unwrap().column.title, "Done");
    }

    #[test]
    fn column_update_can_flip_state() {
        let store = store();
        let view = store.create_board("user-a", "Work").unwrap();
        let target = &view.columns[1].column;

        let updated = store
            .update_column(
                "user-a",
                &target.id,
                ColumnPatch {
                    state: Some(ColumnState::Done),
                    ..ColumnPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.state, ColumnState::Done);

        let err = store
            .update_column("user-b", &target.id, ColumnPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(Entity::Column)));
    }

    #[test]
    fn classify_title_matches_substrings_case_insensitively() {
        assert_eq!(ColumnState::classify_title("DONE"), ColumnState::Done);
        assert_eq!(ColumnState::classify_title("Complete"), ColumnState::Done);
        assert_eq!(
            ColumnState::classify_title("Things I have done lately"),
            ColumnState::Done
        );
        assert_eq!(ColumnState::classify_title("In Progress"), ColumnState::Active);
    }
}
