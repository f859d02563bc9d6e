//! Storage layer for momentum
//!
//! All records live in a single versioned JSON document (the database):
//!
//! ```text
//! <data-dir>/
//!   momentum.json        # the database document
//!   momentum.json.lock   # advisory lock guarding read-modify-write
//!   user                 # persisted caller identity
//! ```
//!
//! Mutations go through [`Backend::update`], an atomic read-modify-write:
//! the closure either succeeds and the whole mutation commits, or errors
//! and nothing is persisted. That single primitive is what makes batch
//! operations (board provisioning, goal relinking) all-or-nothing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::board::{BoardRecord, ColumnRecord, ColumnState};
use crate::checkin::CheckInRecord;
use crate::error::{Error, Result};
use crate::goal::GoalRecord;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::TaskRecord;

/// Name of the database document within the data dir
pub const DATA_FILE: &str = "momentum.json";

/// Current database schema version
pub const DB_SCHEMA_VERSION: &str = "momentum.db.v2";

/// Legacy schema: columns had no completion state and "done" was derived
/// from the column title at read time.
const DB_SCHEMA_LEGACY: &str = "momentum.db.v1";

fn legacy_schema_version() -> String {
    DB_SCHEMA_LEGACY.to_string()
}

/// The database document: every collection, one JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub boards: Vec<BoardRecord>,
    #[serde(default)]
    pub columns: Vec<ColumnRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub goals: Vec<GoalRecord>,
    #[serde(default)]
    pub check_ins: Vec<CheckInRecord>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            schema_version: DB_SCHEMA_VERSION.to_string(),
            boards: Vec::new(),
            columns: Vec::new(),
            tasks: Vec::new(),
            goals: Vec::new(),
            check_ins: Vec::new(),
        }
    }
}

impl Database {
    /// Upgrade a legacy document in place. Returns true if anything changed.
    ///
    /// v1 -> v2: columns gain an explicit completion state, seeded from the
    /// legacy title rule (case-insensitive "done"/"complete" substring).
    pub fn migrate(&mut self) -> bool {
        if self.schema_version == DB_SCHEMA_VERSION {
            return false;
        }
        for column in &mut self.columns {
            column.state = ColumnState::classify_title(&column.title);
        }
        self.schema_version = DB_SCHEMA_VERSION.to_string();
        true
    }

    // =========================================================================
    // Record lookups
    // =========================================================================

    pub fn board(&self, id: &str) -> Option<&BoardRecord> {
        self.boards.iter().find(|board| board.id == id)
    }

    /// Board by id, only if owned by `owner`.
    pub fn board_owned(&self, id: &str, owner: &str) -> Option<&BoardRecord> {
        self.board(id).filter(|board| board.owner == owner)
    }

    pub fn column(&self, id: &str) -> Option<&ColumnRecord> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Column by id together with its owning board.
    pub fn column_with_board(&self, id: &str) -> Option<(&ColumnRecord, &BoardRecord)> {
        let column = self.column(id)?;
        let board = self.board(&column.board_id)?;
        Some((column, board))
    }

    pub fn task(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Resolve a task's column and board, walking task -> column -> board.
    pub fn task_board(&self, task: &TaskRecord) -> Option<(&ColumnRecord, &BoardRecord)> {
        self.column_with_board(&task.column_id)
    }

    /// Task by id, only if its owning board belongs to `owner`.
    ///
    /// Ownership is re-derived on every call; nothing is cached between a
    /// read and a later write.
    pub fn task_owned(&self, id: &str, owner: &str) -> Option<&TaskRecord> {
        let task = self.task(id)?;
        let (_, board) = self.task_board(task)?;
        if board.owner == owner {
            Some(task)
        } else {
            None
        }
    }

    pub fn goal(&self, id: &str) -> Option<&GoalRecord> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn goal_owned(&self, id: &str, owner: &str) -> Option<&GoalRecord> {
        self.goal(id).filter(|goal| goal.owner == owner)
    }

    pub fn check_in(&self, id: &str) -> Option<&CheckInRecord> {
        self.check_ins.iter().find(|check_in| check_in.id == id)
    }

    pub fn check_in_owned(&self, id: &str, owner: &str) -> Option<&CheckInRecord> {
        self.check_in(id).filter(|check_in| check_in.owner == owner)
    }

    // =========================================================================
    // Collection views
    // =========================================================================

    /// Columns of a board, by `order` ascending (id as tie-break).
    pub fn columns_of(&self, board_id: &str) -> Vec<&ColumnRecord> {
        let mut columns: Vec<&ColumnRecord> = self
            .columns
            .iter()
            .filter(|column| column.board_id == board_id)
            .collect();
        columns.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        columns
    }

    /// Tasks in a column, by `order` ascending; equal orders fall back to
    /// creation order via the time-sorted id.
    pub fn tasks_in_column(&self, column_id: &str) -> Vec<&TaskRecord> {
        let mut tasks: Vec<&TaskRecord> = self
            .tasks
            .iter()
            .filter(|task| task.column_id == column_id)
            .collect();
        tasks.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    /// Append-to-end position for a new task in a column.
    pub fn next_order(&self, column_id: &str) -> i64 {
        self.tasks
            .iter()
            .filter(|task| task.column_id == column_id)
            .map(|task| task.order)
            .max()
            .map(|order| order + 1)
            .unwrap_or(0)
    }

    /// Direct children of a task (one level, not the full subtree).
    pub fn children_of(&self, task_id: &str) -> Vec<&TaskRecord> {
        let mut children: Vec<&TaskRecord> = self
            .tasks
            .iter()
            .filter(|task| task.parent_id.as_deref() == Some(task_id))
            .collect();
        children.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        children
    }

    /// Tasks linked to a goal, by `order` ascending.
    pub fn tasks_linked_to(&self, goal_id: &str) -> Vec<&TaskRecord> {
        let mut tasks: Vec<&TaskRecord> = self
            .tasks
            .iter()
            .filter(|task| task.goal_id.as_deref() == Some(goal_id))
            .collect();
        tasks.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    /// All tasks whose board belongs to `owner`.
    pub fn tasks_owned_by(&self, owner: &str) -> Vec<&TaskRecord> {
        self.tasks
            .iter()
            .filter(|task| {
                self.task_board(task)
                    .map(|(_, board)| board.owner == owner)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Whether a task currently sits in a done column. Tasks with a
    /// dangling column reference count as not done.
    pub fn task_is_done(&self, task: &TaskRecord) -> bool {
        self.column(&task.column_id)
            .map(|column| column.state == ColumnState::Done)
            .unwrap_or(false)
    }
}

/// The injected storage abstraction.
///
/// Stores are written against this contract, not against a particular
/// engine; [`MemoryBackend`] backs tests, [`FileBackend`] the CLI.
pub trait Backend {
    /// A read-only copy of the database.
    fn snapshot(&self) -> Result<Database>;

    /// Atomic read-modify-write. The closure's mutation is committed in
    /// full, or not at all if it returns an error.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T>;
}

/// In-memory backend: the storage fake used by unit and store tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Database>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document (used to exercise migration and
    /// dangling-reference tolerance).
    pub fn with_database(database: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(database)),
        }
    }
}

impl Backend for MemoryBackend {
    fn snapshot(&self) -> Result<Database> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::OperationFailed("storage mutex poisoned".to_string()))?;
        guard.migrate();
        Ok(guard.clone())
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T>,
    {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::OperationFailed("storage mutex poisoned".to_string()))?;

        // Mutate a working copy so a failed closure leaves prior state
        // untouched.
        let mut working = guard.clone();
        working.migrate();
        let result = f(&mut working)?;
        *guard = working;
        Ok(result)
    }
}

/// File backend: one JSON document under the data dir, guarded by a
/// `.lock` sibling and replaced atomically (write temp + rename).
#[derive(Debug, Clone)]
pub struct FileBackend {
    data_file: PathBuf,
}

impl FileBackend {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_file: data_dir.as_ref().join(DATA_FILE),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    fn lock_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.lock", self.data_file.display()))
    }

    fn load(&self) -> Result<Database> {
        if !self.data_file.exists() {
            return Ok(Database::default());
        }
        let content = std::fs::read_to_string(&self.data_file)?;
        let database: Database = serde_json::from_str(&content)?;
        Ok(database)
    }

    fn persist(&self, database: &Database) -> Result<()> {
        let json = serde_json::to_string_pretty(database)?;
        lock::write_atomic(&self.data_file, json.as_bytes())
    }
}

impl Backend for FileBackend {
    fn snapshot(&self) -> Result<Database> {
        let _lock = FileLock::acquire(self.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)?;
        let mut database = self.load()?;
        if database.migrate() {
            // Persist the upgrade opportunistically; reads still succeed
            // if the write fails.
            let _ = self.persist(&database);
            tracing::debug!(file = %self.data_file.display(), "migrated database document");
        }
        Ok(database)
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T>,
    {
        let _lock = FileLock::acquire(self.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)?;
        let mut database = self.load()?;
        database.migrate();
        let result = f(&mut database)?;
        self.persist(&database)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ColumnState;
    use tempfile::TempDir;

    fn column(id: &str, board_id: &str, title: &str, order: i64) -> ColumnRecord {
        ColumnRecord {
            id: id.to_string(),
            board_id: board_id.to_string(),
            title: title.to_string(),
            order,
            state: ColumnState::Active,
        }
    }

    #[test]
    fn file_backend_round_trip() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::new(temp.path());

        backend
            .update(|db| {
                db.columns.push(column("col-a", "brd-a", "To Do", 0));
                Ok(())
            })
            .unwrap();

        let snapshot = backend.snapshot().unwrap();
        assert_eq!(snapshot.columns.len(), 1);
        assert_eq!(snapshot.schema_version, DB_SCHEMA_VERSION);
        assert!(backend.data_file().exists());
    }

    #[test]
    fn failed_update_commits_nothing() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::new(temp.path());

        backend
            .update(|db| {
                db.columns.push(column("col-a", "brd-a", "To Do", 0));
                Ok(())
            })
            .unwrap();

        let result: Result<()> = backend.update(|db| {
            db.columns.clear();
            Err(Error::InvalidInput("boom".to_string()))
        });
        assert!(result.is_err());

        let snapshot = backend.snapshot().unwrap();
        assert_eq!(snapshot.columns.len(), 1);
    }

    #[test]
    fn memory_backend_failed_update_commits_nothing() {
        let backend = MemoryBackend::new();
        backend
            .update(|db| {
                db.columns.push(column("col-a", "brd-a", "To Do", 0));
                Ok(())
            })
            .unwrap();

        let result: Result<()> = backend.update(|db| {
            db.columns.clear();
            Err(Error::InvalidInput("boom".to_string()))
        });
        assert!(result.is_err());

        assert_eq!(backend.snapshot().unwrap().columns.len(), 1);
    }

    #[test]
    fn legacy_document_gains_column_states() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::new(temp.path());

        // A v1 document: no schema_version, no column states.
        let legacy = r#"{
            "boards": [],
            "columns": [
                {"id": "col-a", "board_id": "brd-a", "title": "To Do", "order": 0},
                {"id": "col-b", "board_id": "brd-a", "title": "Done", "order": 1},
                {"id": "col-c", "board_id": "brd-a", "title": "Completed work", "order": 2}
            ],
            "tasks": [],
            "goals": [],
            "check_ins": []
        }"#;
        std::fs::write(backend.data_file(), legacy).unwrap();

        let snapshot = backend.snapshot().unwrap();
        assert_eq!(snapshot.schema_version, DB_SCHEMA_VERSION);
        assert_eq!(snapshot.column("col-a").unwrap().state, ColumnState::Active);
        assert_eq!(snapshot.column("col-b").unwrap().state, ColumnState::Done);
        assert_eq!(snapshot.column("col-c").unwrap().state, ColumnState::Done);
    }

    #[test]
    fn next_order_appends_after_max() {
        let mut db = Database::default();
        assert_eq!(db.next_order("col-a"), 0);

        db.tasks.push(crate::task::TaskRecord {
            id: "tsk-a".to_string(),
            column_id: "col-a".to_string(),
            title: "one".to_string(),
            description: None,
            priority: crate::task::Priority::Medium,
            due_date: None,
            order: 4,
            parent_id: None,
            goal_id: None,
            created_at: chrono::Utc::now(),
        });
        assert_eq!(db.next_order("col-a"), 5);
        assert_eq!(db.next_order("col-b"), 0);
    }
}
