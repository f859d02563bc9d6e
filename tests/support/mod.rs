use std::path::Path;

use momentum::board::{BoardStore, BoardView};
use momentum::checkin::CheckInStore;
use momentum::config::DashboardConfig;
use momentum::dashboard::Dashboard;
use momentum::goal::GoalStore;
use momentum::storage::FileBackend;
use momentum::task::{NewTask, TaskRecord, TaskStore};
use tempfile::TempDir;

pub const OWNER: &str = "user-a";
pub const INTRUDER: &str = "user-b";

pub struct TestEnv {
    dir: TempDir,
    pub backend: FileBackend,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let backend = FileBackend::new(dir.path());
        Self { dir, backend }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn boards(&self) -> BoardStore<FileBackend> {
        BoardStore::new(self.backend.clone())
    }

    pub fn tasks(&self) -> TaskStore<FileBackend> {
        TaskStore::new(self.backend.clone())
    }

    pub fn goals(&self) -> GoalStore<FileBackend> {
        GoalStore::new(self.backend.clone())
    }

    pub fn check_ins(&self) -> CheckInStore<FileBackend> {
        CheckInStore::new(self.backend.clone())
    }

    pub fn dashboard(&self) -> Dashboard<FileBackend> {
        Dashboard::new(self.backend.clone(), DashboardConfig::default())
    }

    /// A board for OWNER with the three seed columns.
    pub fn seed_board(&self, title: &str) -> BoardView {
        self.boards()
            .create_board(OWNER, title)
            .expect("board creation")
    }

    /// Create a task for OWNER in the given column of a board view.
    pub fn seed_task(&self, board: &BoardView, column_index: usize, title: &str) -> TaskRecord {
        self.tasks()
            .create_task(
                OWNER,
                NewTask::new(&board.columns[column_index].column.id, title),
            )
            .expect("task creation")
    }
}
