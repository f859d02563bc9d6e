//! Goal aggregator.
//!
//! Goals group tasks through the task-side `goal_id` back-reference; a
//! goal never stores a task list of its own. Progress is dual-mode: as
//! soon as one task links to the goal, the served percentage is derived
//! from how many linked tasks sit in done columns, and the stored scalar
//! is ignored. With zero linked tasks the stored scalar is served
//! verbatim (and stays user-settable).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::ColumnRecord;
use crate::error::{Entity, Error, Result};
use crate::ids::{self, IdKind};
use crate::storage::{Backend, Database};
use crate::task::TaskRecord;

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: String,
    pub owner: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    /// Stored scalar; authoritative only while no task links here.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A linked task with its resolved column; a dangling column leaves
/// `column` empty and the task counts as not done.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedTask {
    pub task: TaskRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnRecord>,
}

/// A goal as served: record, linked tasks, and the effective progress.
#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    pub goal: GoalRecord,
    /// Effective percentage per the dual-mode rule.
    pub progress: u8,
    pub tasks: Vec<LinkedTask>,
}

/// Fields for a new goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            category: None,
            due_date: None,
        }
    }
}

/// Partial update for a goal. `task_ids` is replace-all: the whole
/// linked set is swapped in one batch.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub progress: Option<u8>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub task_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct GoalStore<B> {
    backend: B,
}

impl<B: Backend> GoalStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn create_goal(&self, owner: &str, new: NewGoal) -> Result<GoalView> {
        let title = require_title(&new.title)?;

        self.backend.update(|db| {
            let goal = GoalRecord {
                id: ids::generate(IdKind::Goal),
                owner: owner.to_string(),
                title,
                description: new.description.clone(),
                category: new
                    .category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                progress: 0,
                due_date: new.due_date,
                created_at: Utc::now(),
            };
            db.goals.push(goal.clone());
            tracing::debug!(goal = %goal.id, owner, "created goal");
            Ok(goal_view(db, &goal))
        })
    }

    /// All goals of a user, newest first, with linked tasks and the
    /// dual-mode progress.
    pub fn goals(&self, owner: &str) -> Result<Vec<GoalView>> {
        let db = self.backend.snapshot()?;
        let mut goals: Vec<&GoalRecord> =
            db.goals.iter().filter(|goal| goal.owner == owner).collect();
        goals.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(goals.into_iter().map(|goal| goal_view(&db, goal)).collect())
    }

    pub fn goal(&self, id: &str, owner: &str) -> Result<GoalView> {
        ids::expect(IdKind::Goal, id)?;
        let db = self.backend.snapshot()?;
        let goal = db
            .goal_owned(id, owner)
            .ok_or(Error::NotFound(Entity::Goal))?;
        Ok(goal_view(&db, goal))
    }

    /// Apply a partial update. When `task_ids` is present the linked set
    /// is replaced atomically: every id must exist and belong to the
    /// caller, otherwise nothing changes at all.
    pub fn update_goal(&self, owner: &str, id: &str, patch: GoalPatch) -> Result<GoalView> {
        ids::expect(IdKind::Goal, id)?;
        if let Some(task_ids) = patch.task_ids.as_deref() {
            for task_id in task_ids {
                ids::expect(IdKind::Task, task_id)?;
            }
        }
        if let Some(progress) = patch.progress {
            if progress > 100 {
                return Err(Error::InvalidInput(
                    "progress must be between 0 and 100".to_string(),
                ));
            }
        }

        self.backend.update(|db| {
            db.goal_owned(id, owner).ok_or(Error::NotFound(Entity::Goal))?;

            // Validate the whole replacement set before any link moves.
            if let Some(task_ids) = patch.task_ids.as_deref() {
                for task_id in task_ids {
                    db.task_owned(task_id, owner)
                        .ok_or(Error::NotFound(Entity::Task))?;
                }
            }

            {
                let goal = db
                    .goals
                    .iter_mut()
                    .find(|goal| goal.id == id)
                    .ok_or(Error::NotFound(Entity::Goal))?;

                if let Some(title) = patch.title {
                    goal.title = require_title(&title)?;
                }
                if let Some(description) = patch.description {
                    goal.description = description;
                }
                if let Some(category) = patch.category {
                    goal.category = category;
                }
                if let Some(progress) = patch.progress {
                    goal.progress = progress;
                }
                if let Some(due_date) = patch.due_date {
                    goal.due_date = due_date;
                }
            }

            if let Some(task_ids) = patch.task_ids.as_deref() {
                let mut relinked = 0usize;
                for task in &mut db.tasks {
                    if task.goal_id.as_deref() == Some(id) {
                        task.goal_id = None;
                    }
                    if task_ids.iter().any(|task_id| *task_id == task.id) {
                        task.goal_id = Some(id.to_string());
                        relinked += 1;
                    }
                }
                tracing::debug!(goal = id, relinked, "replaced linked task set");
            }

            let goal = db.goal(id).ok_or(Error::NotFound(Entity::Goal))?.clone();
            Ok(goal_view(db, &goal))
        })
    }

    /// Delete a goal and clear the back-reference on every linked task,
    /// so no task is left pointing at a missing goal.
    pub fn delete_goal(&self, owner: &str, id: &str) -> Result<()> {
        ids::expect(IdKind::Goal, id)?;

        self.backend.update(|db| {
            db.goal_owned(id, owner).ok_or(Error::NotFound(Entity::Goal))?;

            db.goals.retain(|goal| goal.id != id);

            let mut unlinked = 0usize;
            for task in &mut db.tasks {
                if task.goal_id.as_deref() == Some(id) {
                    task.goal_id = None;
                    unlinked += 1;
                }
            }
            tracing::debug!(goal = id, unlinked, "deleted goal");
            Ok(())
        })
    }
}

/// Effective progress per the dual-mode rule.
pub fn effective_progress(stored: u8, linked: &[LinkedTask], db: &Database) -> u8 {
    if linked.is_empty() {
        return stored;
    }
    let completed = linked
        .iter()
        .filter(|link| db.task_is_done(&link.task))
        .count();
    let ratio = completed as f64 / linked.len() as f64;
    (ratio * 100.0).round() as u8
}

pub(crate) fn goal_view(db: &Database, goal: &GoalRecord) -> GoalView {
    let tasks: Vec<LinkedTask> = db
        .tasks_linked_to(&goal.id)
        .into_iter()
        .map(|task| LinkedTask {
            task: task.clone(),
            column: db.column(&task.column_id).cloned(),
        })
        .collect();
    GoalView {
        progress: effective_progress(goal.progress, &tasks, db),
        goal: goal.clone(),
        tasks,
    }
}

fn require_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("goal title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
