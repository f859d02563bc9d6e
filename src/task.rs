//! Task hierarchy store.
//!
//! Tasks sit on two axes at once: a position inside one column (the
//! Kanban axis) and an optional parent task (the subtask axis, an
//! arbitrary-depth forest). The two are independent; a subtask moves
//! through the board on its own. Everything here re-derives ownership
//! through task -> column -> board on every call.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{BoardRecord, ColumnRecord, ColumnState};
use crate::error::{Entity, Error, Result};
use crate::ids::{self, IdKind};
use crate::storage::{Backend, Database};

/// Task priority, urgent first when ranked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Sort rank; lower sorts first.
    pub fn rank(self) -> usize {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(Error::InvalidInput(format!(
                "unknown priority '{other}' (expected low, medium, high, or urgent)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub column_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new task. The column decides the board; `order` is
/// always computed (append to end of the column).
#[derive(Debug, Clone)]
pub struct NewTask {
    pub column_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub parent_id: Option<String>,
    pub goal_id: Option<String>,
}

impl NewTask {
    pub fn new(column_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
            description: None,
            priority: Priority::default(),
            due_date: None,
            parent_id: None,
            goal_id: None,
        }
    }
}

/// Partial update for a task. Outer `None` leaves a field untouched;
/// for clearable fields the inner option distinguishes "set" from
/// "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub column_id: Option<String>,
    pub order: Option<i64>,
    pub parent_id: Option<Option<String>>,
    pub goal_id: Option<Option<String>>,
}

/// One link in the breadcrumb chain, nested from the immediate parent
/// up to the root.
#[derive(Debug, Clone, Serialize)]
pub struct AncestorNode {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<AncestorNode>>,
}

/// A direct child with its resolved column.
#[derive(Debug, Clone, Serialize)]
pub struct Subtask {
    pub task: TaskRecord,
    pub column: ColumnRecord,
}

/// Completion ratio over direct children only, not the full subtree.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubtaskProgress {
    pub completed: usize,
    pub total: usize,
}

/// The board a task belongs to, with its sibling columns (status
/// pickers need them).
#[derive(Debug, Clone, Serialize)]
pub struct BoardContext {
    pub board: BoardRecord,
    pub columns: Vec<ColumnRecord>,
}

/// A task as served by the detail read path.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetails {
    pub task: TaskRecord,
    pub column: ColumnRecord,
    pub board: BoardContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<AncestorNode>,
    pub children: Vec<Subtask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask_progress: Option<SubtaskProgress>,
}

#[derive(Debug, Clone)]
pub struct TaskStore<B> {
    backend: B,
}

impl<B: Backend> TaskStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Create a task in a column of an owned board, appended to the end
    /// of that column. Parent and goal references are validated up front.
    pub fn create_task(&self, owner: &str, new: NewTask) -> Result<TaskRecord> {
        ids::expect(IdKind::Column, &new.column_id)?;
        if let Some(parent_id) = new.parent_id.as_deref() {
            ids::expect(IdKind::Task, parent_id)?;
        }
        if let Some(goal_id) = new.goal_id.as_deref() {
            ids::expect(IdKind::Goal, goal_id)?;
        }
        let title = require_title(&new.title)?;

        self.backend.update(|db| {
            let owned = db
                .column_with_board(&new.column_id)
                .map(|(_, board)| board.owner == owner)
                .unwrap_or(false);
            if !owned {
                return Err(Error::NotFound(Entity::Column));
            }

            if let Some(parent_id) = new.parent_id.as_deref() {
                db.task_owned(parent_id, owner)
                    .ok_or(Error::NotFound(Entity::Task))?;
            }
            if let Some(goal_id) = new.goal_id.as_deref() {
                db.goal_owned(goal_id, owner)
                    .ok_or(Error::NotFound(Entity::Goal))?;
            }

            let task = TaskRecord {
                id: ids::generate(IdKind::Task),
                column_id: new.column_id.clone(),
                title,
                description: new.description.clone(),
                priority: new.priority,
                due_date: new.due_date,
                order: db.next_order(&new.column_id),
                parent_id: new.parent_id.clone(),
                goal_id: new.goal_id.clone(),
                created_at: Utc::now(),
            };
            db.tasks.push(task.clone());
            tracing::debug!(task = %task.id, column = %task.column_id, "created task");
            Ok(task)
        })
    }

    /// The task detail view: record, resolved column, owning board with
    /// sibling columns, ancestor chain, and direct children.
    pub fn task_details(&self, id: &str, owner: &str) -> Result<TaskDetails> {
        ids::expect(IdKind::Task, id)?;
        let db = self.backend.snapshot()?;

        let task = db.task_owned(id, owner).ok_or(Error::NotFound(Entity::Task))?;
        let (column, board) = db.task_board(task).ok_or(Error::NotFound(Entity::Task))?;

        let board_context = BoardContext {
            board: board.clone(),
            columns: db.columns_of(&board.id).into_iter().cloned().collect(),
        };

        let parent = ancestor_chain(&db, task.parent_id.as_deref(), owner);

        let children: Vec<Subtask> = db
            .children_of(id)
            .into_iter()
            .filter_map(|child| {
                let (child_column, child_board) = db.task_board(child)?;
                if child_board.owner != owner {
                    return None;
                }
                Some(Subtask {
                    task: child.clone(),
                    column: child_column.clone(),
                })
            })
            .collect();

        Ok(TaskDetails {
            task: task.clone(),
            column: column.clone(),
            board: board_context,
            parent,
            subtask_progress: subtask_progress(&children),
            children,
        })
    }

    /// Apply a partial update. A column change without an explicit order
    /// appends to the destination column; an explicit order is taken
    /// verbatim (the move protocol sends the destination index).
    pub fn update_task(&self, owner: &str, id: &str, patch: TaskPatch) -> Result<TaskRecord> {
        ids::expect(IdKind::Task, id)?;
        if let Some(column_id) = patch.column_id.as_deref() {
            ids::expect(IdKind::Column, column_id)?;
        }
        if let Some(Some(parent_id)) = patch.parent_id.as_ref().map(|p| p.as_deref()) {
            ids::expect(IdKind::Task, parent_id)?;
        }
        if let Some(Some(goal_id)) = patch.goal_id.as_ref().map(|g| g.as_deref()) {
            ids::expect(IdKind::Goal, goal_id)?;
        }

        self.backend.update(|db| {
            let current = db
                .task_owned(id, owner)
                .ok_or(Error::NotFound(Entity::Task))?
                .clone();

            // Validate every reference before touching the record.
            let destination = match patch.column_id.as_deref() {
                Some(column_id) if column_id != current.column_id => {
                    let owned = db
                        .column_with_board(column_id)
                        .map(|(_, board)| board.owner == owner)
                        .unwrap_or(false);
                    if !owned {
                        return Err(Error::NotFound(Entity::Column));
                    }
                    Some(column_id.to_string())
                }
                _ => None,
            };

            if let Some(Some(parent_id)) = patch.parent_id.as_ref().map(|p| p.as_deref()) {
                if parent_id == id {
                    return Err(Error::InvalidInput(
                        "a task cannot be its own parent".to_string(),
                    ));
                }
                db.task_owned(parent_id, owner)
                    .ok_or(Error::NotFound(Entity::Task))?;
                ensure_acyclic(db, id, parent_id)?;
            }

            if let Some(Some(goal_id)) = patch.goal_id.as_ref().map(|g| g.as_deref()) {
                db.goal_owned(goal_id, owner)
                    .ok_or(Error::NotFound(Entity::Goal))?;
            }

            // A move without an explicit position appends to the
            // destination; computed before the record mutates.
            let appended_order = destination
                .as_deref()
                .filter(|_| patch.order.is_none())
                .map(|column_id| db.next_order(column_id));

            let task = db
                .tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or(Error::NotFound(Entity::Task))?;

            if let Some(title) = patch.title {
                task.title = require_title(&title)?;
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            if let Some(column_id) = destination {
                task.column_id = column_id;
            }
            if let Some(order) = patch.order {
                task.order = order;
            } else if let Some(order) = appended_order {
                task.order = order;
            }
            if let Some(parent_id) = patch.parent_id {
                task.parent_id = parent_id;
            }
            if let Some(goal_id) = patch.goal_id {
                task.goal_id = goal_id;
            }

            tracing::debug!(task = %task.id, "updated task");
            Ok(task.clone())
        })
    }

    /// Delete one task. Direct children are kept and promoted: their
    /// `parent_id` is cleared rather than left dangling.
    pub fn delete_task(&self, owner: &str, id: &str) -> Result<()> {
        ids::expect(IdKind::Task, id)?;

        self.backend.update(|db| {
            db.task_owned(id, owner).ok_or(Error::NotFound(Entity::Task))?;

            db.tasks.retain(|task| task.id != id);

            let mut promoted = 0usize;
            for task in &mut db.tasks {
                if task.parent_id.as_deref() == Some(id) {
                    task.parent_id = None;
                    promoted += 1;
                }
            }
            tracing::debug!(task = id, promoted, "deleted task");
            Ok(())
        })
    }
}

/// Walk `parent_id` links upward and build the breadcrumb chain.
///
/// The walk stops at the first missing ancestor (dangling reference) and
/// at the first ancestor on a board the caller does not own; both
/// truncate the chain silently instead of erroring. A visited set stops
/// pre-existing loops in corrupt data.
pub(crate) fn ancestor_chain(
    db: &Database,
    start: Option<&str>,
    owner: &str,
) -> Option<AncestorNode> {
    let mut allowed: Vec<(String, String)> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = start.map(str::to_string);

    while let Some(parent_id) = current {
        if !visited.insert(parent_id.clone()) {
            break;
        }
        let Some(parent) = db.task(&parent_id) else {
            break;
        };
        let owned = db
            .task_board(parent)
            .map(|(_, board)| board.owner == owner)
            .unwrap_or(false);
        if !owned {
            break;
        }
        allowed.push((parent.id.clone(), parent.title.clone()));
        current = parent.parent_id.clone();
    }

    let mut chain: Option<AncestorNode> = None;
    for (id, title) in allowed.into_iter().rev() {
        chain = Some(AncestorNode {
            id,
            title,
            parent: chain.map(Box::new),
        });
    }
    chain
}

/// Reject a re-parent that would make `task_id` its own ancestor.
fn ensure_acyclic(db: &Database, task_id: &str, new_parent_id: &str) -> Result<()> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = Some(new_parent_id.to_string());

    while let Some(ancestor_id) = current {
        if ancestor_id == task_id {
            return Err(Error::InvalidInput(
                "cannot set parent: task would become its own ancestor".to_string(),
            ));
        }
        if !visited.insert(ancestor_id.clone()) {
            break;
        }
        current = db.task(&ancestor_id).and_then(|task| task.parent_id.clone());
    }
    Ok(())
}

fn subtask_progress(children: &[Subtask]) -> Option<SubtaskProgress> {
    if children.is_empty() {
        return None;
    }
    let completed = children
        .iter()
        .filter(|child| child.column.state == ColumnState::Done)
        .count();
    Some(SubtaskProgress {
        completed,
        total: children.len(),
    })
}

fn require_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("task title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
