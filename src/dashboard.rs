//! Dashboard aggregator.
//!
//! Read-only composition over one database snapshot: today's tasks,
//! priority counts, active goals, the weekly completion histogram, and
//! upcoming deadlines. Everything is derived from a single fetch of the
//! caller's records; there are no per-task follow-up queries. Day
//! windows are UTC calendar days computed from the `now` argument.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::board::ColumnRecord;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::goal::{self, GoalRecord};
use crate::storage::{Backend, Database};
use crate::task::TaskRecord;

/// A task due today, with its resolved column when it has one.
#[derive(Debug, Clone, Serialize)]
pub struct TodayTask {
    pub task: TaskRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnRecord>,
}

/// An in-flight goal with its effective progress.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveGoal {
    pub goal: GoalRecord,
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct Productivity {
    /// Tasks currently sitting in a done column.
    pub completed_count: usize,
    /// Done-column tasks bucketed by creation day over the last 7
    /// calendar days, oldest first. Creation time is the documented
    /// stand-in for a completion timestamp, which the records lack.
    pub weekly: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Task,
    Goal,
}

/// A deadline inside the upcoming window.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingEvent {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
    pub due: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub generated_at: DateTime<Utc>,
    pub todays_tasks: Vec<TodayTask>,
    pub priority_task_count: usize,
    pub active_goals: Vec<ActiveGoal>,
    pub productivity: Productivity,
    pub events: Vec<UpcomingEvent>,
}

#[derive(Debug, Clone)]
pub struct Dashboard<B> {
    backend: B,
    config: DashboardConfig,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B, config: DashboardConfig) -> Self {
        Self { backend, config }
    }

    /// Build the dashboard for one user at one instant. A user with no
    /// boards or goals gets zeros and empty sections, not an error.
    pub fn overview(&self, owner: &str, now: DateTime<Utc>) -> Result<DashboardData> {
        let db = self.backend.snapshot()?;

        let start_of_today = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists")
            .and_utc();
        let start_of_tomorrow = start_of_today + Duration::days(1);
        let window_end = start_of_today + Duration::days(self.config.event_window_days);

        let owned_tasks = db.tasks_owned_by(owner);

        // Today's focus: due within [today, tomorrow), urgent first.
        let mut todays_tasks: Vec<TodayTask> = owned_tasks
            .iter()
            .filter(|task| {
                task.due_date
                    .map(|due| due >= start_of_today && due < start_of_tomorrow)
                    .unwrap_or(false)
            })
            .map(|task| TodayTask {
                task: (*task).clone(),
                column: db.column(&task.column_id).cloned(),
            })
            .collect();
        todays_tasks.sort_by(|a, b| {
            a.task
                .priority
                .rank()
                .cmp(&b.task.priority.rank())
                .then_with(|| a.task.id.cmp(&b.task.id))
        });

        let priority_task_count = todays_tasks
            .iter()
            .filter(|entry| !db.task_is_done(&entry.task))
            .count();

        let active_goals = self.active_goals(&db, owner);

        let completed: Vec<&TaskRecord> = owned_tasks
            .iter()
            .copied()
            .filter(|task| db.task_is_done(task))
            .collect();

        let mut weekly = vec![0usize; 7];
        for (index, bucket) in weekly.iter_mut().enumerate() {
            let day_start = start_of_today - Duration::days(6 - index as i64);
            let day_end = day_start + Duration::days(1);
            *bucket = completed
                .iter()
                .filter(|task| task.created_at >= day_start && task.created_at < day_end)
                .count();
        }

        let events = self.upcoming_events(&db, owner, &owned_tasks, start_of_tomorrow, window_end);

        Ok(DashboardData {
            generated_at: now,
            todays_tasks,
            priority_task_count,
            active_goals,
            productivity: Productivity {
                completed_count: completed.len(),
                weekly,
            },
            events,
        })
    }

    /// Up to the configured limit of goals still in flight, soonest due
    /// date first with undated goals last.
    fn active_goals(&self, db: &Database, owner: &str) -> Vec<ActiveGoal> {
        let mut goals: Vec<ActiveGoal> = db
            .goals
            .iter()
            .filter(|goal| goal.owner == owner)
            .map(|record| {
                let view = goal::goal_view(db, record);
                ActiveGoal {
                    goal: view.goal,
                    progress: view.progress,
                }
            })
            .filter(|active| active.progress < 100)
            .collect();

        goals.sort_by(|a, b| match (a.goal.due_date, b.goal.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.goal.created_at.cmp(&b.goal.created_at),
        });
        goals.truncate(self.config.active_goal_limit);
        goals
    }

    /// Deadlines in the `(tomorrow, today + window]` range, tasks and
    /// goals merged, soonest first, capped at the configured limit.
    fn upcoming_events(
        &self,
        db: &Database,
        owner: &str,
        owned_tasks: &[&TaskRecord],
        start_of_tomorrow: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<UpcomingEvent> {
        let in_window = |due: DateTime<Utc>| due > start_of_tomorrow && due <= window_end;

        let mut events: Vec<UpcomingEvent> = owned_tasks
            .iter()
            .filter_map(|task| {
                let due = task.due_date.filter(|due| in_window(*due))?;
                Some(UpcomingEvent {
                    id: task.id.clone(),
                    title: task.title.clone(),
                    kind: EventKind::Task,
                    due,
                })
            })
            .collect();

        events.extend(db.goals.iter().filter_map(|goal| {
            if goal.owner != owner {
                return None;
            }
            let due = goal.due_date.filter(|due| in_window(*due))?;
            Some(UpcomingEvent {
                id: goal.id.clone(),
                title: goal.title.clone(),
                kind: EventKind::Goal,
                due,
            })
        }));

        events.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));
        events.truncate(self.config.event_limit);
        events
    }
}
