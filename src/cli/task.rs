//! momentum task command implementations.

use std::str::FromStr;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{NewTask, Priority, TaskPatch, TaskStore};

use super::{clearable, parse_date, Context, TaskCommands};

#[derive(serde::Serialize)]
struct TaskDeleteOutput {
    id: String,
    deleted: bool,
}

pub(crate) fn run(ctx: &Context, command: TaskCommands) -> Result<()> {
    let user = ctx.require_user()?;
    let store = TaskStore::new(ctx.backend.clone());
    let options = OutputOptions {
        json: ctx.json,
        quiet: ctx.quiet,
    };

    match command {
        TaskCommands::Add {
            title,
            column,
            description,
            priority,
            due,
            parent,
            goal,
        } => {
            let new = NewTask {
                column_id: column,
                title,
                description,
                priority: Priority::from_str(&priority)?,
                due_date: due.as_deref().map(parse_date).transpose()?,
                parent_id: parent,
                goal_id: goal,
            };
            let task = store.create_task(&user, new)?;
            let mut human = HumanOutput::new("Task created");
            human.push_summary("ID", task.id.clone());
            human.push_summary("Title", task.title.clone());
            human.push_summary("Column", task.column_id.clone());
            human.push_summary("Order", task.order.to_string());
            emit_success(options, "task add", &task, Some(&human))
        }

        TaskCommands::Show { id } => {
            let details = store.task_details(&id, &user)?;
            let mut human = HumanOutput::new(format!("Task {}", details.task.id));
            human.push_summary("Title", details.task.title.clone());
            human.push_summary(
                "Column",
                format!("{} ({})", details.column.title, details.board.board.title),
            );
            if let Some(due) = details.task.due_date {
                human.push_summary("Due", due.to_rfc3339());
            }
            if let Some(chain) = &details.parent {
                let mut crumbs = vec![chain.title.clone()];
                let mut cursor = chain.parent.as_deref();
                while let Some(node) = cursor {
                    crumbs.push(node.title.clone());
                    cursor = node.parent.as_deref();
                }
                crumbs.reverse();
                human.push_summary("Breadcrumb", crumbs.join(" > "));
            }
            if let Some(progress) = details.subtask_progress {
                human.push_summary(
                    "Subtasks",
                    format!("{}/{} done", progress.completed, progress.total),
                );
            }
            for child in &details.children {
                human.push_detail(format!(
                    "{} {} [{}]",
                    child.task.id, child.task.title, child.column.title
                ));
            }
            emit_success(options, "task show", &details, Some(&human))
        }

        TaskCommands::Edit {
            id,
            title,
            description,
            priority,
            due,
            no_due,
            parent,
            no_parent,
            goal,
            no_goal,
        } => {
            let patch = TaskPatch {
                title,
                description: clearable(description),
                priority: priority.as_deref().map(Priority::from_str).transpose()?,
                due_date: if no_due {
                    Some(None)
                } else {
                    due.as_deref().map(parse_date).transpose()?.map(Some)
                },
                column_id: None,
                order: None,
                parent_id: if no_parent { Some(None) } else { parent.map(Some) },
                goal_id: if no_goal { Some(None) } else { goal.map(Some) },
            };
            let task = store.update_task(&user, &id, patch)?;
            let mut human = HumanOutput::new("Task updated");
            human.push_summary("ID", task.id.clone());
            human.push_summary("Title", task.title.clone());
            emit_success(options, "task edit", &task, Some(&human))
        }

        TaskCommands::Move { id, to, position } => {
            let task = store.update_task(
                &user,
                &id,
                TaskPatch {
                    column_id: Some(to),
                    order: position,
                    ..TaskPatch::default()
                },
            )?;
            let mut human = HumanOutput::new("Task moved");
            human.push_summary("ID", task.id.clone());
            human.push_summary("Column", task.column_id.clone());
            human.push_summary("Order", task.order.to_string());
            emit_success(options, "task move", &task, Some(&human))
        }

        TaskCommands::Rm { id } => {
            store.delete_task(&user, &id)?;
            let output = TaskDeleteOutput {
                id: id.clone(),
                deleted: true,
            };
            let mut human = HumanOutput::new("Task deleted");
            human.push_summary("ID", id);
            emit_success(options, "task rm", &output, Some(&human))
        }
    }
}
