//! momentum goal command implementations.

use crate::error::Result;
use crate::goal::{GoalPatch, GoalStore, GoalView, NewGoal};
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{clearable, parse_date, Context, GoalCommands};

#[derive(serde::Serialize)]
struct GoalListOutput {
    total: usize,
    goals: Vec<GoalView>,
}

#[derive(serde::Serialize)]
struct GoalDeleteOutput {
    id: String,
    deleted: bool,
}

pub(crate) fn run(ctx: &Context, command: GoalCommands) -> Result<()> {
    let user = ctx.require_user()?;
    let store = GoalStore::new(ctx.backend.clone());
    let options = OutputOptions {
        json: ctx.json,
        quiet: ctx.quiet,
    };

    match command {
        GoalCommands::Add {
            title,
            description,
            category,
            due,
        } => {
            let new = NewGoal {
                title,
                description,
                category,
                due_date: due.as_deref().map(parse_date).transpose()?,
            };
            let view = store.create_goal(&user, new)?;
            let mut human = HumanOutput::new("Goal created");
            human.push_summary("ID", view.goal.id.clone());
            human.push_summary("Title", view.goal.title.clone());
            human.push_summary("Category", view.goal.category.clone());
            emit_success(options, "goal add", &view, Some(&human))
        }

        GoalCommands::List => {
            let goals = store.goals(&user)?;
            let output = GoalListOutput {
                total: goals.len(),
                goals,
            };
            let mut human = HumanOutput::new("Goals");
            human.push_summary("Total", output.total.to_string());
            for view in &output.goals {
                human.push_detail(format!(
                    "{} {} - {}% ({} tasks)",
                    view.goal.id,
                    view.goal.title,
                    view.progress,
                    view.tasks.len()
                ));
            }
            emit_success(options, "goal list", &output, Some(&human))
        }

        GoalCommands::Show { id } => {
            let view = store.goal(&id, &user)?;
            let mut human = HumanOutput::new(format!("Goal {}", view.goal.id));
            human.push_summary("Title", view.goal.title.clone());
            human.push_summary("Category", view.goal.category.clone());
            human.push_summary("Progress", format!("{}%", view.progress));
            if let Some(due) = view.goal.due_date {
                human.push_summary("Due", due.to_rfc3339());
            }
            for link in &view.tasks {
                let status = link
                    .column
                    .as_ref()
                    .map(|column| column.title.as_str())
                    .unwrap_or("?");
                human.push_detail(format!("{} {} [{}]", link.task.id, link.task.title, status));
            }
            emit_success(options, "goal show", &view, Some(&human))
        }

        GoalCommands::Edit {
            id,
            title,
            description,
            category,
            progress,
            due,
            no_due,
            tasks,
        } => {
            let patch = GoalPatch {
                title,
                description: clearable(description),
                category,
                progress,
                due_date: if no_due {
                    Some(None)
                } else {
                    due.as_deref().map(parse_date).transpose()?.map(Some)
                },
                task_ids: tasks,
            };
            let view = store.update_goal(&user, &id, patch)?;
            let mut human = HumanOutput::new("Goal updated");
            human.push_summary("ID", view.goal.id.clone());
            human.push_summary("Progress", format!("{}%", view.progress));
            human.push_summary("Linked tasks", view.tasks.len().to_string());
            emit_success(options, "goal edit", &view, Some(&human))
        }

        GoalCommands::Rm { id } => {
            store.delete_goal(&user, &id)?;
            let output = GoalDeleteOutput {
                id: id.clone(),
                deleted: true,
            };
            let mut human = HumanOutput::new("Goal deleted");
            human.push_summary("ID", id);
            emit_success(options, "goal rm", &output, Some(&human))
        }
    }
}
