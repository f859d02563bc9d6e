//! momentum dashboard command implementation.

use chrono::Utc;

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::Context;

pub(crate) fn run(ctx: &Context) -> Result<()> {
    let user = ctx.require_user()?;
    let dashboard = Dashboard::new(ctx.backend.clone(), ctx.config.dashboard.clone());
    let data = dashboard.overview(&user, Utc::now())?;

    let mut human = HumanOutput::new("Dashboard");
    human.push_summary("Due today", data.todays_tasks.len().to_string());
    human.push_summary("Open today", data.priority_task_count.to_string());
    human.push_summary("Completed", data.productivity.completed_count.to_string());

    for entry in &data.todays_tasks {
        let status = entry
            .column
            .as_ref()
            .map(|column| column.title.as_str())
            .unwrap_or("?");
        human.push_detail(format!(
            "today: {} {} [{}]",
            entry.task.id, entry.task.title, status
        ));
    }
    for active in &data.active_goals {
        human.push_detail(format!(
            "goal: {} {} - {}%",
            active.goal.id, active.goal.title, active.progress
        ));
    }
    for event in &data.events {
        human.push_detail(format!(
            "upcoming: {} ({})",
            event.title,
            event.due.format("%Y-%m-%d")
        ));
    }

    let weekly: Vec<String> = data
        .productivity
        .weekly
        .iter()
        .map(|count| count.to_string())
        .collect();
    human.push_detail(format!("week: [{}]", weekly.join(" ")));

    emit_success(
        OutputOptions {
            json: ctx.json,
            quiet: ctx.quiet,
        },
        "dashboard",
        &data,
        Some(&human),
    )
}
