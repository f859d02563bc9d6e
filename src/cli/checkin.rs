//! momentum check-in command implementations.

use crate::checkin::{CheckInPatch, CheckInStore, NewCheckIn};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{clearable, parse_date, CheckinCommands, Context};

#[derive(serde::Serialize)]
struct CheckInListOutput {
    total: usize,
    check_ins: Vec<crate::checkin::CheckInRecord>,
}

#[derive(serde::Serialize)]
struct CheckInDeleteOutput {
    id: String,
    deleted: bool,
}

pub(crate) fn run(ctx: &Context, command: CheckinCommands) -> Result<()> {
    let user = ctx.require_user()?;
    let store = CheckInStore::new(ctx.backend.clone());
    let options = OutputOptions {
        json: ctx.json,
        quiet: ctx.quiet,
    };

    match command {
        CheckinCommands::Add {
            content,
            date,
            mood,
            tags,
            public,
            focused_hours,
            reflections,
        } => {
            let new = NewCheckIn {
                content,
                date: date.as_deref().map(parse_date).transpose()?,
                mood,
                tags,
                is_public: public,
                focused_hours,
                reflections,
            };
            let record = store.create(&user, new)?;
            let mut human = HumanOutput::new("Check-in recorded");
            human.push_summary("ID", record.id.clone());
            human.push_summary("Date", record.date.to_rfc3339());
            if let Some(mood) = &record.mood {
                human.push_summary("Mood", mood.clone());
            }
            emit_success(options, "checkin add", &record, Some(&human))
        }

        CheckinCommands::List => {
            let check_ins = store.list(&user)?;
            let output = CheckInListOutput {
                total: check_ins.len(),
                check_ins,
            };
            let mut human = HumanOutput::new("Check-ins");
            human.push_summary("Total", output.total.to_string());
            for record in &output.check_ins {
                human.push_detail(format!(
                    "{} {} - {}",
                    record.id,
                    record.date.format("%Y-%m-%d"),
                    record.content
                ));
            }
            emit_success(options, "checkin list", &output, Some(&human))
        }

        CheckinCommands::Show { id } => {
            let record = store.get(&user, &id)?;
            let mut human = HumanOutput::new(format!("Check-in {}", record.id));
            human.push_summary("Date", record.date.to_rfc3339());
            human.push_summary("Content", record.content.clone());
            if let Some(mood) = &record.mood {
                human.push_summary("Mood", mood.clone());
            }
            if !record.tags.is_empty() {
                human.push_summary("Tags", record.tags.join(", "));
            }
            emit_success(options, "checkin show", &record, Some(&human))
        }

        CheckinCommands::Edit {
            id,
            content,
            date,
            mood,
            tags,
            public,
            focused_hours,
            reflections,
        } => {
            let patch = CheckInPatch {
                content,
                date: date.as_deref().map(parse_date).transpose()?,
                mood: clearable(mood),
                tags,
                is_public: public,
                focused_hours: focused_hours.map(Some),
                reflections: clearable(reflections),
            };
            let record = store.update(&user, &id, patch)?;
            let mut human = HumanOutput::new("Check-in updated");
            human.push_summary("ID", record.id.clone());
            emit_success(options, "checkin edit", &record, Some(&human))
        }

        CheckinCommands::Rm { id } => {
            store.delete(&user, &id)?;
            let output = CheckInDeleteOutput {
                id: id.clone(),
                deleted: true,
            };
            let mut human = HumanOutput::new("Check-in deleted");
            human.push_summary("ID", id);
            emit_success(options, "checkin rm", &output, Some(&human))
        }
    }
}
