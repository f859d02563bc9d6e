//! momentum user identity command implementations.

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::user;

use super::{Context, UserCommands};

#[derive(serde::Serialize)]
struct UserOutput {
    user: String,
}

pub(crate) fn run(ctx: &Context, command: UserCommands) -> Result<()> {
    let options = OutputOptions {
        json: ctx.json,
        quiet: ctx.quiet,
    };

    match command {
        UserCommands::Set { id } => {
            user::persist_user(&ctx.data_dir, &id)?;
            let output = UserOutput { user: id.clone() };
            let mut human = HumanOutput::new("User set");
            human.push_summary("User", id);
            emit_success(options, "user set", &output, Some(&human))
        }

        UserCommands::Show => {
            let resolved = ctx.require_user()?;
            let output = UserOutput {
                user: resolved.clone(),
            };
            let mut human = HumanOutput::new("User");
            human.push_summary("User", resolved);
            emit_success(options, "user show", &output, Some(&human))
        }
    }
}
