//! momentum board and column command implementations.

use std::str::FromStr;

use crate::board::{BoardStore, BoardView, ColumnPatch, ColumnState};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{BoardCommands, ColumnCommands, Context};

#[derive(serde::Serialize)]
struct BoardListOutput {
    total: usize,
    boards: Vec<BoardView>,
}

pub(crate) fn run(ctx: &Context, command: BoardCommands) -> Result<()> {
    let user = ctx.require_user()?;
    let store = BoardStore::new(ctx.backend.clone());
    let options = OutputOptions {
        json: ctx.json,
        quiet: ctx.quiet,
    };

    match command {
        BoardCommands::New { title } => {
            let view = store.create_board(&user, &title)?;
            let mut human = HumanOutput::new("Board created");
            human.push_summary("ID", view.board.id.clone());
            human.push_summary("Title", view.board.title.clone());
            for column in &view.columns {
                human.push_detail(format!(
                    "{} {} (order {})",
                    column.column.id, column.column.title, column.column.order
                ));
            }
            emit_success(options, "board new", &view, Some(&human))
        }

        BoardCommands::List => {
            let boards = store.boards(&user)?;
            let output = BoardListOutput {
                total: boards.len(),
                boards,
            };
            let mut human = HumanOutput::new("Boards");
            human.push_summary("Total", output.total.to_string());
            for view in &output.boards {
                let tasks: usize = view.columns.iter().map(|column| column.tasks.len()).sum();
                human.push_detail(format!(
                    "{} {} ({} columns, {} tasks)",
                    view.board.id,
                    view.board.title,
                    view.columns.len(),
                    tasks
                ));
            }
            emit_success(options, "board list", &output, Some(&human))
        }

        BoardCommands::Show { id } => {
            let view = store.board(&id, &user)?;
            let mut human = HumanOutput::new(format!("Board {}", view.board.id));
            human.push_summary("Title", view.board.title.clone());
            human.push_summary("Created", view.board.created_at.to_rfc3339());
            for column in &view.columns {
                human.push_detail(format!(
                    "[{}] {} - {} tasks",
                    column.column.order,
                    column.column.title,
                    column.tasks.len()
                ));
                for task in &column.tasks {
                    human.push_detail(format!("    {} {}", task.id, task.title));
                }
            }
            emit_success(options, "board show", &view, Some(&human))
        }
    }
}

pub(crate) fn run_column(ctx: &Context, command: ColumnCommands) -> Result<()> {
    let user = ctx.require_user()?;
    let store = BoardStore::new(ctx.backend.clone());
    let options = OutputOptions {
        json: ctx.json,
        quiet: ctx.quiet,
    };

    match command {
        ColumnCommands::Add {
            board,
            title,
            order,
            state,
        } => {
            let state = state.as_deref().map(ColumnState::from_str).transpose()?;
            let column = store.create_column(&user, &board, &title, order, state)?;
            let mut human = HumanOutput::new("Column created");
            human.push_summary("ID", column.id.clone());
            human.push_summary("Title", column.title.clone());
            human.push_summary("Order", column.order.to_string());
            emit_success(options, "column add", &column, Some(&human))
        }

        ColumnCommands::Edit {
            id,
            title,
            order,
            state,
        } => {
            let state = state.as_deref().map(ColumnState::from_str).transpose()?;
            let column = store.update_column(
                &user,
                &id,
                ColumnPatch {
                    title,
                    order,
                    state,
                },
            )?;
            let mut human = HumanOutput::new("Column updated");
            human.push_summary("ID", column.id.clone());
            human.push_summary("Title", column.title.clone());
            emit_success(options, "column edit", &column, Some(&human))
        }
    }
}
