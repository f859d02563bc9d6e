//! Record identifiers.
//!
//! Every record id is a lowercase ULID behind a short kind prefix,
//! e.g. `tsk-01hqv3x9k8w5p2m7r4t6y8z0ab`. ULIDs sort by creation time,
//! which gives "ties broken by creation order" for free wherever two
//! records share the same `order` value.

use ulid::Ulid;

use crate::error::{Error, Result};

/// Id kinds, one per record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Board,
    Column,
    Task,
    Goal,
    CheckIn,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Board => "brd",
            IdKind::Column => "col",
            IdKind::Task => "tsk",
            IdKind::Goal => "gol",
            IdKind::CheckIn => "chk",
        }
    }
}

/// Generate a fresh id of the given kind.
pub fn generate(kind: IdKind) -> String {
    format!("{}-{}", kind.prefix(), Ulid::new().to_string().to_lowercase())
}

/// Validate that an id is structurally an id of the given kind.
///
/// This catches references of the wrong shape early (a column id passed
/// where a task id belongs) before any lookup happens. It says nothing
/// about whether the record exists.
pub fn expect(kind: IdKind, id: &str) -> Result<()> {
    let rest = id
        .strip_prefix(kind.prefix())
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or_else(|| malformed(kind, id))?;

    if rest.is_empty() || !rest.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(malformed(kind, id));
    }

    Ok(())
}

fn malformed(kind: IdKind, id: &str) -> Error {
    Error::InvalidInput(format!("malformed {} id: {id}", kind.prefix()))
}
