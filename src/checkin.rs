//! Daily check-ins.
//!
//! Owner-scoped CRUD over journal entries. No invariants beyond
//! ownership; kept deliberately plain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Entity, Error, Result};
use crate::ids::{self, IdKind};
use crate::storage::Backend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub id: String,
    pub owner: String,
    pub date: DateTime<Utc>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflections: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCheckIn {
    pub content: String,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
    pub mood: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub focused_hours: Option<f64>,
    pub reflections: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckInPatch {
    pub content: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub mood: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub focused_hours: Option<Option<f64>>,
    pub reflections: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct CheckInStore<B> {
    backend: B,
}

impl<B: Backend> CheckInStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn create(&self, owner: &str, new: NewCheckIn) -> Result<CheckInRecord> {
        self.backend.update(|db| {
            let now = Utc::now();
            let record = CheckInRecord {
                id: ids::generate(IdKind::CheckIn),
                owner: owner.to_string(),
                date: new.date.unwrap_or(now),
                content: new.content.clone(),
                mood: new.mood.clone(),
                tags: new.tags.clone(),
                is_public: new.is_public,
                focused_hours: new.focused_hours,
                reflections: new.reflections.clone(),
                updated_at: now,
            };
            db.check_ins.push(record.clone());
            Ok(record)
        })
    }

    /// All check-ins of a user, newest date first.
    pub fn list(&self, owner: &str) -> Result<Vec<CheckInRecord>> {
        let db = self.backend.snapshot()?;
        let mut entries: Vec<CheckInRecord> = db
            .check_ins
            .iter()
            .filter(|check_in| check_in.owner == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(entries)
    }

    pub fn get(&self, owner: &str, id: &str) -> Result<CheckInRecord> {
        ids::expect(IdKind::CheckIn, id)?;
        let db = self.backend.snapshot()?;
        db.check_in_owned(id, owner)
            .cloned()
            .ok_or(Error::NotFound(Entity::CheckIn))
    }

    pub fn update(&self, owner: &str, id: &str, patch: CheckInPatch) -> Result<CheckInRecord> {
        ids::expect(IdKind::CheckIn, id)?;

        self.backend.update(|db| {
            db.check_in_owned(id, owner)
                .ok_or(Error::NotFound(Entity::CheckIn))?;

            let record = db
                .check_ins
                .iter_mut()
                .find(|check_in| check_in.id == id)
                .ok_or(Error::NotFound(Entity::CheckIn))?;

            if let Some(content) = patch.content {
                record.content = content;
            }
            if let Some(date) = patch.date {
                record.date = date;
            }
            if let Some(mood) = patch.mood {
                record.mood = mood;
            }
            if let Some(tags) = patch.tags {
                record.tags = tags;
            }
            if let Some(is_public) = patch.is_public {
                record.is_public = is_public;
            }
            if let Some(focused_hours) = patch.focused_hours {
                record.focused_hours = focused_hours;
            }
            if let Some(reflections) = patch.reflections {
                record.reflections = reflections;
            }
            record.updated_at = Utc::now();
            Ok(record.clone())
        })
    }

    pub fn delete(&self, owner: &str, id: &str) -> Result<()> {
        ids::expect(IdKind::CheckIn, id)?;

        self.backend.update(|db| {
            db.check_in_owned(id, owner)
                .ok_or(Error::NotFound(Entity::CheckIn))?;
            db.check_ins.retain(|check_in| check_in.id != id);
            Ok(())
        })
    }
}
