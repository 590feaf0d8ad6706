//! Learner repository: `users` and their latest `onboarding_surveys` row.

use rusqlite::{params, Connection, OptionalExtension};
use tutor_core::model::{LearnerRecord, LearningPreferences};
use tutor_core::LearnerId;

use crate::error::Result;

/// Learner repository.
pub struct LearnerRepo;

impl LearnerRepo {
    /// Get a learner with their most recent survey answers.
    pub fn get(conn: &Connection, id: &LearnerId) -> Result<Option<LearnerRecord>> {
        let name: Option<Option<String>> = conn
            .query_row(
                "SELECT name FROM users WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(name) = name else {
            return Ok(None);
        };

        let preferences = conn
            .query_row(
                "SELECT learning_style, preferred_pace, background_knowledge
                 FROM onboarding_surveys WHERE user_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![id.as_str()],
                |row| {
                    Ok(LearningPreferences {
                        style: row.get(0)?,
                        pace: row.get(1)?,
                        background: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(Some(LearnerRecord {
            id: id.clone(),
            name,
            preferences,
        }))
    }
}
