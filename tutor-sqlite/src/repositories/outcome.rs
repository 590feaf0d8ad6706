//! Outcome repository: the `memory_summaries` table.

use rusqlite::{params, Connection};
use tutor_core::model::OutcomeRecord;
use tutor_core::{ContextId, LearnerId};

use super::parse_optional_timestamp;
use crate::error::Result;

/// Outcome repository.
pub struct OutcomeRepo;

impl OutcomeRepo {
    /// A learner's outcome records outside `exclude`, most recent first.
    ///
    /// Rows with no context are skipped.
    pub fn excluding(
        conn: &Connection,
        learner: &LearnerId,
        exclude: ContextId,
    ) -> Result<Vec<OutcomeRecord>> {
        let mut stmt = conn.prepare(
            "SELECT module_id, what_learned, how_learned, key_concepts, created_at
             FROM memory_summaries
             WHERE user_id = ?1 AND module_id IS NOT NULL AND module_id != ?2
             ORDER BY id DESC",
        )?;
        let mut outcomes = stmt
            .query_map(params![learner.as_str(), exclude.0], |row| {
                Ok(OutcomeRecord {
                    context_id: ContextId(row.get(0)?),
                    what_learned: row.get(1)?,
                    how_learned: row.get(2)?,
                    key_concepts: row.get(3)?,
                    created_at: parse_optional_timestamp(row.get(4)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        outcomes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(outcomes)
    }
}
