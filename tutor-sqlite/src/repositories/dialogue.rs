//! Dialogue repository: the `conversations` table.
//!
//! Turns live in `messages_json` as a JSON array of `{role, content}`.

use rusqlite::{params, Connection, OptionalExtension};
use tutor_core::model::{decode_turns, ActivityRecord, Turn};
use tutor_core::{ContextId, DialogueId, LearnerId};

use super::parse_optional_timestamp;
use crate::error::Result;

/// Dialogue repository.
pub struct DialogueRepo;

impl DialogueRepo {
    /// A learner's dialogues, most recently updated first, up to `limit`.
    ///
    /// Timestamps are compared after parsing, so mixed stored formats still
    /// order correctly. Undated dialogues come last.
    pub fn recent_activity(
        conn: &Connection,
        learner: &LearnerId,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>> {
        let mut stmt = conn.prepare(
            "SELECT module_id, updated_at, messages_json
             FROM conversations WHERE user_id = ?1
             ORDER BY id DESC",
        )?;
        let mut activity = stmt
            .query_map(params![learner.as_str()], |row| {
                let messages: Option<String> = row.get(2)?;
                Ok(ActivityRecord {
                    context_id: ContextId(row.get(0)?),
                    last_activity: parse_optional_timestamp(row.get(1)?),
                    turn_count: decode_turns(messages.as_deref()).len(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        activity.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        activity.truncate(limit);
        Ok(activity)
    }

    /// The turns of one dialogue, if it belongs to the learner and context.
    ///
    /// An unreadable turn log yields zero turns.
    pub fn turns(
        conn: &Connection,
        learner: &LearnerId,
        context: ContextId,
        dialogue: &DialogueId,
    ) -> Result<Option<Vec<Turn>>> {
        let messages: Option<Option<String>> = conn
            .query_row(
                "SELECT messages_json FROM conversations
                 WHERE id = ?1 AND user_id = ?2 AND module_id = ?3",
                params![dialogue.as_str(), learner.as_str(), context.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(messages.map(|raw| decode_turns(raw.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::test_connection;

    fn setup() -> Connection {
        let conn = test_connection();
        conn.execute_batch(
            r#"INSERT INTO users (id) VALUES (1), (2);
               INSERT INTO modules (id, title) VALUES (10, 'Ten'), (11, 'Eleven'), (12, 'Twelve');
               INSERT INTO conversations (id, user_id, module_id, messages_json, updated_at) VALUES
                 (1, 1, 10, '[{"role":"user","content":"hi"}]', '2024-01-01 10:00:00'),
                 (2, 1, 11, '[{"role":"user","content":"a"},{"role":"assistant","content":"b"}]',
                    '2024-01-02T09:00:00Z'),
                 (3, 1, 12, 'not json', NULL),
                 (4, 2, 10, '[]', '2024-03-01 00:00:00');"#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_recent_activity_sorts_by_parsed_time() {
        let conn = setup();
        let activity = DialogueRepo::recent_activity(&conn, &"1".into(), 5).unwrap();

        let contexts: Vec<_> = activity.iter().map(|a| a.context_id.0).collect();
        assert_eq!(contexts, [11, 10, 12]);
        assert_eq!(activity[0].turn_count, 2);
        assert_eq!(activity[2].turn_count, 0);
        assert!(activity[2].last_activity.is_none());
    }

    #[test]
    fn test_recent_activity_respects_limit() {
        let conn = setup();
        let activity = DialogueRepo::recent_activity(&conn, &"1".into(), 1).unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].context_id, ContextId(11));
    }

    #[test]
    fn test_turns_require_matching_owner() {
        let conn = setup();

        let turns = DialogueRepo::turns(&conn, &"1".into(), ContextId(10), &"1".into())
            .unwrap()
            .unwrap();
        assert_eq!(turns, vec![Turn::learner("hi")]);

        assert!(DialogueRepo::turns(&conn, &"2".into(), ContextId(10), &"1".into())
            .unwrap()
            .is_none());
        assert!(DialogueRepo::turns(&conn, &"1".into(), ContextId(11), &"1".into())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_malformed_turn_log_is_empty() {
        let conn = setup();
        let turns = DialogueRepo::turns(&conn, &"1".into(), ContextId(12), &"3".into()).unwrap();
        assert_eq!(turns, Some(Vec::new()));
    }
}
