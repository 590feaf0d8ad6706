//! Context repository: `modules`, `classes` and `class_corpus`.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tutor_core::model::{ContextRecord, CorpusEntry, ParentRecord, TeachingFields};
use tutor_core::{ContextId, ParentId};

use crate::error::Result;

/// Context and parent-context repository.
pub struct ContextRepo;

impl ContextRepo {
    /// Get a context (module) with its teaching fields.
    pub fn get(conn: &Connection, id: ContextId) -> Result<Option<ContextRecord>> {
        let row = conn
            .query_row(
                "SELECT id, class_id, title, description, system_prompt, module_prompt,
                        system_corpus, module_corpus, dynamic_corpus
                 FROM modules WHERE id = ?1",
                params![id.0],
                context_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get a parent context (class).
    ///
    /// The class `system_prompt` is its teaching philosophy.
    pub fn parent(conn: &Connection, id: ParentId) -> Result<Option<ParentRecord>> {
        let row = conn
            .query_row(
                "SELECT id, title, description, system_prompt, learning_objectives
                 FROM classes WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(ParentRecord {
                        id: ParentId(row.get(0)?),
                        title: row.get(1)?,
                        description: row.get(2)?,
                        teaching_philosophy: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        learning_objectives: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// A class's shared corpus, ascending by `order_index`.
    pub fn corpus(conn: &Connection, parent: ParentId) -> Result<Vec<CorpusEntry>> {
        let mut stmt = conn.prepare(
            "SELECT title, content, type, COALESCE(order_index, 0)
             FROM class_corpus WHERE class_id = ?1
             ORDER BY COALESCE(order_index, 0), id",
        )?;
        let rows = stmt
            .query_map(params![parent.0], |row| {
                Ok(CorpusEntry {
                    title: row.get(0)?,
                    content: row.get(1)?,
                    category: row.get(2)?,
                    priority: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn context_from_row(row: &Row<'_>) -> rusqlite::Result<ContextRecord> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };
    Ok(ContextRecord {
        id: ContextId(row.get(0)?),
        parent_id: row.get::<_, Option<i64>>(1)?.map(ParentId),
        title: row.get(2)?,
        description: row.get(3)?,
        teaching: TeachingFields {
            system_prompt: text(4)?,
            module_prompt: text(5)?,
            system_corpus: text(6)?,
            module_corpus: text(7)?,
            dynamic_corpus: text(8)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::test_connection;

    fn setup() -> Connection {
        let conn = test_connection();
        conn.execute_batch(
            "INSERT INTO classes (id, title, system_prompt, learning_objectives)
                 VALUES (1, 'Economics 101', 'Question everything', NULL),
                        (9, 'History 101', NULL, NULL);
             INSERT INTO modules (id, class_id, title, description, module_prompt)
                 VALUES (2, 1, 'Supply and Demand', 'Markets', 'use an example'),
                        (3, NULL, 'Standalone', NULL, NULL);
             INSERT INTO class_corpus (id, class_id, title, content, type, order_index)
                 VALUES (10, 1, 'B', 'second', 'knowledge', 2),
                        (11, 1, 'A', 'first', 'reference', 1),
                        (12, 1, 'C', 'tie', 'knowledge', 2),
                        (13, 9, 'X', 'other class', 'knowledge', 0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_get_context_with_parent() {
        let conn = setup();
        let ctx = ContextRepo::get(&conn, ContextId(2)).unwrap().unwrap();

        assert_eq!(ctx.parent_id, Some(ParentId(1)));
        assert_eq!(ctx.description.as_deref(), Some("Markets"));
        assert_eq!(ctx.teaching.module_prompt, "use an example");
        assert!(ctx.teaching.system_prompt.is_empty());
    }

    #[test]
    fn test_get_context_without_parent() {
        let conn = setup();
        let ctx = ContextRepo::get(&conn, ContextId(3)).unwrap().unwrap();
        assert!(ctx.parent_id.is_none());
        assert!(!ctx.teaching.is_configured());
        assert!(ContextRepo::get(&conn, ContextId(4)).unwrap().is_none());
    }

    #[test]
    fn test_parent_maps_system_prompt_to_philosophy() {
        let conn = setup();
        let parent = ContextRepo::parent(&conn, ParentId(1)).unwrap().unwrap();
        assert_eq!(parent.teaching_philosophy, "Question everything");
        assert!(parent.learning_objectives.is_empty());
    }

    #[test]
    fn test_corpus_ordered_by_index_then_insertion() {
        let conn = setup();
        let titles: Vec<_> = ContextRepo::corpus(&conn, ParentId(1))
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["A", "B", "C"]);

        let other: Vec<_> = ContextRepo::corpus(&conn, ParentId(9))
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(other, ["X"]);
    }
}
