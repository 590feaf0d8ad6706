//! Material repository: the `documents` table.

use rusqlite::{params, Connection};
use tutor_core::model::MaterialRecord;
use tutor_core::{ContextId, ParentId};

use super::parse_optional_timestamp;
use crate::error::Result;

/// Material repository. Rows come back in insertion order.
pub struct MaterialRepo;

impl MaterialRepo {
    /// Materials attached to a context.
    pub fn for_context(conn: &Connection, context: ContextId) -> Result<Vec<MaterialRecord>> {
        Self::query(
            conn,
            "SELECT filename, content, uploaded_at FROM documents
             WHERE module_id = ?1 ORDER BY id",
            context.0,
        )
    }

    /// Materials attached to a parent context.
    pub fn for_parent(conn: &Connection, parent: ParentId) -> Result<Vec<MaterialRecord>> {
        Self::query(
            conn,
            "SELECT filename, content, uploaded_at FROM documents
             WHERE class_id = ?1 AND module_id IS NULL ORDER BY id",
            parent.0,
        )
    }

    fn query(conn: &Connection, sql: &str, owner: i64) -> Result<Vec<MaterialRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok(MaterialRecord {
                    filename: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    content: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    uploaded_at: parse_optional_timestamp(row.get(2)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::test_connection;

    fn setup() -> Connection {
        let conn = test_connection();
        conn.execute_batch(
            "INSERT INTO classes (id, title) VALUES (1, 'Economics 101');
             INSERT INTO modules (id, class_id, title) VALUES (2, 1, 'Supply and Demand');
             INSERT INTO documents (class_id, module_id, filename, content) VALUES
                 (1, NULL, 'syllabus.md', 'week one'),
                 (1, 2, 'worksheet.md', 'exercise'),
                 (NULL, 2, 'notes.md', NULL),
                 (1, NULL, 'rubric.md', 'grading');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_context_materials_in_insertion_order() {
        let conn = setup();
        let names: Vec<_> = MaterialRepo::for_context(&conn, ContextId(2))
            .unwrap()
            .into_iter()
            .map(|m| m.filename)
            .collect();
        assert_eq!(names, ["worksheet.md", "notes.md"]);
    }

    #[test]
    fn test_parent_materials_exclude_module_documents() {
        let conn = setup();
        let materials = MaterialRepo::for_parent(&conn, ParentId(1)).unwrap();
        let names: Vec<_> = materials.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, ["syllabus.md", "rubric.md"]);
        assert!(materials[0].uploaded_at.is_some());
    }
}
