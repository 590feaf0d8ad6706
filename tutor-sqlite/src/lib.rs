//! SQLite-backed [`LearningStore`] for `tutor-core`.
//!
//! Reads the tables the tutoring backend owns (`users`, `onboarding_surveys`,
//! `classes`, `modules`, `class_corpus`, `conversations`, `memory_summaries`,
//! `documents`). Classes are parent contexts and modules are contexts.
//!
//! ```ignore
//! use tutor_core::{AssemblerConfig, AssemblyRequest, ContextAssembler, ContextId};
//! use tutor_sqlite::SqliteStore;
//!
//! let store = SqliteStore::open("harv.db")?;
//! let assembler = ContextAssembler::new(store, AssemblerConfig::default());
//! let context = assembler.assemble(&AssemblyRequest::new("12", ContextId(3))).await;
//! ```

pub mod error;
pub mod repositories;
pub mod schema;

pub use error::SqliteStoreError;
pub use repositories::parse_timestamp;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::debug;
use tutor_core::model::{
    ActivityRecord, ContextRecord, CorpusEntry, LearnerRecord, MaterialRecord, OutcomeRecord,
    ParentRecord, Turn,
};
use tutor_core::{ContextId, DialogueId, LearnerId, LearningStore, ParentId, StoreError};

use repositories::{ContextRepo, DialogueRepo, LearnerRepo, MaterialRepo, OutcomeRepo};

/// A learning store over a single SQLite connection.
///
/// Reads are serialized through a mutex; each read is one short query.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file. The schema must already exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening learning store");
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a fresh in-memory database with the schema created.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let conn = Connection::open_in_memory()?;
        schema::bootstrap(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` against the connection, e.g. to seed fixtures.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, SqliteStoreError> {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.conn.lock().map_err(|_| SqliteStoreError::LockPoisoned)
    }

    fn read<T>(
        &self,
        entity: &'static str,
        f: impl FnOnce(&Connection) -> error::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.lock()?;
        f(&conn).map_err(|e| e.into_store_error(entity))
    }
}

#[async_trait]
impl LearningStore for SqliteStore {
    async fn learner(&self, id: &LearnerId) -> Result<Option<LearnerRecord>, StoreError> {
        self.read("learner", |conn| LearnerRepo::get(conn, id))
    }

    async fn recent_activity(
        &self,
        learner: &LearnerId,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        self.read("activity", |conn| DialogueRepo::recent_activity(conn, learner, limit))
    }

    async fn context(&self, id: ContextId) -> Result<Option<ContextRecord>, StoreError> {
        self.read("context", |conn| ContextRepo::get(conn, id))
    }

    async fn parent(&self, id: ParentId) -> Result<Option<ParentRecord>, StoreError> {
        self.read("parent", |conn| ContextRepo::parent(conn, id))
    }

    async fn corpus(&self, parent: ParentId) -> Result<Vec<CorpusEntry>, StoreError> {
        self.read("corpus", |conn| ContextRepo::corpus(conn, parent))
    }

    async fn dialogue_turns(
        &self,
        learner: &LearnerId,
        context: ContextId,
        dialogue: &DialogueId,
    ) -> Result<Option<Vec<Turn>>, StoreError> {
        self.read("dialogue", |conn| DialogueRepo::turns(conn, learner, context, dialogue))
    }

    async fn outcomes_excluding(
        &self,
        learner: &LearnerId,
        exclude: ContextId,
    ) -> Result<Vec<OutcomeRecord>, StoreError> {
        self.read("outcome", |conn| OutcomeRepo::excluding(conn, learner, exclude))
    }

    async fn context_materials(
        &self,
        context: ContextId,
    ) -> Result<Vec<MaterialRecord>, StoreError> {
        self.read("material", |conn| MaterialRepo::for_context(conn, context))
    }

    async fn parent_materials(&self, parent: ParentId) -> Result<Vec<MaterialRecord>, StoreError> {
        self.read("material", |conn| MaterialRepo::for_parent(conn, parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_has_schema() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.learner(&"1".into()).await.unwrap().is_none());
        assert!(store.context(ContextId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_file_without_schema_reports_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("empty.db")).unwrap();

        let err = store.context(ContextId(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_mistyped_column_reports_corrupt_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_connection(|conn| {
                conn.execute_batch(
                    "INSERT INTO classes (id, title) VALUES (1, 'Economics 101');
                     INSERT INTO class_corpus (class_id, title, content, type, order_index)
                         VALUES (1, 'A', 'first', 'knowledge', 'high');",
                )
            })
            .unwrap();

        let err = store.corpus(ParentId(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { entity: "corpus", .. }));
    }

    #[tokio::test]
    async fn test_with_connection_seeds_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_connection(|conn| {
                conn.execute("INSERT INTO users (id, name) VALUES (5, 'Grace')", [])
            })
            .unwrap();

        let learner = store.learner(&"5".into()).await.unwrap().unwrap();
        assert_eq!(learner.name.as_deref(), Some("Grace"));
    }
}
