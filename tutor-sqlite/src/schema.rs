//! DDL for the tables the store reads.
//!
//! The tutoring backend owns and migrates these tables. [`bootstrap`] only
//! creates them in an empty database, for fixtures and local tooling.

use rusqlite::Connection;

use crate::error::Result;

/// Create any missing tables.
///
/// Idempotent (uses `IF NOT EXISTS`).
pub fn bootstrap(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email TEXT,
    name TEXT
);

CREATE TABLE IF NOT EXISTS onboarding_surveys (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    learning_style TEXT,
    preferred_pace TEXT,
    background_knowledge TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    learning_objectives TEXT,
    system_prompt TEXT
);

CREATE TABLE IF NOT EXISTS modules (
    id INTEGER PRIMARY KEY,
    class_id INTEGER REFERENCES classes(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    system_prompt TEXT,
    module_prompt TEXT,
    system_corpus TEXT,
    module_corpus TEXT,
    dynamic_corpus TEXT
);

CREATE TABLE IF NOT EXISTS class_corpus (
    id INTEGER PRIMARY KEY,
    class_id INTEGER REFERENCES classes(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    type TEXT NOT NULL,
    order_index INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    module_id INTEGER NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
    messages_json TEXT,
    created_at TEXT,
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_conversations_user
    ON conversations(user_id, module_id);

CREATE TABLE IF NOT EXISTS memory_summaries (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    module_id INTEGER,
    conversation_id INTEGER,
    what_learned TEXT,
    how_learned TEXT,
    key_concepts TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_memory_summaries_user
    ON memory_summaries(user_id, created_at);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    user_id INTEGER,
    class_id INTEGER REFERENCES classes(id) ON DELETE CASCADE,
    module_id INTEGER REFERENCES modules(id) ON DELETE CASCADE,
    filename TEXT,
    content TEXT,
    uploaded_at TEXT DEFAULT (datetime('now'))
);
";

/// An in-memory database with foreign keys enforced and the schema created.
#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    bootstrap(&conn).unwrap();
    conn
}
