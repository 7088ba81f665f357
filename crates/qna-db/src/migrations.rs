use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Each entry is applied once, in order; its index + 1 is its version.
const MIGRATIONS: &[&str] = &[
    // v1: initial schema
    r#"
    CREATE TABLE "User" (
        id          TEXT PRIMARY KEY
    );

    CREATE TABLE "Question" (
        id          INTEGER PRIMARY KEY,
        text        TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE TABLE "Answer" (
        id          INTEGER PRIMARY KEY,
        question_id INTEGER NOT NULL REFERENCES "Question"(id) ON DELETE CASCADE,
        user_id     TEXT NOT NULL REFERENCES "User"(id) ON DELETE CASCADE,
        text        TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE INDEX idx_answer_question ON "Answer"(question_id);
    CREATE INDEX idx_answer_user ON "Answer"(user_id);
    "#,
];

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let current = version(conn)?;

    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let target = idx as i64 + 1;
        if target <= current {
            continue;
        }

        info!("Running migration v{}", target);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [target])?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", version(conn)?);
    Ok(())
}

pub fn version(conn: &Connection) -> Result<i64> {
    let v = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(v)
}
