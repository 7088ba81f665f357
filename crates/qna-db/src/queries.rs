use rusqlite::{Connection, ErrorCode, Row, ffi};
use tracing::{debug, error, warn};

use crate::models::{AnswerRow, QuestionRow, UserRow};
use crate::{Database, DbError, DbResult};

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

impl Database {
    // -- Users --

    pub fn get_user(&self, id: &str) -> DbResult<Option<UserRow>> {
        logged("get_user", self.with_tx(|conn| query_user(conn, id)))
    }

    /// All users, ordered by id.
    pub fn list_users(&self) -> DbResult<Vec<UserRow>> {
        logged(
            "list_users",
            self.with_tx(|conn| {
                let mut stmt = conn.prepare(r#"SELECT id FROM "User" ORDER BY id"#)?;
                let rows = stmt
                    .query_map([], |row| Ok(UserRow { id: row.get(0)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }),
        )
    }

    pub fn create_user(&self, user: &UserRow) -> DbResult<()> {
        logged(
            "create_user",
            self.with_tx_mut(|conn| {
                conn.execute(r#"INSERT INTO "User" (id) VALUES (?1)"#, [&user.id])
                    .map_err(|e| classify_insert(e, "user", &user.id))?;
                Ok(())
            }),
        )
    }

    /// Removes the user and, through the FK cascade, every answer they wrote.
    pub fn delete_user(&self, id: &str) -> DbResult<()> {
        logged(
            "delete_user",
            self.with_tx_mut(|conn| {
                let n = conn.execute(r#"DELETE FROM "User" WHERE id = ?1"#, [id])?;
                expect_one(n, "user", id)
            }),
        )
    }

    // -- Questions --

    pub fn get_question(&self, id: i64) -> DbResult<Option<QuestionRow>> {
        logged("get_question", self.with_tx(|conn| query_question(conn, id)))
    }

    /// All questions, ordered by id.
    pub fn list_questions(&self) -> DbResult<Vec<QuestionRow>> {
        logged(
            "list_questions",
            self.with_tx(|conn| {
                let mut stmt =
                    conn.prepare(r#"SELECT id, text, created_at FROM "Question" ORDER BY id"#)?;
                let rows = stmt
                    .query_map([], question_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }),
        )
    }

    pub fn create_question(&self, question: &QuestionRow) -> DbResult<()> {
        logged(
            "create_question",
            self.with_tx_mut(|conn| {
                conn.execute(
                    &format!(
                        r#"INSERT INTO "Question" (id, text, created_at)
                           VALUES (?1, ?2, COALESCE(?3, {NOW}))"#
                    ),
                    rusqlite::params![question.id, question.text, question.created_at],
                )
                .map_err(|e| classify_insert(e, "question", question.id))?;
                Ok(())
            }),
        )
    }

    /// Removes the question and, through the FK cascade, all of its answers.
    pub fn delete_question(&self, id: i64) -> DbResult<()> {
        logged(
            "delete_question",
            self.with_tx_mut(|conn| {
                let n = conn.execute(r#"DELETE FROM "Question" WHERE id = ?1"#, [id])?;
                expect_one(n, "question", id)
            }),
        )
    }

    /// A question and its answers read from one snapshot.
    pub fn get_question_with_answers(
        &self,
        id: i64,
    ) -> DbResult<Option<(QuestionRow, Vec<AnswerRow>)>> {
        logged(
            "get_question_with_answers",
            self.with_tx(|conn| {
                let Some(question) = query_question(conn, id)? else {
                    return Ok(None);
                };
                let answers = query_answers(conn, id)?;
                Ok(Some((question, answers)))
            }),
        )
    }

    // -- Answers --

    pub fn get_answer(&self, id: i64) -> DbResult<Option<AnswerRow>> {
        logged(
            "get_answer",
            self.with_tx(|conn| {
                conn.query_row(
                    r#"SELECT id, question_id, user_id, text, created_at
                       FROM "Answer" WHERE id = ?1"#,
                    [id],
                    answer_from_row,
                )
                .optional()
            }),
        )
    }

    /// Answers under one question, ordered by id. Empty when there are none
    /// or the question does not exist.
    pub fn list_answers_for_question(&self, question_id: i64) -> DbResult<Vec<AnswerRow>> {
        logged(
            "list_answers_for_question",
            self.with_tx(|conn| query_answers(conn, question_id)),
        )
    }

    /// Inserts an answer if its question exists. The check and the insert
    /// share one immediate transaction, so the question cannot vanish between
    /// them.
    pub fn create_answer(&self, answer: &AnswerRow) -> DbResult<()> {
        logged(
            "create_answer",
            self.with_tx_mut(|conn| {
                if query_question(conn, answer.question_id)?.is_none() {
                    return Err(DbError::not_found("question", answer.question_id));
                }

                conn.execute(
                    &format!(
                        r#"INSERT INTO "Answer" (id, question_id, user_id, text, created_at)
                           VALUES (?1, ?2, ?3, ?4, COALESCE(?5, {NOW}))"#
                    ),
                    rusqlite::params![
                        answer.id,
                        answer.question_id,
                        answer.user_id,
                        answer.text,
                        answer.created_at
                    ],
                )
                .map_err(|e| match classify_insert(e, "answer", answer.id) {
                    // The question was checked above, so the user is the missing parent.
                    DbError::NotFound { .. } => DbError::not_found("user", &answer.user_id),
                    other => other,
                })?;
                Ok(())
            }),
        )
    }

    pub fn delete_answer(&self, id: i64) -> DbResult<()> {
        logged(
            "delete_answer",
            self.with_tx_mut(|conn| {
                let n = conn.execute(r#"DELETE FROM "Answer" WHERE id = ?1"#, [id])?;
                expect_one(n, "answer", id)
            }),
        )
    }
}

fn query_user(conn: &Connection, id: &str) -> DbResult<Option<UserRow>> {
    conn.query_row(r#"SELECT id FROM "User" WHERE id = ?1"#, [id], |row| {
        Ok(UserRow { id: row.get(0)? })
    })
    .optional()
}

fn query_question(conn: &Connection, id: i64) -> DbResult<Option<QuestionRow>> {
    conn.query_row(
        r#"SELECT id, text, created_at FROM "Question" WHERE id = ?1"#,
        [id],
        question_from_row,
    )
    .optional()
}

fn query_answers(conn: &Connection, question_id: i64) -> DbResult<Vec<AnswerRow>> {
    let mut stmt = conn.prepare(
        r#"SELECT id, question_id, user_id, text, created_at
           FROM "Answer"
           WHERE question_id = ?1
           ORDER BY id"#,
    )?;

    let rows = stmt
        .query_map([question_id], answer_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        id: row.get(0)?,
        text: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<AnswerRow> {
    Ok(AnswerRow {
        id: row.get(0)?,
        question_id: row.get(1)?,
        user_id: row.get(2)?,
        text: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn expect_one(affected: usize, resource: &'static str, id: impl ToString) -> DbResult<()> {
    if affected == 0 {
        return Err(DbError::not_found(resource, id));
    }
    Ok(())
}

/// Turn constraint failures on insert into the matching typed error.
fn classify_insert(err: rusqlite::Error, resource: &'static str, id: impl ToString) -> DbError {
    if let rusqlite::Error::SqliteFailure(ref e, _) = err {
        if e.code == ErrorCode::ConstraintViolation {
            match e.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return DbError::AlreadyExists {
                        resource,
                        id: id.to_string(),
                    };
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return DbError::not_found(resource, id),
                _ => {}
            }
        }
    }
    DbError::Sqlite(err)
}

/// Report the outcome of a gateway call to the operator log. Callers only
/// ever see the typed error.
fn logged<T>(op: &'static str, result: DbResult<T>) -> DbResult<T> {
    match &result {
        Err(e) if e.is_fault() => error!(op, error = %e, "Database operation failed"),
        Err(e @ DbError::AlreadyExists { .. }) => warn!(op, error = %e, "Rejected write"),
        Err(e) => debug!(op, error = %e, "Database operation found nothing"),
        Ok(_) => {}
    }
    result
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> DbResult<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> DbResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn user(id: &str) -> UserRow {
        UserRow { id: id.to_string() }
    }

    fn question(id: i64, text: &str) -> QuestionRow {
        QuestionRow {
            id,
            text: text.to_string(),
            created_at: None,
        }
    }

    fn answer(id: i64, question_id: i64, user_id: &str, text: &str) -> AnswerRow {
        AnswerRow {
            id,
            question_id,
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: None,
        }
    }

    /// One user, question 1, and two answers under it.
    fn seeded() -> Database {
        let db = db();
        db.create_user(&user("root")).unwrap();
        db.create_question(&question(1, "First question?")).unwrap();
        db.create_question(&question(2, "Second question?")).unwrap();
        db.create_answer(&answer(1, 1, "root", "First answer for q1")).unwrap();
        db.create_answer(&answer(2, 1, "root", "Second answer for q1")).unwrap();
        db
    }

    #[test]
    fn user_crud() {
        let db = db();
        db.create_user(&user("root")).unwrap();

        assert_eq!(db.get_user("root").unwrap(), Some(user("root")));
        assert!(db.list_users().unwrap().contains(&user("root")));

        db.delete_user("root").unwrap();
        assert_eq!(db.get_user("root").unwrap(), None);
    }

    #[test]
    fn list_users_is_ordered_by_id() {
        let db = db();
        for id in ["carol", "alice", "bob"] {
            db.create_user(&user(id)).unwrap();
        }
        let ids: Vec<String> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, ["alice", "bob", "carol"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let db = seeded();
        assert!(matches!(
            db.create_user(&user("root")),
            Err(DbError::AlreadyExists { resource: "user", .. })
        ));
        assert!(matches!(
            db.create_question(&question(1, "Again?")),
            Err(DbError::AlreadyExists { resource: "question", .. })
        ));
        assert!(matches!(
            db.create_answer(&answer(1, 1, "root", "again")),
            Err(DbError::AlreadyExists { resource: "answer", .. })
        ));
    }

    #[test]
    fn question_round_trip_fills_created_at() {
        let db = db();
        db.create_question(&question(7, "Why?")).unwrap();

        let got = db.get_question(7).unwrap().unwrap();
        assert_eq!(got.id, 7);
        assert_eq!(got.text, "Why?");
        let ts = got.created_at.unwrap();
        assert!(ts.ends_with('Z'), "unexpected timestamp {ts}");
    }

    #[test]
    fn question_keeps_supplied_created_at() {
        let db = db();
        let mut q = question(3, "When?");
        q.created_at = Some("2024-01-02T03:04:05.000000Z".into());
        db.create_question(&q).unwrap();

        assert_eq!(db.get_question(3).unwrap(), Some(q));
    }

    #[test]
    fn missing_question_is_absent_not_an_error() {
        let db = db();
        assert_eq!(db.get_question(404).unwrap(), None);
        assert_eq!(db.get_question_with_answers(404).unwrap(), None);
        assert!(db.list_answers_for_question(404).unwrap().is_empty());
    }

    #[test]
    fn list_questions_and_answers() {
        let db = seeded();
        let ids: Vec<i64> = db.list_questions().unwrap().iter().map(|q| q.id).collect();
        assert_eq!(ids, [1, 2]);

        let answers = db.list_answers_for_question(1).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].text, "First answer for q1");
        assert!(db.list_answers_for_question(2).unwrap().is_empty());
    }

    #[test]
    fn question_with_answers_reads_both() {
        let db = seeded();
        let (q, answers) = db.get_question_with_answers(1).unwrap().unwrap();
        assert_eq!(q.text, "First question?");
        assert_eq!(answers.iter().map(|a| a.id).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn deleting_question_cascades_to_answers() {
        let db = seeded();
        db.delete_question(1).unwrap();

        assert_eq!(db.get_answer(1).unwrap(), None);
        assert_eq!(db.get_answer(2).unwrap(), None);
        assert!(db.get_question(2).unwrap().is_some());
    }

    #[test]
    fn deleting_user_cascades_to_answers() {
        let db = seeded();
        db.delete_user("root").unwrap();

        assert!(db.list_answers_for_question(1).unwrap().is_empty());
        assert!(db.get_question(1).unwrap().is_some());
    }

    #[test]
    fn answer_to_missing_question_writes_nothing() {
        let db = seeded();
        let err = db.create_answer(&answer(3, 50, "root", "Answer for some fake Question"));
        assert!(matches!(
            err,
            Err(DbError::NotFound { resource: "question", ref id }) if id == "50"
        ));

        assert_eq!(db.get_answer(3).unwrap(), None);
        assert_eq!(db.list_answers_for_question(1).unwrap().len(), 2);
        assert_eq!(db.list_questions().unwrap().len(), 2);
    }

    #[test]
    fn answer_from_unknown_user_is_rejected() {
        let db = seeded();
        let err = db.create_answer(&answer(3, 1, "nobody", "hi"));
        assert!(matches!(err, Err(DbError::NotFound { resource: "user", .. })));
        assert_eq!(db.get_answer(3).unwrap(), None);
    }

    #[test]
    fn deletes_report_missing_rows() {
        let db = seeded();
        db.delete_answer(2).unwrap();

        assert!(matches!(
            db.delete_answer(2),
            Err(DbError::NotFound { resource: "answer", .. })
        ));
        assert!(matches!(
            db.delete_question(99),
            Err(DbError::NotFound { resource: "question", .. })
        ));
        assert!(matches!(
            db.delete_user("ghost"),
            Err(DbError::NotFound { resource: "user", .. })
        ));
    }
}
