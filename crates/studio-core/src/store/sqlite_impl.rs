//! SQLite project store.

use crate::error::{Result, StudioError};
use crate::project::{NO_FEEDBACK_YET, Project, ProjectSummary, project_name, timestamp_now};
use crate::store::{Field, ProjectStore};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT,
    project_name TEXT,
    user_request TEXT,
    research_output TEXT,
    script_content TEXT,
    editor_feedback TEXT,
    editor_score INTEGER DEFAULT 0,
    is_approved INTEGER,
    storyboard_output TEXT,
    review_count INTEGER NOT NULL DEFAULT 0
)";

const SELECT_PROJECT: &str = "SELECT id, created_at, project_name, user_request, research_output,
        script_content, editor_feedback, editor_score, is_approved, storyboard_output, review_count
 FROM projects WHERE id = ?1";

/// Project store backed by a single SQLite table.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_TABLE, [])?;
        add_review_count_column(&conn)?;
        tracing::info!("project store ready");
        Ok(Self { conn })
    }
}

/// Tables created before `review_count` existed get the column, with rows
/// that carry a score counted as reviewed once.
fn add_review_count_column(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(projects)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if !columns.iter().any(|c| c == "review_count") {
        conn.execute(
            "ALTER TABLE projects ADD COLUMN review_count INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
        let migrated = conn.execute(
            "UPDATE projects SET review_count = 1 WHERE editor_score > 0",
            [],
        )?;
        tracing::info!(migrated, "added review_count column");
    }
    Ok(())
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let score: Option<i64> = row.get(7)?;
    let approved: Option<i64> = row.get(8)?;
    let review_count: Option<i64> = row.get(10)?;

    Ok(Project {
        id: row.get(0)?,
        created_at: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        original_idea: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        research_brief: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        script_content: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        editor_feedback: row
            .get::<_, Option<String>>(6)?
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| NO_FEEDBACK_YET.to_string()),
        editor_score: score.unwrap_or(0).clamp(0, 10) as u8,
        is_approved: approved.unwrap_or(0) != 0,
        review_count: review_count.unwrap_or(0).max(0) as u32,
        storyboard_output: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}

fn expect_one(changed: usize, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(StudioError::ProjectNotFound(id));
    }
    Ok(())
}

impl ProjectStore for SqliteStore {
    fn create(&self, original_idea: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO projects (created_at, project_name, user_request, is_approved, editor_score)
             VALUES (?1, ?2, ?3, 0, 0)",
            params![timestamp_now(), project_name(original_idea), original_idea],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(project = id, "created project");
        Ok(id)
    }

    fn load(&self, id: i64) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(SELECT_PROJECT, params![id], row_to_project)
            .optional()?;
        Ok(project)
    }

    fn update_field(&self, id: i64, field: Field, value: &str) -> Result<()> {
        // Column names come from a closed enum, never from input
        let sql = format!("UPDATE projects SET {} = ?1 WHERE id = ?2", field.column());
        let changed = self.conn.execute(&sql, params![value, id])?;
        expect_one(changed, id)?;
        tracing::debug!(project = id, field = %field, len = value.len(), "updated field");
        Ok(())
    }

    fn update_review_stats(
        &self,
        id: i64,
        feedback: &str,
        score: u8,
        approved: bool,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET editor_feedback = ?1, editor_score = ?2, is_approved = ?3,
                 review_count = review_count + 1
             WHERE id = ?4",
            params![feedback, i64::from(score), i64::from(approved), id],
        )?;
        expect_one(changed, id)?;
        tracing::debug!(project = id, score, approved, "recorded review");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<ProjectSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, project_name, created_at FROM projects ORDER BY id DESC")?;

        let rows = stmt.query_map([], |row| {
            Ok(ProjectSummary {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                created_at: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Stage;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_load_defaults() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.create("A robot chef on Mars").unwrap();

        let project = store.load(id).unwrap().unwrap();
        assert_eq!(project.id, id);
        assert_eq!(project.original_idea, "A robot chef on Mars");
        assert_eq!(project.name, "A robot chef on Mars");
        assert_eq!(project.editor_feedback, NO_FEEDBACK_YET);
        assert_eq!(project.editor_score, 0);
        assert!(!project.is_approved);
        assert_eq!(project.review_count, 0);
        assert!(project.research_brief.is_empty());
        assert_eq!(Stage::derive(&project), Stage::Research);
    }

    #[test]
    fn test_load_unknown_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load(42).unwrap().is_none());
    }

    #[test]
    fn test_update_field_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.create("idea").unwrap();

        store.update_field(id, Field::ScriptContent, "draft one").unwrap();
        store.update_field(id, Field::ScriptContent, "draft two").unwrap();
        assert_eq!(store.load(id).unwrap().unwrap().script_content, "draft two");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.update_field(9, Field::ResearchOutput, "x"),
            Err(StudioError::ProjectNotFound(9))
        ));
        assert!(matches!(
            store.update_review_stats(9, "x", 1, false),
            Err(StudioError::ProjectNotFound(9))
        ));
    }

    #[test]
    fn test_review_stats_increment_counter() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.create("idea").unwrap();

        store.update_review_stats(id, "too slow", 4, false).unwrap();
        store.update_review_stats(id, "great", 9, true).unwrap();

        let project = store.load(id).unwrap().unwrap();
        assert_eq!(project.editor_feedback, "great");
        assert_eq!(project.editor_score, 9);
        assert!(project.is_approved);
        assert_eq!(project.review_count, 2);
    }

    #[test]
    fn test_list_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.create("first idea").unwrap();
        let second = store.create("second idea").unwrap();

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
        assert_eq!(listed[1].name, "first idea");
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.create("one").unwrap();
        store
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![first])
            .unwrap();
        let second = store.create("two").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_reopen_preserves_derived_stage() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join(".studio").join("studio.db");

        let id = {
            let store = SqliteStore::open(&db).unwrap();
            let id = store.create("idea").unwrap();
            store.update_field(id, Field::ResearchOutput, "brief").unwrap();
            store.update_field(id, Field::ScriptContent, "script").unwrap();
            store.update_review_stats(id, "flat", 3, false).unwrap();
            id
        };

        let store = SqliteStore::open(&db).unwrap();
        let project = store.load(id).unwrap().unwrap();
        assert_eq!(Stage::derive(&project), Stage::Review);
        assert_eq!(project.review_count, 1);
    }

    #[test]
    fn test_legacy_table_gains_review_count() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("studio.db");

        {
            let conn = Connection::open(&db).unwrap();
            conn.execute(
                "CREATE TABLE projects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    created_at TEXT, project_name TEXT, user_request TEXT,
                    research_output TEXT, script_content TEXT, editor_feedback TEXT,
                    editor_score INTEGER, is_approved INTEGER, storyboard_output TEXT
                )",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO projects (created_at, project_name, user_request, editor_score, is_approved)
                 VALUES ('2025-01-01 00:00:00', 'old', 'old idea', 6, 0),
                        ('2025-01-02 00:00:00', 'new', 'new idea', NULL, NULL)",
                [],
            )
            .unwrap();
        }

        let store = SqliteStore::open(&db).unwrap();
        let reviewed = store.load(1).unwrap().unwrap();
        assert_eq!(reviewed.review_count, 1);
        let fresh = store.load(2).unwrap().unwrap();
        assert_eq!(fresh.review_count, 0);
        assert_eq!(fresh.editor_score, 0);
        assert!(!fresh.is_approved);
        assert_eq!(fresh.editor_feedback, NO_FEEDBACK_YET);
    }
}
