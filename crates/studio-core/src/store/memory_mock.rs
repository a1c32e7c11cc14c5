//! In-memory project store for testing.

use crate::error::{Result, StudioError};
use crate::project::{Project, ProjectSummary, timestamp_now};
use crate::store::{Field, ProjectStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    projects: BTreeMap<i64, Project>,
    fail_writes: bool,
}

/// Store that keeps projects in a map.
///
/// Clones share the same data, so a test can keep a handle after moving the
/// store into a runtime.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Number of stored projects.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().projects.len()
    }

    /// Whether the store holds no projects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_project<F>(&self, id: i64, f: F) -> Result<()>
    where
        F: FnOnce(&mut Project),
    {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(StudioError::Database(rusqlite::Error::InvalidQuery));
        }
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or(StudioError::ProjectNotFound(id))?;
        f(project);
        Ok(())
    }
}

impl ProjectStore for MemoryStore {
    fn create(&self, original_idea: &str) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(StudioError::Database(rusqlite::Error::InvalidQuery));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .projects
            .insert(id, Project::draft(id, original_idea, timestamp_now()));
        Ok(id)
    }

    fn load(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.inner.lock().unwrap().projects.get(&id).cloned())
    }

    fn update_field(&self, id: i64, field: Field, value: &str) -> Result<()> {
        self.with_project(id, |project| {
            let slot = match field {
                Field::ResearchOutput => &mut project.research_brief,
                Field::ScriptContent => &mut project.script_content,
                Field::StoryboardOutput => &mut project.storyboard_output,
            };
            *slot = value.to_string();
        })
    }

    fn update_review_stats(
        &self,
        id: i64,
        feedback: &str,
        score: u8,
        approved: bool,
    ) -> Result<()> {
        self.with_project(id, |project| {
            project.editor_feedback = feedback.to_string();
            project.editor_score = score;
            project.is_approved = approved;
            project.review_count += 1;
        })
    }

    fn list_all(&self) -> Result<Vec<ProjectSummary>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .projects
            .values()
            .rev()
            .map(|p| ProjectSummary {
                id: p.id,
                name: p.name.clone(),
                created_at: p.created_at.clone(),
            })
            .collect())
    }
}
