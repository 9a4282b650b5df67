// In memory implementation of the AssignmentRepository port.
//
// Purpose
// - Support handler tests and local development without a database.
//
// Responsibilities
// - Keep a (session, student) index next to the assignments and update both under one write
//   lock, so two concurrent inserts for the same pair cannot both succeed.
// - Enforce optimistic concurrency on save by checking the expected version.

use crate::core::assignment::Assignment;
use crate::core::ports::{AssignmentRepository, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    assignments: HashMap<String, Assignment>,
    by_session_student: HashMap<(String, String), String>,
}

#[derive(Default)]
pub struct InMemoryAssignmentStore {
    inner: RwLock<StoreState>,
    is_offline: bool,
    delay_save_ms: AtomicU64,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Delays every save before it takes the write lock. Used to force interleavings.
    pub fn set_delay_save_ms(&self, ms: u64) {
        self.delay_save_ms.store(ms, Ordering::Relaxed);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Assignment store offline".into()));
        }
        Ok(())
    }
}

fn oldest_first(mut assignments: Vec<Assignment>) -> Vec<Assignment> {
    assignments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    assignments
}

#[async_trait::async_trait]
impl AssignmentRepository for InMemoryAssignmentStore {
    async fn insert(&self, assignment: Assignment) -> Result<Assignment, StoreError> {
        self.ensure_online()?;
        let mut guard = self.inner.write().await;
        if guard.assignments.contains_key(&assignment.id) {
            return Err(StoreError::Backend(format!(
                "assignment id {} is already taken",
                assignment.id
            )));
        }
        for student_id in assignment.student_ids() {
            let key = (assignment.session_id.clone(), student_id.to_string());
            if guard.by_session_student.contains_key(&key) {
                return Err(StoreError::Duplicate {
                    session_id: key.0,
                    student_id: key.1,
                });
            }
        }
        for student_id in assignment.student_ids() {
            guard.by_session_student.insert(
                (assignment.session_id.clone(), student_id.to_string()),
                assignment.id.clone(),
            );
        }
        guard
            .assignments
            .insert(assignment.id.clone(), assignment.clone());
        Ok(assignment)
    }

    async fn get(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        self.ensure_online()?;
        Ok(self.inner.read().await.assignments.get(id).cloned())
    }

    async fn save(
        &self,
        mut assignment: Assignment,
        expected_version: u64,
    ) -> Result<Assignment, StoreError> {
        self.ensure_online()?;
        let delay = self.delay_save_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let mut guard = self.inner.write().await;
        let stored = guard
            .assignments
            .get_mut(&assignment.id)
            .ok_or_else(|| StoreError::Missing(assignment.id.clone()))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionMismatch {
                expected: expected_version,
                actual: stored.version,
            });
        }
        assignment.version = expected_version + 1;
        *stored = assignment.clone();
        Ok(assignment)
    }

    async fn remove(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        self.ensure_online()?;
        let mut guard = self.inner.write().await;
        let Some(removed) = guard.assignments.remove(id) else {
            return Ok(None);
        };
        for student_id in removed.student_ids() {
            guard
                .by_session_student
                .remove(&(removed.session_id.clone(), student_id.to_string()));
        }
        Ok(Some(removed))
    }

    async fn list(&self) -> Result<Vec<Assignment>, StoreError> {
        self.ensure_online()?;
        let guard = self.inner.read().await;
        Ok(oldest_first(guard.assignments.values().cloned().collect()))
    }

    async fn list_by_invigilator(
        &self,
        invigilator_id: &str,
    ) -> Result<Vec<Assignment>, StoreError> {
        self.ensure_online()?;
        let guard = self.inner.read().await;
        Ok(oldest_first(
            guard
                .assignments
                .values()
                .filter(|a| a.is_invigilated_by(invigilator_id))
                .cloned()
                .collect(),
        ))
    }

    async fn is_assigned(&self, session_id: &str, student_id: &str) -> Result<bool, StoreError> {
        self.ensure_online()?;
        Ok(self
            .inner
            .read()
            .await
            .by_session_student
            .contains_key(&(session_id.to_string(), student_id.to_string())))
    }
}
