// Applies a scanned payload to the canonical assignment.
//
// Responsibilities
// - Load the assignment named by the payload and authorize the acting identity against the
//   stored invigilator. The invigilator embedded in the payload is never consulted.
// - Match students by id only. Ids missing from the roster are ignored. Exam and hall ids in
//   the snapshot are only compared for a warning; the stored assignment decides.
// - Persist with optimistic concurrency and retry on a version conflict, so simultaneous
//   scans of one assignment cannot lose each other's updates.

use crate::application::errors::ApplicationError;
use crate::core::assignment::{Assignment, PresenceChange};
use crate::core::payload::ScanPayload;
use crate::core::ports::{AssignmentRepository, StoreError};
use crate::core::reference::Actor;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceOutcome {
    /// Students that were absent before this call.
    pub marked_count: usize,
    /// Every payload student found on the roster, whether newly or previously present.
    pub marked_student_ids: Vec<String>,
    pub newly_marked_student_ids: Vec<String>,
    pub assignment: Assignment,
}

pub struct MarkAttendanceHandler<TStore>
where
    TStore: AssignmentRepository + 'static,
{
    store: Arc<TStore>,
    retry_limit: usize,
}

impl<TStore> MarkAttendanceHandler<TStore>
where
    TStore: AssignmentRepository + 'static,
{
    pub fn new(store: Arc<TStore>, retry_limit: usize) -> Self {
        Self { store, retry_limit }
    }

    #[tracing::instrument(
        skip_all,
        fields(actor = %actor.user_id, assignment_id = %payload.assignment_id)
    )]
    pub async fn handle(
        &self,
        actor: &Actor,
        payload: &ScanPayload,
    ) -> Result<MarkAttendanceOutcome, ApplicationError> {
        validate(payload)?;
        let scanned_ids = distinct_student_ids(payload);

        let mut attempt = 0;
        loop {
            let mut assignment = self
                .store
                .get(&payload.assignment_id)
                .await?
                .ok_or_else(|| ApplicationError::not_found("assignment", &payload.assignment_id))?;

            if !assignment.is_invigilated_by(&actor.user_id) {
                tracing::warn!("scan rejected: acting user is not the assigned invigilator");
                return Err(ApplicationError::Forbidden(
                    "you are not the invigilator of this assignment".into(),
                ));
            }
            if attempt == 0
                && (payload.exam.id != assignment.session_id || payload.hall.id != assignment.hall_id)
            {
                tracing::warn!(
                    payload_exam = %payload.exam.id,
                    payload_hall = %payload.hall.id,
                    "scanned snapshot disagrees with the stored assignment"
                );
            }

            let mut marked = Vec::new();
            let mut newly_marked = Vec::new();
            for student_id in &scanned_ids {
                match assignment.mark_present(student_id) {
                    Some(PresenceChange::NewlyPresent) => {
                        newly_marked.push(student_id.to_string());
                        marked.push(student_id.to_string());
                    }
                    Some(PresenceChange::AlreadyPresent) => marked.push(student_id.to_string()),
                    None => tracing::debug!(%student_id, "scanned student is not on the roster"),
                }
            }

            let assignment = if newly_marked.is_empty() {
                assignment
            } else {
                let expected_version = assignment.version;
                match self.store.save(assignment, expected_version).await {
                    Ok(saved) => saved,
                    Err(StoreError::VersionMismatch { expected, actual })
                        if attempt < self.retry_limit =>
                    {
                        attempt += 1;
                        tracing::debug!(expected, actual, attempt, "retrying attendance update");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            tracing::info!(
                marked = marked.len(),
                newly_marked = newly_marked.len(),
                "attendance marked"
            );
            return Ok(MarkAttendanceOutcome {
                marked_count: newly_marked.len(),
                marked_student_ids: marked,
                newly_marked_student_ids: newly_marked,
                assignment,
            });
        }
    }
}

fn validate(payload: &ScanPayload) -> Result<(), ApplicationError> {
    let missing = if payload.assignment_id.trim().is_empty() {
        Some("assignment id")
    } else if payload.exam.id.trim().is_empty() {
        Some("exam id")
    } else if payload.hall.id.trim().is_empty() {
        Some("hall id")
    } else if payload.students.is_empty() {
        Some("students")
    } else {
        None
    };
    match missing {
        Some(field) => Err(ApplicationError::InvalidPayload(format!(
            "payload is missing {field}"
        ))),
        None => Ok(()),
    }
}

fn distinct_student_ids(payload: &ScanPayload) -> Vec<&str> {
    let mut seen = HashSet::new();
    payload
        .student_ids()
        .filter(|id| seen.insert(*id))
        .collect()
}
