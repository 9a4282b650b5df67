// Read-side join of an assignment with its referenced records.
//
// Purpose
// - Give callers a fully resolved assignment without handing them the persisted aggregate.

use crate::application::errors::ApplicationError;
use crate::core::assignment::Assignment;
use crate::core::ports::ReferenceData;
use crate::core::reference::{ExamSession, Hall, Invigilator, Student};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntryView {
    pub student: Student,
    pub is_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub id: String,
    pub session: ExamSession,
    pub hall: Hall,
    pub invigilator: Invigilator,
    pub students: Vec<RosterEntryView>,
    pub encoded_payload: Option<String>,
    pub created_at: i64,
}

/// Resolves every reference of `assignment`. Roster students that no longer resolve are
/// left out of the view.
pub async fn resolve_view<TReference>(
    reference: &TReference,
    assignment: Assignment,
) -> Result<AssignmentView, ApplicationError>
where
    TReference: ReferenceData + ?Sized,
{
    let session = reference
        .session(&assignment.session_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("exam session", &assignment.session_id))?;
    let hall = reference
        .hall(&assignment.hall_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("hall", &assignment.hall_id))?;
    let invigilator = reference
        .invigilator(&assignment.invigilator_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("invigilator", &assignment.invigilator_id))?;

    let mut students = Vec::with_capacity(assignment.assigned_count());
    for entry in assignment.students() {
        match reference.student(&entry.student_id).await? {
            Some(student) => students.push(RosterEntryView {
                student,
                is_present: entry.is_present,
            }),
            None => tracing::warn!(
                assignment_id = %assignment.id,
                student_id = %entry.student_id,
                "roster student no longer resolves"
            ),
        }
    }

    Ok(AssignmentView {
        id: assignment.id,
        session,
        hall,
        invigilator,
        students,
        encoded_payload: assignment.encoded_payload,
        created_at: assignment.created_at,
    })
}
