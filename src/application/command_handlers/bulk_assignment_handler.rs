// Fans one (exam, hall, invigilator) assignment out over many students.
//
// Responsibilities
// - Resolve the shared references once and fail fast when any of them is missing.
// - Give every student its own single-student assignment. A failing student is reported as
//   data and never aborts or rolls back the rest of the batch.
// - Bound the number of students processed at once.

use crate::application::command_handlers::create_assignment_handler::{
    AssignmentContext, persist_new, require_admin, require_field, resolve_context,
};
use crate::application::errors::ApplicationError;
use crate::core::ports::{AssignmentRepository, ReferenceData};
use crate::core::reference::Actor;
use futures::{StreamExt, stream};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBulkAssignments {
    pub session_id: String,
    pub hall_id: String,
    pub invigilator_id: String,
    pub student_ids: Vec<String>,
    pub requested_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuccess {
    pub student_id: String,
    pub assignment_id: String,
    pub encoded_payload: String,
    pub assigned_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkFailureReason {
    StudentNotFound,
    AlreadyAssigned,
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub student_id: String,
    pub reason: BulkFailureReason,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkAssignmentReport {
    pub success: Vec<BulkSuccess>,
    pub failed: Vec<BulkFailure>,
}

pub struct BulkAssignmentHandler<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    store: Arc<TStore>,
    reference: Arc<TReference>,
    concurrency: usize,
}

impl<TStore, TReference> BulkAssignmentHandler<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    pub fn new(store: Arc<TStore>, reference: Arc<TReference>, concurrency: usize) -> Self {
        Self {
            store,
            reference,
            concurrency: concurrency.max(1),
        }
    }

    #[tracing::instrument(skip_all, fields(actor = %actor.user_id, students = command.student_ids.len()))]
    pub async fn handle(
        &self,
        actor: &Actor,
        command: CreateBulkAssignments,
    ) -> Result<BulkAssignmentReport, ApplicationError> {
        require_admin(actor, "create exam assignments")?;
        require_field("sessionId", &command.session_id)?;
        require_field("hallId", &command.hall_id)?;
        require_field("invigilatorId", &command.invigilator_id)?;
        validate_student_ids(&command.student_ids)?;

        let context = resolve_context(
            &*self.reference,
            &command.session_id,
            &command.hall_id,
            &command.invigilator_id,
        )
        .await?;

        let context = &context;
        let requested_at = command.requested_at;
        let outcomes: Vec<Result<BulkSuccess, BulkFailure>> =
            stream::iter(command.student_ids.iter().cloned())
                .map(|student_id| async move {
                    self.assign_one(context, &student_id, requested_at).await
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut report = BulkAssignmentReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(success) => report.success.push(success),
                Err(failure) => report.failed.push(failure),
            }
        }
        tracing::info!(
            session_id = %command.session_id,
            succeeded = report.success.len(),
            failed = report.failed.len(),
            "bulk exam assignment finished"
        );
        Ok(report)
    }

    async fn assign_one(
        &self,
        context: &AssignmentContext,
        student_id: &str,
        requested_at: i64,
    ) -> Result<BulkSuccess, BulkFailure> {
        let fail = |reason: BulkFailureReason, message: String| {
            tracing::warn!(student_id, ?reason, %message, "bulk assignment skipped student");
            BulkFailure {
                student_id: student_id.to_string(),
                reason,
                message,
            }
        };

        let student = match self.reference.student(student_id).await {
            Ok(Some(student)) => student,
            Ok(None) => {
                return Err(fail(
                    BulkFailureReason::StudentNotFound,
                    format!("student {student_id} not found"),
                ));
            }
            Err(e) => return Err(fail(BulkFailureReason::InternalError, e.to_string())),
        };

        match self.store.is_assigned(&context.session.id, student_id).await {
            Ok(false) => {}
            Ok(true) => {
                return Err(fail(
                    BulkFailureReason::AlreadyAssigned,
                    format!(
                        "student {student_id} is already assigned to exam {}",
                        context.session.id
                    ),
                ));
            }
            Err(e) => return Err(fail(BulkFailureReason::InternalError, e.to_string())),
        }

        match persist_new(&*self.store, context, &[student], requested_at).await {
            Ok(assignment) => Ok(BulkSuccess {
                student_id: student_id.to_string(),
                encoded_payload: assignment.encoded_payload.unwrap_or_default(),
                assignment_id: assignment.id,
                assigned_at: assignment.created_at,
            }),
            Err(e @ ApplicationError::Conflict { .. }) => {
                Err(fail(BulkFailureReason::AlreadyAssigned, e.to_string()))
            }
            Err(e) => Err(fail(BulkFailureReason::InternalError, e.to_string())),
        }
    }
}

fn validate_student_ids(student_ids: &[String]) -> Result<(), ApplicationError> {
    if student_ids.is_empty() {
        return Err(ApplicationError::Validation(
            "studentIds must contain at least one student".into(),
        ));
    }
    let mut seen = HashSet::with_capacity(student_ids.len());
    for student_id in student_ids {
        require_field("studentId", student_id)?;
        if !seen.insert(student_id.as_str()) {
            return Err(ApplicationError::Validation(format!(
                "studentIds lists {student_id} more than once"
            )));
        }
    }
    Ok(())
}
