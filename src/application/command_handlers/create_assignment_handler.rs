// Creates one assignment for a roster of students.
//
// Responsibilities
// - Resolve the exam session, hall, invigilator and every student before touching the store.
// - Reject students that already sit this exam elsewhere. The store re-checks atomically on
//   insert, so a concurrent creation still ends in a conflict rather than a second record.
// - Generate and cache the scan payload before the one and only insert.

use crate::application::errors::ApplicationError;
use crate::application::views::{AssignmentView, RosterEntryView};
use crate::core::assignment::{Assignment, RosterError};
use crate::core::payload;
use crate::core::ports::{AssignmentRepository, ReferenceData};
use crate::core::reference::{Actor, ExamSession, Hall, Invigilator, Student};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssignment {
    pub session_id: String,
    pub hall_id: String,
    pub invigilator_id: String,
    pub student_ids: Vec<String>,
    pub requested_at: i64,
}

/// The shared references of an assignment, resolved once.
#[derive(Debug, Clone)]
pub struct AssignmentContext {
    pub session: ExamSession,
    pub hall: Hall,
    pub invigilator: Invigilator,
}

pub fn require_admin(actor: &Actor, action: &str) -> Result<(), ApplicationError> {
    if actor.is_admin() {
        return Ok(());
    }
    Err(ApplicationError::Forbidden(format!(
        "only administrators may {action}"
    )))
}

pub fn require_field(name: &str, value: &str) -> Result<(), ApplicationError> {
    if value.trim().is_empty() {
        return Err(ApplicationError::Validation(format!("{name} is required")));
    }
    Ok(())
}

pub async fn resolve_context<TReference>(
    reference: &TReference,
    session_id: &str,
    hall_id: &str,
    invigilator_id: &str,
) -> Result<AssignmentContext, ApplicationError>
where
    TReference: ReferenceData + ?Sized,
{
    let session = reference
        .session(session_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("exam session", session_id))?;
    let hall = reference
        .hall(hall_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("hall", hall_id))?;
    let invigilator = reference
        .invigilator(invigilator_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("invigilator", invigilator_id))?;
    Ok(AssignmentContext {
        session,
        hall,
        invigilator,
    })
}

/// Builds, encodes and inserts a new assignment for already resolved students.
pub async fn persist_new<TStore>(
    store: &TStore,
    context: &AssignmentContext,
    students: &[Student],
    created_at: i64,
) -> Result<Assignment, ApplicationError>
where
    TStore: AssignmentRepository + ?Sized,
{
    let student_ids: Vec<String> = students.iter().map(|s| s.id.clone()).collect();
    let mut assignment = Assignment::new(
        Uuid::now_v7().to_string(),
        context.session.id.clone(),
        context.hall.id.clone(),
        context.invigilator.id.clone(),
        &student_ids,
        created_at,
    )
    .map_err(|e: RosterError| ApplicationError::Validation(e.to_string()))?;

    let encoded = payload::encode(
        &assignment,
        &context.session,
        &context.hall,
        &context.invigilator,
        students,
    )
    .map_err(|e| ApplicationError::Validation(format!("cannot encode payload: {e}")))?;
    assignment.encoded_payload = Some(encoded);

    Ok(store.insert(assignment).await?)
}

pub struct CreateAssignmentHandler<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    store: Arc<TStore>,
    reference: Arc<TReference>,
}

impl<TStore, TReference> CreateAssignmentHandler<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    pub fn new(store: Arc<TStore>, reference: Arc<TReference>) -> Self {
        Self { store, reference }
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn handle(
        &self,
        actor: &Actor,
        command: CreateAssignment,
    ) -> Result<AssignmentView, ApplicationError> {
        require_admin(actor, "create exam assignments")?;
        require_field("sessionId", &command.session_id)?;
        require_field("hallId", &command.hall_id)?;
        require_field("invigilatorId", &command.invigilator_id)?;
        if command.student_ids.is_empty() {
            return Err(ApplicationError::Validation(
                "at least one studentId is required".into(),
            ));
        }
        for student_id in &command.student_ids {
            require_field("studentId", student_id)?;
        }

        let context = resolve_context(
            &*self.reference,
            &command.session_id,
            &command.hall_id,
            &command.invigilator_id,
        )
        .await?;

        let mut students = Vec::with_capacity(command.student_ids.len());
        for student_id in &command.student_ids {
            let student = self
                .reference
                .student(student_id)
                .await?
                .ok_or_else(|| ApplicationError::not_found("student", student_id))?;
            if self
                .store
                .is_assigned(&command.session_id, student_id)
                .await?
            {
                return Err(ApplicationError::Conflict {
                    session_id: command.session_id.clone(),
                    student_id: student_id.clone(),
                });
            }
            students.push(student);
        }

        let assignment =
            persist_new(&*self.store, &context, &students, command.requested_at).await?;
        tracing::info!(
            assignment_id = %assignment.id,
            session_id = %assignment.session_id,
            students = assignment.assigned_count(),
            "exam assignment created"
        );

        Ok(AssignmentView {
            id: assignment.id,
            session: context.session,
            hall: context.hall,
            invigilator: context.invigilator,
            students: students
                .into_iter()
                .map(|student| RosterEntryView {
                    student,
                    is_present: false,
                })
                .collect(),
            encoded_payload: assignment.encoded_payload,
            created_at: assignment.created_at,
        })
    }
}

#[cfg(test)]
mod create_assignment_handler_tests {
    use super::*;
    use crate::adapters::in_memory::in_memory_assignment_store::InMemoryAssignmentStore;
    use crate::core::ports::StoreError;
    use crate::test_support::fixtures::{Seeded, seeded};
    use rstest::rstest;

    fn command(seeded: &Seeded, student_ids: &[&str]) -> CreateAssignment {
        CreateAssignment {
            session_id: seeded.session_id.clone(),
            hall_id: seeded.hall_id.clone(),
            invigilator_id: seeded.teacher.user_id.clone(),
            student_ids: student_ids.iter().map(|s| s.to_string()).collect(),
            requested_at: 1_700_000_000_000,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_an_assignment_with_every_student_absent(
        #[future] seeded: Seeded,
    ) {
        let seeded = seeded.await;
        let handler = CreateAssignmentHandler::new(seeded.store.clone(), seeded.reference.clone());
        let view = handler
            .handle(&seeded.admin, command(&seeded, &["stu-0001"]))
            .await
            .expect("create failed");

        assert_eq!(view.session.id, seeded.session_id);
        assert_eq!(view.students.len(), 1);
        assert!(!view.students[0].is_present);
        let stored = seeded.store.get(&view.id).await.unwrap().unwrap();
        assert_eq!(stored.encoded_payload, view.encoded_payload);
        let decoded = payload::decode(view.encoded_payload.as_deref().unwrap()).unwrap();
        assert_eq!(decoded.assignment_id, view.id);
        assert_eq!(decoded.assigned_at, 1_700_000_000_000);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_conflict_on_a_second_assignment_for_the_same_exam(
        #[future] seeded: Seeded,
    ) {
        let seeded = seeded.await;
        let handler = CreateAssignmentHandler::new(seeded.store.clone(), seeded.reference.clone());
        handler
            .handle(&seeded.admin, command(&seeded, &["stu-0001"]))
            .await
            .unwrap();

        let mut other_hall = command(&seeded, &["stu-0001"]);
        other_hall.hall_id = seeded.other_hall_id.clone();
        let result = handler.handle(&seeded.admin, other_hall).await;
        assert!(matches!(
            result,
            Err(ApplicationError::Conflict { ref student_id, .. }) if student_id == "stu-0001"
        ));
        assert_eq!(seeded.store.list().await.unwrap().len(), 1);
    }

    #[rstest]
    #[case::session("session")]
    #[case::hall("hall")]
    #[case::invigilator("invigilator")]
    #[case::student("student")]
    #[tokio::test]
    async fn it_should_fail_when_a_reference_does_not_resolve(
        #[future] seeded: Seeded,
        #[case] missing: &str,
    ) {
        let seeded = seeded.await;
        let handler = CreateAssignmentHandler::new(seeded.store.clone(), seeded.reference.clone());
        let mut cmd = command(&seeded, &["stu-0001"]);
        match missing {
            "session" => cmd.session_id = "exm-missing".into(),
            "hall" => cmd.hall_id = "hal-missing".into(),
            "invigilator" => cmd.invigilator_id = "tch-missing".into(),
            _ => cmd.student_ids = vec!["stu-missing".into()],
        }
        let result = handler.handle(&seeded.admin, cmd).await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
        assert!(seeded.store.list().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_missing_fields(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let handler = CreateAssignmentHandler::new(seeded.store.clone(), seeded.reference.clone());
        let mut cmd = command(&seeded, &[]);
        let result = handler.handle(&seeded.admin, cmd.clone()).await;
        assert!(matches!(result, Err(ApplicationError::Validation(_))));

        cmd.student_ids = vec!["stu-0001".into()];
        cmd.hall_id = " ".into();
        let result = handler.handle(&seeded.admin, cmd).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "validation failed: hallId is required"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_forbid_teachers(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let handler = CreateAssignmentHandler::new(seeded.store.clone(), seeded.reference.clone());
        let result = handler
            .handle(&seeded.teacher, command(&seeded, &["stu-0001"]))
            .await;
        assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_if_the_store_is_offline(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let mut store = InMemoryAssignmentStore::new();
        store.toggle_offline();
        let handler = CreateAssignmentHandler::new(Arc::new(store), seeded.reference.clone());
        let result = handler
            .handle(&seeded.admin, command(&seeded, &["stu-0001"]))
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Store(StoreError::Backend(_)))
        ));
    }
}
