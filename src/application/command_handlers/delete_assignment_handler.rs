use crate::application::command_handlers::create_assignment_handler::require_admin;
use crate::application::errors::ApplicationError;
use crate::core::assignment::Assignment;
use crate::core::ports::AssignmentRepository;
use crate::core::reference::Actor;
use std::sync::Arc;

pub struct DeleteAssignmentHandler<TStore>
where
    TStore: AssignmentRepository + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> DeleteAssignmentHandler<TStore>
where
    TStore: AssignmentRepository + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn handle(&self, actor: &Actor, id: &str) -> Result<Assignment, ApplicationError> {
        require_admin(actor, "delete exam assignments")?;
        let removed = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("assignment", id))?;
        tracing::info!(assignment_id = %removed.id, "exam assignment deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod delete_assignment_handler_tests {
    use super::*;
    use crate::test_support::fixtures::{Seeded, seeded};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_remove_the_assignment_and_free_its_students(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded.assign(&["stu-0001"]).await;
        let handler = DeleteAssignmentHandler::new(seeded.store.clone());

        let removed = handler.handle(&seeded.admin, &assignment.id).await.unwrap();
        assert_eq!(removed.id, assignment.id);
        assert!(seeded.store.get(&assignment.id).await.unwrap().is_none());
        // the student can be assigned to the exam again
        seeded.assign(&["stu-0001"]).await;
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_for_an_unknown_assignment(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let handler = DeleteAssignmentHandler::new(seeded.store.clone());
        let result = handler.handle(&seeded.admin, "asg-missing").await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_forbid_teachers(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded.assign(&["stu-0001"]).await;
        let handler = DeleteAssignmentHandler::new(seeded.store.clone());
        let result = handler.handle(&seeded.teacher, &assignment.id).await;
        assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
        assert!(seeded.store.get(&assignment.id).await.unwrap().is_some());
    }
}
