// Read access to assignments and to the registered students they draw on.
//
// Purpose
// - Resolve assignments into views for administrators and invigilators.
// - Collapse an invigilator's duty list to one entry per (exam session, hall).

use crate::application::command_handlers::create_assignment_handler::require_admin;
use crate::application::errors::ApplicationError;
use crate::application::views::{AssignmentView, resolve_view};
use crate::core::assignment::Assignment;
use crate::core::ports::{AssignmentRepository, ReferenceData};
use crate::core::reference::{Actor, Student, StudentFilter, student_matches_text};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFilter {
    pub invigilator_id: Option<String>,
    pub session_id: Option<String>,
    /// Case-insensitive substring over roster students' name, matric number and email.
    pub search: Option<String>,
}

/// Keeps the first assignment seen for every (session, hall) pair.
pub fn distinct_by_session_and_hall(assignments: Vec<Assignment>) -> Vec<Assignment> {
    let mut seen = HashSet::new();
    assignments
        .into_iter()
        .filter(|a| seen.insert((a.session_id.clone(), a.hall_id.clone())))
        .collect()
}

pub struct AssignmentQueries<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    store: Arc<TStore>,
    reference: Arc<TReference>,
}

impl<TStore, TReference> AssignmentQueries<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    pub fn new(store: Arc<TStore>, reference: Arc<TReference>) -> Self {
        Self { store, reference }
    }

    pub async fn find_by_id(
        &self,
        _actor: &Actor,
        id: &str,
    ) -> Result<AssignmentView, ApplicationError> {
        let assignment = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("assignment", id))?;
        resolve_view(&*self.reference, assignment).await
    }

    pub async fn find_by_invigilator(
        &self,
        actor: &Actor,
        invigilator_id: &str,
    ) -> Result<Vec<AssignmentView>, ApplicationError> {
        if !actor.may_act_for(invigilator_id) {
            return Err(ApplicationError::Forbidden(
                "you may only list your own assignments".into(),
            ));
        }
        let assignments = self.store.list_by_invigilator(invigilator_id).await?;
        self.resolve_all(distinct_by_session_and_hall(assignments))
            .await
    }

    pub async fn list_all(
        &self,
        actor: &Actor,
        filter: &AssignmentFilter,
    ) -> Result<Vec<AssignmentView>, ApplicationError> {
        require_admin(actor, "list all exam assignments")?;
        let assignments = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|a| {
                filter
                    .invigilator_id
                    .as_deref()
                    .is_none_or(|id| a.invigilator_id == id)
            })
            .filter(|a| {
                filter
                    .session_id
                    .as_deref()
                    .is_none_or(|id| a.session_id == id)
            })
            .collect();
        let views = self.resolve_all(assignments).await?;

        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        Ok(match needle {
            Some(needle) => views
                .into_iter()
                .filter(|view| {
                    view.students
                        .iter()
                        .any(|entry| student_matches_text(&entry.student, needle))
                })
                .collect(),
            None => views,
        })
    }

    pub async fn students(
        &self,
        actor: &Actor,
        filter: &StudentFilter,
    ) -> Result<Vec<Student>, ApplicationError> {
        require_admin(actor, "list registered students")?;
        Ok(self.reference.students(filter).await?)
    }

    async fn resolve_all(
        &self,
        assignments: Vec<Assignment>,
    ) -> Result<Vec<AssignmentView>, ApplicationError> {
        let mut views = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            views.push(resolve_view(&*self.reference, assignment).await?);
        }
        Ok(views)
    }
}
