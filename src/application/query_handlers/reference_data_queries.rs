// Administrator listings of the registered reference records.

use crate::application::command_handlers::create_assignment_handler::require_admin;
use crate::application::errors::ApplicationError;
use crate::core::ports::ReferenceData;
use crate::core::reference::{Actor, ExamSession, Hall, Invigilator, Student, StudentFilter};
use std::sync::Arc;

pub struct ReferenceDataQueries<TReference>
where
    TReference: ReferenceData + 'static,
{
    reference: Arc<TReference>,
}

impl<TReference> ReferenceDataQueries<TReference>
where
    TReference: ReferenceData + 'static,
{
    pub fn new(reference: Arc<TReference>) -> Self {
        Self { reference }
    }

    pub async fn students(&self, actor: &Actor) -> Result<Vec<Student>, ApplicationError> {
        require_admin(actor, "list students")?;
        Ok(self.reference.students(&StudentFilter::default()).await?)
    }

    pub async fn teachers(&self, actor: &Actor) -> Result<Vec<Invigilator>, ApplicationError> {
        require_admin(actor, "list teachers")?;
        Ok(self.reference.invigilators().await?)
    }

    pub async fn halls(&self, actor: &Actor) -> Result<Vec<Hall>, ApplicationError> {
        require_admin(actor, "list halls")?;
        Ok(self.reference.halls().await?)
    }

    pub async fn exams(&self, actor: &Actor) -> Result<Vec<ExamSession>, ApplicationError> {
        require_admin(actor, "list exam sessions")?;
        Ok(self.reference.sessions().await?)
    }
}
