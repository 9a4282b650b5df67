// Administrator registration of students, halls and exam sessions.
//
// Responsibilities
// - Validate required fields and hand the new record to the registry.
// - Uniqueness (hall name, matric number, email) is enforced by the registry and surfaces
//   as `ApplicationError::AlreadyExists`.

use crate::application::command_handlers::create_assignment_handler::{require_admin, require_field};
use crate::application::errors::ApplicationError;
use crate::core::ports::ReferenceRegistry;
use crate::core::reference::{Actor, ExamSession, Hall, Student};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateStudent {
    pub name: String,
    pub matric_number: String,
    pub department: String,
    pub email: String,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateHall {
    pub name: String,
    pub location: Option<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateExam {
    pub course_code: String,
    pub course_title: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration: String,
}

pub struct RegisterReferenceDataHandler<TRegistry>
where
    TRegistry: ReferenceRegistry + 'static,
{
    registry: Arc<TRegistry>,
}

impl<TRegistry> RegisterReferenceDataHandler<TRegistry>
where
    TRegistry: ReferenceRegistry + 'static,
{
    pub fn new(registry: Arc<TRegistry>) -> Self {
        Self { registry }
    }

    #[tracing::instrument(skip(self, actor, command), fields(actor = %actor.user_id))]
    pub async fn create_student(
        &self,
        actor: &Actor,
        command: CreateStudent,
    ) -> Result<Student, ApplicationError> {
        require_admin(actor, "register students")?;
        require_field("name", &command.name)?;
        require_field("matricNumber", &command.matric_number)?;
        require_field("department", &command.department)?;
        require_field("email", &command.email)?;

        let student = Student {
            id: Uuid::now_v7().to_string(),
            name: command.name.trim().to_string(),
            matric_number: command.matric_number.trim().to_string(),
            department: command.department.trim().to_string(),
            email: command.email.trim().to_lowercase(),
            level: command.level.filter(|l| !l.trim().is_empty()),
        };
        self.registry.add_student(student.clone()).await?;
        tracing::info!(student_id = %student.id, "student registered");
        Ok(student)
    }

    #[tracing::instrument(skip(self, actor, command), fields(actor = %actor.user_id))]
    pub async fn create_hall(
        &self,
        actor: &Actor,
        command: CreateHall,
    ) -> Result<Hall, ApplicationError> {
        require_admin(actor, "register halls")?;
        require_field("name", &command.name)?;

        let hall = Hall {
            id: Uuid::now_v7().to_string(),
            name: command.name.trim().to_string(),
            location: command.location.filter(|l| !l.trim().is_empty()),
            capacity: command.capacity,
        };
        self.registry.add_hall(hall.clone()).await?;
        tracing::info!(hall_id = %hall.id, "hall registered");
        Ok(hall)
    }

    #[tracing::instrument(skip(self, actor, command), fields(actor = %actor.user_id))]
    pub async fn create_exam(
        &self,
        actor: &Actor,
        command: CreateExam,
    ) -> Result<ExamSession, ApplicationError> {
        require_admin(actor, "register exam sessions")?;
        require_field("courseCode", &command.course_code)?;
        require_field("courseTitle", &command.course_title)?;
        require_field("duration", &command.duration)?;
        let date = command
            .date
            .ok_or_else(|| ApplicationError::Validation("date is required".into()))?;

        let session = ExamSession {
            id: Uuid::now_v7().to_string(),
            course_code: command.course_code.trim().to_string(),
            course_title: command.course_title.trim().to_string(),
            date,
            start_time: command.start_time,
            end_time: command.end_time,
            duration: command.duration.trim().to_string(),
        };
        self.registry.add_session(session.clone()).await?;
        tracing::info!(session_id = %session.id, "exam session registered");
        Ok(session)
    }
}
