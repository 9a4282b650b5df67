// Attendance statistics derived from the assignment store on every call.

use crate::application::command_handlers::create_assignment_handler::require_admin;
use crate::application::errors::ApplicationError;
use crate::core::assignment::Assignment;
use crate::core::attendance::AttendanceTally;
use crate::core::ports::{AssignmentRepository, ReferenceData};
use crate::core::reference::{Actor, Student};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total_assignments: usize,
    pub total_students: usize,
    pub total_present: usize,
    pub total_absent: usize,
    pub attendance_rate: String,
}

impl From<AttendanceTally> for AttendanceSummary {
    fn from(tally: AttendanceTally) -> Self {
        Self {
            total_assignments: tally.assignments,
            total_students: tally.assigned,
            total_present: tally.present,
            total_absent: tally.absent(),
            attendance_rate: tally.rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttendance {
    pub session_id: String,
    pub course_code: Option<String>,
    pub course_title: Option<String>,
    pub assigned: usize,
    pub present: usize,
    pub attendance_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBreakdown {
    pub overall: AttendanceSummary,
    pub sessions: Vec<SessionAttendance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterLine {
    pub assignment_id: String,
    pub hall_id: String,
    pub student_id: String,
    /// `None` when the student no longer resolves in the reference data.
    pub student: Option<Student>,
    pub is_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRoster {
    pub session_id: String,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub students: Vec<RosterLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedStudent {
    pub assignment_id: String,
    pub session_id: String,
    pub hall_id: String,
    pub student_id: String,
    pub student: Option<Student>,
}

pub struct AttendanceReports<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    store: Arc<TStore>,
    reference: Arc<TReference>,
}

impl<TStore, TReference> AttendanceReports<TStore, TReference>
where
    TStore: AssignmentRepository + 'static,
    TReference: ReferenceData + 'static,
{
    pub fn new(store: Arc<TStore>, reference: Arc<TReference>) -> Self {
        Self { store, reference }
    }

    pub async fn summary(
        &self,
        actor: &Actor,
        invigilator_id: &str,
    ) -> Result<AttendanceSummary, ApplicationError> {
        let assignments = self.invigilator_assignments(actor, invigilator_id).await?;
        Ok(assignments.iter().collect::<AttendanceTally>().into())
    }

    pub async fn global_summary(&self, actor: &Actor) -> Result<AttendanceSummary, ApplicationError> {
        require_admin(actor, "view global attendance")?;
        let assignments = self.store.list().await?;
        Ok(assignments.iter().collect::<AttendanceTally>().into())
    }

    /// Groups the invigilator's assignments by exam session, in order of first appearance.
    pub async fn breakdown(
        &self,
        actor: &Actor,
        invigilator_id: &str,
    ) -> Result<SessionBreakdown, ApplicationError> {
        let assignments = self.invigilator_assignments(actor, invigilator_id).await?;

        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, AttendanceTally> = HashMap::new();
        for assignment in &assignments {
            let tally = groups
                .entry(assignment.session_id.as_str())
                .or_insert_with(|| {
                    order.push(assignment.session_id.as_str());
                    AttendanceTally::default()
                });
            tally.add(assignment);
        }

        let mut sessions = Vec::with_capacity(order.len());
        for session_id in order {
            let tally = groups[session_id];
            let session = self.reference.session(session_id).await?;
            sessions.push(SessionAttendance {
                session_id: session_id.to_string(),
                course_code: session.as_ref().map(|s| s.course_code.clone()),
                course_title: session.map(|s| s.course_title),
                assigned: tally.assigned,
                present: tally.present,
                attendance_rate: tally.rate(),
            });
        }

        Ok(SessionBreakdown {
            overall: assignments.iter().collect::<AttendanceTally>().into(),
            sessions,
        })
    }

    pub async fn session_roster(
        &self,
        actor: &Actor,
        invigilator_id: &str,
        session_id: &str,
    ) -> Result<SessionRoster, ApplicationError> {
        let assignments = self.invigilator_assignments(actor, invigilator_id).await?;

        let mut students = Vec::new();
        for assignment in assignments.iter().filter(|a| a.session_id == session_id) {
            for entry in assignment.students() {
                students.push(RosterLine {
                    assignment_id: assignment.id.clone(),
                    hall_id: assignment.hall_id.clone(),
                    student_id: entry.student_id.clone(),
                    student: self.reference.student(&entry.student_id).await?,
                    is_present: entry.is_present,
                });
            }
        }
        let present = students.iter().filter(|line| line.is_present).count();
        Ok(SessionRoster {
            session_id: session_id.to_string(),
            total: students.len(),
            present,
            absent: students.len() - present,
            students,
        })
    }

    pub async fn scanned_students(
        &self,
        actor: &Actor,
        invigilator_id: &str,
    ) -> Result<Vec<ScannedStudent>, ApplicationError> {
        let assignments = self.invigilator_assignments(actor, invigilator_id).await?;

        let mut scanned = Vec::new();
        for assignment in &assignments {
            for entry in assignment.students().iter().filter(|e| e.is_present) {
                scanned.push(ScannedStudent {
                    assignment_id: assignment.id.clone(),
                    session_id: assignment.session_id.clone(),
                    hall_id: assignment.hall_id.clone(),
                    student_id: entry.student_id.clone(),
                    student: self.reference.student(&entry.student_id).await?,
                });
            }
        }
        Ok(scanned)
    }

    async fn invigilator_assignments(
        &self,
        actor: &Actor,
        invigilator_id: &str,
    ) -> Result<Vec<Assignment>, ApplicationError> {
        if !actor.may_act_for(invigilator_id) {
            return Err(ApplicationError::Forbidden(
                "you may only view your own attendance".into(),
            ));
        }
        Ok(self.store.list_by_invigilator(invigilator_id).await?)
    }
}
