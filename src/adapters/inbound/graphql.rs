use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Result as GqlResult, Schema, SimpleObject};

use crate::application::query_handlers::attendance_reports::{AttendanceSummary, SessionAttendance};
use crate::application::views::AssignmentView;
use crate::core::reference::Actor;
use crate::shell::state::AppState;

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(state: AppState) -> AppSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(state)
        .finish()
}

#[derive(SimpleObject, Clone)]
pub struct GqlRosterEntry {
    pub student_id: String,
    pub name: String,
    pub matric_number: String,
    pub is_present: bool,
}

#[derive(SimpleObject, Clone)]
pub struct GqlAssignment {
    pub id: String,
    pub session_id: String,
    pub course_code: String,
    pub course_title: String,
    pub hall_id: String,
    pub hall_name: String,
    pub invigilator_id: String,
    pub invigilator_name: String,
    pub students: Vec<GqlRosterEntry>,
    pub encoded_payload: Option<String>,
    pub created_at: i64,
}

impl From<AssignmentView> for GqlAssignment {
    fn from(v: AssignmentView) -> Self {
        Self {
            id: v.id,
            session_id: v.session.id,
            course_code: v.session.course_code,
            course_title: v.session.course_title,
            hall_id: v.hall.id,
            hall_name: v.hall.name,
            invigilator_id: v.invigilator.id,
            invigilator_name: v.invigilator.name,
            students: v
                .students
                .into_iter()
                .map(|entry| GqlRosterEntry {
                    student_id: entry.student.id,
                    name: entry.student.name,
                    matric_number: entry.student.matric_number,
                    is_present: entry.is_present,
                })
                .collect(),
            encoded_payload: v.encoded_payload,
            created_at: v.created_at,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlSessionAttendance {
    pub session_id: String,
    pub course_code: Option<String>,
    pub assigned: u64,
    pub present: u64,
    pub attendance_rate: String,
}

impl From<SessionAttendance> for GqlSessionAttendance {
    fn from(v: SessionAttendance) -> Self {
        Self {
            session_id: v.session_id,
            course_code: v.course_code,
            assigned: v.assigned as u64,
            present: v.present as u64,
            attendance_rate: v.attendance_rate,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlAttendanceStats {
    pub total_assignments: u64,
    pub total_students: u64,
    pub total_present: u64,
    pub total_absent: u64,
    pub attendance_rate: String,
    pub sessions: Vec<GqlSessionAttendance>,
}

impl GqlAttendanceStats {
    fn new(summary: AttendanceSummary, sessions: Vec<SessionAttendance>) -> Self {
        Self {
            total_assignments: summary.total_assignments as u64,
            total_students: summary.total_students as u64,
            total_present: summary.total_present as u64,
            total_absent: summary.total_absent as u64,
            attendance_rate: summary.attendance_rate,
            sessions: sessions.into_iter().map(Into::into).collect(),
        }
    }
}

fn actor<'a>(context: &'a Context<'_>) -> GqlResult<&'a Actor> {
    context
        .data_opt::<Actor>()
        .ok_or_else(|| "missing or unknown bearer token".into())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn assignment(&self, context: &Context<'_>, id: String) -> GqlResult<GqlAssignment> {
        let state = context.data_unchecked::<AppState>();
        let view = state.queries.find_by_id(actor(context)?, &id).await?;
        Ok(view.into())
    }

    async fn my_assignments(&self, context: &Context<'_>) -> GqlResult<Vec<GqlAssignment>> {
        let state = context.data_unchecked::<AppState>();
        let actor = actor(context)?;
        let views = state
            .queries
            .find_by_invigilator(actor, &actor.user_id)
            .await?;
        Ok(views.into_iter().map(Into::into).collect())
    }

    async fn attendance_stats(&self, context: &Context<'_>) -> GqlResult<GqlAttendanceStats> {
        let state = context.data_unchecked::<AppState>();
        let actor = actor(context)?;
        let breakdown = state.reports.breakdown(actor, &actor.user_id).await?;
        Ok(GqlAttendanceStats::new(breakdown.overall, breakdown.sessions))
    }
}
