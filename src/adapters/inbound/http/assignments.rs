// Assignment routes: creation, listing, lookup and deletion.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::adapters::inbound::http::auth::AuthenticatedActor;
use crate::adapters::inbound::http::errors::HttpError;
use crate::application::command_handlers::bulk_assignment_handler::CreateBulkAssignments;
use crate::application::command_handlers::create_assignment_handler::CreateAssignment;
use crate::application::query_handlers::assignment_queries::AssignmentFilter;
use crate::core::reference::StudentFilter;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateAssignmentBody {
    pub session_id: String,
    pub hall_id: String,
    pub invigilator_id: String,
    pub student_id: Option<String>,
    pub student_ids: Vec<String>,
}

impl CreateAssignmentBody {
    /// `studentId` is shorthand for a single-student roster.
    fn roster(self) -> Vec<String> {
        let mut roster = self.student_ids;
        if let Some(student_id) = self.student_id {
            roster.insert(0, student_id);
        }
        roster
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBulkBody {
    pub session_id: String,
    pub hall_id: String,
    pub invigilator_id: String,
    pub student_ids: Vec<String>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    body: Result<Json<CreateAssignmentBody>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|e| HttpError::unprocessable(e.body_text()))?;
    let command = CreateAssignment {
        session_id: body.session_id.clone(),
        hall_id: body.hall_id.clone(),
        invigilator_id: body.invigilator_id.clone(),
        student_ids: body.roster(),
        requested_at: Utc::now().timestamp_millis(),
    };
    let view = state.create_handler.handle(&actor, command).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn create_bulk(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    body: Result<Json<CreateBulkBody>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|e| HttpError::unprocessable(e.body_text()))?;
    let command = CreateBulkAssignments {
        session_id: body.session_id,
        hall_id: body.hall_id,
        invigilator_id: body.invigilator_id,
        student_ids: body.student_ids,
        requested_at: Utc::now().timestamp_millis(),
    };
    let report = state.bulk_handler.handle(&actor, command).await?;
    Ok(Json(report))
}

pub async fn list_all(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(filter): Query<AssignmentFilter>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.queries.list_all(&actor, &filter).await?))
}

pub async fn find_by_id(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.queries.find_by_id(&actor, &id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.delete_handler.handle(&actor, &id).await?))
}

pub async fn my_assignments(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(
        state
            .queries
            .find_by_invigilator(&actor, &actor.user_id)
            .await?,
    ))
}

pub async fn all_students(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(
        state
            .queries
            .students(&actor, &StudentFilter::default())
            .await?,
    ))
}

pub async fn filter_students(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(filter): Query<StudentFilter>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.queries.students(&actor, &filter).await?))
}

#[cfg(test)]
mod assignments_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::core::ports::AssignmentRepository;
    use crate::test_support::fixtures::{Seeded, seeded};
    use crate::test_support::http::{ADMIN_TOKEN, TEACHER_TOKEN, test_app};

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn post(path: &str, token: &str, body: impl Into<Body>) -> Request<Body> {
        Request::post(path)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(path: &str, token: &str) -> Request<Body> {
        Request::get(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn create_body(seeded: &Seeded, student_id: &str) -> String {
        json!({
            "sessionId": seeded.session_id,
            "hallId": seeded.hall_id,
            "invigilatorId": seeded.teacher.user_id,
            "studentId": student_id,
        })
        .to_string()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_201_with_the_resolved_assignment(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;

        let (status, json) = send(
            &app,
            post("/api/exam-assignments", ADMIN_TOKEN, create_body(&seeded, "stu-0001")),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["session"]["courseCode"], "CSC301");
        assert_eq!(json["students"][0]["student"]["id"], "stu-0001");
        assert_eq!(json["students"][0]["isPresent"], false);
        assert!(json["encodedPayload"].is_string());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_409_for_a_second_assignment_to_the_same_exam(
        #[future] seeded: Seeded,
    ) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let body = create_body(&seeded, "stu-0001");

        send(&app, post("/api/exam-assignments", ADMIN_TOKEN, body.clone())).await;
        let (status, json) = send(&app, post("/api/exam-assignments", ADMIN_TOKEN, body)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json["message"].as_str().unwrap().contains("stu-0001"));
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some("bogus"), StatusCode::UNAUTHORIZED)]
    #[case(Some(TEACHER_TOKEN), StatusCode::FORBIDDEN)]
    #[tokio::test]
    async fn it_should_guard_creation(
        #[future] seeded: Seeded,
        #[case] token: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let mut request = Request::post("/api/exam-assignments")
            .header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request = request
            .body(Body::from(create_body(&seeded, "stu-0001")))
            .unwrap();

        let (status, _) = send(&app, request).await;
        assert_eq!(status, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_422_on_invalid_json(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let (status, _) = send(&app, post("/api/exam-assignments", ADMIN_TOKEN, "not-json")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_400_when_a_field_is_missing(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let body = json!({ "sessionId": seeded.session_id, "studentId": "stu-0001" }).to_string();
        let (status, json) = send(&app, post("/api/exam-assignments", ADMIN_TOKEN, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "validation failed: hallId is required");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_bulk_results_per_student(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let body = json!({
            "sessionId": seeded.session_id,
            "hallId": seeded.hall_id,
            "invigilatorId": seeded.teacher.user_id,
            "studentIds": ["stu-0001", "stu-unknown", "stu-0002"],
        })
        .to_string();

        let (status, json) = send(&app, post("/api/exam-assignments/bulk", ADMIN_TOKEN, body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"].as_array().unwrap().len(), 2);
        assert_eq!(json["failed"][0]["studentId"], "stu-unknown");
        assert_eq!(json["failed"][0]["reason"], "STUDENT_NOT_FOUND");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fetch_and_delete_an_assignment(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded.assign(&["stu-0001"]).await;
        let app = test_app(&seeded).await;
        let path = format!("/api/exam-assignments/{}", assignment.id);

        let (status, json) = send(&app, get(&path, TEACHER_TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], assignment.id.as_str());

        let delete = |token: &str| {
            Request::delete(path.as_str())
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap()
        };
        let (status, _) = send(&app, delete(TEACHER_TOKEN)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, json) = send(&app, delete(ADMIN_TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], assignment.id.as_str());
        assert_eq!(json["sessionId"], seeded.session_id.as_str());
        assert_eq!(json["students"][0]["studentId"], "stu-0001");
        assert!(seeded.store.get(&assignment.id).await.unwrap().is_none());

        let (status, _) = send(&app, get(&path, TEACHER_TOKEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_list_and_filter(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        seeded.assign(&["stu-0001"]).await;
        seeded
            .assign_in(&seeded.other_session_id, &seeded.hall_id, &["stu-0002"])
            .await;
        let app = test_app(&seeded).await;

        let (status, json) = send(&app, get("/api/exam-assignments/all", ADMIN_TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let path = format!("/api/exam-assignments/all?sessionId={}", seeded.other_session_id);
        let (_, json) = send(&app, get(&path, ADMIN_TOKEN)).await;
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, get("/api/exam-assignments/all", TEACHER_TOKEN)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, json) = send(&app, get("/api/exam-assignments/my-assignments", TEACHER_TOKEN)).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_list_registered_students(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;

        let (status, json) = send(&app, get("/api/exam-assignments/students/all", ADMIN_TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 10);

        let (_, json) = send(
            &app,
            get("/api/exam-assignments/students/filter?search=stu-0007", ADMIN_TOKEN),
        )
        .await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["matricNumber"], "MAT/stu-0007");
    }
}
