// Attendance routes: scanning and the invigilator and admin reports.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::inbound::http::auth::AuthenticatedActor;
use crate::adapters::inbound::http::errors::HttpError;
use crate::application::errors::ApplicationError;
use crate::application::query_handlers::attendance_reports::{AttendanceSummary, SessionBreakdown};
use crate::core::payload::{self, ScanPayload};
use crate::shell::state::AppState;

/// A scan arrives either as the decoded object (`qrData`) or as the raw payload text.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkAttendanceBody {
    pub qr_data: Option<Value>,
    pub payload: Option<String>,
}

impl MarkAttendanceBody {
    fn into_scan(self) -> Result<ScanPayload, ApplicationError> {
        match (self.qr_data, self.payload) {
            (Some(Value::String(text)), _) | (None, Some(text)) => Ok(payload::decode(&text)?),
            (Some(value), _) => Ok(payload::decode_value(value)?),
            (None, None) => Err(ApplicationError::InvalidPayload(
                "qrData or payload is required".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStatsResponse {
    pub summary: AttendanceSummary,
    pub breakdown: SessionBreakdown,
}

pub async fn mark(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    body: Result<Json<MarkAttendanceBody>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|e| HttpError::unprocessable(e.body_text()))?;
    let scan = body.into_scan()?;
    Ok(Json(state.mark_handler.handle(&actor, &scan).await?))
}

pub async fn scanned_students(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(
        state
            .reports
            .scanned_students(&actor, &actor.user_id)
            .await?,
    ))
}

pub async fn session_roster(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(
        state
            .reports
            .session_roster(&actor, &actor.user_id, &session_id)
            .await?,
    ))
}

pub async fn attendance_stats(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    let breakdown = state.reports.breakdown(&actor, &actor.user_id).await?;
    Ok(Json(AttendanceStatsResponse {
        summary: breakdown.overall.clone(),
        breakdown,
    }))
}

pub async fn global_stats(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.reports.global_summary(&actor).await?))
}

#[cfg(test)]
mod attendance_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::test_support::fixtures::{Seeded, seeded};
    use crate::test_support::http::{ADMIN_TOKEN, OTHER_TEACHER_TOKEN, TEACHER_TOKEN, test_app};

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn scan(token: &str, body: Value) -> Request<Body> {
        Request::post("/api/exam-assignments/attendance")
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(path: &str, token: &str) -> Request<Body> {
        Request::get(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_mark_attendance_from_a_decoded_payload(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded.assign(&["stu-0001", "stu-0002"]).await;
        let qr_data: Value =
            serde_json::from_str(assignment.encoded_payload.as_deref().unwrap()).unwrap();
        let app = test_app(&seeded).await;

        let (status, json) = send(&app, scan(TEACHER_TOKEN, json!({ "qrData": qr_data }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["markedCount"], 2);
        assert_eq!(json["markedStudentIds"], json!(["stu-0001", "stu-0002"]));

        let (_, json) = send(&app, scan(TEACHER_TOKEN, json!({ "qrData": qr_data }))).await;
        assert_eq!(json["markedCount"], 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_mark_attendance_from_raw_payload_text(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded.assign(&["stu-0001"]).await;
        let app = test_app(&seeded).await;

        let body = json!({ "payload": assignment.encoded_payload });
        let (status, json) = send(&app, scan(TEACHER_TOKEN, body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["markedCount"], 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_403_for_another_invigilator(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded.assign(&["stu-0001"]).await;
        let app = test_app(&seeded).await;

        let body = json!({ "payload": assignment.encoded_payload });
        let (status, _) = send(&app, scan(OTHER_TEACHER_TOKEN, body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "payload": "not-json" }))]
    #[case(json!({ "qrData": { "assignmentId": "asg-1", "students": [] } }))]
    #[tokio::test]
    async fn it_should_return_400_for_an_unusable_payload(
        #[future] seeded: Seeded,
        #[case] body: Value,
    ) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let (status, _) = send(&app, scan(TEACHER_TOKEN, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_404_for_an_unknown_assignment(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let app = test_app(&seeded).await;
        let body = json!({ "qrData": {
            "assignmentId": "asg-missing",
            "exam": { "id": seeded.session_id },
            "hall": { "id": seeded.hall_id },
            "students": [{ "id": "stu-0001" }],
        }});
        let (status, _) = send(&app, scan(TEACHER_TOKEN, body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_serve_the_attendance_reports(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let assignment = seeded
            .assign(&[
                "stu-0001", "stu-0002", "stu-0003", "stu-0004", "stu-0005", "stu-0006",
                "stu-0007", "stu-0008", "stu-0009", "stu-0010",
            ])
            .await;
        seeded
            .mark(&assignment.id, &["stu-0001", "stu-0002", "stu-0003", "stu-0004"])
            .await;
        let app = test_app(&seeded).await;

        let (status, json) = send(&app, get("/api/exam-assignments/attendance-stats", TEACHER_TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["attendanceRate"], "40.00%");
        assert_eq!(json["breakdown"]["sessions"][0]["sessionId"], seeded.session_id.as_str());

        let (_, json) = send(&app, get("/api/exam-assignments/scanned-students", TEACHER_TOKEN)).await;
        assert_eq!(json.as_array().unwrap().len(), 4);

        let path = format!("/api/exam-assignments/scanned-students/exam/{}", seeded.session_id);
        let (_, json) = send(&app, get(&path, TEACHER_TOKEN)).await;
        assert_eq!(json["total"], 10);
        assert_eq!(json["absent"], 6);

        let (status, _) = send(&app, get("/api/exam-assignments/stats/global", TEACHER_TOKEN)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, json) = send(&app, get("/api/exam-assignments/stats/global", ADMIN_TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalPresent"], 4);
    }
}
