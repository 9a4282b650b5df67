// Admin routes over the reference data: register and list students, halls and exams, list teachers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::adapters::inbound::http::auth::AuthenticatedActor;
use crate::adapters::inbound::http::errors::HttpError;
use crate::application::command_handlers::register_reference_data_handler::{
    CreateExam, CreateHall, CreateStudent,
};
use crate::shell::state::AppState;

pub async fn create_student(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    body: Result<Json<CreateStudent>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|e| HttpError::unprocessable(e.body_text()))?;
    let student = state.register_handler.create_student(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn create_hall(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    body: Result<Json<CreateHall>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|e| HttpError::unprocessable(e.body_text()))?;
    let hall = state.register_handler.create_hall(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(hall)))
}

pub async fn create_exam(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    body: Result<Json<CreateExam>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|e| HttpError::unprocessable(e.body_text()))?;
    let session = state.register_handler.create_exam(&actor, body).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_students(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.reference_queries.students(&actor).await?))
}

pub async fn list_teachers(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.reference_queries.teachers(&actor).await?))
}

pub async fn list_halls(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.reference_queries.halls(&actor).await?))
}

pub async fn list_exams(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.reference_queries.exams(&actor).await?))
}
