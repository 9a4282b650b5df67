use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Extension, Router,
    response::Html,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::inbound::graphql::{AppSchema, build_schema};
use crate::adapters::inbound::http::auth::AuthenticatedActor;
use crate::adapters::inbound::http::errors::HttpError;
use crate::adapters::inbound::http::{admin, assignments, attendance};
use crate::shell::state::AppState;

pub const API_PREFIX: &str = "/api/exam-assignments";
pub const ADMIN_PREFIX: &str = "/api/admin";

pub fn router(state: AppState) -> Router {
    let schema = build_schema(state.clone());
    Router::new()
        .nest(API_PREFIX, api_routes())
        .nest(ADMIN_PREFIX, admin_routes())
        .route("/gql", get(graphiql).post(graphql))
        .layer(Extension(schema))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // admin
        .route("/", post(assignments::create))
        .route("/bulk", post(assignments::create_bulk))
        .route("/all", get(assignments::list_all))
        .route("/students/all", get(assignments::all_students))
        .route("/students/filter", get(assignments::filter_students))
        .route("/stats/global", get(attendance::global_stats))
        // invigilator
        .route("/my-assignments", get(assignments::my_assignments))
        .route("/attendance", post(attendance::mark))
        .route("/scanned-students", get(attendance::scanned_students))
        .route(
            "/scanned-students/exam/{session_id}",
            get(attendance::session_roster),
        )
        .route("/attendance-stats", get(attendance::attendance_stats))
        // any role
        .route(
            "/{id}",
            get(assignments::find_by_id).delete(assignments::delete),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(admin::list_students).post(admin::create_student),
        )
        .route("/teachers", get(admin::list_teachers))
        .route("/halls", get(admin::list_halls).post(admin::create_hall))
        .route("/exams", get(admin::list_exams).post(admin::create_exam))
}

async fn graphql(
    Extension(schema): Extension<AppSchema>,
    actor: Result<AuthenticatedActor, HttpError>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Ok(AuthenticatedActor(actor)) = actor {
        request = request.data(actor);
    }
    schema.execute(request).await.into()
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/gql").finish())
}
