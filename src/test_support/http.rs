// Application state and router over the seeded stores, with one bearer token per seeded actor.

use crate::adapters::in_memory::in_memory_identity::InMemoryIdentityProvider;
use crate::shell::config::AppConfig;
use crate::shell::http::router;
use crate::shell::state::AppState;
use crate::test_support::fixtures::Seeded;
use axum::Router;
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const TEACHER_TOKEN: &str = "teacher-token";
pub const OTHER_TEACHER_TOKEN: &str = "other-teacher-token";

pub async fn test_state(seeded: &Seeded) -> AppState {
    let identity = InMemoryIdentityProvider::new();
    identity.register(ADMIN_TOKEN, seeded.admin.clone()).await;
    identity.register(TEACHER_TOKEN, seeded.teacher.clone()).await;
    identity
        .register(OTHER_TEACHER_TOKEN, seeded.other_teacher.clone())
        .await;
    AppState::in_memory(
        seeded.store.clone(),
        seeded.reference.clone(),
        Arc::new(identity),
        &AppConfig::default(),
    )
}

pub async fn test_app(seeded: &Seeded) -> Router {
    router(test_state(seeded).await)
}
