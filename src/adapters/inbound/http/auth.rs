// Resolves the acting identity from an `Authorization: Bearer <token>` header.

use crate::adapters::inbound::http::errors::HttpError;
use crate::core::reference::Actor;
use crate::shell::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

#[derive(Debug, Clone)]
pub struct AuthenticatedActor(pub Actor);

impl FromRequestParts<AppState> for AuthenticatedActor {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| HttpError::unauthorized("missing bearer token"))?;

        match state.identity.resolve(token).await {
            Ok(Some(actor)) => Ok(Self(actor)),
            Ok(None) => Err(HttpError::unauthorized("unknown bearer token")),
            Err(e) => {
                tracing::error!(error = %e, "identity provider failed");
                Err(HttpError::unauthorized("identity could not be resolved"))
            }
        }
    }
}
