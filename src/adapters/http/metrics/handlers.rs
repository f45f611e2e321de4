//! HTTP handlers for metrics endpoints.
//!
//! These handlers connect Axum routes to application layer handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Json, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::application::handlers::{
    GetMetricsHandler, GetMetricsQuery, InitMetricsCommand, InitMetricsHandler,
};
use crate::domain::foundation::{DomainError, UserId, ValidationError};
use crate::domain::metrics::MetricsError;

use super::dto::{ErrorResponse, HealthResponse, MetricsInitializedResponse, TrendView};

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

/// Metrics API error that implements IntoResponse.
#[derive(Debug)]
pub enum MetricsApiError {
    BadRequest(ValidationError),
    Metrics(MetricsError),
}

impl MetricsApiError {
    fn status(&self) -> StatusCode {
        match self {
            MetricsApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MetricsApiError::Metrics(err) => match err {
                MetricsError::UserNotFound(_) => StatusCode::NOT_FOUND,
                MetricsError::Forbidden { .. } => StatusCode::FORBIDDEN,
                MetricsError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                MetricsError::DataFormat(_) | MetricsError::UnrecognizedEvent { .. } | MetricsError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for MetricsApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            MetricsApiError::BadRequest(err) => ErrorResponse::from(DomainError::from(err)),
            MetricsApiError::Metrics(err) => {
                if status.is_server_error() {
                    error!(status = status.as_u16(), error = %err, "Metrics request failed");
                }
                ErrorResponse::from(DomainError::from(err))
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<MetricsError> for MetricsApiError {
    fn from(err: MetricsError) -> Self {
        MetricsApiError::Metrics(err)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing metrics handlers.
#[derive(Clone)]
pub struct MetricsAppState {
    pub get_metrics: Arc<GetMetricsHandler>,
    pub init_metrics: Arc<InitMetricsHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Header carrying the caller identity.
pub const USER_HEADER: &str = "user";
/// Accepted alternative to [`USER_HEADER`].
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user context extracted from request headers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::unauthorized("Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = [USER_HEADER, USER_ID_HEADER]
            .iter()
            .filter_map(|name| parts.headers.get(*name))
            .filter_map(|value| value.to_str().ok())
            .find_map(|s| UserId::new(s).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /metrics
///
/// Returns the caller's trend view.
pub async fn get_metrics(
    State(state): State<MetricsAppState>,
    user: AuthenticatedUser,
) -> Result<Json<TrendView>, MetricsApiError> {
    let view = state
        .get_metrics
        .handle(GetMetricsQuery { user_id: user.user_id })
        .await?;
    Ok(Json(view))
}

/// POST /metrics/:user_id
///
/// Creates an empty aggregate for `user_id`. Only the user may do this.
pub async fn init_metrics(
    State(state): State<MetricsAppState>,
    Path(user_id): Path<String>,
    user: AuthenticatedUser,
) -> Result<Json<MetricsInitializedResponse>, MetricsApiError> {
    let user_id = UserId::new(user_id).map_err(MetricsApiError::BadRequest)?;

    let saved = state
        .init_metrics
        .handle(InitMetricsCommand {
            caller: user.user_id,
            user_id,
        })
        .await?;

    Ok(Json(MetricsInitializedResponse {
        user_id: saved.user_id.to_string(),
        message: "Metrics initialized".to_string(),
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: MetricsError) -> StatusCode {
        MetricsApiError::from(err).status()
    }

    #[test]
    fn error_statuses_follow_taxonomy() {
        let alice = UserId::new("alice").unwrap();
        assert_eq!(status_of(MetricsError::UserNotFound(alice.clone())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(MetricsError::Forbidden {
                caller: alice.clone(),
                target: UserId::new("bob").unwrap()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(MetricsError::Unavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(MetricsError::store("down")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(MetricsError::data_format("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_of(MetricsError::UnrecognizedEvent {
                stream: "goal".into(),
                event_type: "X".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_is_400() {
        assert_eq!(MetricsApiError::BadRequest(ValidationError::empty_field("user_id")).status(), StatusCode::BAD_REQUEST);
    }
}
