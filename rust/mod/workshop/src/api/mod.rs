pub mod catalog;
pub mod entries;
pub mod history;
pub mod reference;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use gaswork_core::ServiceError;

use crate::service::WorkshopService;

/// Shared application state.
pub type AppState = Arc<WorkshopService>;

/// Build the workshop API router. The binary nests this under the module
/// name, so the full prefix is `/workshop/v1`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::routes())
        .merge(entries::routes())
        .merge(history::routes())
        .merge(reference::routes())
}

/// Standard API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let code = err.status_code().as_u16();
        ApiError {
            code,
            message: err.to_string(),
        }
    }
}

/// Wrap a Result<T, ServiceError> into an API response.
pub(crate) fn ok_json<T: Serialize>(result: Result<T, ServiceError>) -> Result<Json<T>, ApiError> {
    result.map(Json).map_err(ApiError::from)
}
