use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::model::CalibrationRecord;
use crate::service::history::{HistoryFilters, HistoryHit};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(search_history))
        .route("/history/record/{id}", get(get_record))
        .route("/history/record/{id}/certificate", get(certificate))
        .route("/history/{serial}", get(history))
}

#[derive(Deserialize)]
struct HistoryQuery {
    cliente: Option<String>,
    modelo: Option<String>,
    serial: Option<String>,
}

async fn history(
    State(svc): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<Vec<CalibrationRecord>>, ApiError> {
    ok_json(svc.history(&serial))
}

async fn search_history(
    State(svc): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryHit>>, ApiError> {
    let filters = HistoryFilters {
        cliente: q.cliente,
        modelo: q.modelo,
        serial: q.serial,
    };
    ok_json(svc.search_history(&filters))
}

async fn get_record(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CalibrationRecord>, ApiError> {
    ok_json(svc.get_calibration_record(&id))
}

async fn certificate(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let cert = svc.certificate(&id).map_err(ApiError::from)?;
    Ok(([(header::CONTENT_TYPE, cert.content_type)], cert.bytes).into_response())
}
