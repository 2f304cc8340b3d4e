use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use gaswork_core::{ListParams, ListResult};

use crate::model::{ClientRef, MasterCatalogEntry, SensorDefault};
use crate::service::catalog::{CatalogFilters, RegisterCatalogInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(list_catalog).post(register_catalog))
        .route("/catalog/search", get(search_catalog))
        .route(
            "/catalog/{serial}",
            get(lookup_catalog).patch(update_catalog).delete(delete_catalog),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    serial_number: String,
    brand: String,
    model: String,
    current_client: Option<ClientRef>,
    #[serde(default)]
    default_sensors: Vec<SensorDefault>,
    #[serde(default)]
    general_observations: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    serial: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    client: Option<String>,
}

async fn register_catalog(
    State(svc): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<MasterCatalogEntry>, ApiError> {
    ok_json(svc.register_catalog(RegisterCatalogInput {
        serial_number: body.serial_number,
        brand: body.brand,
        model: body.model,
        current_client: body.current_client,
        default_sensors: body.default_sensors,
        general_observations: body.general_observations,
    }))
}

async fn list_catalog(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<MasterCatalogEntry>>, ApiError> {
    ok_json(svc.list_catalog(&params))
}

async fn lookup_catalog(
    State(svc): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<MasterCatalogEntry>, ApiError> {
    ok_json(svc.lookup_catalog(&serial))
}

async fn search_catalog(
    State(svc): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<MasterCatalogEntry>>, ApiError> {
    let filters = CatalogFilters {
        serial: q.serial,
        brand: q.brand,
        model: q.model,
        client: q.client,
    };
    ok_json(svc.search_catalog(&filters))
}

async fn update_catalog(
    State(svc): State<AppState>,
    Path(serial): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<MasterCatalogEntry>, ApiError> {
    ok_json(svc.update_catalog(&serial, patch))
}

async fn delete_catalog(
    State(svc): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_catalog(&serial).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
