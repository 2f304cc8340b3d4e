use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;

use crate::model::{Brand, Client, ModelRef, Technician};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands).post(create_brand))
        .route("/models", get(list_models).post(create_model))
        .route("/technicians", get(list_technicians).post(create_technician))
        .route("/clients", get(list_clients).post(create_client))
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientBody {
    name: String,
    tax_id: String,
    #[serde(default)]
    department: String,
}

async fn list_brands(State(svc): State<AppState>) -> Result<Json<Vec<Brand>>, ApiError> {
    ok_json(svc.list_brands())
}

async fn create_brand(
    State(svc): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<Json<Brand>, ApiError> {
    ok_json(svc.create_brand(&body.name))
}

async fn list_models(State(svc): State<AppState>) -> Result<Json<Vec<ModelRef>>, ApiError> {
    ok_json(svc.list_models())
}

async fn create_model(
    State(svc): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<Json<ModelRef>, ApiError> {
    ok_json(svc.create_model(&body.name))
}

async fn list_technicians(
    State(svc): State<AppState>,
) -> Result<Json<Vec<Technician>>, ApiError> {
    ok_json(svc.list_technicians())
}

async fn create_technician(
    State(svc): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<Json<Technician>, ApiError> {
    ok_json(svc.create_technician(&body.name))
}

async fn list_clients(State(svc): State<AppState>) -> Result<Json<Vec<Client>>, ApiError> {
    ok_json(svc.list_clients())
}

async fn create_client(
    State(svc): State<AppState>,
    Json(body): Json<ClientBody>,
) -> Result<Json<Client>, ApiError> {
    ok_json(svc.create_client(Client {
        id: String::new(),
        name: body.name,
        tax_id: body.tax_id,
        department: body.department,
    }))
}
