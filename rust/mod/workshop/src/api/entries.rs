use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;

use crate::model::{CalibrationRecord, ClientRef, SensorReading, SparePart, WorkshopEntry};
use crate::service::calibration::CalibrateInput;
use crate::service::delivery::DeliveryInput;
use crate::service::history::{DeliveredReport, EntryWithCalibration};
use crate::service::intake::IntakeInput;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries", post(intake))
        .route("/entries/pending", get(pending_review))
        .route("/entries/calibrated", get(calibrated_pending_delivery))
        .route("/entries/delivered", get(delivered))
        .route("/entries/deliver", post(deliver))
        .route("/entries/serial/{serial}", get(open_entry))
        .route("/entries/{id}", get(get_entry))
        .route("/entries/{id}/defaults", get(calibration_defaults))
        .route("/entries/{id}/calibrate", post(calibrate))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntakeBody {
    serial_number: String,
    entry_date: String,
    #[serde(default)]
    observations: String,
    brand: Option<String>,
    model: Option<String>,
    client: Option<ClientRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalibrateBody {
    calibration_date: String,
    technician: String,
    calibration_data: Vec<SensorReading>,
    #[serde(default)]
    spare_parts: Vec<SparePart>,
    #[serde(default)]
    internal_notes: String,
    #[serde(default)]
    use_department_as_client: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliverBody {
    serial_numbers: Vec<String>,
    delivery_note: String,
    delivery_location: String,
    delivery_date: String,
}

async fn intake(
    State(svc): State<AppState>,
    Json(body): Json<IntakeBody>,
) -> Result<Json<WorkshopEntry>, ApiError> {
    ok_json(svc.intake(IntakeInput {
        serial_number: body.serial_number,
        entry_date: body.entry_date,
        observations: body.observations,
        brand: body.brand,
        model: body.model,
        client: body.client,
    }))
}

async fn get_entry(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkshopEntry>, ApiError> {
    ok_json(svc.get_entry(&id))
}

async fn open_entry(
    State(svc): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<WorkshopEntry>, ApiError> {
    ok_json(svc.open_entry(&serial))
}

async fn calibration_defaults(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SensorReading>>, ApiError> {
    let entry = svc.get_entry(&id).map_err(ApiError::from)?;
    ok_json(svc.calibration_defaults(&entry.serial_number))
}

async fn calibrate(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CalibrateBody>,
) -> Result<Json<CalibrationRecord>, ApiError> {
    ok_json(svc.calibrate(&id, CalibrateInput {
        calibration_date: body.calibration_date,
        technician: body.technician,
        calibration_data: body.calibration_data,
        spare_parts: body.spare_parts,
        internal_notes: body.internal_notes,
        use_department_as_client: body.use_department_as_client,
    }))
}

async fn deliver(
    State(svc): State<AppState>,
    Json(body): Json<DeliverBody>,
) -> Result<Json<Vec<WorkshopEntry>>, ApiError> {
    ok_json(svc.deliver(DeliveryInput {
        serial_numbers: body.serial_numbers,
        delivery_note: body.delivery_note,
        delivery_location: body.delivery_location,
        delivery_date: body.delivery_date,
    }))
}

async fn pending_review(
    State(svc): State<AppState>,
) -> Result<Json<Vec<WorkshopEntry>>, ApiError> {
    ok_json(svc.pending_review())
}

async fn calibrated_pending_delivery(
    State(svc): State<AppState>,
) -> Result<Json<Vec<EntryWithCalibration>>, ApiError> {
    ok_json(svc.calibrated_pending_delivery())
}

async fn delivered(
    State(svc): State<AppState>,
) -> Result<Json<DeliveredReport>, ApiError> {
    ok_json(svc.delivered())
}
