use tracing::info;

use gaswork_core::{ServiceError, new_id, now_rfc3339, parse_date};
use gaswork_sql::{SQLError, TxStatement, Value};

use super::WorkshopService;
use crate::model::{CalibrationRecord, EntryStatus, SensorReading, SparePart, WorkshopEntry};

/// One calibration sheet is a single page: 1 to 6 sensor rows.
pub const MAX_CALIBRATION_ROWS: usize = 6;

/// Input for recording a calibration.
#[derive(Debug, Default)]
pub struct CalibrateInput {
    pub calibration_date: String,
    pub technician: String,
    pub calibration_data: Vec<SensorReading>,
    pub spare_parts: Vec<SparePart>,
    pub internal_notes: String,
    /// Label the certificate with the client's department instead of the
    /// company name. A labeling choice only — the catalog client is untouched.
    pub use_department_as_client: bool,
}

impl WorkshopService {
    /// Suggested sensor rows for a new calibration of this serial.
    ///
    /// Identity fields come from the most recent calibration record, falling
    /// back to the catalog's default sensors. Zero/span/bottle are reset to
    /// empty and `approved` to false: pass/fail state is never carried
    /// forward between visits.
    pub fn calibration_defaults(&self, serial: &str) -> Result<Vec<SensorReading>, ServiceError> {
        let last: Vec<CalibrationRecord> = self.query_records(
            "SELECT data FROM calibration_records WHERE serial_number = ?1 \
             ORDER BY calibration_date DESC, create_at DESC LIMIT 1",
            &[Value::Text(serial.to_string())],
        )?;

        if let Some(record) = last.into_iter().next() {
            return Ok(record
                .calibration_data
                .into_iter()
                .map(reset_to_suggestion)
                .collect());
        }

        match self.lookup_catalog(serial) {
            Ok(catalog) => Ok(catalog
                .default_sensors
                .into_iter()
                .map(|d| SensorReading {
                    sensor: d.sensor,
                    pre_alarm: d.pre_alarm,
                    alarm: d.alarm,
                    calibration_value: d.calibration_value,
                    valor_zero: String::new(),
                    valor_span: String::new(),
                    calibration_bottle: String::new(),
                    approved: false,
                })
                .collect()),
            Err(ServiceError::NotFound(_)) => Ok(Vec::new()),
            Err(other) => Err(other),
        }
    }

    /// Record a calibration and move the entry to CALIBRATED_PENDING_DELIVERY.
    ///
    /// The record insert and the status flip commit in one transaction; the
    /// UPDATE is guarded on PENDING_REVIEW so a concurrent transition rolls
    /// everything back. Catalog default_sensors are never touched here.
    pub fn calibrate(
        &self,
        entry_id: &str,
        input: CalibrateInput,
    ) -> Result<CalibrationRecord, ServiceError> {
        parse_date("calibration_date", &input.calibration_date)?;
        if input.technician.trim().is_empty() {
            return Err(ServiceError::Validation("technician is required".into()));
        }
        if input.calibration_data.is_empty() || input.calibration_data.len() > MAX_CALIBRATION_ROWS
        {
            return Err(ServiceError::Validation(format!(
                "calibration_data must have 1 to {} sensor rows, got {}",
                MAX_CALIBRATION_ROWS,
                input.calibration_data.len()
            )));
        }

        let entry: WorkshopEntry = self.get_entry(entry_id)?;
        if entry.status != EntryStatus::PendingReview {
            return Err(ServiceError::InvalidState(format!(
                "entry '{}' (serial '{}') is {}, expected PENDING_REVIEW",
                entry.id,
                entry.serial_number,
                entry.status.as_str()
            )));
        }

        let certificate_client = if input.use_department_as_client {
            if entry.client.department.trim().is_empty() {
                return Err(ServiceError::Validation(format!(
                    "client '{}' has no department to label the certificate with",
                    entry.client.name
                )));
            }
            entry.client.department.clone()
        } else {
            entry.client.name.clone()
        };

        let now = now_rfc3339();
        let record = CalibrationRecord {
            id: new_id(),
            entry_id: entry.id.clone(),
            serial_number: entry.serial_number.clone(),
            brand: entry.brand.clone(),
            model: entry.model.clone(),
            client_name: entry.client.name.clone(),
            certificate_client,
            calibration_date: input.calibration_date,
            technician: input.technician,
            calibration_data: input.calibration_data,
            spare_parts: input.spare_parts,
            internal_notes: input.internal_notes,
            create_at: Some(now.clone()),
        };

        let mut updated = entry.clone();
        updated.status = EntryStatus::CalibratedPendingDelivery;
        updated.technician = Some(record.technician.clone());
        updated.update_at = Some(now.clone());

        let record_json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let entry_json = serde_json::to_string(&updated)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.sql
            .exec_tx(&[
                TxStatement::new(
                    "INSERT INTO calibration_records \
                     (id, data, entry_id, serial_number, calibration_date, client_name, model, create_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    vec![
                        Value::Text(record.id.clone()),
                        Value::Text(record_json),
                        Value::Text(record.entry_id.clone()),
                        Value::Text(record.serial_number.clone()),
                        Value::Text(record.calibration_date.clone()),
                        Value::Text(record.client_name.clone()),
                        Value::Text(record.model.clone()),
                        Value::Text(now.clone()),
                    ],
                ),
                TxStatement::guarded(
                    "UPDATE workshop_entries SET data = ?1, status = ?2, update_at = ?3 \
                     WHERE id = ?4 AND status = 'PENDING_REVIEW'",
                    vec![
                        Value::Text(entry_json),
                        Value::Text(EntryStatus::CalibratedPendingDelivery.as_str().into()),
                        Value::Text(now),
                        Value::Text(entry.id.clone()),
                    ],
                ),
            ])
            .map_err(|e| match e {
                SQLError::TxAborted(_) => ServiceError::InvalidState(format!(
                    "entry '{}' left PENDING_REVIEW concurrently",
                    entry.id
                )),
                other => ServiceError::Storage(other.to_string()),
            })?;

        info!(
            serial = %record.serial_number,
            record_id = %record.id,
            technician = %record.technician,
            "calibration recorded"
        );
        Ok(record)
    }
}

fn reset_to_suggestion(row: SensorReading) -> SensorReading {
    SensorReading {
        sensor: row.sensor,
        pre_alarm: row.pre_alarm,
        alarm: row.alarm,
        calibration_value: row.calibration_value,
        valor_zero: String::new(),
        valor_span: String::new(),
        calibration_bottle: String::new(),
        approved: false,
    }
}
