use tracing::info;

use gaswork_core::{ServiceError, new_id, now_rfc3339, parse_date};
use gaswork_sql::{TxStatement, Value};

use super::WorkshopService;
use super::catalog::client_name_value;
use crate::model::{ClientRef, EntryStatus, MasterCatalogEntry, WorkshopEntry};

/// Input for equipment intake.
///
/// For a serial already in the master catalog, brand/model/client default
/// from the catalog; supplied values override the snapshot only and are not
/// written back. For an unknown serial all three are required — intake is
/// the one place that creates a catalog record implicitly.
#[derive(Debug, Default)]
pub struct IntakeInput {
    pub serial_number: String,
    pub entry_date: String,
    pub observations: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub client: Option<ClientRef>,
}

impl WorkshopService {
    /// Register one physical visit of a serial number, creating the
    /// workshop entry in PENDING_REVIEW.
    pub fn intake(&self, input: IntakeInput) -> Result<WorkshopEntry, ServiceError> {
        if input.serial_number.trim().is_empty() {
            return Err(ServiceError::Validation("serial_number is required".into()));
        }
        parse_date("entry_date", &input.entry_date)?;

        // Friendly pre-check; the partial unique index is the authoritative
        // guard inside the transaction below.
        if self.open_entry(&input.serial_number).is_ok() {
            return Err(already_in_workshop(&input.serial_number));
        }

        let (brand, model, client, catalog_insert) = match self.lookup_catalog(&input.serial_number) {
            Ok(catalog) => {
                let brand = input.brand.unwrap_or(catalog.brand);
                let model = input.model.unwrap_or(catalog.model);
                let client = input
                    .client
                    .or(catalog.current_client)
                    .ok_or_else(|| ServiceError::Validation(format!(
                        "serial '{}' has no client of record; supply one at intake",
                        input.serial_number
                    )))?;
                (brand, model, client, None)
            }
            Err(ServiceError::NotFound(_)) => {
                let brand = require(input.brand, "brand", &input.serial_number)?;
                let model = require(input.model, "model", &input.serial_number)?;
                let client = input.client.ok_or_else(|| ServiceError::Validation(format!(
                    "client is required for unknown serial '{}'",
                    input.serial_number
                )))?;

                // First visit: seed the catalog with empty default_sensors,
                // in the same transaction as the entry insert.
                let now = now_rfc3339();
                let catalog = MasterCatalogEntry {
                    serial_number: input.serial_number.clone(),
                    brand: brand.clone(),
                    model: model.clone(),
                    current_client: Some(client.clone()),
                    default_sensors: Vec::new(),
                    general_observations: String::new(),
                    create_at: Some(now.clone()),
                    update_at: Some(now),
                };
                (brand, model, client, Some(catalog))
            }
            Err(other) => return Err(other),
        };

        let now = now_rfc3339();
        let entry = WorkshopEntry {
            id: new_id(),
            serial_number: input.serial_number.clone(),
            brand,
            model,
            client,
            entry_date: input.entry_date,
            observations: input.observations,
            status: EntryStatus::PendingReview,
            technician: None,
            delivery_note: None,
            delivery_location: None,
            delivery_date: None,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut stmts = Vec::new();
        if let Some(catalog) = &catalog_insert {
            let json = serde_json::to_string(catalog)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            stmts.push(TxStatement::new(
                "INSERT INTO catalog_entries \
                 (id, data, serial_number, brand, model, client_name, create_at, update_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                vec![
                    Value::Text(catalog.serial_number.clone()),
                    Value::Text(json),
                    Value::Text(catalog.serial_number.clone()),
                    Value::Text(catalog.brand.clone()),
                    Value::Text(catalog.model.clone()),
                    client_name_value(&catalog.current_client),
                    Value::Text(catalog.create_at.clone().unwrap_or_default()),
                    Value::Text(catalog.update_at.clone().unwrap_or_default()),
                ],
            ));
        }

        let entry_json = serde_json::to_string(&entry)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        stmts.push(TxStatement::new(
            "INSERT INTO workshop_entries \
             (id, data, serial_number, status, entry_date, create_at, update_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            vec![
                Value::Text(entry.id.clone()),
                Value::Text(entry_json),
                Value::Text(entry.serial_number.clone()),
                Value::Text(entry.status.as_str().into()),
                Value::Text(entry.entry_date.clone()),
                Value::Text(now.clone()),
                Value::Text(now),
            ],
        ));

        self.sql.exec_tx(&stmts).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("idx_entry_open_serial") || msg.contains("workshop_entries") {
                already_in_workshop(&entry.serial_number)
            } else if msg.contains("UNIQUE constraint") {
                // Lost a race on the implicit catalog insert.
                already_in_workshop(&entry.serial_number)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        info!(serial = %entry.serial_number, entry_id = %entry.id, "equipment intake");
        Ok(entry)
    }

    /// Fetch a workshop entry by id.
    pub fn get_entry(&self, id: &str) -> Result<WorkshopEntry, ServiceError> {
        self.get_record("workshop_entries", id)
    }

    /// The open (non-DELIVERED) entry for a serial, if one exists.
    pub fn open_entry(&self, serial: &str) -> Result<WorkshopEntry, ServiceError> {
        let entries: Vec<WorkshopEntry> = self.query_records(
            "SELECT data FROM workshop_entries WHERE serial_number = ?1 AND status != 'DELIVERED'",
            &[Value::Text(serial.to_string())],
        )?;
        entries.into_iter().next().ok_or_else(|| {
            ServiceError::NotFound(format!("no open workshop entry for serial '{}'", serial))
        })
    }
}

fn require(
    value: Option<String>,
    field: &str,
    serial: &str,
) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!(
            "{} is required for unknown serial '{}'",
            field, serial
        ))),
    }
}

fn already_in_workshop(serial: &str) -> ServiceError {
    ServiceError::AlreadyInWorkshop(format!(
        "serial '{}' already has an open workshop entry",
        serial
    ))
}
