use std::collections::HashSet;

use tracing::info;

use gaswork_core::{ServiceError, now_rfc3339, parse_date};
use gaswork_sql::{SQLError, TxStatement, Value};

use super::WorkshopService;
use crate::model::{EntryStatus, WorkshopEntry};

/// Input for delivering a batch of calibrated equipment under one note.
#[derive(Debug, Default)]
pub struct DeliveryInput {
    pub serial_numbers: Vec<String>,
    pub delivery_note: String,
    pub delivery_location: String,
    pub delivery_date: String,
}

impl WorkshopService {
    /// Deliver a batch of serials, all-or-nothing.
    ///
    /// Every serial must have an open entry in CALIBRATED_PENDING_DELIVERY;
    /// offenders are named and nothing changes. On success each entry becomes
    /// DELIVERED and the catalog's current_client is refreshed from the
    /// entry's client snapshot — the unit leaves with its client of record.
    /// The whole batch commits as one transaction of status-guarded updates.
    pub fn deliver(&self, input: DeliveryInput) -> Result<Vec<WorkshopEntry>, ServiceError> {
        if input.serial_numbers.is_empty() {
            return Err(ServiceError::Validation("delivery batch is empty".into()));
        }
        let unique: HashSet<&String> = input.serial_numbers.iter().collect();
        if unique.len() != input.serial_numbers.len() {
            return Err(ServiceError::Validation(
                "delivery batch lists a serial more than once".into(),
            ));
        }
        if input.delivery_note.trim().is_empty() || input.delivery_location.trim().is_empty() {
            return Err(ServiceError::Validation(
                "delivery_note and delivery_location are required".into(),
            ));
        }
        parse_date("delivery_date", &input.delivery_date)?;

        // Collect entries up front; name every offender, not just the first.
        let mut updated = Vec::with_capacity(input.serial_numbers.len());
        let mut offenders = Vec::new();
        let now = now_rfc3339();

        for serial in &input.serial_numbers {
            match self.open_entry(serial) {
                Ok(entry) if entry.status == EntryStatus::CalibratedPendingDelivery => {
                    let mut e = entry;
                    e.status = EntryStatus::Delivered;
                    e.delivery_note = Some(input.delivery_note.clone());
                    e.delivery_location = Some(input.delivery_location.clone());
                    e.delivery_date = Some(input.delivery_date.clone());
                    e.update_at = Some(now.clone());
                    updated.push(e);
                }
                Ok(entry) => {
                    offenders.push(format!("{} ({})", serial, entry.status.as_str()));
                }
                Err(ServiceError::NotFound(_)) => {
                    offenders.push(format!("{} (not in workshop)", serial));
                }
                Err(other) => return Err(other),
            }
        }

        if !offenders.is_empty() {
            return Err(ServiceError::InvalidState(format!(
                "batch not deliverable, offending serial(s): {}",
                offenders.join(", ")
            )));
        }

        let mut stmts = Vec::with_capacity(updated.len() * 2);
        for entry in &updated {
            let entry_json = serde_json::to_string(entry)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            stmts.push(TxStatement::guarded(
                "UPDATE workshop_entries \
                 SET data = ?1, status = 'DELIVERED', delivery_date = ?2, update_at = ?3 \
                 WHERE id = ?4 AND status = 'CALIBRATED_PENDING_DELIVERY'",
                vec![
                    Value::Text(entry_json),
                    Value::Text(input.delivery_date.clone()),
                    Value::Text(now.clone()),
                    Value::Text(entry.id.clone()),
                ],
            ));

            // Refresh the catalog owner of record in the same transaction.
            let mut catalog = self.lookup_catalog(&entry.serial_number)?;
            catalog.current_client = Some(entry.client.clone());
            catalog.update_at = Some(now.clone());
            let catalog_json = serde_json::to_string(&catalog)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            stmts.push(TxStatement::guarded(
                "UPDATE catalog_entries SET data = ?1, client_name = ?2, update_at = ?3 \
                 WHERE id = ?4",
                vec![
                    Value::Text(catalog_json),
                    Value::Text(entry.client.name.clone()),
                    Value::Text(now.clone()),
                    Value::Text(entry.serial_number.clone()),
                ],
            ));
        }

        self.sql.exec_tx(&stmts).map_err(|e| match e {
            SQLError::TxAborted(_) => ServiceError::InvalidState(
                "batch state changed concurrently, nothing was delivered".into(),
            ),
            other => ServiceError::Storage(other.to_string()),
        })?;

        info!(
            note = %input.delivery_note,
            count = updated.len(),
            "delivery batch completed"
        );
        Ok(updated)
    }
}
