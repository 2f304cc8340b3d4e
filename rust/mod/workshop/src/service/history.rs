use std::collections::HashMap;

use serde::Serialize;

use gaswork_core::{ServiceError, days_between, parse_date};
use gaswork_sql::Value;

use super::{RenderedCertificate, WorkshopService};
use crate::model::{CalibrationRecord, EntryStatus, WorkshopEntry};

/// Substring filters over the denormalized history fields.
#[derive(Debug, Default)]
pub struct HistoryFilters {
    pub cliente: Option<String>,
    pub modelo: Option<String>,
    pub serial: Option<String>,
}

/// One history search hit: the record plus per-serial derived stats.
///
/// `last_calibration_date` and `calibration_count` are recomputed from the
/// calibration_records rows on every query — never stored, so there is no
/// second source of truth for "latest calibration".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryHit {
    #[serde(flatten)]
    pub record: CalibrationRecord,
    pub last_calibration_date: String,
    pub calibration_count: i64,
}

/// A calibrated entry enriched with its calibration record, for
/// delivery-time summary display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryWithCalibration {
    #[serde(flatten)]
    pub entry: WorkshopEntry,
    pub calibration: CalibrationRecord,
}

/// A delivered entry with its turnaround time in calendar days.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredEntry {
    #[serde(flatten)]
    pub entry: WorkshopEntry,
    pub days_in_workshop: i64,
}

/// Turnaround-time report over all delivered entries.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredReport {
    pub items: Vec<DeliveredEntry>,
    pub average_days: i64,
}

impl WorkshopService {
    /// Fetch one calibration record by id.
    pub fn get_calibration_record(&self, id: &str) -> Result<CalibrationRecord, ServiceError> {
        self.get_record("calibration_records", id)
    }

    /// Full calibration history of a serial, newest first.
    pub fn history(&self, serial: &str) -> Result<Vec<CalibrationRecord>, ServiceError> {
        self.query_records(
            "SELECT data FROM calibration_records WHERE serial_number = ?1 \
             ORDER BY calibration_date DESC, create_at DESC",
            &[Value::Text(serial.to_string())],
        )
    }

    /// Substring search across denormalized history fields, each hit
    /// enriched with the serial's latest calibration date and total count.
    pub fn search_history(&self, filters: &HistoryFilters) -> Result<Vec<HistoryHit>, ServiceError> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let mut add = |col: &str, needle: &Option<String>, clauses: &mut Vec<String>, params: &mut Vec<Value>| {
            if let Some(n) = needle {
                let idx = params.len() + 1;
                clauses.push(format!("lower({}) LIKE '%' || lower(?{}) || '%'", col, idx));
                params.push(Value::Text(n.clone()));
            }
        };
        add("client_name", &filters.cliente, &mut clauses, &mut params);
        add("model", &filters.modelo, &mut clauses, &mut params);
        add("serial_number", &filters.serial, &mut clauses, &mut params);

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT data FROM calibration_records{} \
             ORDER BY calibration_date DESC, serial_number",
            where_sql
        );
        let records: Vec<CalibrationRecord> = self.query_records(&sql, &params)?;

        let stats = self.per_serial_stats()?;
        Ok(records
            .into_iter()
            .map(|record| {
                let (last, count) = stats
                    .get(&record.serial_number)
                    .cloned()
                    .unwrap_or((record.calibration_date.clone(), 1));
                HistoryHit {
                    record,
                    last_calibration_date: last,
                    calibration_count: count,
                }
            })
            .collect())
    }

    /// All entries awaiting review.
    pub fn pending_review(&self) -> Result<Vec<WorkshopEntry>, ServiceError> {
        self.entries_in_status(EntryStatus::PendingReview)
    }

    /// All calibrated entries awaiting delivery, enriched with their
    /// calibration record.
    pub fn calibrated_pending_delivery(
        &self,
    ) -> Result<Vec<EntryWithCalibration>, ServiceError> {
        let entries = self.entries_in_status(EntryStatus::CalibratedPendingDelivery)?;
        let mut enriched = Vec::with_capacity(entries.len());
        for entry in entries {
            let records: Vec<CalibrationRecord> = self.query_records(
                "SELECT data FROM calibration_records WHERE entry_id = ?1",
                &[Value::Text(entry.id.clone())],
            )?;
            let calibration = records.into_iter().next().ok_or_else(|| {
                ServiceError::Internal(format!(
                    "calibrated entry '{}' has no calibration record",
                    entry.id
                ))
            })?;
            enriched.push(EntryWithCalibration { entry, calibration });
        }
        Ok(enriched)
    }

    /// All delivered entries with turnaround days and the overall average.
    pub fn delivered(&self) -> Result<DeliveredReport, ServiceError> {
        let entries = self.entries_in_status(EntryStatus::Delivered)?;
        let mut items = Vec::with_capacity(entries.len());
        let mut total_days: i64 = 0;

        for entry in entries {
            let entry_date = parse_date("entry_date", &entry.entry_date)?;
            let delivery = entry.delivery_date.as_deref().ok_or_else(|| {
                ServiceError::Internal(format!(
                    "delivered entry '{}' has no delivery_date",
                    entry.id
                ))
            })?;
            let delivery_date = parse_date("delivery_date", delivery)?;
            let days = days_between(entry_date, delivery_date);
            total_days += days;
            items.push(DeliveredEntry { entry, days_in_workshop: days });
        }

        let average_days = if items.is_empty() {
            0
        } else {
            (total_days as f64 / items.len() as f64).round() as i64
        };

        Ok(DeliveredReport { items, average_days })
    }

    /// Render the certificate for a calibration record via the external
    /// renderer collaborator.
    pub fn certificate(&self, record_id: &str) -> Result<RenderedCertificate, ServiceError> {
        let renderer = self.renderer.as_ref().ok_or_else(|| {
            ServiceError::Internal("no certificate renderer configured".into())
        })?;
        let record = self.get_calibration_record(record_id)?;
        let entry = self.get_entry(&record.entry_id)?;
        renderer.render(&record, &entry)
    }

    fn entries_in_status(&self, status: EntryStatus) -> Result<Vec<WorkshopEntry>, ServiceError> {
        self.list_records(
            "workshop_entries",
            &[("status", Value::Text(status.as_str().into()))],
            "entry_date, serial_number",
        )
    }

    /// Latest calibration date and total count per serial, derived on read.
    fn per_serial_stats(&self) -> Result<HashMap<String, (String, i64)>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT serial_number, MAX(calibration_date) as last_date, COUNT(*) as cnt \
                 FROM calibration_records GROUP BY serial_number",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut stats = HashMap::new();
        for row in &rows {
            let serial = row.get_str("serial_number").unwrap_or_default().to_string();
            let last = row.get_str("last_date").unwrap_or_default().to_string();
            let count = row.get_i64("cnt").unwrap_or(0);
            stats.insert(serial, (last, count));
        }
        Ok(stats)
    }
}
