use serde::{Deserialize, Serialize};

use super::ClientRef;

/// Workshop entry status.
///
/// Transitions forward only: PENDING_REVIEW → CALIBRATED_PENDING_DELIVERY
/// → DELIVERED. DELIVERED is terminal per entry; a new visit of the same
/// serial creates a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    PendingReview,
    CalibratedPendingDelivery,
    Delivered,
}

impl EntryStatus {
    /// Column value for the indexed `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::PendingReview => "PENDING_REVIEW",
            EntryStatus::CalibratedPendingDelivery => "CALIBRATED_PENDING_DELIVERY",
            EntryStatus::Delivered => "DELIVERED",
        }
    }
}

impl Default for EntryStatus {
    fn default() -> Self {
        Self::PendingReview
    }
}

/// WorkshopEntry — one physical visit (entry → exit) of a serial number.
/// PK = generated id; at most one non-DELIVERED entry per serial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopEntry {
    pub id: String,

    /// FK to the master catalog.
    pub serial_number: String,

    pub brand: String,

    pub model: String,

    /// Client snapshot copied at intake time, not a live reference.
    pub client: ClientRef,

    /// Intake date, `YYYY-MM-DD`.
    pub entry_date: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub observations: String,

    #[serde(default)]
    pub status: EntryStatus,

    /// Set at calibration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<String>,

    /// Exit date, `YYYY-MM-DD`. Set by delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&EntryStatus::CalibratedPendingDelivery).unwrap();
        assert_eq!(json, "\"CALIBRATED_PENDING_DELIVERY\"");
        assert_eq!(
            EntryStatus::CalibratedPendingDelivery.as_str(),
            "CALIBRATED_PENDING_DELIVERY"
        );
    }

    #[test]
    fn entry_json_roundtrip() {
        let entry = WorkshopEntry {
            id: "abc123".into(),
            serial_number: "SN-100".into(),
            brand: "Dräger".into(),
            model: "X-am".into(),
            client: ClientRef {
                name: "Acme Industrial".into(),
                tax_id: "B12345678".into(),
                department: String::new(),
            },
            entry_date: "2024-01-10".into(),
            observations: String::new(),
            status: EntryStatus::PendingReview,
            technician: None,
            delivery_note: None,
            delivery_location: None,
            delivery_date: None,
            create_at: None,
            update_at: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: WorkshopEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
