use serde::{Deserialize, Serialize};

/// Client identity as a structured value, never a free-form string.
///
/// Used both as the catalog's `current_client` and as the point-in-time
/// snapshot copied onto a workshop entry at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub name: String,

    /// Fiscal identifier (CIF/NIF).
    pub tax_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,
}

/// A catalog-held suggested sensor row.
///
/// Only identity fields live here; zero/span/bottle/approved belong to a
/// concrete calibration and are never part of the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDefault {
    pub sensor: String,
    #[serde(default)]
    pub pre_alarm: String,
    #[serde(default)]
    pub alarm: String,
    #[serde(default)]
    pub calibration_value: String,
}

/// MasterCatalogEntry — the durable per-serial memory of a piece of
/// equipment, independent of any single workshop visit.
/// PK = serial_number (immutable once created).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCatalogEntry {
    /// Equipment serial number — primary key.
    pub serial_number: String,

    pub brand: String,

    pub model: String,

    /// Most recent owner of record. Refreshed on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_client: Option<ClientRef>,

    /// Suggested sensor rows used to pre-fill a new calibration's
    /// identity fields only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_sensors: Vec<SensorDefault>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub general_observations: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
