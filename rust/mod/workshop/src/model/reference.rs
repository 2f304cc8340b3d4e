use serde::{Deserialize, Serialize};

// Plain name registries read by the intake/calibration flows.
// No state machine; uniqueness on name (or tax_id for clients).

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
}

/// Equipment model name. `ModelRef` to avoid clashing with the catalog's
/// per-serial `model` attribute in imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: String,
    pub name: String,
}

/// A client as a plain reference record (distinct from the structured
/// `ClientRef` snapshots carried by catalog entries and workshop entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub tax_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,
}
