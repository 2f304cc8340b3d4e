use serde::{Deserialize, Serialize};

/// One sensor row on the calibration sheet.
///
/// Identity fields (sensor/pre_alarm/alarm/calibration_value) may be seeded
/// from history or catalog defaults; the measured fields and `approved` are
/// always entered fresh for each visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub sensor: String,
    #[serde(default)]
    pub pre_alarm: String,
    #[serde(default)]
    pub alarm: String,
    #[serde(default)]
    pub calibration_value: String,
    #[serde(default)]
    pub valor_zero: String,
    #[serde(default)]
    pub valor_span: String,
    #[serde(default)]
    pub calibration_bottle: String,
    /// Explicit pass/fail, never inferred.
    #[serde(default)]
    pub approved: bool,
}

/// A spare part consumed during a calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    pub description: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub under_warranty: bool,
}

/// CalibrationRecord — the immutable result of one calibration performed
/// during a visit. One-to-one with the WorkshopEntry it closes out;
/// append-only history per serial.
///
/// serial/brand/model/client are denormalized from the entry so history
/// queries never need a join back to mutable rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    pub id: String,

    /// The workshop entry this record closes out.
    pub entry_id: String,

    pub serial_number: String,
    pub brand: String,
    pub model: String,

    /// Denormalized client name for history queries.
    pub client_name: String,

    /// Label placed on the generated certificate: the company name, or the
    /// department when `use_department_as_client` was set at calibration.
    pub certificate_client: String,

    /// `YYYY-MM-DD`.
    pub calibration_date: String,

    pub technician: String,

    /// 1–6 sensor rows, matching a single-page calibration sheet.
    pub calibration_data: Vec<SensorReading>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spare_parts: Vec<SparePart>,

    /// Workshop-internal notes. Never exposed on generated certificates.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub internal_notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}

impl CalibrationRecord {
    /// The record as handed to a certificate renderer — internal notes
    /// stripped, certificate label substituted for the client name.
    pub fn certificate_view(&self) -> serde_json::Value {
        serde_json::json!({
            "serialNumber": self.serial_number,
            "brand": self.brand,
            "model": self.model,
            "client": self.certificate_client,
            "calibrationDate": self.calibration_date,
            "technician": self.technician,
            "calibrationData": self.calibration_data,
            "spareParts": self.spare_parts,
        })
    }
}
