//! Stand-in certificate renderer.
//!
//! Serves the record's certificate view as JSON so delivery workflows can be
//! exercised end to end without the external PDF service.
//! TODO: swap for the PDF renderer once its endpoint is deployed.

use gaswork_core::ServiceError;
use gaswork_workshop::model::{CalibrationRecord, WorkshopEntry};
use gaswork_workshop::service::{CertificateRenderer, RenderedCertificate};

pub struct JsonCertificateRenderer;

impl CertificateRenderer for JsonCertificateRenderer {
    fn render(
        &self,
        record: &CalibrationRecord,
        entry: &WorkshopEntry,
    ) -> Result<RenderedCertificate, ServiceError> {
        let mut view = record.certificate_view();
        if let Some(obj) = view.as_object_mut() {
            obj.insert("entryDate".into(), serde_json::json!(entry.entry_date));
            obj.insert("deliveryDate".into(), serde_json::json!(entry.delivery_date));
        }
        let bytes = serde_json::to_vec_pretty(&view)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(RenderedCertificate {
            content_type: "application/json",
            bytes,
        })
    }
}
