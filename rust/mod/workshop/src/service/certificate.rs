use gaswork_core::ServiceError;

use crate::model::{CalibrationRecord, WorkshopEntry};

/// A rendered certificate document, opaque to the workshop core.
pub struct RenderedCertificate {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// External certificate renderer collaborator.
///
/// The core supplies the calibration record's data (already stripped of
/// internal notes via [`CalibrationRecord::certificate_view`]) and does not
/// format the document itself.
pub trait CertificateRenderer: Send + Sync {
    fn render(
        &self,
        record: &CalibrationRecord,
        entry: &WorkshopEntry,
    ) -> Result<RenderedCertificate, ServiceError>;
}
