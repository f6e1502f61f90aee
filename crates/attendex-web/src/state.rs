use std::sync::Arc;

use attendex_core::{DocumentStore, PdfBackend};
use attendex_parsing::AttendanceExtractor;

/// Shared application state accessible from all handlers.
///
/// The store is opened once at startup and shared by every request.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub backend: Arc<dyn PdfBackend>,
    pub extractor: AttendanceExtractor,
}
