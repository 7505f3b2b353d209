//! Shared application state handed to every handler

use crate::services::scan::ScanJob;
use ecoscan_config::EcoscanConfig;
use ecoscan_llm::AnalysisProvider;
use ecoscan_store::Stores;
use std::sync::Arc;

/// State shared by all routes. The OCR client lives in the workers'
/// [`ScanContext`](crate::services::scan::ScanContext), not here; no
/// handler talks to the OCR service directly.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub llm: Arc<dyn AnalysisProvider>,
    /// Producer side of the background scan queue
    pub scan_queue: flume::Sender<ScanJob>,
    pub config: Arc<EcoscanConfig>,
}
