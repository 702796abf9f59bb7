use std::sync::Arc;

use crate::collector::Collector;

#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    /// Host identity reported in every snapshot, resolved once at startup
    pub hostname: Arc<str>,
}

impl AppState {
    pub fn new(collector: Collector, hostname: impl Into<Arc<str>>) -> Self {
        Self {
            collector: Arc::new(collector),
            hostname: hostname.into(),
        }
    }
}
