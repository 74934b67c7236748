use log::{debug, info, warn};

/// Scoped front for the `log` facade used by the core components.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::scoped("radar")
    }

    pub fn scoped(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.scope, message);
    }

    pub fn debug(&self, message: &str) {
        debug!("[{}] {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
