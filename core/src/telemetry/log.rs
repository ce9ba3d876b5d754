use log::{debug, info, warn};

/// Component-tagged front for the `log` facade.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    /// Per-frame detail, silent unless debug logging is enabled.
    pub fn detail(&self, message: &str) {
        debug!("[{}] {}", self.component, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("presence")
    }
}
