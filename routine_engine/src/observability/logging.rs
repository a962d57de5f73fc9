use log::Level;

/// key=value logger for routine calls, switchable per caller.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    enabled: bool,
}

impl StructuredLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log_call(&self, level: Level, procedure: &str, metadata: &[(&str, String)]) {
        if !self.enabled {
            return;
        }

        log::log!(level, "Call: {}{}", procedure, format_metadata(metadata));
    }

    pub fn log_connection(&self, level: Level, procedure: &str, action: &str) {
        if !self.enabled {
            return;
        }

        log::log!(level, "Connection {} for {}", action, procedure);
    }

    pub fn log_error(&self, procedure: &str, error: &str, metadata: &[(&str, String)]) {
        if !self.enabled {
            return;
        }

        log::error!(
            "Error: {}, procedure={}{}",
            error,
            procedure,
            format_metadata(metadata)
        );
    }

    pub fn log_metric(&self, name: &str, value: f64, unit: &str) {
        if !self.enabled {
            return;
        }

        log::info!("Metric: {}={}{}", name, value, unit);
    }
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

fn format_metadata(metadata: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (key, value) in metadata {
        out.push_str(&format!(", {}={}", key, value));
    }
    out
}
