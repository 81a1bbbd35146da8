use std::path::PathBuf;
use std::time::Duration;

use crate::probe::ProbeSettings;

/// Runtime configuration for a monitoring pass, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the `Products` and `Daily` worksheets.
    pub workbook_dir: PathBuf,
    pub log_level: String,
    pub headless: bool,
    /// Explicit Chrome/Chromium executable; discovered on the system when `None`.
    pub chromium_path: Option<PathBuf>,
    pub navigation_timeout_secs: u64,
    pub inter_product_delay_ms: u64,
}

impl AppConfig {
    /// Probe settings for this run: the engine's built-in constants with the
    /// environment-provided navigation timeout and courtesy delay applied.
    #[must_use]
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            inter_product_delay: Duration::from_millis(self.inter_product_delay_ms),
            ..ProbeSettings::default()
        }
    }
}
