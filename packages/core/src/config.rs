//! Station configuration
//!
//! Everything the web page used to receive at render time (patient id,
//! endpoint URLs and templates) lives here. Loaded from `config.json` in the
//! platform config directory, then overridden from the environment.

use crate::{StationError, StationResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Placeholder replaced by the patient identifier
pub const CEDULA_PLACEHOLDER: &str = "__CED__";
/// Placeholder replaced by the capture filename
pub const FILE_PLACEHOLDER: &str = "__FILE__";

pub const CONFIG_PATH_ENV: &str = "EVIDENCE_STATION_CONFIG";
pub const BACKEND_URL_ENV: &str = "EVIDENCE_BACKEND_URL";
pub const CEDULA_ENV: &str = "EVIDENCE_CEDULA";

/// URL with `__CED__` / `__FILE__` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute the first occurrence of each placeholder
    pub fn render(&self, cedula: &str, filename: Option<&str>) -> String {
        let url = self.0.replacen(CEDULA_PLACEHOLDER, cedula, 1);
        match filename {
            Some(file) => url.replacen(FILE_PLACEHOLDER, file, 1),
            None => url,
        }
    }
}

/// Backend endpoints, relative to `backend_url` unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub list_captures: UrlTemplate,
    pub capture_image: UrlTemplate,
    pub delete_capture: String,
    pub capture_upload: String,
    pub toggle_prediction: String,
    pub thresholds: String,
    pub thresholds_reset: String,
    pub video_feed: String,
    /// JSON patient summaries. The stock backend only renders HTML at
    /// `/historial`, so deployments must expose this route or point it at one.
    pub patients: String,
    /// Form POST storing a new patient
    pub register_patient: String,
    pub download: UrlTemplate,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            list_captures: UrlTemplate::new("/get_capturas/__CED__"),
            capture_image: UrlTemplate::new("/patients/__CED__/__FILE__"),
            delete_capture: "/delete_captura".to_string(),
            capture_upload: "/capture".to_string(),
            toggle_prediction: "/toggle_predictions".to_string(),
            thresholds: "/thresholds".to_string(),
            thresholds_reset: "/thresholds/reset".to_string(),
            video_feed: "/video_feed".to_string(),
            patients: "/api/patients".to_string(),
            register_patient: "/start_stream".to_string(),
            download: UrlTemplate::new("/download/__CED__"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Base URL of the evidence backend
    pub backend_url: String,
    /// Patient to open directly on the camera page
    pub cedula: Option<String>,
    pub endpoints: Endpoints,
    /// Quiet window before a threshold edit is pushed
    pub debounce_ms: u64,
    /// How long a notification stays on screen
    pub notification_ms: u64,
    /// Interval between live preview refreshes, 0 disables the preview
    pub preview_interval_ms: u64,
    pub http_timeout_secs: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            cedula: None,
            endpoints: Endpoints::default(),
            debounce_ms: 120,
            notification_ms: 3000,
            preview_interval_ms: 1000,
            http_timeout_secs: 10,
        }
    }
}

impl StationConfig {
    /// Load configuration from the default location plus environment overrides
    pub fn load() -> StationResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                Self::load_from_file(&path)?
            }
            Some(path) => {
                debug!("No configuration at {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> StationResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: StationConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> StationResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// `config.json` inside the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "evidence", "EvidenceStation")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(cedula) = lookup(CEDULA_ENV).filter(|v| !v.trim().is_empty()) {
            self.cedula = Some(cedula.trim().to_string());
        }
    }

    pub fn validate(&self) -> StationResult<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://"))
        {
            return Err(StationError::Configuration(format!(
                "backend_url must be an http(s) URL, got {:?}",
                self.backend_url
            )));
        }
        if !self
            .endpoints
            .capture_image
            .as_str()
            .contains(FILE_PLACEHOLDER)
        {
            return Err(StationError::Configuration(format!(
                "capture_image template must contain {}",
                FILE_PLACEHOLDER
            )));
        }
        Ok(())
    }

    /// Join an endpoint to the backend URL; absolute URLs pass through
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let base = self.backend_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }

    pub fn resolve_template(&self, template: &UrlTemplate) -> UrlTemplate {
        UrlTemplate::new(self.resolve(template.as_str()))
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn preview_interval(&self) -> Option<Duration> {
        (self.preview_interval_ms > 0).then(|| Duration::from_millis(self.preview_interval_ms))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
