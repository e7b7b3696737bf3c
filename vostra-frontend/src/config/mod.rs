use serde::Deserialize;
use std::time::Duration;
use vostra_core::upload::DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    pub invoice_api: InvoiceApiSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector, e.g. `http://tempo:4317`. Span export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "vostra-frontend".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which [`vostra_core::InvoiceApi`] implementation backs the web app.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    Http,
    Demo,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InvoiceApiSettings {
    pub mode: ApiMode,
    /// Backend origin without the `/api` suffix.
    pub base_url: String,
    /// Unset means no client-side deadline; a timeout is reported as a
    /// transport failure.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl InvoiceApiSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    // Works both from the workspace root and from inside the crate.
    let configuration_directory = if base_path.ends_with("vostra-frontend") {
        base_path.join("config")
    } else {
        base_path.join("vostra-frontend").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
