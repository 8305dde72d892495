use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_VALIDATION_URL: &str =
    "https://api.casaticketing.ma//api/P6MXWJD9HRJ5VL1MESMU/mobileBarcodeScan";
const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 10_000;
const DEFAULT_SCANNER_FPS: u32 = 10;
const DEFAULT_SCANNER_QRBOX: u32 = 250;
const DEFAULT_CONTAINER_ID: &str = "qr-reader";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub validation_url: String,
    pub request_timeout_ms: u32,
    pub scanner_fps: u32,
    pub scanner_qrbox: u32,
    pub container_id: String,
    pub enable_logging: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            validation_url: DEFAULT_VALIDATION_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            scanner_fps: DEFAULT_SCANNER_FPS,
            scanner_qrbox: DEFAULT_SCANNER_QRBOX,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            enable_logging: true,
        }
    }
}

impl ScannerConfig {
    /// Configuración desde variables capturadas en compilación (ver `build.rs`).
    /// Los valores que no se pueden parsear usan el default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match key {
            "VALIDATION_URL" => option_env!("VALIDATION_URL"),
            "REQUEST_TIMEOUT_MS" => option_env!("REQUEST_TIMEOUT_MS"),
            "SCANNER_FPS" => option_env!("SCANNER_FPS"),
            "SCANNER_QRBOX" => option_env!("SCANNER_QRBOX"),
            "SCANNER_CONTAINER_ID" => option_env!("SCANNER_CONTAINER_ID"),
            "ENABLE_LOGGING" => option_env!("ENABLE_LOGGING"),
            _ => None,
        })
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'static str>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(str::trim).filter(|v| !v.is_empty());

        Self {
            validation_url: non_empty("VALIDATION_URL")
                .map(str::to_string)
                .unwrap_or(defaults.validation_url),
            request_timeout_ms: non_empty("REQUEST_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.request_timeout_ms),
            scanner_fps: non_empty("SCANNER_FPS")
                .and_then(|v| v.parse().ok())
                .filter(|fps| *fps > 0)
                .unwrap_or(defaults.scanner_fps),
            scanner_qrbox: non_empty("SCANNER_QRBOX")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scanner_qrbox),
            container_id: non_empty("SCANNER_CONTAINER_ID")
                .map(str::to_string)
                .unwrap_or(defaults.container_id),
            enable_logging: non_empty("ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.request_timeout_ms))
    }

    pub fn log_level(&self) -> log::Level {
        if self.enable_logging {
            log::Level::Debug
        } else {
            log::Level::Warn
        }
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: ScannerConfig = ScannerConfig::from_env();
}
