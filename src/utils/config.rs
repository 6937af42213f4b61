use chrono::FixedOffset;
use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::error::{NodeError, Result};

const MAX_FEEDBACK_SECS: f64 = 10.0;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub recognition: RecognitionConfig,
    pub gallery: GalleryConfig,
    pub attendance: AttendanceConfig,
    pub feedback: FeedbackConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Maximum face distance still counted as a match. Lower is stricter.
    pub tolerance: f32,
    pub analyzer_url: String,
    pub analyzer_timeout_ms: u64,
    pub max_frame_bytes: usize,
    pub resize_width: u32,
    pub decode_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub snapshot_path: PathBuf,
    pub enrollment_manifest: PathBuf,
    pub photos_dir: PathBuf,
    pub rebuild_on_empty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    pub storage_path: PathBuf,
    pub cooldown_seconds: u64,
    pub utc_offset_minutes: i32,
    pub storage_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub device_port: u16,
    pub timeout_ms: u64,
    pub positive_duration_secs: f64,
    pub negative_duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub metrics_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_request_bytes: 10_485_760, // 10MB
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.6,
            analyzer_url: "http://127.0.0.1:8500/analyze".to_string(),
            analyzer_timeout_ms: 5_000,
            max_frame_bytes: 5 * 1024 * 1024,
            resize_width: 480,
            decode_timeout_ms: 2_000,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data/gallery.json"),
            enrollment_manifest: PathBuf::from("data/enrollment.json"),
            photos_dir: PathBuf::from("data/photos"),
            rebuild_on_empty: true,
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("data/attendance"),
            cooldown_seconds: 300,
            utc_offset_minutes: 0,
            storage_timeout_ms: 2_000,
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            device_port: 5000,
            timeout_ms: 2_000,
            positive_duration_secs: 2.0,
            negative_duration_secs: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            metrics_interval_secs: 300,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        let config = ConfigLib::builder()
            // Start with default values
            .add_source(ConfigLib::try_from(&Config::default())?)

            // Load from config file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Override with environment variables (e.g., APP__SERVER__PORT)
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))

            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(NodeError::Config("Invalid port number".into()));
        }

        let tolerance = self.recognition.tolerance;
        if !(tolerance > 0.0 && tolerance <= 2.0) {
            return Err(NodeError::Config(format!(
                "recognition.tolerance must be in (0, 2], got {}",
                tolerance
            )));
        }
        if self.recognition.analyzer_timeout_ms == 0 || self.recognition.decode_timeout_ms == 0 {
            return Err(NodeError::Config("recognition timeouts must be greater than 0".into()));
        }
        if self.recognition.max_frame_bytes == 0 {
            return Err(NodeError::Config("max_frame_bytes must be greater than 0".into()));
        }

        if self.attendance.storage_timeout_ms == 0 {
            return Err(NodeError::Config("storage_timeout_ms must be greater than 0".into()));
        }
        if self.attendance.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(NodeError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.attendance.utc_offset_minutes
            )));
        }

        if self.feedback.timeout_ms == 0 {
            return Err(NodeError::Config("feedback.timeout_ms must be greater than 0".into()));
        }
        for duration in [
            self.feedback.positive_duration_secs,
            self.feedback.negative_duration_secs,
        ] {
            if !(duration > 0.0 && duration <= MAX_FEEDBACK_SECS) {
                return Err(NodeError::Config(format!(
                    "feedback durations must be in (0, {}], got {}",
                    MAX_FEEDBACK_SECS, duration
                )));
            }
        }

        Ok(())
    }

    pub fn get_cooldown(&self) -> Duration {
        Duration::from_secs(self.attendance.cooldown_seconds)
    }

    pub fn get_storage_timeout(&self) -> Duration {
        Duration::from_millis(self.attendance.storage_timeout_ms)
    }

    pub fn get_analyzer_timeout(&self) -> Duration {
        Duration::from_millis(self.recognition.analyzer_timeout_ms)
    }

    pub fn get_decode_timeout(&self) -> Duration {
        Duration::from_millis(self.recognition.decode_timeout_ms)
    }

    pub fn get_feedback_timeout(&self) -> Duration {
        Duration::from_millis(self.feedback.timeout_ms)
    }

    pub fn get_positive_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.feedback.positive_duration_secs).unwrap_or(Duration::ZERO)
    }

    pub fn get_negative_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.feedback.negative_duration_secs).unwrap_or(Duration::ZERO)
    }

    pub fn get_metrics_interval(&self) -> Option<Duration> {
        match self.logging.metrics_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn get_utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.attendance.utc_offset_minutes * 60).ok_or_else(|| {
            NodeError::Config(format!(
                "invalid utc_offset_minutes: {}",
                self.attendance.utc_offset_minutes
            ))
        })
    }
}

/// Settings for the device-side feedback agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn new() -> Result<Self> {
        let config = ConfigLib::builder()
            .add_source(ConfigLib::try_from(&AgentConfig::default())?)
            .add_source(File::with_name("config/agent").required(false))
            .add_source(Environment::with_prefix("AGENT").separator("__").try_parsing(true))
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.port == 0 {
            return Err(NodeError::Config("Invalid port number".into()));
        }
        Ok(config)
    }
}

impl From<ConfigError> for NodeError {
    fn from(error: ConfigError) -> Self {
        NodeError::Config(error.to_string())
    }
}
