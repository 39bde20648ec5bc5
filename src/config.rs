// Layered configuration: defaults -> veritas.toml -> VERITAS_* env vars

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelinePolicy;
use crate::service::ReviewPolicy;

/// Main configuration structure for Veritas
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VeritasConfig {
    /// Pipeline stage timeouts and escalation switches
    pub pipeline: PipelineConfig,
    /// Approval workflow settings
    pub review: ReviewConfig,
    /// Notification fan-out settings
    pub notifications: NotificationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bounded wait for the validate capability, per call
    pub validate_timeout_seconds: u64,
    /// Bounded wait for the assess capability, per call
    pub assess_timeout_seconds: u64,
    /// Bounded wait for the compose capability, per call
    pub compose_timeout_seconds: u64,
    /// Escalate a failed validate call to the terminal validation_failed
    /// state instead of degrading to the fallback outcome
    pub escalate_validation_failure: bool,
    /// Escalate a failed assess call to the terminal analysis_failed state
    pub escalate_analysis_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            validate_timeout_seconds: 30,
            assess_timeout_seconds: 60,
            compose_timeout_seconds: 15,
            escalate_validation_failure: false,
            escalate_analysis_failure: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Minimum rejection-comment length in characters
    pub min_comment_chars: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_comment_chars: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Identities notified of every report that finishes the pipeline
    pub supervisor_recipients: Vec<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            supervisor_recipients: vec!["supervisor-001".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit logs as JSON for structured collection
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl VeritasConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (veritas.toml, .veritas-rc)
    /// 3. Environment variables (prefixed with VERITAS_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("veritas.toml").exists() {
            builder = builder.add_source(File::with_name("veritas"));
        }

        if Path::new(".veritas-rc").exists() {
            builder = builder.add_source(File::with_name(".veritas-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("VERITAS")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let veritas_config: VeritasConfig = config.try_deserialize()?;
        Ok(veritas_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Pipeline policy derived from the configured timeouts and switches.
    /// The supervisor pool rides along so the orchestrator has one source
    /// for its fan-out targets.
    pub fn pipeline_policy(&self) -> PipelinePolicy {
        PipelinePolicy {
            validate_timeout: Duration::from_secs(self.pipeline.validate_timeout_seconds),
            assess_timeout: Duration::from_secs(self.pipeline.assess_timeout_seconds),
            escalate_validation_failure: self.pipeline.escalate_validation_failure,
            escalate_analysis_failure: self.pipeline.escalate_analysis_failure,
            supervisor_recipients: self.notifications.supervisor_recipients.clone(),
        }
    }

    pub fn compose_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.compose_timeout_seconds)
    }

    pub fn review_policy(&self) -> ReviewPolicy {
        ReviewPolicy {
            min_comment_chars: self.review.min_comment_chars,
        }
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<VeritasConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = VeritasConfig::load_env_file();
        VeritasConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static VeritasConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
