use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::workflow::WorkflowContext;

/// Main configuration structure for mediaflow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MediaFlowConfig {
    /// Source and destination libraries
    pub library: LibraryConfig,
    /// Orchestrator behaviour
    pub workflow: WorkflowConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Root of the library that gets scanned
    pub base_path: String,
    /// Root of the library qualifying files are moved into
    pub destination_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Fail an effect that has not settled after this many seconds
    pub effect_timeout_seconds: Option<u64>,
    /// Forget the previous error report when the operator restarts
    pub clear_reports_on_restart: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for MediaFlowConfig {
    fn default() -> Self {
        Self {
            library: LibraryConfig {
                base_path: "./library".to_string(),
                destination_path: "./archive".to_string(),
            },
            workflow: WorkflowConfig {
                effect_timeout_seconds: None, // Effects may run as long as they need
                clear_reports_on_restart: false,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
        }
    }
}

impl MediaFlowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (mediaflow.toml)
    /// 3. Environment variables (prefixed with MEDIAFLOW__)
    pub fn load() -> Result<Self> {
        Self::load_from("mediaflow.toml")
    }

    /// Same as [`MediaFlowConfig::load`] with an explicit file location
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEDIAFLOW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
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

    /// Fresh workflow context for the configured libraries
    pub fn workflow_context(&self) -> WorkflowContext {
        WorkflowContext::new(&self.library.base_path, &self.library.destination_path)
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<MediaFlowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        if let Err(e) = MediaFlowConfig::load_env_file() {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
        }
        MediaFlowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static MediaFlowConfig> {
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
