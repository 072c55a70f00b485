use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the data-room client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataRoomConfig {
    /// Hosted backend connection settings
    pub backend: BackendConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (tables, storage and rpc live under it)
    pub url: String,
    /// Project API key sent as `apikey` (can be set via env var)
    pub api_key: Option<String>,
    /// User access token; the API key is used when absent
    pub access_token: Option<String>,
    /// Storage bucket holding organization logos
    pub logo_bucket: String,
    /// Object name of the logo inside the organization's folder
    pub logo_object_name: String,
    /// Remote procedure that creates the data room and invitations
    pub onboarding_procedure: String,
    /// Transport timeout in seconds; 0 keeps the HTTP client's default
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    pub json_logs: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: None, // Read from DATAROOM_BACKEND_API_KEY or SUPABASE_ANON_KEY
            access_token: None,
            logo_bucket: "organization-logos".to_string(),
            logo_object_name: "logo".to_string(),
            onboarding_procedure: "complete_onboarding".to_string(),
            request_timeout_seconds: 0,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl BackendConfig {
    /// Timeout to install on the HTTP client, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl DataRoomConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (dataroom.toml)
    /// 3. Environment variables (`DATAROOM_BACKEND__URL`, `DATAROOM_OBSERVABILITY__LOG_LEVEL`, ...)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("dataroom.toml"))
    }

    /// Same as [`DataRoomConfig::load`] but reads the given file instead of `dataroom.toml`
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&DataRoomConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("DATAROOM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut dataroom_config: DataRoomConfig = builder.build()?.try_deserialize()?;

        // The API key may come from the generic backend variable as well
        if dataroom_config.backend.api_key.is_none() {
            if let Ok(key) = std::env::var("DATAROOM_BACKEND_API_KEY") {
                dataroom_config.backend.api_key = Some(key);
            } else if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
                dataroom_config.backend.api_key = Some(key);
            }
        }

        Ok(dataroom_config)
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
}
