use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "CUSTODY";
const DEFAULT_USER_AGENT: &str = concat!("custody_timeline/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] ConfigError),
    #[error("CUSTODY_UPSTREAM_URL must be set and contain an {{id}} placeholder")]
    MissingUpstream,
}

/// Runtime settings, read from `CUSTODY_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Upstream URL with an `{id}` placeholder.
    pub upstream_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "0.0.0.0".to_string(),
            port: 3000,
            upstream_url: String::new(),
            timeout_secs: 20,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self, SettingsError> {
        let d = Settings::default();
        let settings: Settings = Config::builder()
            .set_default("host", d.host)?
            .set_default("port", i64::from(d.port))?
            .set_default("upstream_url", d.upstream_url)?
            .set_default("timeout_secs", d.timeout_secs as i64)?
            .set_default("user_agent", d.user_agent)?
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if !self.upstream_url.contains("{id}") {
            return Err(SettingsError::MissingUpstream);
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
