use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },

    #[error("{key} must be within 0..={max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        max: i64,
    },
}

/// Longest configurable auto-approval wait (366 days)
pub const MAX_WAIT_HOURS: i64 = 24 * 366;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub mail: MailConfig,
    /// Accounts created at startup when running on the in-memory store
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity service
    pub jwt_secret: String,
}

/// Auto-approval sweep settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SweepConfig {
    pub enabled: bool,
    /// Listings pending longer than this are decided automatically
    pub wait_hours: i64,
    pub tick_interval_secs: u64,
    /// Candidates fetched per query; a sweep pages until none are left
    pub batch_size: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wait_hours: 24,
            tick_interval_secs: 3600,
            batch_size: 500,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_WAIT_HOURS).contains(&self.wait_hours) {
            return Err(ConfigError::OutOfRange {
                key: "sweep.wait_hours",
                value: self.wait_hours,
                max: MAX_WAIT_HOURS,
            });
        }
        Ok(())
    }

    /// Only meaningful after [`SweepConfig::validate`]
    pub fn wait_period(&self) -> chrono::Duration {
        chrono::Duration::hours(self.wait_hours)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}

/// Image-safety scorer settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModerationConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_user: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.sightengine.com/1.0/check.json".to_string(),
            api_user: None,
            api_secret: None,
            timeout_ms: 5000,
        }
    }
}

impl ModerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Both credentials present and non-empty
    pub fn has_credentials(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.api_user) && set(&self.api_secret)
    }
}

/// Outbound mail relay
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MailConfig {
    /// JSON mail relay endpoint; notifications are only logged when unset
    #[serde(default)]
    pub relay_url: Option<String>,
    pub from: String,
    pub timeout_ms: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            from: "noreply@campus-exchange.local".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact_details: String,
    #[serde(default)]
    pub role: String,
    /// Name of a seeded group
    #[serde(default)]
    pub group: Option<String>,
}

impl AppConfig {
    /// Load `config/<env>.yaml` and apply environment overrides
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.sweep.validate()?;
        Ok(config)
    }

    /// Apply `AUTO_APPROVE_WAIT_HOURS`, `SIGHTENGINE_API_USER`,
    /// `SIGHTENGINE_API_KEY`, `JWT_SECRET` and `DATABASE_URL`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("AUTO_APPROVE_WAIT_HOURS") {
            match value.trim().parse::<i64>() {
                Ok(hours) if (0..=MAX_WAIT_HOURS).contains(&hours) => {
                    self.sweep.wait_hours = hours
                }
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        key: "AUTO_APPROVE_WAIT_HOURS",
                        value,
                    });
                }
            }
        }
        if let Some(user) = lookup("SIGHTENGINE_API_USER") {
            self.moderation.api_user = Some(user);
        }
        if let Some(key) = lookup("SIGHTENGINE_API_KEY") {
            self.moderation.api_secret = Some(key);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.postgres_url = Some(url);
        }
        Ok(())
    }
}
