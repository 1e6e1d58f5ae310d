//! Host configuration, read once at startup.

use thiserror::Error;

use bookstore_core::{ClientId, DomainError, OrgId};
use bookstore_hooks::ProvisioningConfig;

pub const ENV_BIND_ADDR: &str = "BOOKSTORE_BIND_ADDR";
pub const ENV_CLIENT: &str = "BOOKSTORE_CLIENT";
pub const ENV_ORGANIZATION: &str = "BOOKSTORE_ORGANIZATION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: {source}")]
    InvalidId {
        key: &'static str,
        #[source]
        source: DomainError,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// Client the seeded reference data and request principal belong to.
    pub client: ClientId,
    pub organization: OrgId,
    pub provisioning: ProvisioningConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            // Fresh tenant per process unless configured.
            client: ClientId::generate(),
            organization: OrgId::generate(),
            provisioning: ProvisioningConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            provisioning: ProvisioningConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(v) = lookup(ENV_BIND_ADDR).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = v.trim().to_string();
        }
        if let Some(v) = lookup(ENV_CLIENT) {
            config.client = v
                .parse()
                .map_err(|source| ConfigError::InvalidId { key: ENV_CLIENT, source })?;
        }
        if let Some(v) = lookup(ENV_ORGANIZATION) {
            config.organization = v
                .parse()
                .map_err(|source| ConfigError::InvalidId { key: ENV_ORGANIZATION, source })?;
        }

        Ok(config)
    }
}
