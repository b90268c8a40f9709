//! Layered gateway configuration: defaults, then a YAML file, then
//! `JSONAPI__`-prefixed environment variables
//! (e.g. `JSONAPI__ACL__CHECK_ACCESS=true` maps to `acl.check_access`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use jsonapi_acl::{AclConfig, JwtConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load gateway configuration: {0}")]
    Extract(#[from] figment::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GatewayConfig {
    pub acl: AclConfig,
    pub jwt: JwtConfig,
}

impl GatewayConfig {
    /// Load configuration with layered loading: defaults → YAML file → env.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config = Figment::new()
            .merge(Serialized::defaults(GatewayConfig::default()))
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed("JSONAPI__").split("__"))
            .extract()?;

        Ok(config)
    }
}
