//! Runtime configuration of the client.
//!
//! Values come from a key lookup so the same code serves the browser
//! (compile time `option_env!`) and native tooling (process environment,
//! optionally primed from a `.env` file).

use serde::Deserialize;

use crate::error::ConfigError;

pub const API_URL_KEY: &str = "PARKING_API_URL";
pub const USER_POOL_ID_KEY: &str = "PARKING_USER_POOL_ID";
pub const USER_POOL_CLIENT_ID_KEY: &str = "PARKING_USER_POOL_CLIENT_ID";
pub const PWNED_URL_KEY: &str = "PARKING_PWNED_URL";

pub const DEFAULT_PWNED_URL: &str = "https://api.pwnedpasswords.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoConfig {
    pub user_pool_id: String,
    pub client_id:    String,
}

impl CognitoConfig {
    /// `eu-west-2_AbCdEf` → `eu-west-2`.
    pub fn region(&self) -> Result<&str, ConfigError> {
        match self.user_pool_id.split_once('_') {
            Some((region, rest)) if !region.is_empty() && !rest.is_empty() => Ok(region),
            _ => Err(ConfigError::InvalidUserPool(self.user_pool_id.clone())),
        }
    }

    pub fn endpoint(&self) -> Result<String, ConfigError> {
        Ok(format!("https://cognito-idp.{}.amazonaws.com/", self.region()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_base_url: String,
    pub cognito:      CognitoConfig,
    pub pwned_url:    String,
}

impl ClientConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let config = ClientConfig {
            api_base_url: required(API_URL_KEY)?.trim_end_matches('/').to_string(),
            cognito: CognitoConfig {
                user_pool_id: required(USER_POOL_ID_KEY)?,
                client_id:    required(USER_POOL_CLIENT_ID_KEY)?,
            },
            pwned_url: lookup(PWNED_URL_KEY)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PWNED_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        config.cognito.region()?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
