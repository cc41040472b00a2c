//! Configuration figée à la compilation (`PARKING_*` lus par `option_env!`).

use parking_core::config::{API_URL_KEY, PWNED_URL_KEY, USER_POOL_CLIENT_ID_KEY, USER_POOL_ID_KEY};
use parking_core::error::ConfigError;
use parking_core::ClientConfig;

const BUILD_ENV: [(&str, Option<&str>); 4] = [
    (API_URL_KEY, option_env!("PARKING_API_URL")),
    (USER_POOL_ID_KEY, option_env!("PARKING_USER_POOL_ID")),
    (USER_POOL_CLIENT_ID_KEY, option_env!("PARKING_USER_POOL_CLIENT_ID")),
    (PWNED_URL_KEY, option_env!("PARKING_PWNED_URL")),
];

pub fn load() -> Result<ClientConfig, ConfigError> {
    ClientConfig::from_lookup(|key| {
        BUILD_ENV
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.map(str::to_string))
    })
}
