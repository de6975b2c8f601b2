use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Listener settings shared by every service in the workspace. Service crates
/// flatten this into their own config struct and layer domain sections on top.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load from the optional `configuration` file and `APP__`-prefixed
    /// environment variables, with `.env` applied first.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read an environment variable with strictness tied to the deployment:
/// production (`strict`) must set every key explicitly, dev falls back to
/// `default` when one is given.
pub fn require_env(key: &str, default: Option<&str>, strict: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if strict {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_combines_host_and_port() {
        let config = Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 9000,
        };
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn require_env_defaults_only_outside_strict_mode() {
        let key = "SERVICE_CORE_TEST_UNSET_KEY";
        assert_eq!(
            require_env(key, Some("fallback"), false).unwrap(),
            "fallback"
        );
        assert!(require_env(key, Some("fallback"), true).is_err());
        assert!(require_env(key, None, false).is_err());
    }

    #[test]
    fn require_env_prefers_the_set_value() {
        let key = "SERVICE_CORE_TEST_SET_KEY";
        env::set_var(key, "explicit");
        assert_eq!(require_env(key, Some("fallback"), false).unwrap(), "explicit");
        assert_eq!(require_env(key, None, true).unwrap(), "explicit");
        env::remove_var(key);
    }
}
