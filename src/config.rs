// Configuration
//
// Settings are read from environment variables, each with a default except
// the partner id. The partner id is checked when the signing identity is
// built, not here.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::warn;

use crate::signing::{ContentHashAlgorithm, RequestSigner, SigningError, SigningIdentity};

pub const DEFAULT_SANDBOX_BASE_URL: &str = "https://api.sandbox.payments.example";
pub const DEFAULT_PRODUCTION_BASE_URL: &str = "https://api.payments.example";
pub const DEFAULT_AUDIENCE: &str = "payment-api";
pub const DEFAULT_API_VERSION: &str = "2.0";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Which deployment of the payment API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow!("unknown environment '{}' (expected sandbox or production)", other)),
        }
    }
}

/// Everything needed to build a signing identity and an API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub partner_id: String,
    pub environment: Environment,
    pub sandbox_key_path: PathBuf,
    pub production_key_path: PathBuf,
    pub sandbox_base_url: String,
    pub production_base_url: String,
    pub audience: String,
    pub content_hash: ContentHashAlgorithm,
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            partner_id: String::new(),
            environment: Environment::Sandbox,
            sandbox_key_path: PathBuf::from("./keys/sandbox_private_key.pem"),
            production_key_path: PathBuf::from("./keys/production_private_key.pem"),
            sandbox_base_url: DEFAULT_SANDBOX_BASE_URL.to_string(),
            production_base_url: DEFAULT_PRODUCTION_BASE_URL.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            content_hash: ContentHashAlgorithm::Sha256,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("PAYMENT_ENVIRONMENT") {
            Some(value) => value.parse::<Environment>().context("invalid PAYMENT_ENVIRONMENT")?,
            None => defaults.environment,
        };

        let content_hash = match var("PAYMENT_CONTENT_HASH") {
            Some(value) => value
                .parse::<ContentHashAlgorithm>()
                .map_err(|e| anyhow!(e))
                .context("invalid PAYMENT_CONTENT_HASH")?,
            None => defaults.content_hash,
        };

        let timeout_seconds = match var("PAYMENT_TIMEOUT_SECONDS") {
            Some(value) => value.parse::<u64>().ok().filter(|secs| *secs > 0).unwrap_or_else(|| {
                warn!(
                    "Ignoring invalid PAYMENT_TIMEOUT_SECONDS '{}', using {}",
                    value, DEFAULT_TIMEOUT_SECONDS
                );
                DEFAULT_TIMEOUT_SECONDS
            }),
            None => defaults.timeout_seconds,
        };

        Ok(Self {
            partner_id: var("PAYMENT_PARTNER_ID").unwrap_or_default(),
            environment,
            sandbox_key_path: var("PAYMENT_SANDBOX_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.sandbox_key_path),
            production_key_path: var("PAYMENT_PRODUCTION_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.production_key_path),
            sandbox_base_url: var("PAYMENT_SANDBOX_BASE_URL").unwrap_or(defaults.sandbox_base_url),
            production_base_url: var("PAYMENT_PRODUCTION_BASE_URL").unwrap_or(defaults.production_base_url),
            audience: var("PAYMENT_AUDIENCE").unwrap_or(defaults.audience),
            content_hash,
            api_version: var("PAYMENT_API_VERSION").unwrap_or(defaults.api_version),
            timeout_seconds,
        })
    }

    /// Base URL of the selected environment, without a trailing slash.
    pub fn base_url(&self) -> &str {
        let url = match self.environment {
            Environment::Sandbox => &self.sandbox_base_url,
            Environment::Production => &self.production_base_url,
        };
        url.trim_end_matches('/')
    }

    /// Private key file of the selected environment.
    pub fn key_path(&self) -> &Path {
        match self.environment {
            Environment::Sandbox => &self.sandbox_key_path,
            Environment::Production => &self.production_key_path,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn signer(&self) -> RequestSigner {
        RequestSigner::new(self.content_hash)
    }

    /// Build the partner identity for the selected environment.
    pub fn identity(&self) -> Result<SigningIdentity, SigningError> {
        if self.partner_id.trim().is_empty() {
            return Err(SigningError::Configuration("missing partner id".to_string()));
        }
        SigningIdentity::from_key_file(&self.partner_id, &self.audience, self.key_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.base_url(), DEFAULT_SANDBOX_BASE_URL);
        assert_eq!(config.key_path(), Path::new("./keys/sandbox_private_key.pem"));
        assert_eq!(config.content_hash, ContentHashAlgorithm::Sha256);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.partner_id.is_empty());
    }

    #[test]
    fn test_production_selection() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PAYMENT_PARTNER_ID", "partner-9"),
            ("PAYMENT_ENVIRONMENT", "Production"),
            ("PAYMENT_PRODUCTION_BASE_URL", "https://api.example.test/"),
            ("PAYMENT_PRODUCTION_KEY_PATH", "/etc/keys/prod.pem"),
            ("PAYMENT_CONTENT_HASH", "md5"),
        ]))
        .unwrap();

        assert_eq!(config.partner_id, "partner-9");
        assert_eq!(config.base_url(), "https://api.example.test");
        assert_eq!(config.key_path(), Path::new("/etc/keys/prod.pem"));
        assert_eq!(config.signer().content_hash(), ContentHashAlgorithm::Md5);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ApiConfig::from_lookup(lookup(&[("PAYMENT_ENVIRONMENT", "staging")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("PAYMENT_CONTENT_HASH", "sha1")])).is_err());

        let config = ApiConfig::from_lookup(lookup(&[("PAYMENT_TIMEOUT_SECONDS", "soon")])).unwrap();
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = ApiConfig::from_lookup(lookup(&[("PAYMENT_TIMEOUT_SECONDS", "0")])).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));

        let config = ApiConfig::from_lookup(lookup(&[("PAYMENT_TIMEOUT_SECONDS", "12")])).unwrap();
        assert_eq!(config.timeout_seconds, 12);
    }

    #[test]
    fn test_missing_partner_id() {
        let config = ApiConfig::from_lookup(lookup(&[("PAYMENT_PARTNER_ID", "   ")])).unwrap();
        let err = config.identity().unwrap_err();
        assert!(matches!(err, SigningError::Configuration(_)));
    }
}
