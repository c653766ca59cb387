//! Environment-driven configuration for the acquisition facade.

use std::time::Duration;

use pwa_registrar::{CloudflareCredentials, NamecheapCredentials, RegistrarError, RegistrarProvider};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Credentials(#[from] RegistrarError),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub default_provider: RegistrarProvider,
    pub namecheap: Option<NamecheapCredentials>,
    pub namecheap_sandbox: bool,
    pub namecheap_api_url: Option<String>,
    pub cloudflare: Option<CloudflareCredentials>,
    pub cloudflare_api_url: Option<String>,
    pub price_cache_ttl: Option<Duration>,
    pub purchase_revalidate: bool,
}

fn flag(value: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value.map(|v| v.trim().to_ascii_lowercase()).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match value.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            message: format!("expected a boolean, got {value:?}"),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AcquisitionConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Credentials for the default provider are required. The other
    /// provider's are optional; calls that select it without credentials
    /// fail with `CredentialsMissing`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_provider = match non_empty(lookup("DOMAIN_PROVIDER")) {
            Some(p) => p.parse().map_err(|message| ConfigError::Invalid {
                key: "DOMAIN_PROVIDER",
                message,
            })?,
            None => RegistrarProvider::Namecheap,
        };

        let namecheap = NamecheapCredentials::from_lookup(&lookup);
        let cloudflare = CloudflareCredentials::from_lookup(&lookup);
        let (namecheap, cloudflare) = match default_provider {
            RegistrarProvider::Namecheap => (Some(namecheap?), cloudflare.ok()),
            RegistrarProvider::Cloudflare => (namecheap.ok(), Some(cloudflare?)),
        };

        let price_cache_ttl = match non_empty(lookup("PRICE_CACHE_TTL_SECS")) {
            Some(secs) => Some(Duration::from_secs(secs.parse().map_err(|_| ConfigError::Invalid {
                key: "PRICE_CACHE_TTL_SECS",
                message: format!("expected whole seconds, got {secs:?}"),
            })?)),
            None => None,
        };

        Ok(Self {
            default_provider,
            namecheap,
            namecheap_sandbox: flag(lookup("NAMECHEAP_SANDBOX"), "NAMECHEAP_SANDBOX", false)?,
            namecheap_api_url: non_empty(lookup("NAMECHEAP_API_URL")),
            cloudflare,
            cloudflare_api_url: non_empty(lookup("CLOUDFLARE_API_URL")),
            price_cache_ttl,
            purchase_revalidate: flag(lookup("PURCHASE_REVALIDATE"), "PURCHASE_REVALIDATE", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    const NAMECHEAP: &[(&str, &str)] = &[
        ("NAMECHEAP_API_USER", "apiuser"),
        ("NAMECHEAP_API_KEY", "secret"),
        ("NAMECHEAP_USERNAME", "user"),
    ];

    #[test]
    fn defaults_to_namecheap() {
        let config = AcquisitionConfig::from_lookup(env(NAMECHEAP)).unwrap();
        assert_eq!(config.default_provider, RegistrarProvider::Namecheap);
        assert_eq!(config.namecheap.unwrap().client_ip, "127.0.0.1");
        assert!(config.cloudflare.is_none());
        assert!(config.purchase_revalidate);
        assert!(!config.namecheap_sandbox);
        assert_eq!(config.price_cache_ttl, None);
    }

    #[test]
    fn default_provider_credentials_are_required() {
        let err =
            AcquisitionConfig::from_lookup(env(&[("DOMAIN_PROVIDER", "cloudflare")])).unwrap_err();
        match err {
            ConfigError::Credentials(RegistrarError::CredentialsMissing(keys)) => {
                assert_eq!(keys, "CLOUDFLARE_API_TOKEN, CLOUDFLARE_ZONE_ID, CLOUDFLARE_ACCOUNT_ID")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reads_optional_settings() {
        let mut pairs = NAMECHEAP.to_vec();
        pairs.extend([
            ("PRICE_CACHE_TTL_SECS", "3600"),
            ("PURCHASE_REVALIDATE", "false"),
            ("NAMECHEAP_SANDBOX", "1"),
            ("CLOUDFLARE_API_URL", "http://localhost:9000"),
        ]);
        let config = AcquisitionConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.price_cache_ttl, Some(Duration::from_secs(3600)));
        assert!(!config.purchase_revalidate);
        assert!(config.namecheap_sandbox);
        assert_eq!(config.cloudflare_api_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut pairs = NAMECHEAP.to_vec();
        pairs.push(("DOMAIN_PROVIDER", "godaddy"));
        assert!(matches!(
            AcquisitionConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: "DOMAIN_PROVIDER", .. })
        ));

        let mut pairs = NAMECHEAP.to_vec();
        pairs.push(("PRICE_CACHE_TTL_SECS", "soon"));
        assert!(matches!(
            AcquisitionConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: "PRICE_CACHE_TTL_SECS", .. })
        ));
    }
}
