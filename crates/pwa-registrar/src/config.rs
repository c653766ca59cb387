//! Registrar credentials.
//!
//! Credentials are read once through a lookup function (normally the process
//! environment) and never mutated afterwards. A missing required value is a
//! configuration error reported before any network call.

use crate::error::{RegistrarError, Result};

pub const DEFAULT_CLIENT_IP: &str = "127.0.0.1";

#[derive(Clone)]
pub struct NamecheapCredentials {
    pub api_user: String,
    pub api_key: String,
    pub username: String,
    pub client_ip: String,
}

#[derive(Clone)]
pub struct CloudflareCredentials {
    pub api_token: String,
    pub zone_id: String,
    pub account_id: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for NamecheapCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamecheapCredentials")
            .field("api_user", &self.api_user)
            .field("username", &self.username)
            .field("client_ip", &self.client_ip)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for CloudflareCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareCredentials")
            .field("zone_id", &self.zone_id)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

fn required<F>(lookup: &F, key: &str, missing: &mut Vec<String>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(key.to_string());
            String::new()
        }
    }
}

impl NamecheapCredentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let api_user = required(&lookup, "NAMECHEAP_API_USER", &mut missing);
        let api_key = required(&lookup, "NAMECHEAP_API_KEY", &mut missing);
        let username = required(&lookup, "NAMECHEAP_USERNAME", &mut missing);
        if !missing.is_empty() {
            return Err(RegistrarError::CredentialsMissing(missing.join(", ")));
        }
        let client_ip = lookup("NAMECHEAP_CLIENT_IP")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_IP.to_string());
        Ok(Self {
            api_user,
            api_key,
            username,
            client_ip,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

impl CloudflareCredentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let api_token = required(&lookup, "CLOUDFLARE_API_TOKEN", &mut missing);
        let zone_id = required(&lookup, "CLOUDFLARE_ZONE_ID", &mut missing);
        let account_id = required(&lookup, "CLOUDFLARE_ACCOUNT_ID", &mut missing);
        if !missing.is_empty() {
            return Err(RegistrarError::CredentialsMissing(missing.join(", ")));
        }
        Ok(Self {
            api_token,
            zone_id,
            account_id,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}
