//! Shared types for the domain acquisition clients.
//!
//! Every registrar client normalises its API responses into these types so
//! callers never see a provider's wire format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RegistrarError, Result};

/// Supported registrar providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RegistrarProvider {
    Namecheap,
    Cloudflare,
}

impl std::fmt::Display for RegistrarProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namecheap => write!(f, "namecheap"),
            Self::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

impl std::str::FromStr for RegistrarProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "namecheap" => Ok(Self::Namecheap),
            "cloudflare" => Ok(Self::Cloudflare),
            other => Err(format!("unknown registrar provider: {other}")),
        }
    }
}

/// A lowercase `name.tld` pair with exactly one dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    name: String,
    tld: String,
}

impl DomainName {
    pub fn new(name: &str, tld: &str) -> Result<Self> {
        let name = name.trim().to_ascii_lowercase();
        let tld = tld.trim().trim_start_matches('.').to_ascii_lowercase();
        if !is_valid_label(&name) || !is_valid_label(&tld) {
            return Err(RegistrarError::InvalidDomain(format!("{name}.{tld}")));
        }
        Ok(Self { name, tld })
    }

    /// Parse a full `name.tld` string.
    pub fn parse(domain: &str) -> Result<Self> {
        let domain = domain.trim().trim_end_matches('.');
        match domain.split_once('.') {
            Some((name, tld)) if !tld.contains('.') => Self::new(name, tld),
            _ => Err(RegistrarError::InvalidDomain(domain.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tld(&self) -> &str {
        &self.tld
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.name, self.tld)
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Registrant contact, required by Namecheap and ignored by Cloudflare.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub organization: Option<String>,
}

/// Outcome of checking a single candidate domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    pub domain: String,
    pub available: bool,
    pub price: Option<Decimal>,
    pub premium_price: Option<Decimal>,
    pub is_premium: bool,
}

impl AvailabilityCheck {
    /// Placeholder used when a check fails inside a fan-out.
    pub fn unavailable(domain: impl std::fmt::Display) -> Self {
        Self {
            domain: domain.to_string(),
            available: false,
            price: None,
            premium_price: None,
            is_premium: false,
        }
    }
}

/// How a client prefers to be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPlan {
    /// One concurrent `check_availability` per TLD.
    FanOut(&'static [&'static str]),
    /// A single `check_batch` covering every TLD.
    Batched(&'static [&'static str]),
}

impl SearchPlan {
    pub fn tlds(&self) -> &'static [&'static str] {
        match self {
            Self::FanOut(t) | Self::Batched(t) => t,
        }
    }
}

/// Adapter-level purchase input.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub domain: DomainName,
    pub registrant: Option<Contact>,
    /// Overrides the client IP configured with the credentials.
    pub client_ip: Option<String>,
}

/// What a registrar told us about a completed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub domain: String,
    pub transaction_id: Option<String>,
    /// Expiry exactly as the registrar reported it, if it did.
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub r#type: String,
    pub name: String,
    pub content: String,
    pub ttl: Option<u32>,
    pub proxied: Option<bool>,
}

/// Result of a DNS setup call at the adapter level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsSetup {
    pub record: Option<DnsRecord>,
    /// Whether the resulting DNS state references the requested target host.
    pub points_at_target: bool,
}
