//! Results handed to the collaborator layer, which persists them.

use pwa_registrar::{AvailabilityCheck, Contact, DnsRecord, RegistrarProvider};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainSearchResult {
    pub domain: String,
    pub available: bool,
    pub price: Option<Decimal>,
    pub premium_price: Option<Decimal>,
    pub is_premium: bool,
    pub provider: RegistrarProvider,
    #[serde(default)]
    pub recommended: bool,
}

impl DomainSearchResult {
    pub fn from_check(
        check: AvailabilityCheck,
        provider: RegistrarProvider,
        recommended: bool,
    ) -> Self {
        Self {
            domain: check.domain,
            available: check.available,
            price: check.price,
            premium_price: check.premium_price,
            is_premium: check.is_premium,
            provider,
            recommended,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPurchaseRequest {
    pub domain: String,
    pub price: Decimal,
    pub user_id: String,
    pub provider: RegistrarProvider,
    #[serde(default)]
    pub registrant: Option<Contact>,
    #[serde(default)]
    pub client_ip: Option<String>,
}

/// Either the success fields or `error` is populated, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainPurchaseResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub domain: Option<String>,
    pub expiry_date: Option<String>,
    pub error: Option<String>,
}

impl DomainPurchaseResult {
    pub fn succeeded(
        domain: String,
        transaction_id: Option<String>,
        expiry_date: Option<String>,
    ) -> Self {
        Self {
            success: true,
            transaction_id,
            domain: Some(domain),
            expiry_date,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            domain: None,
            expiry_date: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsSetupResult {
    pub success: bool,
    pub domain: String,
    pub provider: RegistrarProvider,
    pub target_host: String,
    /// Whether the resulting DNS state references `target_host`.
    pub points_at_target: bool,
    pub record: Option<DnsRecord>,
    /// Set on failure, and when the provider could not honour the target.
    pub warning: Option<String>,
}
