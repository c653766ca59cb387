//! Cloudflare Registrar API client.
//!
//! Uses the Cloudflare v4 REST API for availability, registration and DNS.
//! Every response is decoded into a typed envelope; the `result` payload is
//! only trusted when `success` is true.

use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::RegistrarClient;
use crate::config::CloudflareCredentials;
use crate::error::{RegistrarError, Result};
use crate::types::*;

pub const CLOUDFLARE_API: &str = "https://api.cloudflare.com/client/v4";

/// TLDs checked by a Cloudflare search, in display order.
pub const SEARCH_TLDS: &[&str] = &[
    "com", "net", "org", "io", "co", "site", "online", "store", "shop", "xyz", "app", "dev",
    "live", "fun", "space", "website", "club", "vip", "bet", "games",
];

/// TLDs flagged as recommended in Cloudflare search results.
pub const RECOMMENDED_TLDS: &[&str] = &["site", "online"];

/// Automatic TTL in Cloudflare's DNS API.
const AUTO_TTL: u32 = 1;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

impl<T> Envelope<T> {
    fn first_error(&self) -> Option<String> {
        self.errors.first().map(|e| match e.code {
            Some(code) => format!("{} ({code})", e.message),
            None => e.message.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CandidateResult {
    name: String,
    #[serde(default)]
    available: bool,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    premium: bool,
    #[serde(default)]
    premium_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct RegisteredDomain {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenStatus {
    #[serde(default)]
    status: String,
}

#[derive(Serialize)]
struct CheckBody<'a> {
    domains: &'a [String],
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    privacy: bool,
    auto_renew: bool,
}

fn non_negative(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|p| !p.is_sign_negative())
}

pub struct CloudflareClient {
    client: Client,
    credentials: CloudflareCredentials,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(credentials: CloudflareCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
            base_url: CLOUDFLARE_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.credentials.api_token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.apply_auth(req).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(RegistrarError::ProviderParse(format!(
                    "invalid Cloudflare response: {e}"
                )))
            }
            Err(_) => {
                return Err(RegistrarError::http(
                    Some(status.as_u16()),
                    format!("Cloudflare returned {status}"),
                ))
            }
        };
        if !status.is_success() {
            let message = envelope
                .first_error()
                .unwrap_or_else(|| format!("Cloudflare returned {status}"));
            return Err(RegistrarError::http(Some(status.as_u16()), message));
        }
        if !envelope.success {
            return Err(RegistrarError::ProviderParse(
                envelope
                    .first_error()
                    .unwrap_or_else(|| "Unknown Cloudflare error".to_string()),
            ));
        }
        envelope
            .result
            .ok_or_else(|| {
                RegistrarError::ProviderParse("Cloudflare response has no result".into())
            })
    }

    async fn check_domains(&self, candidates: &[String]) -> Result<Vec<AvailabilityCheck>> {
        debug!(count = candidates.len(), "Checking Cloudflare availability");
        let results: Vec<CandidateResult> = self
            .send(
                self.client
                    .post(self.url("domains/check"))
                    .json(&CheckBody { domains: candidates }),
            )
            .await?;

        let checks = results
            .into_iter()
            .filter_map(|r| match DomainName::parse(&r.name) {
                Ok(domain) => Some(AvailabilityCheck {
                    domain: domain.to_string(),
                    available: r.available,
                    price: non_negative(r.price),
                    premium_price: non_negative(r.premium_price),
                    is_premium: r.premium,
                }),
                Err(_) => {
                    warn!(name = %r.name, "Skipping malformed Cloudflare check result");
                    None
                }
            })
            .collect();
        Ok(checks)
    }
}

#[async_trait::async_trait]
impl RegistrarClient for CloudflareClient {
    fn provider(&self) -> RegistrarProvider {
        RegistrarProvider::Cloudflare
    }

    fn search_plan(&self) -> SearchPlan {
        SearchPlan::Batched(SEARCH_TLDS)
    }

    async fn check_availability(&self, name: &str, tld: &str) -> Result<AvailabilityCheck> {
        let domain = DomainName::new(name, tld)?;
        let fqdn = domain.to_string();
        self.check_domains(std::slice::from_ref(&fqdn))
            .await?
            .into_iter()
            .find(|c| c.domain == fqdn)
            .ok_or_else(|| RegistrarError::ProviderParse(format!("no check result for {fqdn}")))
    }

    async fn check_batch(&self, name: &str, tlds: &[&str]) -> Result<Vec<AvailabilityCheck>> {
        let candidates = tlds
            .iter()
            .map(|tld| DomainName::new(name, tld).map(|d| d.to_string()))
            .collect::<Result<Vec<_>>>()?;
        self.check_domains(&candidates).await
    }

    async fn register_domain(&self, request: &RegistrationRequest) -> Result<RegistrationReceipt> {
        let fqdn = request.domain.to_string();
        let url = self.url(&format!("accounts/{}/domains", self.credentials.account_id));
        debug!(domain = %fqdn, "Registering domain with Cloudflare");

        let registered: RegisteredDomain = self
            .send(self.client.post(url).json(&RegisterBody {
                name: &fqdn,
                privacy: true,
                auto_renew: false,
            }))
            .await
            .map_err(|e| match e {
                RegistrarError::ProviderParse(m) => RegistrarError::Registration(m),
                other => other,
            })?;

        Ok(RegistrationReceipt {
            domain: registered
                .name
                .map(|n| n.to_ascii_lowercase())
                .unwrap_or(fqdn),
            transaction_id: registered.id,
            expires_at: registered.expires_at,
        })
    }

    async fn setup_dns(&self, domain: &DomainName, target_host: &str) -> Result<DnsSetup> {
        let url = self.url(&format!("zones/{}/dns_records", self.credentials.zone_id));
        let record = DnsRecord {
            id: None,
            r#type: "CNAME".to_string(),
            name: domain.to_string(),
            content: target_host.to_string(),
            ttl: Some(AUTO_TTL),
            proxied: Some(true),
        };
        debug!(domain = %domain, target = target_host, "Creating Cloudflare CNAME");

        let created: DnsRecord = self.send(self.client.post(url).json(&record)).await?;
        let points_at_target = created.content.eq_ignore_ascii_case(target_host);
        Ok(DnsSetup {
            record: Some(created),
            points_at_target,
        })
    }

    async fn get_domain_info(&self, domain: &DomainName) -> Result<Option<AvailabilityCheck>> {
        let fqdn = domain.to_string();
        Ok(self
            .check_domains(std::slice::from_ref(&fqdn))
            .await?
            .into_iter()
            .find(|c| c.domain == fqdn))
    }

    async fn verify_credentials(&self) -> Result<bool> {
        let token: TokenStatus = self
            .send(self.client.get(self.url("user/tokens/verify")))
            .await?;
        Ok(token.status == "active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommended_tlds_are_searched() {
        assert_eq!(SEARCH_TLDS.len(), 20);
        for tld in RECOMMENDED_TLDS {
            assert!(SEARCH_TLDS.contains(tld));
        }
    }

    #[test]
    fn envelope_reports_first_error_with_code() {
        let env: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"success":false,"errors":[{"code":1003,"message":"Invalid zone"}],"result":null}"#,
        )
        .expect("decode");
        assert_eq!(env.first_error().as_deref(), Some("Invalid zone (1003)"));
        assert!(env.result.is_none());
    }

    #[test]
    fn negative_prices_are_dropped() {
        assert_eq!(non_negative(Some(Decimal::new(-1, 0))), None);
        assert_eq!(non_negative(Some(Decimal::new(999, 2))), Some(Decimal::new(999, 2)));
    }
}
