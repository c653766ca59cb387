//! Namecheap API client.
//!
//! Namecheap uses an XML-based API authenticated with query-string
//! credentials. Responses are decoded in `response` and normalised into the
//! crate's types.
//!
//! Reference: https://www.namecheap.com/support/api/methods/

pub mod pricing;
pub mod response;

use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::RegistrarClient;
use crate::config::NamecheapCredentials;
use crate::error::{RegistrarError, Result};
use crate::price_cache::PriceCache;
use crate::types::*;
use response::ApiResponse;

pub const NAMECHEAP_API: &str = "https://api.namecheap.com/xml.response";
pub const NAMECHEAP_SANDBOX: &str = "https://api.sandbox.namecheap.com/xml.response";

const CONTACT_ROLES: [&str; 4] = ["Registrant", "Tech", "Admin", "AuxBilling"];

/// Strip everything but digits and drop a leading North American `1` from an
/// eleven digit number.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest.to_string(),
        _ => digits,
    }
}

pub struct NamecheapClient {
    client: Client,
    credentials: NamecheapCredentials,
    base_url: String,
    prices: Arc<dyn PriceCache>,
}

impl NamecheapClient {
    pub fn new(
        credentials: NamecheapCredentials,
        sandbox: bool,
        prices: Arc<dyn PriceCache>,
    ) -> Self {
        Self {
            client: Client::new(),
            credentials,
            base_url: (if sandbox { NAMECHEAP_SANDBOX } else { NAMECHEAP_API }).to_string(),
            prices,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn base_params(&self, command: &str, client_ip: Option<&str>) -> Vec<(String, String)> {
        let client_ip = client_ip.unwrap_or(&self.credentials.client_ip);
        vec![
            ("ApiUser".into(), self.credentials.api_user.clone()),
            ("ApiKey".into(), self.credentials.api_key.clone()),
            ("UserName".into(), self.credentials.username.clone()),
            ("ClientIp".into(), client_ip.to_string()),
            ("Command".into(), command.to_string()),
        ]
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let resp = request.send().await?;
        let status = resp.status();
        let xml = resp.text().await?;
        if !status.is_success() {
            return Err(RegistrarError::http(
                Some(status.as_u16()),
                response::error_message(&xml),
            ));
        }
        Ok(xml)
    }

    async fn get(&self, params: &[(String, String)]) -> Result<String> {
        self.send(self.client.get(&self.base_url).query(params)).await
    }

    /// Registration price for `tld`, served from the cache when possible.
    ///
    /// Never fails: a pricing error or an unusable price falls back to the
    /// tier default, and whichever value is used gets cached.
    pub async fn get_domain_price(&self, tld: &str) -> Decimal {
        let tld = tld.trim_start_matches('.').to_ascii_lowercase();
        if let Some(price) = self.prices.get(&tld) {
            return price;
        }
        let price = match self.fetch_price(&tld).await {
            Ok(price) => price,
            Err(e) => {
                let fallback = pricing::fallback_price(&tld);
                warn!(
                    tld = %tld,
                    error = %e,
                    fallback = %fallback,
                    "Namecheap pricing unavailable, using tier default"
                );
                fallback
            }
        };
        self.prices.set(&tld, price);
        price
    }

    async fn fetch_price(&self, tld: &str) -> Result<Decimal> {
        let mut params = self.base_params("namecheap.users.getPricing", None);
        params.push(("ProductType".into(), "DOMAIN".into()));
        params.push(("ProductCategory".into(), "REGISTER".into()));
        params.push(("ActionName".into(), "REGISTER".into()));
        params.push(("ProductName".into(), tld.to_uppercase()));
        debug!(tld, "Fetching Namecheap pricing");
        let xml = self.get(&params).await?;
        ApiResponse::decode(&xml)?;
        match response::product_price(&xml, tld) {
            Some(price) if !price.is_sign_negative() => Ok(price),
            Some(price) => Err(RegistrarError::ProviderParse(format!(
                "negative price {price} for .{tld}"
            ))),
            None => Err(RegistrarError::ProviderParse(format!(
                "no price listed for .{tld}"
            ))),
        }
    }

    /// Contact blocks for every role. Phones are submitted with the `+1`
    /// country code, so registrants must have a US or Canada number.
    fn contact_params(contact: &Contact) -> Result<Vec<(String, String)>> {
        let digits = normalize_phone(&contact.phone);
        if digits.is_empty() || digits.len() > 10 {
            return Err(RegistrarError::Registration(format!(
                "Registrant phone {:?} is not a US or Canada number",
                contact.phone
            )));
        }
        let phone = format!("+1.{digits}");
        let mut params = Vec::new();
        for role in CONTACT_ROLES {
            let mut push = |field: &str, value: &str| {
                params.push((format!("{role}{field}"), value.to_string()));
            };
            push("FirstName", &contact.first_name);
            push("LastName", &contact.last_name);
            push("Address1", &contact.address1);
            if let Some(address2) = &contact.address2 {
                push("Address2", address2);
            }
            push("City", &contact.city);
            push("StateProvince", &contact.state_province);
            push("PostalCode", &contact.postal_code);
            push("Country", &contact.country);
            push("Phone", &phone);
            push("EmailAddress", &contact.email);
            if let Some(org) = &contact.organization {
                push("OrganizationName", org);
            }
        }
        Ok(params)
    }
}

#[async_trait::async_trait]
impl RegistrarClient for NamecheapClient {
    fn provider(&self) -> RegistrarProvider {
        RegistrarProvider::Namecheap
    }

    fn search_plan(&self) -> SearchPlan {
        SearchPlan::FanOut(pricing::SEARCH_TLDS)
    }

    async fn check_availability(&self, name: &str, tld: &str) -> Result<AvailabilityCheck> {
        let mut checks = self.check_batch(name, &[tld]).await?;
        checks
            .pop()
            .ok_or_else(|| {
                RegistrarError::ProviderParse(format!("no check result for {name}.{tld}"))
            })
    }

    /// One `domains.check` call with a comma-separated `DomainList`. Fails as
    /// a whole if the call fails or any candidate is missing from the answer.
    async fn check_batch(&self, name: &str, tlds: &[&str]) -> Result<Vec<AvailabilityCheck>> {
        let domains = tlds
            .iter()
            .map(|tld| DomainName::new(name, tld))
            .collect::<Result<Vec<_>>>()?;
        let list = domains
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let mut params = self.base_params("namecheap.domains.check", None);
        params.push(("DomainList".into(), list.clone()));
        debug!(domains = %list, "Checking Namecheap availability");

        let xml = self.get(&params).await?;
        let resp = ApiResponse::decode(&xml)?;
        let mut decoded = Vec::with_capacity(domains.len());
        for domain in &domains {
            let fqdn = domain.to_string();
            let result = resp
                .find("DomainCheckResult", "Domain", &fqdn)
                .ok_or_else(|| {
                    RegistrarError::ProviderParse(format!("no check result for {fqdn}"))
                })?;
            let is_premium = result.flag("IsPremiumName");
            let premium_price = if is_premium {
                result
                    .decimal("PremiumRegistrationPrice")
                    .filter(|p| !p.is_sign_negative() && !p.is_zero())
            } else {
                None
            };
            decoded.push((domain, fqdn, result.flag("Available"), is_premium, premium_price));
        }

        let mut checks = Vec::with_capacity(decoded.len());
        for (domain, fqdn, available, is_premium, premium_price) in decoded {
            let price = if !available {
                None
            } else if let Some(premium) = premium_price {
                Some(premium)
            } else {
                Some(self.get_domain_price(domain.tld()).await)
            };
            checks.push(AvailabilityCheck {
                domain: fqdn,
                available,
                price,
                premium_price,
                is_premium,
            });
        }
        Ok(checks)
    }

    async fn register_domain(&self, request: &RegistrationRequest) -> Result<RegistrationReceipt> {
        let contact = request.registrant.as_ref().ok_or_else(|| {
            RegistrarError::Registration(
                "Registrant contact information is required for Namecheap".to_string(),
            )
        })?;
        let fqdn = request.domain.to_string();
        let mut params = self.base_params("namecheap.domains.create", request.client_ip.as_deref());
        params.push(("DomainName".into(), fqdn.clone()));
        params.push(("Years".into(), "1".into()));
        params.push(("AddFreeWhoisguard".into(), "yes".into()));
        params.push(("WGEnabled".into(), "yes".into()));
        params.extend(Self::contact_params(contact)?);
        debug!(domain = %fqdn, "Registering domain with Namecheap");

        let xml = self
            .send(self.client.post(&self.base_url).query(&params))
            .await?;
        let resp = ApiResponse::decode(&xml).map_err(|e| RegistrarError::Registration(e.detail()))?;
        if let Some(created) = resp.find("DomainCreateResult", "Domain", &fqdn) {
            if created.attr("Registered").is_some() && !created.flag("Registered") {
                return Err(RegistrarError::Registration(format!(
                    "Namecheap did not register {fqdn}"
                )));
            }
        }

        Ok(RegistrationReceipt {
            domain: fqdn,
            transaction_id: resp.transaction_id(),
            // The create response carries no usable expiry.
            expires_at: None,
        })
    }

    async fn setup_dns(&self, domain: &DomainName, target_host: &str) -> Result<DnsSetup> {
        let mut params = self.base_params("namecheap.domains.dns.setDefault", None);
        params.push(("SLD".into(), domain.name().to_string()));
        params.push(("TLD".into(), domain.tld().to_string()));
        debug!(domain = %domain, "Resetting Namecheap DNS to registrar defaults");

        let xml = self.get(&params).await?;
        let resp = ApiResponse::decode(&xml)?;
        let updated = resp
            .elements("DomainDNSSetDefaultResult")
            .next()
            .map(|el| el.flag("Updated"))
            .unwrap_or(false);
        if !updated {
            return Err(RegistrarError::ProviderParse(format!(
                "Namecheap did not update DNS for {domain}"
            )));
        }

        warn!(
            domain = %domain,
            target = target_host,
            "Namecheap parks DNS on its default hosts; target host not applied"
        );
        Ok(DnsSetup {
            record: None,
            points_at_target: false,
        })
    }

    async fn get_domain_info(&self, domain: &DomainName) -> Result<Option<AvailabilityCheck>> {
        self.check_availability(domain.name(), domain.tld())
            .await
            .map(Some)
    }

    async fn verify_credentials(&self) -> Result<bool> {
        // Cheapest call: list domains page 1 with 1 result
        let mut params = self.base_params("namecheap.domains.getList", None);
        params.push(("PageSize".into(), "1".into()));
        let xml = self.get(&params).await?;
        Ok(ApiResponse::decode(&xml).is_ok())
    }
}
