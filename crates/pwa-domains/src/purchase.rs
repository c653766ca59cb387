use chrono::{DateTime, Months, SecondsFormat, Utc};
use pwa_registrar::{DomainName, RegistrarClient, RegistrarProvider, RegistrationRequest};
use tracing::{error, info, info_span, warn, Instrument};

use crate::types::{DomainPurchaseRequest, DomainPurchaseResult};

/// Namecheap does not report an expiry, and every registration is for one
/// year, so the expiry is derived from the purchase time.
pub fn one_year_from(now: DateTime<Utc>) -> String {
    let expiry = now.checked_add_months(Months::new(12)).unwrap_or(now);
    expiry.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone)]
pub struct PurchaseCoordinator {
    revalidate: bool,
}

impl Default for PurchaseCoordinator {
    fn default() -> Self {
        Self { revalidate: true }
    }
}

impl PurchaseCoordinator {
    pub fn new(revalidate: bool) -> Self {
        Self { revalidate }
    }

    /// Run one purchase. Every operational failure is folded into the
    /// returned result.
    pub async fn purchase(
        &self,
        client: &dyn RegistrarClient,
        request: &DomainPurchaseRequest,
    ) -> DomainPurchaseResult {
        let span = info_span!(
            "purchase",
            provider = %request.provider,
            domain = %request.domain,
            user_id = %request.user_id
        );
        async {
            let result = self.run(client, request).await;
            match &result.error {
                None => info!(
                    transaction_id = result.transaction_id.as_deref().unwrap_or(""),
                    expiry = result.expiry_date.as_deref().unwrap_or(""),
                    "Domain purchased"
                ),
                Some(e) => error!(error = %e, "Domain purchase failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        client: &dyn RegistrarClient,
        request: &DomainPurchaseRequest,
    ) -> DomainPurchaseResult {
        if client.provider() != request.provider {
            return DomainPurchaseResult::failed(format!(
                "Request names {} but the {} client was supplied",
                request.provider,
                client.provider()
            ));
        }
        let domain = match DomainName::parse(&request.domain) {
            Ok(domain) => domain,
            Err(e) => return DomainPurchaseResult::failed(e.to_string()),
        };
        if request.price.is_sign_negative() {
            return DomainPurchaseResult::failed(format!("Invalid price: {}", request.price));
        }

        if self.revalidate {
            if let Err(reason) = Self::revalidate(client, &domain, request).await {
                return DomainPurchaseResult::failed(reason);
            }
        } else {
            warn!("Purchasing without re-checking availability");
        }

        let registration = RegistrationRequest {
            domain,
            registrant: request.registrant.clone(),
            client_ip: request.client_ip.clone(),
        };
        match client.register_domain(&registration).await {
            Ok(receipt) => {
                let expiry = match request.provider {
                    RegistrarProvider::Namecheap => Some(one_year_from(Utc::now())),
                    RegistrarProvider::Cloudflare => receipt.expires_at,
                };
                DomainPurchaseResult::succeeded(
                    registration.domain.to_string(),
                    receipt.transaction_id,
                    expiry,
                )
            }
            Err(e) => DomainPurchaseResult::failed(e.detail()),
        }
    }

    async fn revalidate(
        client: &dyn RegistrarClient,
        domain: &DomainName,
        request: &DomainPurchaseRequest,
    ) -> Result<(), String> {
        let check = match client.get_domain_info(domain).await {
            Ok(Some(check)) => check,
            Ok(None) => return Err(format!("Domain {domain} could not be re-checked")),
            Err(e) => return Err(format!("Availability re-check failed: {}", e.detail())),
        };
        if !check.available {
            return Err(format!("Domain {domain} is no longer available"));
        }
        match check.price {
            Some(live) if live > request.price => Err(format!(
                "Price for {domain} rose from {} to {live}",
                request.price
            )),
            _ => Ok(()),
        }
    }
}
