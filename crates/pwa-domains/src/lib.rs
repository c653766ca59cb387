//! Domain acquisition for provisioned PWA landing pages.
//!
//! [`DomainAcquisition`] is the surface collaborators call: it searches the
//! selected registrar, buys a domain and points its DNS at a target host.
//! Apart from `CredentialsMissing`, every operation reports failure inside its
//! result value.

pub mod config;
pub mod dns;
pub mod logging;
pub mod purchase;
pub mod search;
pub mod selector;
pub mod types;

#[cfg(test)]
mod test_utils;

use std::collections::HashMap;
use std::sync::Arc;

use pwa_registrar::{
    cloudflare::RECOMMENDED_TLDS, CloudflareClient, DomainName, InMemoryPriceCache, NamecheapClient,
    PriceCache, RegistrarClient, RegistrarError, RegistrarProvider, Result,
};
use tracing::{info, info_span, warn, Instrument};

pub use config::{AcquisitionConfig, ConfigError};
pub use dns::DnsConfigurator;
pub use purchase::PurchaseCoordinator;
pub use search::DomainSearch;
pub use selector::ProviderSelector;
pub use types::{DnsSetupResult, DomainPurchaseRequest, DomainPurchaseResult, DomainSearchResult};

pub struct DomainAcquisition {
    clients: HashMap<RegistrarProvider, Arc<dyn RegistrarClient>>,
    selector: ProviderSelector,
    search: DomainSearch,
    purchases: PurchaseCoordinator,
    dns: DnsConfigurator,
}

impl DomainAcquisition {
    /// Fails with `CredentialsMissing` when no client backs the selector's
    /// current provider.
    pub fn new(
        selector: ProviderSelector,
        clients: impl IntoIterator<Item = Arc<dyn RegistrarClient>>,
        purchases: PurchaseCoordinator,
    ) -> Result<Self> {
        let clients: HashMap<_, _> = clients.into_iter().map(|c| (c.provider(), c)).collect();
        let acquisition = Self {
            clients,
            selector,
            search: DomainSearch::default(),
            purchases,
            dns: DnsConfigurator,
        };
        acquisition.client(acquisition.get_provider())?;
        Ok(acquisition)
    }

    pub fn from_config(config: &AcquisitionConfig) -> Result<Self> {
        let prices: Arc<dyn PriceCache> =
            Arc::new(InMemoryPriceCache::with_ttl(config.price_cache_ttl));
        let mut clients: Vec<Arc<dyn RegistrarClient>> = Vec::new();

        if let Some(credentials) = &config.namecheap {
            let mut client =
                NamecheapClient::new(credentials.clone(), config.namecheap_sandbox, prices);
            if let Some(url) = &config.namecheap_api_url {
                client = client.with_base_url(url.clone());
            }
            clients.push(Arc::new(client));
        }
        if let Some(credentials) = &config.cloudflare {
            let mut client = CloudflareClient::new(credentials.clone());
            if let Some(url) = &config.cloudflare_api_url {
                client = client.with_base_url(url.clone());
            }
            clients.push(Arc::new(client));
        }

        Self::new(
            ProviderSelector::new(config.default_provider),
            clients,
            PurchaseCoordinator::new(config.purchase_revalidate),
        )
    }

    fn client(&self, provider: RegistrarProvider) -> Result<Arc<dyn RegistrarClient>> {
        self.clients
            .get(&provider)
            .cloned()
            .ok_or_else(|| {
                RegistrarError::CredentialsMissing(format!("{provider} is not configured"))
            })
    }

    pub fn get_provider(&self) -> RegistrarProvider {
        self.selector.get()
    }

    /// Affects operations started after this call only.
    pub fn set_provider(&self, provider: RegistrarProvider) {
        let previous = self.selector.set(provider);
        if previous != provider {
            info!(%previous, %provider, "Registrar provider switched");
        }
    }

    pub fn is_configured(&self, provider: RegistrarProvider) -> bool {
        self.clients.contains_key(&provider)
    }

    pub async fn search_domains(&self, query: &str) -> Result<Vec<DomainSearchResult>> {
        self.search_domains_with(self.get_provider(), query).await
    }

    pub async fn search_domains_with(
        &self,
        provider: RegistrarProvider,
        query: &str,
    ) -> Result<Vec<DomainSearchResult>> {
        let client = self.client(provider)?;
        let span = info_span!("search", %provider, query);
        Ok(self.search.search(client.as_ref(), query).instrument(span).await)
    }

    /// Uses the provider named in the request, never the selector.
    pub async fn purchase_domain(
        &self,
        request: &DomainPurchaseRequest,
    ) -> Result<DomainPurchaseResult> {
        let client = self.client(request.provider)?;
        Ok(self.purchases.purchase(client.as_ref(), request).await)
    }

    pub async fn setup_dns(&self, domain: &str, target: &str) -> Result<DnsSetupResult> {
        self.setup_dns_with(self.get_provider(), domain, target).await
    }

    pub async fn setup_dns_with(
        &self,
        provider: RegistrarProvider,
        domain: &str,
        target: &str,
    ) -> Result<DnsSetupResult> {
        let client = self.client(provider)?;
        Ok(self.dns.setup(client.as_ref(), domain, target).await)
    }

    pub async fn get_domain_info(&self, domain: &str) -> Result<Option<DomainSearchResult>> {
        self.get_domain_info_with(self.get_provider(), domain).await
    }

    /// `None` when the domain is malformed or the lookup fails.
    pub async fn get_domain_info_with(
        &self,
        provider: RegistrarProvider,
        domain: &str,
    ) -> Result<Option<DomainSearchResult>> {
        let client = self.client(provider)?;
        let domain = match DomainName::parse(domain) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "Domain info skipped");
                return Ok(None);
            }
        };
        match client.get_domain_info(&domain).await {
            Ok(check) => Ok(check.map(|c| {
                let recommended = provider == RegistrarProvider::Cloudflare
                    && RECOMMENDED_TLDS.contains(&domain.tld());
                DomainSearchResult::from_check(c, provider, recommended)
            })),
            Err(e) => {
                warn!(%provider, %domain, error = %e, "Domain info lookup failed");
                Ok(None)
            }
        }
    }

    /// `Ok(false)` when the registrar rejects the credentials or cannot be
    /// reached.
    pub async fn verify_credentials(&self, provider: RegistrarProvider) -> Result<bool> {
        let client = self.client(provider)?;
        match client.verify_credentials().await {
            Ok(valid) => {
                info!(%provider, valid, "Credentials checked");
                Ok(valid)
            }
            Err(e) => {
                warn!(%provider, error = %e, "Credential check failed");
                Ok(false)
            }
        }
    }
}
