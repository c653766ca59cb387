//! In-memory registrar used by the orchestration tests.
//!
//! Behaviour is configured up front; calls are recorded so tests can assert
//! what reached the "registrar".

use async_trait::async_trait;
use pwa_registrar::cloudflare::SEARCH_TLDS as CLOUDFLARE_TLDS;
use pwa_registrar::namecheap::pricing::SEARCH_TLDS as NAMECHEAP_TLDS;
use pwa_registrar::{
    AvailabilityCheck, DnsRecord, DnsSetup, DomainName, RegistrarClient, RegistrarError,
    RegistrarProvider, RegistrationReceipt, RegistrationRequest, Result, SearchPlan,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

type Hook = Arc<dyn Fn() + Send + Sync>;

pub struct MockRegistrar {
    provider: RegistrarProvider,
    available: HashMap<String, Decimal>,
    failing_tlds: HashSet<String>,
    fail_batch: bool,
    registration: Option<Result<RegistrationReceipt>>,
    dns: Option<Result<DnsSetup>>,
    on_check: Option<Hook>,
    checks: Mutex<Vec<String>>,
    registrations: Mutex<Vec<RegistrationRequest>>,
    dns_calls: Mutex<Vec<(String, String)>>,
}

impl MockRegistrar {
    pub fn new(provider: RegistrarProvider) -> Self {
        Self {
            provider,
            available: HashMap::new(),
            failing_tlds: HashSet::new(),
            fail_batch: false,
            registration: None,
            dns: None,
            on_check: None,
            checks: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            dns_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn namecheap() -> Self {
        Self::new(RegistrarProvider::Namecheap)
    }

    pub fn cloudflare() -> Self {
        Self::new(RegistrarProvider::Cloudflare)
    }

    pub fn with_available(mut self, domain: &str, price: Decimal) -> Self {
        self.available.insert(domain.to_string(), price);
        self
    }

    pub fn with_failing_tld(mut self, tld: &str) -> Self {
        self.failing_tlds.insert(tld.to_string());
        self
    }

    pub fn with_failing_batch(mut self) -> Self {
        self.fail_batch = true;
        self
    }

    pub fn with_registration(mut self, outcome: Result<RegistrationReceipt>) -> Self {
        self.registration = Some(outcome);
        self
    }

    pub fn with_dns(mut self, outcome: Result<DnsSetup>) -> Self {
        self.dns = Some(outcome);
        self
    }

    /// Runs at the start of every availability check.
    pub fn with_check_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_check = Some(Arc::new(hook));
        self
    }

    pub fn check_count(&self) -> usize {
        self.checks.lock().unwrap().len()
    }

    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn dns_calls(&self) -> Vec<(String, String)> {
        self.dns_calls.lock().unwrap().clone()
    }

    fn lookup(&self, domain: &DomainName) -> AvailabilityCheck {
        match self.available.get(&domain.to_string()) {
            Some(price) => AvailabilityCheck {
                domain: domain.to_string(),
                available: true,
                price: Some(*price),
                premium_price: None,
                is_premium: false,
            },
            None => AvailabilityCheck::unavailable(domain),
        }
    }
}

#[async_trait]
impl RegistrarClient for MockRegistrar {
    fn provider(&self) -> RegistrarProvider {
        self.provider
    }

    fn search_plan(&self) -> SearchPlan {
        match self.provider {
            RegistrarProvider::Namecheap => SearchPlan::FanOut(NAMECHEAP_TLDS),
            RegistrarProvider::Cloudflare => SearchPlan::Batched(CLOUDFLARE_TLDS),
        }
    }

    async fn check_availability(&self, name: &str, tld: &str) -> Result<AvailabilityCheck> {
        if let Some(hook) = &self.on_check {
            hook();
        }
        let domain = DomainName::new(name, tld)?;
        self.checks.lock().unwrap().push(domain.to_string());
        // Let sibling checks interleave.
        tokio::task::yield_now().await;
        if self.failing_tlds.contains(tld) {
            return Err(RegistrarError::http(None, "simulated network error"));
        }
        Ok(self.lookup(&domain))
    }

    async fn check_batch(&self, name: &str, tlds: &[&str]) -> Result<Vec<AvailabilityCheck>> {
        if let Some(hook) = &self.on_check {
            hook();
        }
        if self.fail_batch {
            return Err(RegistrarError::http(Some(502), "bad gateway"));
        }
        let mut results = Vec::new();
        for tld in tlds {
            let domain = DomainName::new(name, tld)?;
            self.checks.lock().unwrap().push(domain.to_string());
            results.push(self.lookup(&domain));
        }
        Ok(results)
    }

    async fn register_domain(&self, request: &RegistrationRequest) -> Result<RegistrationReceipt> {
        self.registrations.lock().unwrap().push(request.clone());
        match &self.registration {
            Some(outcome) => outcome.clone(),
            None => Ok(RegistrationReceipt {
                domain: request.domain.to_string(),
                transaction_id: Some("TX-1".into()),
                expires_at: None,
            }),
        }
    }

    async fn setup_dns(&self, domain: &DomainName, target_host: &str) -> Result<DnsSetup> {
        self.dns_calls
            .lock()
            .unwrap()
            .push((domain.to_string(), target_host.to_string()));
        if let Some(outcome) = &self.dns {
            return outcome.clone();
        }
        Ok(match self.provider {
            RegistrarProvider::Namecheap => DnsSetup {
                record: None,
                points_at_target: false,
            },
            RegistrarProvider::Cloudflare => DnsSetup {
                record: Some(DnsRecord {
                    id: Some("rec-1".into()),
                    r#type: "CNAME".into(),
                    name: domain.to_string(),
                    content: target_host.to_string(),
                    ttl: Some(1),
                    proxied: Some(true),
                }),
                points_at_target: true,
            },
        })
    }

    async fn get_domain_info(&self, domain: &DomainName) -> Result<Option<AvailabilityCheck>> {
        if self.failing_tlds.contains(domain.tld()) {
            return Err(RegistrarError::http(None, "simulated network error"));
        }
        Ok(Some(self.lookup(domain)))
    }

    async fn verify_credentials(&self) -> Result<bool> {
        Ok(true)
    }
}
