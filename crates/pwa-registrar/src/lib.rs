//! Registrar API clients for domain acquisition.
//!
//! Each sub-module implements an HTTP client for one registrar. All clients
//! normalise their API responses into the types in `types` so the rest of
//! the application never handles a provider's wire format.

pub mod cloudflare;
pub mod config;
pub mod error;
pub mod namecheap;
pub mod price_cache;
pub mod types;

pub use cloudflare::CloudflareClient;
pub use config::{CloudflareCredentials, NamecheapCredentials};
pub use error::{RegistrarError, Result};
pub use namecheap::NamecheapClient;
pub use price_cache::{InMemoryPriceCache, PriceCache};
pub use types::*;

/// Trait that every registrar client must implement.
#[async_trait::async_trait]
pub trait RegistrarClient: Send + Sync {
    fn provider(&self) -> RegistrarProvider;

    /// The TLD candidates to search and how to check them.
    fn search_plan(&self) -> SearchPlan;

    /// Check a single `name.tld` candidate.
    async fn check_availability(&self, name: &str, tld: &str) -> Result<AvailabilityCheck>;

    /// Check `name` against several TLDs in one registrar call. The whole
    /// batch fails if the call fails.
    async fn check_batch(&self, name: &str, tlds: &[&str]) -> Result<Vec<AvailabilityCheck>>;

    /// Purchase a domain. Not idempotent; never retried here.
    async fn register_domain(&self, request: &RegistrationRequest) -> Result<RegistrationReceipt>;

    /// Point `domain` at `target_host`, as far as the registrar supports it.
    async fn setup_dns(&self, domain: &DomainName, target_host: &str) -> Result<DnsSetup>;

    async fn get_domain_info(&self, domain: &DomainName) -> Result<Option<AvailabilityCheck>>;

    /// Verify that credentials are accepted.
    async fn verify_credentials(&self) -> Result<bool>;
}
