//! Availability search across a registrar's fixed TLD candidate list.

use std::cmp::Ordering;

use futures::future::join_all;
use pwa_registrar::cloudflare::RECOMMENDED_TLDS;
use pwa_registrar::{AvailabilityCheck, RegistrarClient, SearchPlan};
use tracing::{debug, info, warn};

use crate::types::DomainSearchResult;

pub const MAX_FAN_OUT_RESULTS: usize = 10;

/// Reduce free text to a single lowercase label: anything from the first dot
/// on is dropped, as are characters outside `[a-z0-9-]`.
pub fn normalize_query(query: &str) -> Option<String> {
    let head = query.trim().split('.').next().unwrap_or_default();
    let label: String = head
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    let label = label.trim_matches('-');
    if label.is_empty() || label.len() > 63 {
        None
    } else {
        Some(label.to_string())
    }
}

/// Cheapest first; results without a price go last, ties by name.
fn by_price(a: &DomainSearchResult, b: &DomainSearchResult) -> Ordering {
    let price = match (a.price, b.price) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    price.then_with(|| a.domain.cmp(&b.domain))
}

fn tld_of(domain: &str) -> &str {
    domain.rsplit_once('.').map(|(_, tld)| tld).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct DomainSearch {
    max_results: usize,
}

impl Default for DomainSearch {
    fn default() -> Self {
        Self {
            max_results: MAX_FAN_OUT_RESULTS,
        }
    }
}

impl DomainSearch {
    pub async fn search(
        &self,
        client: &dyn RegistrarClient,
        query: &str,
    ) -> Vec<DomainSearchResult> {
        let Some(name) = normalize_query(query) else {
            warn!(query, "Search query has no usable domain label");
            return Vec::new();
        };
        let provider = client.provider();
        let results = match client.search_plan() {
            SearchPlan::FanOut(tlds) => self.fan_out(client, &name, tlds).await,
            SearchPlan::Batched(tlds) => Self::batched(client, &name, tlds).await,
        };
        info!(%provider, name = %name, results = results.len(), "Domain search finished");
        results
    }

    /// Check every TLD concurrently. A failing check becomes an unavailable
    /// placeholder instead of failing the batch. Results come back in `tlds`
    /// order.
    pub async fn check_all(
        client: &dyn RegistrarClient,
        name: &str,
        tlds: &[&str],
    ) -> Vec<AvailabilityCheck> {
        let checks = tlds.iter().map(|tld| async move {
            match client.check_availability(name, tld).await {
                Ok(check) => check,
                Err(e) => {
                    warn!(name, tld, error = %e, "Availability check failed");
                    AvailabilityCheck::unavailable(format!("{name}.{tld}"))
                }
            }
        });
        join_all(checks).await
    }

    async fn fan_out(
        &self,
        client: &dyn RegistrarClient,
        name: &str,
        tlds: &[&str],
    ) -> Vec<DomainSearchResult> {
        let provider = client.provider();
        let settled = Self::check_all(client, name, tlds).await;
        let mut results: Vec<DomainSearchResult> = settled
            .into_iter()
            .filter(|c| c.available)
            .map(|c| DomainSearchResult::from_check(c, provider, false))
            .collect();
        debug!(checked = tlds.len(), available = results.len(), "Fan-out settled");
        results.sort_by(by_price);
        results.truncate(self.max_results);
        results
    }

    async fn batched(
        client: &dyn RegistrarClient,
        name: &str,
        tlds: &[&str],
    ) -> Vec<DomainSearchResult> {
        let provider = client.provider();
        match client.check_batch(name, tlds).await {
            Ok(checks) => checks
                .into_iter()
                .map(|c| {
                    let recommended = RECOMMENDED_TLDS.contains(&tld_of(&c.domain));
                    DomainSearchResult::from_check(c, provider, recommended)
                })
                .collect(),
            Err(e) => {
                warn!(%provider, name, error = %e, "Batched availability check failed");
                Vec::new()
            }
        }
    }
}
