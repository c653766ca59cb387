use pwa_registrar::{DomainName, RegistrarClient};
use tracing::{info, info_span, warn, Instrument};

use crate::types::DnsSetupResult;

/// Reduce a URL or bare host to the host part: scheme, credentials, path,
/// port and trailing dots are removed.
pub fn target_host(target: &str) -> Option<String> {
    let rest = target.trim();
    let rest = rest.split_once("://").map(|(_, r)| r).unwrap_or(rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);
    let host = host.split(':').next().unwrap_or_default();
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DnsConfigurator;

impl DnsConfigurator {
    pub async fn setup(
        &self,
        client: &dyn RegistrarClient,
        domain: &str,
        target: &str,
    ) -> DnsSetupResult {
        let provider = client.provider();
        let span = info_span!("dns_setup", %provider, domain, target);
        async {
            let mut result = DnsSetupResult {
                success: false,
                domain: domain.trim().to_ascii_lowercase(),
                provider,
                target_host: target.trim().to_string(),
                points_at_target: false,
                record: None,
                warning: None,
            };

            let domain = match DomainName::parse(domain) {
                Ok(d) => d,
                Err(e) => {
                    result.warning = Some(e.to_string());
                    warn!(error = %e, "DNS setup skipped");
                    return result;
                }
            };
            result.domain = domain.to_string();
            let Some(host) = target_host(target) else {
                result.warning = Some(format!("Target {target:?} has no host"));
                warn!("DNS setup skipped: empty target host");
                return result;
            };
            result.target_host = host;

            match client.setup_dns(&domain, &result.target_host).await {
                Ok(setup) => {
                    result.success = true;
                    result.points_at_target = setup.points_at_target;
                    result.record = setup.record;
                    if !result.points_at_target {
                        let warning = match &result.record {
                            Some(record) => format!(
                                "{provider} record for {domain} points at {}, not {}",
                                record.content, result.target_host
                            ),
                            None => format!(
                                "{provider} set default DNS for {domain}; \
                                 it does not point at {}",
                                result.target_host
                            ),
                        };
                        warn!("{warning}");
                        result.warning = Some(warning);
                    }
                    info!(points_at_target = result.points_at_target, "DNS configured");
                }
                Err(e) => {
                    warn!(error = %e, "DNS setup failed");
                    result.warning = Some(format!("DNS setup failed: {}", e.detail()));
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}
