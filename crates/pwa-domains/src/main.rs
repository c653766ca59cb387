use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pwa_domains::logging::init_logging;
use pwa_domains::{AcquisitionConfig, DomainAcquisition, DomainPurchaseRequest};
use pwa_registrar::{Contact, RegistrarProvider};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pwa-domains")]
#[command(about = "Search, buy and point domains for PWA landing pages")]
struct Args {
    /// Registrar to use instead of DOMAIN_PROVIDER
    #[arg(long, global = true)]
    provider: Option<RegistrarProvider>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check availability and price across the registrar's TLD list
    Search { query: String },
    /// Look up a single domain
    Info { domain: String },
    /// Register a domain
    Purchase {
        domain: String,
        /// Price the buyer agreed to; the purchase is refused if it rose
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value = "cli")]
        user_id: String,
        /// JSON file with the registrant contact (required by Namecheap)
        #[arg(long)]
        registrant: Option<std::path::PathBuf>,
        #[arg(long)]
        client_ip: Option<String>,
    },
    /// Point a domain at a host or URL
    Dns { domain: String, target: String },
    /// Check that the registrar accepts the configured credentials
    Verify,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_contact(path: &std::path::Path) -> Result<Contact> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing registrant contact in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let mut config = AcquisitionConfig::from_env().context("loading registrar configuration")?;
    if let Some(provider) = args.provider {
        config.default_provider = provider;
    }
    let domains = DomainAcquisition::from_config(&config)?;
    let provider = domains.get_provider();

    match args.command {
        Command::Search { query } => print_json(&domains.search_domains(&query).await?)?,
        Command::Info { domain } => print_json(&domains.get_domain_info(&domain).await?)?,
        Command::Purchase {
            domain,
            price,
            user_id,
            registrant,
            client_ip,
        } => {
            let registrant = registrant.as_deref().map(read_contact).transpose()?;
            let request = DomainPurchaseRequest {
                domain,
                price,
                user_id,
                provider,
                registrant,
                client_ip,
            };
            let result = domains.purchase_domain(&request).await?;
            print_json(&result)?;
            if !result.success {
                bail!(result.error.unwrap_or_else(|| "purchase failed".into()));
            }
        }
        Command::Dns { domain, target } => {
            let result = domains.setup_dns(&domain, &target).await?;
            print_json(&result)?;
            if !result.success {
                bail!(result.warning.unwrap_or_else(|| "DNS setup failed".into()));
            }
        }
        Command::Verify => {
            let valid = domains.verify_credentials(provider).await?;
            print_json(&serde_json::json!({ "provider": provider, "valid": valid }))?;
            if !valid {
                bail!("{provider} rejected the configured credentials");
            }
        }
    }
    Ok(())
}
