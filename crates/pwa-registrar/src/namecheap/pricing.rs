use rust_decimal::Decimal;

/// Low-cost TLDs, usually discounted for the first year.
pub const CHEAP_TLDS: &[&str] = &[
    "xyz", "online", "site", "store", "fun", "space", "website", "club", "top", "icu", "shop",
    "live",
];

/// Mainstream TLDs priced at the standard rate.
pub const STANDARD_TLDS: &[&str] = &[
    "com", "net", "org", "io", "co", "info", "biz", "app", "me", "pro", "us", "cc",
];

/// Casino-adjacent and premium TLDs.
pub const PREMIUM_TLDS: &[&str] = &[
    "casino", "bet", "poker", "games", "win", "vip", "luxury", "gold", "money", "cash", "lotto",
];

/// Every TLD a Namecheap search checks, across all three tiers.
pub const SEARCH_TLDS: &[&str] = &[
    "xyz", "online", "site", "store", "fun", "space", "website", "club", "top", "icu", "shop",
    "live", "com", "net", "org", "io", "co", "info", "biz", "app", "me", "pro", "us", "cc",
    "casino", "bet", "poker", "games", "win", "vip", "luxury", "gold", "money", "cash", "lotto",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Cheap,
    Standard,
    Premium,
}

impl PriceTier {
    pub fn of(tld: &str) -> Self {
        let tld = tld.trim_start_matches('.').to_ascii_lowercase();
        if CHEAP_TLDS.contains(&tld.as_str()) {
            Self::Cheap
        } else if PREMIUM_TLDS.contains(&tld.as_str()) {
            Self::Premium
        } else {
            Self::Standard
        }
    }

    /// Price used when live pricing cannot be fetched.
    pub fn fallback_price(self) -> Decimal {
        match self {
            Self::Cheap => Decimal::new(199, 2),
            Self::Standard => Decimal::new(1299, 2),
            Self::Premium => Decimal::new(2599, 2),
        }
    }
}

pub fn fallback_price(tld: &str) -> Decimal {
    PriceTier::of(tld).fallback_price()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_list_spans_all_tiers() {
        assert_eq!(SEARCH_TLDS.len(), 35);
        assert_eq!(
            SEARCH_TLDS.len(),
            CHEAP_TLDS.len() + STANDARD_TLDS.len() + PREMIUM_TLDS.len()
        );
        for tld in CHEAP_TLDS.iter().chain(STANDARD_TLDS).chain(PREMIUM_TLDS) {
            assert!(SEARCH_TLDS.contains(tld), "{tld} missing from search list");
        }
    }

    #[test]
    fn fallback_by_tier() {
        assert_eq!(fallback_price("site"), Decimal::new(199, 2));
        assert_eq!(fallback_price(".CASINO"), Decimal::new(2599, 2));
        assert_eq!(fallback_price("com"), Decimal::new(1299, 2));
        assert_eq!(fallback_price("unlisted"), Decimal::new(1299, 2));
    }
}
