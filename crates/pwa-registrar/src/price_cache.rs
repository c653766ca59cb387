//! TLD -> registration price memo.
//!
//! Without a TTL an entry lives for the lifetime of the cache, which is how
//! pricing has always been cached. With a TTL, reads past the deadline miss
//! and drop the entry.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait PriceCache: Send + Sync {
    fn get(&self, tld: &str) -> Option<Decimal>;
    fn set(&self, tld: &str, price: Decimal);
    fn invalidate(&self, tld: &str);
    fn clear(&self);
}

struct Entry {
    price: Decimal,
    stored_at: Instant,
}

pub struct InMemoryPriceCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Option<Duration>,
}

impl InMemoryPriceCache {
    pub fn new() -> Self {
        Self::with_ttl(None)
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key(tld: &str) -> String {
        tld.trim().trim_start_matches('.').to_ascii_lowercase()
    }
}

impl Default for InMemoryPriceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCache for InMemoryPriceCache {
    fn get(&self, tld: &str) -> Option<Decimal> {
        let key = Self::key(tld);
        let mut entries = self.lock();
        let (price, stored_at) = entries.get(&key).map(|e| (e.price, e.stored_at))?;
        if let Some(ttl) = self.ttl {
            if stored_at.elapsed() >= ttl {
                entries.remove(&key);
                return None;
            }
        }
        Some(price)
    }

    fn set(&self, tld: &str, price: Decimal) {
        self.lock().insert(
            Self::key(tld),
            Entry {
                price,
                stored_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, tld: &str) {
        self.lock().remove(&Self::key(tld));
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
