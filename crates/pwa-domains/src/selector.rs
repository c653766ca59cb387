use pwa_registrar::RegistrarProvider;
use std::sync::{Arc, RwLock};

/// Which registrar backs operations that do not name one explicitly.
///
/// Cloning yields another handle to the same selection. Operations read it
/// once when they start, so switching providers never affects a call that is
/// already running.
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    current: Arc<RwLock<RegistrarProvider>>,
}

impl ProviderSelector {
    pub fn new(initial: RegistrarProvider) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> RegistrarProvider {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the previously selected provider.
    pub fn set(&self, provider: RegistrarProvider) -> RegistrarProvider {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *current, provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_selection() {
        let selector = ProviderSelector::new(RegistrarProvider::Namecheap);
        let other = selector.clone();
        assert_eq!(other.set(RegistrarProvider::Cloudflare), RegistrarProvider::Namecheap);
        assert_eq!(selector.get(), RegistrarProvider::Cloudflare);
    }
}
