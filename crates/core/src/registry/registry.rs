//! Provider registry.
//!
//! A multi-map from platform to the providers registered for it, in
//! registration order. Built once at service construction and read on every
//! call.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cashback_adapters::Platform;
use chrono::Utc;
use log::{debug, info, warn};
use rand::Rng;

use super::SelectionStrategy;
use crate::errors::{Error, Result};
use crate::provider::{SupplierCode, SupplierProvider};

type ProviderMap = HashMap<Platform, Vec<Arc<dyn SupplierProvider>>>;

/// Providers registered per platform.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<ProviderMap>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ProviderMap> {
        self.providers.read().unwrap_or_else(|poisoned| {
            warn!("Provider registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProviderMap> {
        self.providers.write().unwrap_or_else(|poisoned| {
            warn!("Provider registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Appends `provider` to the candidates of its platform.
    pub fn register(&self, provider: Arc<dyn SupplierProvider>) {
        let platform = provider.platform();
        info!(
            "Registered provider {}:{} (priority {})",
            provider.supplier(),
            platform,
            provider.priority()
        );
        self.write().entry(platform).or_default().push(provider);
    }

    /// Removes the first provider of `supplier` for `platform`. Returns
    /// whether one was removed.
    pub fn unregister(&self, supplier: SupplierCode, platform: Platform) -> bool {
        let mut providers = self.write();
        let Some(list) = providers.get_mut(&platform) else {
            return false;
        };
        let Some(index) = list.iter().position(|p| p.supplier() == supplier) else {
            return false;
        };

        list.remove(index);
        if list.is_empty() {
            providers.remove(&platform);
        }
        info!("Unregistered provider {}:{}", supplier, platform);
        true
    }

    /// Picks a provider for `platform`.
    ///
    /// Fails with [`Error::ProviderUnavailable`] when none is registered.
    pub fn select(
        &self,
        platform: Platform,
        strategy: SelectionStrategy,
        trace_id: &str,
    ) -> Result<Arc<dyn SupplierProvider>> {
        let providers = self.read();
        let candidates = providers
            .get(&platform)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| Error::ProviderUnavailable {
                platform,
                trace_id: trace_id.to_string(),
            })?;

        let index = match strategy {
            SelectionStrategy::Priority => by_priority(candidates),
            SelectionStrategy::Random => rand::thread_rng().gen_range(0..candidates.len()),
            SelectionStrategy::RoundRobin => {
                (Utc::now().timestamp_millis().unsigned_abs() % candidates.len() as u64) as usize
            }
        };
        let selected = Arc::clone(&candidates[index]);
        debug!(
            "Selected provider {}:{} by {} among {} (trace: {})",
            selected.supplier(),
            platform,
            strategy,
            candidates.len(),
            trace_id
        );
        Ok(selected)
    }

    /// Platforms with at least one provider, in a stable order.
    pub fn supported_platforms(&self) -> Vec<Platform> {
        let providers = self.read();
        Platform::ALL
            .into_iter()
            .filter(|platform| providers.get(platform).is_some_and(|list| !list.is_empty()))
            .collect()
    }

    pub fn providers_for(&self, platform: Platform) -> Vec<Arc<dyn SupplierProvider>> {
        self.read().get(&platform).cloned().unwrap_or_default()
    }

    pub fn clear(&self) {
        self.write().clear();
        info!("Cleared all providers");
    }
}

/// Index of the lowest priority. Strict comparison keeps the earliest
/// registration on ties.
fn by_priority(candidates: &[Arc<dyn SupplierProvider>]) -> usize {
    let mut best = 0;
    for (index, provider) in candidates.iter().enumerate().skip(1) {
        if provider.priority() < candidates[best].priority() {
            best = index;
        }
    }
    best
}
