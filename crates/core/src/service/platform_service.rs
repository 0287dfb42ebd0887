//! Platform service facade.

use std::sync::Arc;

use cashback_adapters::{Platform, StandardActivityDetail};
use log::{debug, error, info, warn};

use crate::config::{ProviderConfig, ServiceConfig};
use crate::errors::{Error, Result};
use crate::http::HttpClient;
use crate::provider::{
    ActivityListResult, ConvertLinkOptions, ConvertLinkResult, FetchDetailOptions,
    FetchListOptions, ProviderCapabilities, ProviderFactories, ProviderFeature, ProviderMeta,
    SupplierCode, SupplierProvider,
};
use crate::registry::{ProviderRegistry, SelectionStrategy};
use crate::trace::create_trace_id;

/// Single entry point for supplier operations.
///
/// At construction every enabled supplier config is registered for every
/// platform its factory supports. Configs whose factory is unknown or whose
/// provider cannot be created are logged and skipped.
pub struct PlatformService {
    registry: ProviderRegistry,
    factories: ProviderFactories,
    /// Suppliers with at least one registered provider, in config order.
    configured: Vec<SupplierCode>,
    strategy: SelectionStrategy,
}

impl PlatformService {
    pub fn new(config: &ServiceConfig, http: Arc<dyn HttpClient>) -> Self {
        let factories = ProviderFactories::with_signing_backend(config.signing_backend);
        Self::with_factories(config, http, factories)
    }

    pub fn with_factories(
        config: &ServiceConfig,
        http: Arc<dyn HttpClient>,
        factories: ProviderFactories,
    ) -> Self {
        let mut service = Self {
            registry: ProviderRegistry::new(),
            factories,
            configured: Vec::new(),
            strategy: config.selection_strategy,
        };
        for provider_config in config.providers.iter().filter(|c| c.enabled) {
            service.initialize_provider(provider_config, &http);
        }
        service
    }

    fn initialize_provider(&mut self, config: &ProviderConfig, http: &Arc<dyn HttpClient>) {
        let factory = match self.factories.get(config.code) {
            Ok(factory) => factory,
            Err(e) => {
                error!("Failed to initialize supplier {}: {}", config.code, e);
                return;
            }
        };

        let mut registered = 0;
        for platform in factory.supported_platforms() {
            match factory.create(platform, config, Arc::clone(http)) {
                Ok(provider) => {
                    self.registry.register(provider);
                    registered += 1;
                }
                Err(e) => error!(
                    "Failed to create provider {}:{}: {}",
                    config.code, platform, e
                ),
            }
        }

        if registered > 0 && !self.configured.contains(&config.code) {
            self.configured.push(config.code);
            info!(
                "Initialized supplier {} on {} platform(s)",
                config.code, registered
            );
        }
    }

    fn select(&self, platform: Platform, trace_id: &str) -> Result<Arc<dyn SupplierProvider>> {
        let provider = self.registry.select(platform, self.strategy, trace_id)?;
        debug!(
            "Using provider {}:{} (trace: {})",
            provider.supplier(),
            platform,
            trace_id
        );
        Ok(provider)
    }

    pub async fn fetch_activity_list(
        &self,
        platform: Platform,
        mut options: FetchListOptions,
    ) -> Result<ActivityListResult> {
        options.trace_id = ensure_trace_id(platform, options.trace_id);
        let provider = self.select(platform, &options.trace_id)?;
        provider.fetch_activity_list(options).await
    }

    pub async fn fetch_activity_detail(
        &self,
        platform: Platform,
        mut options: FetchDetailOptions,
    ) -> Result<StandardActivityDetail> {
        options.trace_id = ensure_trace_id(platform, options.trace_id);
        let provider = self.select(platform, &options.trace_id)?;
        provider.fetch_activity_detail(options).await
    }

    /// Converts a link on `platform`.
    ///
    /// Fails with [`Error::UnsupportedOperation`] before any request when the
    /// selected provider lacks the `convertLink` capability.
    pub async fn convert_link(
        &self,
        platform: Platform,
        mut options: ConvertLinkOptions,
    ) -> Result<ConvertLinkResult> {
        options.trace_id = ensure_trace_id(platform, options.trace_id);
        let provider = self.select(platform, &options.trace_id)?;
        if !provider.supports(ProviderFeature::ConvertLink) {
            warn!(
                "Link conversion is not supported by {} for {} (trace: {})",
                provider.supplier(),
                platform,
                options.trace_id
            );
            return Err(Error::unsupported_operation(
                ProviderFeature::ConvertLink.as_str(),
                provider.supplier(),
                platform,
            ));
        }
        provider.convert_link(options).await
    }

    /// True when any provider registered for `platform` offers `feature`.
    pub fn supports_feature(&self, platform: Platform, feature: ProviderFeature) -> bool {
        self.registry
            .providers_for(platform)
            .iter()
            .any(|provider| provider.supports(feature))
    }

    /// Link type codes offered by the providers of `platform`, ascending.
    pub fn supported_link_types(&self, platform: Platform) -> Vec<i64> {
        let mut link_types: Vec<i64> = self
            .registry
            .providers_for(platform)
            .iter()
            .flat_map(|provider| provider.capabilities().supported_link_types(platform))
            .collect();
        link_types.sort_unstable();
        link_types.dedup();
        link_types
    }

    /// Capability table of the first configured supplier.
    pub fn provider_capabilities(&self) -> Option<&'static ProviderCapabilities> {
        self.configured
            .iter()
            .find_map(|code| self.factories.get(*code).ok())
            .map(|factory| factory.capabilities())
    }

    pub fn supported_platforms(&self) -> Vec<Platform> {
        self.registry.supported_platforms()
    }

    /// Metadata of every configured supplier.
    pub fn provider_metas(&self) -> Vec<ProviderMeta> {
        self.configured
            .iter()
            .filter_map(|code| self.factories.get(*code).ok())
            .map(|factory| ProviderMeta::from_capabilities(factory.capabilities(), true))
            .collect()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Health of the provider selected for `platform`. False when none is
    /// registered.
    pub async fn health_check(&self, platform: Platform) -> bool {
        let trace_id = create_trace_id(platform.as_str());
        match self.registry.select(platform, self.strategy, &trace_id) {
            Ok(provider) => provider.health_check().await,
            Err(e) => {
                warn!("Health check skipped: {}", e);
                false
            }
        }
    }
}

fn ensure_trace_id(platform: Platform, trace_id: String) -> String {
    if trace_id.trim().is_empty() {
        create_trace_id(platform.as_str())
    } else {
        trace_id
    }
}
