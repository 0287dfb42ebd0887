//! Supplier factories and the catalog that holds them.

use std::collections::BTreeMap;
use std::sync::Arc;

use cashback_adapters::Platform;

use crate::config::ProviderConfig;
use crate::errors::{Error, Result};
use crate::http::HttpClient;
use crate::signer::{ParameterSigner, SigningBackend};

use super::capabilities::{ProviderCapabilities, ProviderFeature, SupplierCode};
use super::traits::SupplierProvider;
use super::zhetaoke::ZhetaokeProviderFactory;

/// Builds providers for one supplier.
pub trait ProviderFactory: Send + Sync {
    fn code(&self) -> SupplierCode;

    fn capabilities(&self) -> &'static ProviderCapabilities;

    /// Platforms with a provider implementation.
    fn supported_platforms(&self) -> Vec<Platform> {
        self.capabilities().supported_platforms()
    }

    /// Creates the provider for `platform`.
    ///
    /// Fails with [`Error::UnsupportedPlatform`] when the supplier has no
    /// implementation for it and with [`Error::Configuration`] when a
    /// required credential is missing or blank.
    fn create(
        &self,
        platform: Platform,
        config: &ProviderConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Arc<dyn SupplierProvider>>;

    fn supports_feature(&self, platform: Platform, feature: ProviderFeature) -> bool {
        self.capabilities().supports_feature(platform, feature)
    }

    fn supported_link_types(&self, platform: Platform) -> Vec<i64> {
        self.capabilities().supported_link_types(platform)
    }
}

/// Factories by supplier code.
#[derive(Clone, Default)]
pub struct ProviderFactories {
    factories: BTreeMap<SupplierCode, Arc<dyn ProviderFactory>>,
}

impl ProviderFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every supplier with an implementation, signing with the native backend.
    pub fn with_defaults() -> Self {
        Self::with_signing_backend(SigningBackend::default())
    }

    pub fn with_signing_backend(backend: SigningBackend) -> Self {
        let mut factories = Self::new();
        factories.register(Arc::new(ZhetaokeProviderFactory::new(
            ParameterSigner::new(backend),
        )));
        factories
    }

    /// Adds `factory`, replacing any factory with the same code.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.code(), factory);
    }

    pub fn get(&self, code: SupplierCode) -> Result<Arc<dyn ProviderFactory>> {
        self.factories
            .get(&code)
            .cloned()
            .ok_or_else(|| Error::UnknownSupplier(code.to_string()))
    }

    pub fn all(&self) -> Vec<Arc<dyn ProviderFactory>> {
        self.factories.values().cloned().collect()
    }
}

/// Rejects platforms missing from the factory's capability table.
pub fn ensure_platform(factory: &dyn ProviderFactory, platform: Platform) -> Result<()> {
    if factory.capabilities().platform(platform).is_some() {
        Ok(())
    } else {
        Err(Error::UnsupportedPlatform {
            supplier: factory.code(),
            platform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::jutuike::JUTUIKE_CAPABILITIES;
    use crate::provider::zhetaoke::ZHETAOKE_CAPABILITIES;

    struct CatalogOnlyFactory;

    impl ProviderFactory for CatalogOnlyFactory {
        fn code(&self) -> SupplierCode {
            SupplierCode::Jutuike
        }

        fn capabilities(&self) -> &'static ProviderCapabilities {
            &JUTUIKE_CAPABILITIES
        }

        fn create(
            &self,
            platform: Platform,
            _config: &ProviderConfig,
            _http: Arc<dyn HttpClient>,
        ) -> Result<Arc<dyn SupplierProvider>> {
            ensure_platform(self, platform)?;
            Err(Error::UnsupportedPlatform {
                supplier: self.code(),
                platform,
            })
        }
    }

    #[test]
    fn test_defaults_register_zhetaoke_only() {
        let factories = ProviderFactories::with_defaults();
        assert_eq!(factories.all().len(), 1);
        assert!(factories.get(SupplierCode::Zhetaoke).is_ok());
        assert!(matches!(
            factories.get(SupplierCode::Jutuike).err(),
            Some(Error::UnknownSupplier(code)) if code == "jutuike"
        ));
    }

    #[test]
    fn test_capability_queries() {
        let factories = ProviderFactories::with_defaults();
        let zhetaoke = factories.get(SupplierCode::Zhetaoke).unwrap();

        assert!(zhetaoke.supports_feature(Platform::Douyin, ProviderFeature::ConvertLink));
        assert!(!zhetaoke.supports_feature(Platform::Meituan, ProviderFeature::ConvertLink));
        assert_eq!(zhetaoke.supported_link_types(Platform::Meituan), vec![1, 2, 3, 4, 5]);
        assert_eq!(
            zhetaoke.supported_platforms(),
            ZHETAOKE_CAPABILITIES.supported_platforms()
        );
    }

    #[test]
    fn test_unsupported_platform() {
        let mut factories = ProviderFactories::new();
        factories.register(Arc::new(CatalogOnlyFactory));
        let factory = factories.get(SupplierCode::Jutuike).unwrap();

        let err = ensure_platform(factory.as_ref(), Platform::Eleme).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedPlatform {
                supplier: SupplierCode::Jutuike,
                platform: Platform::Eleme
            }
        ));
    }
}
