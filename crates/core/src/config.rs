//! Supplier and service configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::provider::{CredentialField, SupplierCode};
use crate::registry::SelectionStrategy;
use crate::signer::SigningBackend;

pub const ENV_PROVIDERS: &str = "CASHBACK_PROVIDERS";
pub const ENV_SELECTION_STRATEGY: &str = "CASHBACK_SELECTION_STRATEGY";
pub const ENV_SIGNING_BACKEND: &str = "CASHBACK_SIGNING_BACKEND";
pub const ENV_CACHE_TTL_MINUTES: &str = "CASHBACK_CACHE_TTL_MINUTES";
pub const ENV_ZHE_TAOKE_APPKEY: &str = "ZHE_TAOKE_APPKEY";
pub const ENV_ZHE_TAOKE_SID: &str = "ZHE_TAOKE_SID";
pub const ENV_ZHE_TAOKE_CUSTOMER_ID: &str = "ZHE_TAOKE_CUSTOMER_ID";

/// Priority given to configs that do not set one.
pub const DEFAULT_PRIORITY: u32 = 999;
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 20;

fn default_enabled() -> bool {
    true
}

fn default_priority() -> u32 {
    DEFAULT_PRIORITY
}

/// Configuration of one supplier account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(alias = "name")]
    pub code: SupplierCode,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower is preferred.
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Supplier-defined credential fields, e.g. `appkey` and `sid`.
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    /// Request timeout in milliseconds.
    #[serde(default, rename = "timeout")]
    pub timeout_ms: Option<u64>,
}

impl ProviderConfig {
    pub fn new(code: SupplierCode) -> Self {
        Self {
            code,
            enabled: true,
            priority: DEFAULT_PRIORITY,
            credentials: BTreeMap::new(),
            timeout_ms: None,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Credential value, treating blank values as missing.
    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Checks that every required credential field is present and not blank.
pub fn validate_credentials(config: &ProviderConfig, fields: &[CredentialField]) -> Result<()> {
    for field in fields.iter().filter(|field| field.required) {
        if config.credential(field.key).is_none() {
            return Err(Error::configuration(
                format!(
                    "Missing required credential '{}' ({}) for supplier {}",
                    field.key, field.label, config.code
                ),
                field.key,
            ));
        }
    }
    Ok(())
}

/// Service-wide configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub providers: Vec<ProviderConfig>,
    pub selection_strategy: SelectionStrategy,
    pub signing_backend: SigningBackend,
    pub cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            selection_strategy: SelectionStrategy::default(),
            signing_backend: SigningBackend::default(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_MINUTES * 60),
        }
    }
}

impl ServiceConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let providers = match read(ENV_PROVIDERS) {
            Some(json) => serde_json::from_str::<Vec<ProviderConfig>>(&json).map_err(|e| {
                Error::configuration(format!("Invalid provider list: {}", e), ENV_PROVIDERS)
            })?,
            None => legacy_providers(&read),
        };

        let selection_strategy = read(ENV_SELECTION_STRATEGY)
            .map(|value| value.parse::<SelectionStrategy>())
            .transpose()?
            .unwrap_or_default();

        let signing_backend = read(ENV_SIGNING_BACKEND)
            .map(|value| value.parse::<SigningBackend>())
            .transpose()?
            .unwrap_or_default();

        let cache_ttl = match read(ENV_CACHE_TTL_MINUTES) {
            Some(value) => parse_ttl_minutes(&value)?,
            None => Duration::from_secs(DEFAULT_CACHE_TTL_MINUTES * 60),
        };

        debug!(
            "Loaded {} provider config(s), strategy {:?}, signing backend {:?}",
            providers.len(),
            selection_strategy,
            signing_backend
        );

        Ok(Self {
            providers,
            selection_strategy,
            signing_backend,
            cache_ttl,
        })
    }
}

/// Parses a whole number of minutes into a TTL, rejecting values whose
/// length in seconds does not fit in a `u64`.
fn parse_ttl_minutes(value: &str) -> Result<Duration> {
    let minutes = value.parse::<u64>().map_err(|_| {
        Error::configuration(
            format!("Cache TTL must be a whole number of minutes, got '{}'", value),
            ENV_CACHE_TTL_MINUTES,
        )
    })?;
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            Error::configuration(
                format!("Cache TTL of {} minutes is out of range", minutes),
                ENV_CACHE_TTL_MINUTES,
            )
        })
}

/// Single Zhetaoke account from the `ZHE_TAOKE_*` variables.
fn legacy_providers(read: &dyn Fn(&str) -> Option<String>) -> Vec<ProviderConfig> {
    let appkey = read(ENV_ZHE_TAOKE_APPKEY);
    let sid = read(ENV_ZHE_TAOKE_SID);
    if appkey.is_none() && sid.is_none() {
        return Vec::new();
    }

    let mut config = ProviderConfig::new(SupplierCode::Zhetaoke).with_priority(1);
    for (key, value) in [
        ("appkey", appkey),
        ("sid", sid),
        ("customerId", read(ENV_ZHE_TAOKE_CUSTOMER_ID)),
    ] {
        if let Some(value) = value {
            config.credentials.insert(key.to_string(), value);
        }
    }
    vec![config]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CredentialFieldType;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.providers.is_empty());
        assert_eq!(config.selection_strategy, SelectionStrategy::Priority);
        assert_eq!(config.signing_backend, SigningBackend::Native);
        assert_eq!(config.cache_ttl, Duration::from_secs(20 * 60));
    }

    #[test]
    fn test_legacy_zhetaoke_variables() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("ZHE_TAOKE_APPKEY", "key"),
            ("ZHE_TAOKE_SID", "sid"),
            ("CASHBACK_SELECTION_STRATEGY", "round-robin"),
        ]))
        .unwrap();

        assert_eq!(config.providers.len(), 1);
        let provider = &config.providers[0];
        assert_eq!(provider.code, SupplierCode::Zhetaoke);
        assert_eq!(provider.credential("appkey"), Some("key"));
        assert_eq!(provider.credential("customerId"), None);
        assert_eq!(config.selection_strategy, SelectionStrategy::RoundRobin);
    }

    #[test]
    fn test_provider_list_json() {
        let json = r#"[
            {"name": "zhetaoke", "priority": 2, "credentials": {"appkey": "a", "sid": "s"}, "timeout": 3000},
            {"code": "jutuike", "enabled": false}
        ]"#;
        let config = ServiceConfig::from_lookup(lookup(&[("CASHBACK_PROVIDERS", json)])).unwrap();

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].priority, 2);
        assert_eq!(config.providers[0].timeout(), Some(Duration::from_millis(3000)));
        assert!(!config.providers[1].enabled);
        assert_eq!(config.providers[1].priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ServiceConfig::from_lookup(lookup(&[("CASHBACK_CACHE_TTL_MINUTES", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration { field: Some(ref f), .. } if f == "CASHBACK_CACHE_TTL_MINUTES"
        ));

        let err = ServiceConfig::from_lookup(lookup(&[("CASHBACK_PROVIDERS", "{")])).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration { field: Some(ref f), .. } if f == "CASHBACK_PROVIDERS"
        ));
    }

    #[test]
    fn test_cache_ttl_minutes() {
        let config =
            ServiceConfig::from_lookup(lookup(&[("CASHBACK_CACHE_TTL_MINUTES", "5")])).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(300));

        let err = ServiceConfig::from_lookup(lookup(&[(
            "CASHBACK_CACHE_TTL_MINUTES",
            "307445734561825861",
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration { field: Some(ref f), .. } if f == "CASHBACK_CACHE_TTL_MINUTES"
        ));
    }

    #[test]
    fn test_validate_credentials() {
        let fields = [CredentialField {
            key: "sid",
            label: "SID",
            placeholder: "",
            required: true,
            field_type: CredentialFieldType::Text,
            help_text: None,
        }];
        let config = ProviderConfig::new(SupplierCode::Zhetaoke).with_credential("sid", "  ");
        let err = validate_credentials(&config, &fields).unwrap_err();
        assert!(matches!(err, Error::Configuration { field: Some(ref f), .. } if f == "sid"));

        let config = config.with_credential("sid", "123");
        assert!(validate_credentials(&config, &fields).is_ok());
    }
}
