//! Supplier capabilities and credential schemas.
//!
//! Capability tables are static data: one per supplier, listing the
//! platforms it serves, the features available on each and the credential
//! fields its configuration must carry.

use std::fmt;
use std::str::FromStr;

use cashback_adapters::Platform;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Affiliate supplier identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierCode {
    Zhetaoke,
    Jutuike,
}

impl SupplierCode {
    pub const ALL: [SupplierCode; 2] = [SupplierCode::Zhetaoke, SupplierCode::Jutuike];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierCode::Zhetaoke => "zhetaoke",
            SupplierCode::Jutuike => "jutuike",
        }
    }
}

impl fmt::Display for SupplierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownSupplier(s.to_string()))
    }
}

/// Feature a supplier may offer on a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderFeature {
    ActivityList,
    ActivityDetail,
    ConvertLink,
    Qrcode,
    Deeplink,
    MiniProgram,
}

impl ProviderFeature {
    pub const ALL: [ProviderFeature; 6] = [
        ProviderFeature::ActivityList,
        ProviderFeature::ActivityDetail,
        ProviderFeature::ConvertLink,
        ProviderFeature::Qrcode,
        ProviderFeature::Deeplink,
        ProviderFeature::MiniProgram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFeature::ActivityList => "activityList",
            ProviderFeature::ActivityDetail => "activityDetail",
            ProviderFeature::ConvertLink => "convertLink",
            ProviderFeature::Qrcode => "qrcode",
            ProviderFeature::Deeplink => "deeplink",
            ProviderFeature::MiniProgram => "miniProgram",
        }
    }
}

impl fmt::Display for ProviderFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialFieldType {
    Text,
    Password,
    Select,
}

/// One credential a supplier configuration must (or may) carry.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialField {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: CredentialFieldType,
    pub help_text: Option<&'static str>,
}

/// Features and link types a supplier offers on one platform.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCapability {
    pub platform: Platform,
    pub features: &'static [ProviderFeature],
    pub supported_link_types: &'static [i64],
    pub notes: Option<&'static str>,
}

/// Everything a supplier can do, and what it needs to do it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilities {
    pub code: SupplierCode,
    pub name: &'static str,
    pub description: &'static str,
    pub website: Option<&'static str>,
    pub credential_fields: &'static [CredentialField],
    pub platforms: &'static [PlatformCapability],
}

impl ProviderCapabilities {
    pub fn platform(&self, platform: Platform) -> Option<&PlatformCapability> {
        self.platforms.iter().find(|cap| cap.platform == platform)
    }

    pub fn supported_platforms(&self) -> Vec<Platform> {
        self.platforms.iter().map(|cap| cap.platform).collect()
    }

    pub fn supports_feature(&self, platform: Platform, feature: ProviderFeature) -> bool {
        self.platform(platform)
            .is_some_and(|cap| cap.features.contains(&feature))
    }

    pub fn supported_link_types(&self, platform: Platform) -> Vec<i64> {
        self.platform(platform)
            .map(|cap| cap.supported_link_types.to_vec())
            .unwrap_or_default()
    }
}

/// Supplier summary for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMeta {
    pub code: SupplierCode,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    /// Whether an enabled configuration exists for the supplier.
    pub configured: bool,
    pub supported_platforms: Vec<Platform>,
}

impl ProviderMeta {
    pub fn from_capabilities(capabilities: &ProviderCapabilities, configured: bool) -> Self {
        Self {
            code: capabilities.code,
            name: capabilities.name.to_string(),
            description: capabilities.description.to_string(),
            website: capabilities.website.map(str::to_string),
            configured,
            supported_platforms: capabilities.supported_platforms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_CAPABILITIES: ProviderCapabilities = ProviderCapabilities {
        code: SupplierCode::Zhetaoke,
        name: "Test",
        description: "test supplier",
        website: None,
        credential_fields: &[],
        platforms: &[PlatformCapability {
            platform: Platform::Meituan,
            features: &[ProviderFeature::ActivityList, ProviderFeature::Qrcode],
            supported_link_types: &[1, 2],
            notes: None,
        }],
    };

    #[test]
    fn test_supplier_code_parse() {
        assert_eq!("ZheTaoKe".parse::<SupplierCode>().unwrap(), SupplierCode::Zhetaoke);
        assert!(matches!(
            "taobao".parse::<SupplierCode>(),
            Err(Error::UnknownSupplier(code)) if code == "taobao"
        ));
    }

    #[test]
    fn test_feature_lookup() {
        assert!(TEST_CAPABILITIES.supports_feature(Platform::Meituan, ProviderFeature::Qrcode));
        assert!(!TEST_CAPABILITIES.supports_feature(Platform::Meituan, ProviderFeature::ConvertLink));
        assert!(!TEST_CAPABILITIES.supports_feature(Platform::Eleme, ProviderFeature::ActivityList));
        assert_eq!(TEST_CAPABILITIES.supported_link_types(Platform::Meituan), vec![1, 2]);
        assert!(TEST_CAPABILITIES.supported_link_types(Platform::Douyin).is_empty());
    }

    #[test]
    fn test_feature_serializes_camel_case() {
        let value = serde_json::to_value(ProviderFeature::MiniProgram).unwrap();
        assert_eq!(value, "miniProgram");
    }

    #[test]
    fn test_meta_from_capabilities() {
        let meta = ProviderMeta::from_capabilities(&TEST_CAPABILITIES, true);
        assert_eq!(meta.supported_platforms, vec![Platform::Meituan]);
        assert!(meta.configured);
    }
}
