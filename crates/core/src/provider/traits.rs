//! Supplier provider trait definitions.
//!
//! One [`SupplierProvider`] serves one (supplier, platform) pair. The
//! registry picks among providers for a platform by priority or strategy.

use async_trait::async_trait;
use cashback_adapters::{
    LinkVariant, Platform, QrCode, StandardActivityDetail, StandardActivitySummary,
};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

use super::capabilities::{ProviderCapabilities, ProviderFeature, SupplierCode};

/// Paging and filtering for an activity list request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchListOptions {
    pub page: u32,
    pub page_size: u32,
    pub activity_id: Option<String>,
    pub trace_id: String,
}

impl FetchListOptions {
    pub fn new(page: u32, page_size: u32, trace_id: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            activity_id: None,
            trace_id: trace_id.into(),
        }
    }

    pub fn with_activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchDetailOptions {
    pub id: String,
    pub link_type: Option<i64>,
    pub trace_id: String,
}

impl FetchDetailOptions {
    pub fn new(id: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link_type: None,
            trace_id: trace_id.into(),
        }
    }

    pub fn with_link_type(mut self, link_type: i64) -> Self {
        self.link_type = Some(link_type);
        self
    }
}

/// Input of a link conversion: a product url or share text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLinkOptions {
    pub content: String,
    /// Opaque value echoed back by the supplier for attribution.
    pub external_info: Option<String>,
    pub trace_id: String,
}

impl ConvertLinkOptions {
    pub fn new(content: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            external_info: None,
            trace_id: trace_id.into(),
        }
    }

    pub fn with_external_info(mut self, external_info: impl Into<String>) -> Self {
        self.external_info = Some(external_info.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListResult {
    pub items: Vec<StandardActivitySummary>,
    /// True when the page came back full.
    pub has_more: bool,
    pub page: u32,
    pub trace_id: String,
    pub cached: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLinkResult {
    pub platform: Platform,
    /// Preferred link, falling back to the first variant.
    pub link: String,
    pub short_link: Option<String>,
    /// Url of the first QR code.
    pub qr_code: Option<String>,
    pub trace_id: String,
    pub title: Option<String>,
    pub link_variants: Vec<LinkVariant>,
    pub qrcodes: Vec<QrCode>,
}

/// Trait for supplier providers.
///
/// Implementations are stateless per call: build signed parameters, make one
/// request through the injected HTTP client, then hand the payload to the
/// platform's adapter.
#[async_trait]
pub trait SupplierProvider: Send + Sync {
    fn supplier(&self) -> SupplierCode;

    fn platform(&self) -> Platform;

    /// Lower values are preferred.
    fn priority(&self) -> u32;

    fn capabilities(&self) -> &'static ProviderCapabilities;

    /// Whether the supplier's capability table lists `feature` for this
    /// provider's platform.
    fn supports(&self, feature: ProviderFeature) -> bool {
        self.capabilities()
            .supports_feature(self.platform(), feature)
    }

    async fn fetch_activity_list(&self, options: FetchListOptions) -> Result<ActivityListResult>;

    async fn fetch_activity_detail(
        &self,
        options: FetchDetailOptions,
    ) -> Result<StandardActivityDetail>;

    /// Converts a product link into rebate links.
    ///
    /// Fails with [`Error::UnsupportedOperation`] unless overridden. The
    /// default never touches the network.
    async fn convert_link(&self, _options: ConvertLinkOptions) -> Result<ConvertLinkResult> {
        Err(Error::unsupported_operation(
            ProviderFeature::ConvertLink.as_str(),
            self.supplier(),
            self.platform(),
        ))
    }

    /// One cheap request against the supplier. Never fails: problems are
    /// logged and reported as `false`.
    async fn health_check(&self) -> bool;
}
