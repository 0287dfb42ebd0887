use async_trait::async_trait;
use cashback_adapters::{
    ActivityAdapter, AdapterContext, DetailSource, Platform, StandardActivityDetail,
    ZtkElemeAdapter,
};
use log::debug;
use serde_json::Value;

use super::{ZhetaokeClient, ZHETAOKE_CAPABILITIES};
use crate::errors::{Error, Result};
use crate::provider::capabilities::{ProviderCapabilities, SupplierCode};
use crate::provider::traits::{
    ActivityListResult, FetchDetailOptions, FetchListOptions, SupplierProvider,
};
use crate::signer::Params;

const DETAIL_ENDPOINT: &str = "https://api.zhetaoke.com:10001/api/open_eleme_generateLink.ashx";
const LIST_TYPE: i64 = 11;

pub struct ZhetaokeElemeProvider {
    client: ZhetaokeClient,
    adapter: ZtkElemeAdapter,
}

impl ZhetaokeElemeProvider {
    pub fn new(client: ZhetaokeClient) -> Self {
        Self {
            client,
            adapter: ZtkElemeAdapter::new(),
        }
    }

    /// True when the generate-link response holds something to normalize.
    fn has_detail(&self, response: &Value, link_type: Option<i64>) -> bool {
        let listed = self
            .adapter
            .extract_activities(response)
            .map(|items| !items.is_empty())
            .unwrap_or(false);
        listed
            || self.adapter.detail_fallback(response, link_type).is_some()
            || response.as_object().is_some_and(|root| !root.is_empty())
    }
}

#[async_trait]
impl SupplierProvider for ZhetaokeElemeProvider {
    fn supplier(&self) -> SupplierCode {
        SupplierCode::Zhetaoke
    }

    fn platform(&self) -> Platform {
        Platform::Eleme
    }

    fn priority(&self) -> u32 {
        self.client.priority()
    }

    fn capabilities(&self) -> &'static ProviderCapabilities {
        &ZHETAOKE_CAPABILITIES
    }

    async fn fetch_activity_list(&self, options: FetchListOptions) -> Result<ActivityListResult> {
        self.client.fetch_list(&self.adapter, LIST_TYPE, &options).await
    }

    async fn fetch_activity_detail(
        &self,
        options: FetchDetailOptions,
    ) -> Result<StandardActivityDetail> {
        debug!(
            "[zhetaoke:eleme] Fetching detail {} (trace: {})",
            options.id, options.trace_id
        );

        let mut params = Params::new();
        params.insert("activity_id".to_string(), options.id.as_str().into());
        let response = self
            .client
            .get(DETAIL_ENDPOINT, &options.trace_id, &options.trace_id, params)
            .await?;

        if !self.has_detail(&response, options.link_type) {
            return Err(
                Error::platform_request("未找到活动详情", options.trace_id.as_str())
                    .with_origin(SupplierCode::Zhetaoke, Platform::Eleme)
                    .with_details(Some(response)),
            );
        }

        let ctx = AdapterContext::new(options.trace_id.as_str()).with_link_type(options.link_type);
        Ok(self
            .adapter
            .normalize_detail(&DetailSource::from_response(response), &ctx))
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}
