use async_trait::async_trait;
use cashback_adapters::{
    ActivityAdapter, AdapterContext, DetailSource, Platform, RawActivity,
    StandardActivityDetail, ZtkMeituanAdapter,
};
use log::{debug, info};
use serde_json::Value;

use super::{ZhetaokeClient, LIST_ENDPOINT, ZHETAOKE_CAPABILITIES};
use crate::errors::{Error, Result};
use crate::provider::capabilities::{ProviderCapabilities, SupplierCode};
use crate::provider::traits::{
    ActivityListResult, FetchDetailOptions, FetchListOptions, SupplierProvider,
};
use crate::signer::Params;

const DETAIL_ENDPOINT: &str = "http://api.zhetaoke.com:10000/api/open_meituan_generateLink.ashx";
const LIST_TYPE: i64 = 10;
const DEFAULT_LINK_TYPE: i64 = 1;

pub struct ZhetaokeMeituanProvider {
    client: ZhetaokeClient,
    adapter: ZtkMeituanAdapter,
}

impl ZhetaokeMeituanProvider {
    pub fn new(client: ZhetaokeClient) -> Self {
        Self {
            client,
            adapter: ZtkMeituanAdapter::new(),
        }
    }

    fn pick(&self, items: Vec<RawActivity>, id: &str) -> Option<RawActivity> {
        let position = items
            .iter()
            .position(|item| self.adapter.is_same_activity(item, id))
            .unwrap_or(0);
        items.into_iter().nth(position)
    }

    /// Looks the activity up on the list endpoint when the generate-link
    /// response carries no usable record. A list payload without activities
    /// fails with that payload attached.
    async fn fetch_single_activity(&self, id: &str, trace_id: &str) -> Result<Option<RawActivity>> {
        info!(
            "[zhetaoke:meituan] Detail response had no activity, falling back to list (trace: {})",
            trace_id
        );
        let mut params = Params::new();
        params.insert("type".to_string(), LIST_TYPE.into());
        params.insert("activityId".to_string(), id.into());

        let fallback_trace = format!("{}-fallback", trace_id);
        let response = self
            .client
            .get(LIST_ENDPOINT, trace_id, &fallback_trace, params)
            .await?;

        let items = self
            .adapter
            .extract_activities(&response)
            .map_err(|e| self.client.adapter_error(e, trace_id))?;
        Ok(self.pick(items, id))
    }
}

#[async_trait]
impl SupplierProvider for ZhetaokeMeituanProvider {
    fn supplier(&self) -> SupplierCode {
        SupplierCode::Zhetaoke
    }

    fn platform(&self) -> Platform {
        Platform::Meituan
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
        let FetchDetailOptions {
            id,
            link_type,
            trace_id,
        } = options;
        debug!(
            "[zhetaoke:meituan] Fetching detail {} with link type {:?} (trace: {})",
            id, link_type, trace_id
        );

        let mut params = Params::new();
        params.insert("actId".to_string(), id.as_str().into());
        params.insert("activityId".to_string(), id.as_str().into());
        params.insert(
            "linkType".to_string(),
            link_type.unwrap_or(DEFAULT_LINK_TYPE).into(),
        );
        params.insert("miniCode".to_string(), 1i64.into());

        let response: Value = self
            .client
            .get(DETAIL_ENDPOINT, &trace_id, &trace_id, params)
            .await?;

        let base = match self.adapter.extract_activities(&response) {
            Ok(items) => self.pick(items, &id),
            Err(_) => self.adapter.detail_fallback(&response, link_type),
        };
        let base = match base {
            Some(base) => base,
            None => self
                .fetch_single_activity(&id, &trace_id)
                .await?
                .ok_or_else(|| {
                    Error::platform_request("未找到活动详情", trace_id.as_str())
                        .with_origin(SupplierCode::Zhetaoke, Platform::Meituan)
                        .with_details(Some(response.clone()))
                })?,
        };

        let ctx = AdapterContext::new(trace_id.as_str()).with_link_type(link_type);
        let detail = self
            .adapter
            .normalize_detail(&DetailSource::new(base, response), &ctx);
        debug!(
            "[zhetaoke:meituan] Detail {} resolved with {} link variant(s) (trace: {})",
            detail.summary.id,
            detail.link_variants.len(),
            trace_id
        );
        Ok(detail)
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}
