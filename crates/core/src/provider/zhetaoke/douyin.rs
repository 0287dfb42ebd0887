use async_trait::async_trait;
use cashback_adapters::normalize::DEFAULT_TITLE;
use cashback_adapters::ztk::douyin_link_types;
use cashback_adapters::{
    ActivityAdapter, AdapterContext, DetailSource, Platform, StandardActivityDetail,
    ZtkDouyinAdapter,
};
use log::{debug, warn};
use serde_json::Value;

use super::{ZhetaokeClient, ZHETAOKE_CAPABILITIES};
use crate::errors::{Error, Result};
use crate::provider::capabilities::{ProviderCapabilities, ProviderFeature, SupplierCode};
use crate::provider::traits::{
    ActivityListResult, ConvertLinkOptions, ConvertLinkResult, FetchDetailOptions,
    FetchListOptions, SupplierProvider,
};
use crate::signer::{ParamValue, Params};

const CONVERT_ENDPOINT: &str = "https://api.zhetaoke.com:10001/api/open_douyin_zhuanlian.ashx";

/// Response codes the conversion endpoint uses for success.
const SUCCESS_CODES: [i64; 2] = [10000, 200];
const CONVERT_FAILED: &str = "转链失败";

/// Douyin is conversion-only: there is no activity catalogue to list.
pub struct ZhetaokeDouyinProvider {
    client: ZhetaokeClient,
    adapter: ZtkDouyinAdapter,
}

impl ZhetaokeDouyinProvider {
    pub fn new(client: ZhetaokeClient) -> Self {
        Self {
            client,
            adapter: ZtkDouyinAdapter::new(),
        }
    }

    fn unsupported(&self, feature: ProviderFeature) -> Error {
        Error::unsupported_operation(feature.as_str(), SupplierCode::Zhetaoke, Platform::Douyin)
    }
}

fn response_code(response: &Value) -> Option<i64> {
    match response.get("code")? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn into_convert_result(detail: StandardActivityDetail, trace_id: String) -> ConvertLinkResult {
    let short_link = detail
        .links_by_type
        .get(douyin_link_types::SHORT)
        .cloned();
    let title = Some(detail.summary.title).filter(|title| title != DEFAULT_TITLE);

    ConvertLinkResult {
        platform: Platform::Douyin,
        link: detail.link.unwrap_or_default(),
        short_link,
        qr_code: detail.qrcodes.first().map(|qr| qr.url.clone()),
        trace_id,
        title,
        link_variants: detail.link_variants,
        qrcodes: detail.qrcodes,
    }
}

#[async_trait]
impl SupplierProvider for ZhetaokeDouyinProvider {
    fn supplier(&self) -> SupplierCode {
        SupplierCode::Zhetaoke
    }

    fn platform(&self) -> Platform {
        Platform::Douyin
    }

    fn priority(&self) -> u32 {
        self.client.priority()
    }

    fn capabilities(&self) -> &'static ProviderCapabilities {
        &ZHETAOKE_CAPABILITIES
    }

    async fn fetch_activity_list(&self, _options: FetchListOptions) -> Result<ActivityListResult> {
        Err(self.unsupported(ProviderFeature::ActivityList))
    }

    async fn fetch_activity_detail(
        &self,
        _options: FetchDetailOptions,
    ) -> Result<StandardActivityDetail> {
        Err(self.unsupported(ProviderFeature::ActivityDetail))
    }

    async fn convert_link(&self, options: ConvertLinkOptions) -> Result<ConvertLinkResult> {
        let ConvertLinkOptions {
            content,
            external_info,
            trace_id,
        } = options;
        debug!("[zhetaoke:douyin] Converting link (trace: {})", trace_id);

        let mut params = Params::new();
        params.insert("product_url".to_string(), content.into());
        params.insert("need_qr_code".to_string(), "true".into());
        params.insert("use_coupon".to_string(), "true".into());
        params.insert("need_share_link".to_string(), "true".into());
        params.insert("external_info".to_string(), ParamValue::from(external_info));

        let response = self
            .client
            .get(CONVERT_ENDPOINT, &trace_id, &trace_id, params)
            .await?;

        let code = response_code(&response);
        if !code.is_some_and(|code| SUCCESS_CODES.contains(&code)) {
            let message = response
                .get("msg")
                .and_then(Value::as_str)
                .filter(|msg| !msg.is_empty())
                .unwrap_or(CONVERT_FAILED)
                .to_string();
            warn!(
                "[zhetaoke:douyin] Conversion rejected with code {:?}: {} (trace: {})",
                code, message, trace_id
            );
            return Err(Error::platform_request(message, trace_id)
                .with_origin(SupplierCode::Zhetaoke, Platform::Douyin)
                .with_details(Some(response)));
        }

        let ctx = AdapterContext::new(trace_id.as_str());
        let detail = self
            .adapter
            .normalize_detail(&DetailSource::from_response(response), &ctx);
        Ok(into_convert_result(detail, trace_id))
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::zhetaoke::test_support::{client, ScriptedHttpClient};
    use serde_json::json;

    fn provider(http: std::sync::Arc<ScriptedHttpClient>) -> ZhetaokeDouyinProvider {
        ZhetaokeDouyinProvider::new(client(Platform::Douyin, http))
    }

    #[tokio::test]
    async fn test_list_and_detail_are_unsupported_without_network() {
        let http = ScriptedHttpClient::new(vec![]);
        let provider = provider(http.clone());

        let err = provider
            .fetch_activity_list(FetchListOptions::new(1, 10, "douyin-t"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedOperation { ref operation, .. } if operation == "activityList"
        ));

        let err = provider
            .fetch_activity_detail(FetchDetailOptions::new("1", "douyin-t"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
        assert_eq!(http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_convert_link() {
        let http = ScriptedHttpClient::new(vec![Ok(json!({
            "code": 10000,
            "data": {"data": {
                "dy_zlink": "https://v.douyin.com/abc",
                "dy_deeplink": "snssdk1128://x",
                "qr_code": {"url": "https://img/qr.png", "width": 300, "height": 300}
            }}
        }))]);
        let result = provider(http.clone())
            .convert_link(
                ConvertLinkOptions::new("https://v.douyin.com/src", "douyin-t")
                    .with_external_info("u1"),
            )
            .await
            .unwrap();

        assert_eq!(result.link, "https://v.douyin.com/abc");
        assert_eq!(result.short_link.as_deref(), Some("https://v.douyin.com/abc"));
        assert_eq!(result.qr_code.as_deref(), Some("https://img/qr.png"));
        assert_eq!(result.title, None);
        assert_eq!(result.link_variants.len(), 2);

        let (url, options) = http.request(0);
        assert_eq!(url, CONVERT_ENDPOINT);
        assert_eq!(
            options.params.get("product_url").map(String::as_str),
            Some("https://v.douyin.com/src")
        );
        assert_eq!(options.params.get("need_qr_code").map(String::as_str), Some("true"));
        assert_eq!(options.params.get("external_info").map(String::as_str), Some("u1"));
    }

    #[tokio::test]
    async fn test_convert_link_accepts_string_code() {
        let http = ScriptedHttpClient::new(vec![Ok(json!({
            "code": "200",
            "data": {"data": {"dy_zlink": "https://v.douyin.com/str"}}
        }))]);
        let result = provider(http.clone())
            .convert_link(ConvertLinkOptions::new("https://v.douyin.com/src", "douyin-t"))
            .await
            .unwrap();

        assert_eq!(result.platform, Platform::Douyin);
        assert_eq!(result.link, "https://v.douyin.com/str");
        assert_eq!(result.trace_id, "douyin-t");
        assert_eq!(http.call_count(), 1);
    }

    #[tokio::test]
    async fn test_convert_link_rejected() {
        let payload = json!({"code": 40001, "msg": "链接无效"});
        let http = ScriptedHttpClient::new(vec![Ok(payload.clone())]);
        let err = provider(http)
            .convert_link(ConvertLinkOptions::new("bad", "douyin-t"))
            .await
            .unwrap_err();

        match err {
            Error::PlatformRequest {
                message, details, ..
            } => {
                assert_eq!(message, "链接无效");
                assert_eq!(details, Some(payload));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_convert_link_defaults_message() {
        let http = ScriptedHttpClient::new(vec![Ok(json!({"code": "500"}))]);
        let err = provider(http)
            .convert_link(ConvertLinkOptions::new("bad", "douyin-t"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlatformRequest { ref message, .. } if message == "转链失败"));
    }
}
