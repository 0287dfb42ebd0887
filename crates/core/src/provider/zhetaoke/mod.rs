//! Zhetaoke supplier.
//!
//! Every Zhetaoke request carries `appkey`, `sid`, an optional
//! `customer_id`, a millisecond `timestamp` and the `traceId`, signed with
//! the `sid` as secret. [`ZhetaokeClient`] holds that shared plumbing; the
//! per-platform providers only differ in endpoints and detail handling.

mod capabilities;
mod douyin;
mod eleme;
mod meituan;

use std::sync::Arc;
use std::time::Duration;

use cashback_adapters::{ActivityAdapter, AdapterContext, AdapterError, Platform};
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;

pub use capabilities::{APPKEY, CUSTOMER_ID, SID, ZHETAOKE_CAPABILITIES};
pub use douyin::ZhetaokeDouyinProvider;
pub use eleme::ZhetaokeElemeProvider;
pub use meituan::ZhetaokeMeituanProvider;

use crate::config::{validate_credentials, ProviderConfig};
use crate::errors::{Error, Result};
use crate::http::{HttpClient, HttpError, RequestOptions};
use crate::provider::capabilities::{ProviderCapabilities, SupplierCode};
use crate::provider::factory::{ensure_platform, ProviderFactory};
use crate::provider::traits::{ActivityListResult, FetchListOptions, SupplierProvider};
use crate::signer::{ParamValue, ParameterSigner, Params, SignedParams};

/// Activity list endpoint shared by Meituan and Eleme.
pub const LIST_ENDPOINT: &str = "http://api.zhetaoke.com:10000/api/api_activity.ashx";

const HEALTH_CHECK_TRACE_ID: &str = "health-check";
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
/// List type probed by the health check.
const HEALTH_CHECK_LIST_TYPE: i64 = 10;

/// Credentials, signer and HTTP client shared by the Zhetaoke providers.
#[derive(Clone)]
pub struct ZhetaokeClient {
    platform: Platform,
    appkey: String,
    sid: String,
    customer_id: Option<String>,
    priority: u32,
    timeout: Option<Duration>,
    signer: ParameterSigner,
    http: Arc<dyn HttpClient>,
}

impl ZhetaokeClient {
    /// Fails with [`Error::Configuration`] when `appkey` or `sid` is missing.
    pub fn new(
        platform: Platform,
        config: &ProviderConfig,
        http: Arc<dyn HttpClient>,
        signer: ParameterSigner,
    ) -> Result<Self> {
        validate_credentials(config, ZHETAOKE_CAPABILITIES.credential_fields)?;
        let required = |key: &str| {
            config.credential(key).map(str::to_string).ok_or_else(|| {
                Error::configuration(format!("Missing zhetaoke credential '{}'", key), key)
            })
        };

        Ok(Self {
            platform,
            appkey: required(APPKEY)?,
            sid: required(SID)?,
            customer_id: config.credential(CUSTOMER_ID).map(str::to_string),
            priority: config.priority,
            timeout: config.timeout(),
            signer,
            http,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Adds the account fields to `extra` and signs the result with the sid.
    pub fn build_signed_params(&self, trace_id: &str, extra: Params) -> SignedParams {
        let mut params = extra;
        params.insert("appkey".to_string(), self.appkey.as_str().into());
        params.insert("sid".to_string(), self.sid.as_str().into());
        params.insert(
            "customer_id".to_string(),
            ParamValue::from(self.customer_id.clone()),
        );
        params.insert(
            "timestamp".to_string(),
            Utc::now().timestamp_millis().into(),
        );
        params.insert("traceId".to_string(), trace_id.into());
        self.signer.sign(&params, &self.sid)
    }

    /// Signed GET against `url`. HTTP failures come back as
    /// [`Error::PlatformRequest`] tagged with supplier and platform.
    pub async fn get(
        &self,
        url: &str,
        trace_id: &str,
        param_trace_id: &str,
        extra: Params,
    ) -> Result<Value> {
        let params = self.build_signed_params(param_trace_id, extra);
        let mut options = RequestOptions::new().with_params(params);
        if let Some(timeout) = self.timeout {
            options = options.with_timeout(timeout);
        }

        debug!(
            "[zhetaoke:{}] GET {} (trace: {})",
            self.platform, url, trace_id
        );
        self.http
            .get(url, options)
            .await
            .map_err(|e| self.http_error(e, trace_id))
    }

    pub fn http_error(&self, err: HttpError, trace_id: &str) -> Error {
        let status = err.status_code();
        let error = Error::platform_request(format!("Zhetaoke request failed: {}", err), trace_id)
            .with_origin(SupplierCode::Zhetaoke, self.platform);
        match status {
            Some(status) => error.with_status(status),
            None => error,
        }
    }

    pub fn adapter_error(&self, err: AdapterError, trace_id: &str) -> Error {
        Error::from_adapter(err, trace_id).with_origin(SupplierCode::Zhetaoke, self.platform)
    }

    /// Fetches one list page and normalizes it with `adapter`.
    pub async fn fetch_list(
        &self,
        adapter: &dyn ActivityAdapter,
        list_type: i64,
        options: &FetchListOptions,
    ) -> Result<ActivityListResult> {
        let trace_id = options.trace_id.as_str();
        debug!(
            "[zhetaoke:{}] Fetching activity list page {} size {} (trace: {})",
            self.platform, options.page, options.page_size, trace_id
        );

        let mut params = Params::new();
        params.insert("type".to_string(), list_type.into());
        params.insert("page".to_string(), options.page.into());
        params.insert("page_size".to_string(), options.page_size.into());
        params.insert(
            "activityId".to_string(),
            ParamValue::from(options.activity_id.clone()),
        );

        let response = self.get(LIST_ENDPOINT, trace_id, trace_id, params).await?;
        let raw = adapter
            .extract_activities(&response)
            .map_err(|e| self.adapter_error(e, trace_id))?;

        let ctx = AdapterContext::new(trace_id);
        let items = raw
            .iter()
            .map(|activity| adapter.normalize_summary(activity, &ctx))
            .collect();

        Ok(ActivityListResult {
            items,
            has_more: raw.len() >= options.page_size as usize,
            page: options.page,
            trace_id: trace_id.to_string(),
            cached: false,
        })
    }

    /// Minimal list request with a short timeout. Never fails.
    pub async fn health_check(&self) -> bool {
        let mut extra = Params::new();
        extra.insert("type".to_string(), HEALTH_CHECK_LIST_TYPE.into());
        extra.insert("page".to_string(), 1i64.into());
        extra.insert("page_size".to_string(), 1i64.into());

        let options = RequestOptions::new()
            .with_params(self.build_signed_params(HEALTH_CHECK_TRACE_ID, extra))
            .with_timeout(HEALTH_CHECK_TIMEOUT);

        match self.http.get(LIST_ENDPOINT, options).await {
            Ok(_) => true,
            Err(e) => {
                warn!("[zhetaoke:{}] Health check failed: {}", self.platform, e);
                false
            }
        }
    }
}

/// Builds Zhetaoke providers for Meituan, Eleme and Douyin.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZhetaokeProviderFactory {
    signer: ParameterSigner,
}

impl ZhetaokeProviderFactory {
    pub fn new(signer: ParameterSigner) -> Self {
        Self { signer }
    }
}

impl ProviderFactory for ZhetaokeProviderFactory {
    fn code(&self) -> SupplierCode {
        SupplierCode::Zhetaoke
    }

    fn capabilities(&self) -> &'static ProviderCapabilities {
        &ZHETAOKE_CAPABILITIES
    }

    fn create(
        &self,
        platform: Platform,
        config: &ProviderConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Arc<dyn SupplierProvider>> {
        ensure_platform(self, platform)?;
        let client = ZhetaokeClient::new(platform, config, http, self.signer)?;
        let provider: Arc<dyn SupplierProvider> = match platform {
            Platform::Meituan => Arc::new(ZhetaokeMeituanProvider::new(client)),
            Platform::Eleme => Arc::new(ZhetaokeElemeProvider::new(client)),
            Platform::Douyin => Arc::new(ZhetaokeDouyinProvider::new(client)),
        };
        Ok(provider)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Serves canned responses in order and records every request.
    #[derive(Default)]
    pub struct ScriptedHttpClient {
        responses: Mutex<VecDeque<std::result::Result<Value, HttpError>>>,
        pub requests: Mutex<Vec<(String, RequestOptions)>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedHttpClient {
        pub fn new(responses: Vec<std::result::Result<Value, HttpError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn request(&self, index: usize) -> (String, RequestOptions) {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn get(
            &self,
            url: &str,
            options: RequestOptions,
        ) -> std::result::Result<Value, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), options));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::Transport("no scripted response".into())))
        }

        async fn post(
            &self,
            url: &str,
            _body: Option<Value>,
            options: RequestOptions,
        ) -> std::result::Result<Value, HttpError> {
            self.get(url, options).await
        }
    }

    pub fn config() -> ProviderConfig {
        ProviderConfig::new(SupplierCode::Zhetaoke)
            .with_priority(1)
            .with_credential(APPKEY, "test-key")
            .with_credential(SID, "test-sid")
    }

    pub fn client(platform: Platform, http: Arc<ScriptedHttpClient>) -> ZhetaokeClient {
        ZhetaokeClient::new(platform, &config(), http, ParameterSigner::default()).unwrap()
    }
}
