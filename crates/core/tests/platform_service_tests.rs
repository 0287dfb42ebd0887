//! Integration tests driving `PlatformService` and `ActivityService` through a
//! call-counting stub HTTP client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cashback_core::provider::zhetaoke::{APPKEY, SID};
use cashback_core::{
    build_cache_key, hash_params, ActivityService, ActivityStatus, Cache, ConvertLinkOptions,
    Error, FetchListOptions, HttpClient, HttpError, ListQuery, MemoryCache, Platform,
    PlatformService, ProviderConfig, ProviderFeature, RequestOptions, SelectionStrategy,
    ServiceConfig, SupplierCode,
};
use serde_json::{json, Value};

// =============================================================================
// Stub HTTP client
// =============================================================================

/// Answers every request with the same payload and counts calls.
struct StubHttpClient {
    response: Value,
    calls: AtomicUsize,
}

impl StubHttpClient {
    fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn get(&self, _url: &str, _options: RequestOptions) -> Result<Value, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    async fn post(
        &self,
        url: &str,
        _body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value, HttpError> {
        self.get(url, options).await
    }
}

// =============================================================================
// Unavailable cache
// =============================================================================

/// Fails every operation and counts attempted writes.
#[derive(Default)]
struct UnavailableCache {
    writes: AtomicUsize,
}

#[async_trait]
impl Cache for UnavailableCache {
    async fn get(&self, _key: &str) -> cashback_core::Result<Option<Value>> {
        Err(Error::platform_request("cache offline", "cache"))
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> cashback_core::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(Error::platform_request("cache offline", "cache"))
    }

    async fn delete(&self, _key: &str) -> cashback_core::Result<()> {
        Err(Error::platform_request("cache offline", "cache"))
    }

    async fn invalidate_by_pattern(&self, _pattern: &str) -> cashback_core::Result<usize> {
        Err(Error::platform_request("cache offline", "cache"))
    }
}

fn zhetaoke(priority: u32) -> ProviderConfig {
    ProviderConfig::new(SupplierCode::Zhetaoke)
        .with_priority(priority)
        .with_credential(APPKEY, "app")
        .with_credential(SID, "sid")
}

fn service_with(http: Arc<StubHttpClient>, strategy: SelectionStrategy) -> PlatformService {
    let config = ServiceConfig {
        providers: vec![zhetaoke(1)],
        selection_strategy: strategy,
        ..ServiceConfig::default()
    };
    PlatformService::new(&config, http)
}

fn list_payload() -> Value {
    json!({"data": {"list": [{"activity_id": "9", "title": "X", "commission_rate": "12%"}]}})
}

// =============================================================================
// PlatformService
// =============================================================================

#[tokio::test]
async fn test_end_to_end_list_normalization() {
    let http = StubHttpClient::new(list_payload());
    let service = service_with(http.clone(), SelectionStrategy::Priority);

    let result = service
        .fetch_activity_list(Platform::Meituan, FetchListOptions::new(1, 10, ""))
        .await
        .unwrap();

    assert_eq!(http.calls(), 1);
    assert!(!result.has_more);
    assert!(result.trace_id.starts_with("meituan-"));

    let item = &result.items[0];
    assert_eq!(item.id, "9");
    assert_eq!(item.title, "X");
    assert_eq!(item.commission_rate, 12.0);
    assert_eq!(item.commission_text, "12%");
    assert_eq!(item.status, ActivityStatus::Unknown);
    assert!(item.tags.is_empty());
    assert_eq!(item.trace_id, result.trace_id);
}

#[tokio::test]
async fn test_convert_link_without_capability_makes_no_request() {
    let http = StubHttpClient::new(json!({}));
    let service = service_with(http.clone(), SelectionStrategy::Priority);

    for platform in [Platform::Meituan, Platform::Eleme] {
        assert!(!service.supports_feature(platform, ProviderFeature::ConvertLink));
        let err = service
            .convert_link(platform, ConvertLinkOptions::new("https://example.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }
    assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn test_douyin_list_is_unsupported_without_request() {
    let http = StubHttpClient::new(json!({}));
    let service = service_with(http.clone(), SelectionStrategy::RoundRobin);

    let err = service
        .fetch_activity_list(Platform::Douyin, FetchListOptions::new(1, 10, "t"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }));
    assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn test_douyin_convert_link() {
    let http = StubHttpClient::new(json!({
        "code": 200,
        "data": {"data": {"dy_zlink": "https://v.douyin.com/short"}}
    }));
    let service = service_with(http.clone(), SelectionStrategy::Priority);

    let result = service
        .convert_link(
            Platform::Douyin,
            ConvertLinkOptions::new("https://v.douyin.com/src", "douyin-trace"),
        )
        .await
        .unwrap();

    assert_eq!(result.link, "https://v.douyin.com/short");
    assert_eq!(result.trace_id, "douyin-trace");
    assert_eq!(http.calls(), 1);
}

#[tokio::test]
async fn test_priority_selection_prefers_lowest_value() {
    let http = StubHttpClient::new(list_payload());
    let config = ServiceConfig {
        providers: vec![zhetaoke(7), zhetaoke(1), zhetaoke(4)],
        ..ServiceConfig::default()
    };
    let service = PlatformService::new(&config, http);

    assert_eq!(service.registry().providers_for(Platform::Meituan).len(), 3);
    let selected = service
        .registry()
        .select(Platform::Meituan, SelectionStrategy::Priority, "t")
        .unwrap();
    assert_eq!(selected.priority(), 1);
    assert_eq!(service.provider_metas().len(), 1);
}

#[tokio::test]
async fn test_health_check() {
    let http = StubHttpClient::new(json!({"status": 200}));
    let service = service_with(http.clone(), SelectionStrategy::Priority);

    assert!(service.health_check(Platform::Eleme).await);
    assert_eq!(http.calls(), 1);
}

// =============================================================================
// ActivityService
// =============================================================================

#[tokio::test]
async fn test_activity_service_caches_lists() {
    let http = StubHttpClient::new(list_payload());
    let platforms = Arc::new(service_with(http.clone(), SelectionStrategy::Priority));
    let cache = Arc::new(MemoryCache::new());
    let activities = ActivityService::new(platforms, cache.clone(), Duration::from_secs(60));

    let query = ListQuery {
        page: Some(0),
        page_size: None,
        activity_id: None,
    };
    let first = activities
        .fetch_list(Platform::Meituan, query.clone())
        .await
        .unwrap();
    let second = activities
        .fetch_list(
            Platform::Meituan,
            ListQuery {
                page: Some(1),
                page_size: Some(10),
                activity_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(http.calls(), 1);
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.page, 1);
    assert_ne!(first.trace_id, second.trace_id);
    assert!(second.trace_id.starts_with("meituan-list-"));
    assert_eq!(second.items[0].id, "9");

    let removed = activities.invalidate(Some(Platform::Meituan)).await.unwrap();
    assert_eq!(removed, 1);
    activities.fetch_list(Platform::Meituan, query).await.unwrap();
    assert_eq!(http.calls(), 2);
}

#[tokio::test]
async fn test_activity_service_caches_details_per_link_type() {
    let http = StubHttpClient::new(json!({
        "data": {"list": [{"activity_id": "5", "title": "Detail", "link": "https://x/5"}]}
    }));
    let platforms = Arc::new(service_with(http.clone(), SelectionStrategy::Priority));
    let cache = Arc::new(MemoryCache::new());
    let activities = ActivityService::new(platforms, cache.clone(), Duration::from_secs(60));

    let first = activities.fetch_detail(Platform::Meituan, "5", None).await.unwrap();
    let second = activities.fetch_detail(Platform::Meituan, "5", None).await.unwrap();
    activities
        .fetch_detail(Platform::Meituan, "5", Some(2))
        .await
        .unwrap();

    assert_eq!(http.calls(), 2);
    assert!(!first.summary.cached);
    assert!(second.summary.cached);
    assert_eq!(second.summary.title, "Detail");
    assert!(cache
        .get("platform:meituan:api:detail:5:linkType:0")
        .await
        .unwrap()
        .is_some());

    assert_eq!(activities.invalidate(None).await.unwrap(), 2);
}

#[tokio::test]
async fn test_cache_hit_refreshes_every_item() {
    let http = StubHttpClient::new(json!({"data": {"list": [
        {"activity_id": "1", "title": "A"},
        {"activity_id": "2", "title": "B"}
    ]}}));
    let platforms = Arc::new(service_with(http.clone(), SelectionStrategy::Priority));
    let activities =
        ActivityService::new(platforms, Arc::new(MemoryCache::new()), Duration::from_secs(60));

    let first = activities
        .fetch_list(Platform::Meituan, ListQuery::default())
        .await
        .unwrap();
    let second = activities
        .fetch_list(Platform::Meituan, ListQuery::default())
        .await
        .unwrap();

    assert_eq!(http.calls(), 1);
    assert!(first.items.iter().all(|item| !item.cached));
    assert!(first.items.iter().all(|item| item.trace_id == first.trace_id));
    assert_eq!(second.items.len(), 2);
    assert!(second.items.iter().all(|item| item.cached));
    assert!(second.items.iter().all(|item| item.trace_id == second.trace_id));
    assert_ne!(second.items[0].trace_id, first.items[0].trace_id);
}

#[tokio::test]
async fn test_failing_cache_falls_through_to_provider() {
    let http = StubHttpClient::new(list_payload());
    let platforms = Arc::new(service_with(http.clone(), SelectionStrategy::Priority));
    let cache = Arc::new(UnavailableCache::default());
    let activities = ActivityService::new(platforms, cache.clone(), Duration::from_secs(60));

    for _ in 0..2 {
        let result = activities
            .fetch_list(Platform::Meituan, ListQuery::default())
            .await
            .unwrap();
        assert!(!result.cached);
        assert_eq!(result.items[0].id, "9");
    }
    let detail = activities
        .fetch_detail(Platform::Meituan, "9", None)
        .await
        .unwrap();
    assert!(!detail.summary.cached);

    assert_eq!(http.calls(), 3);
    assert_eq!(cache.writes.load(Ordering::SeqCst), 3);
    assert!(activities.invalidate(None).await.is_err());
}

#[tokio::test]
async fn test_unreadable_cache_entry_is_replaced() {
    let http = StubHttpClient::new(list_payload());
    let platforms = Arc::new(service_with(http.clone(), SelectionStrategy::Priority));
    let cache = Arc::new(MemoryCache::new());
    let activities = ActivityService::new(platforms, cache.clone(), Duration::from_secs(60));

    let key = build_cache_key(&[
        "platform",
        "meituan",
        "api",
        "list",
        &hash_params(&json!({
            "page": 1,
            "pageSize": 10,
            "activityId": Option::<String>::None,
            "platform": Platform::Meituan,
        })),
    ]);
    cache
        .set(&key, json!("not a list result"), Duration::from_secs(60))
        .await
        .unwrap();

    let first = activities
        .fetch_list(Platform::Meituan, ListQuery::default())
        .await
        .unwrap();
    assert!(!first.cached);
    assert_eq!(http.calls(), 1);

    let second = activities
        .fetch_list(Platform::Meituan, ListQuery::default())
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(http.calls(), 1);
    assert_eq!(cache.len(), 1);
}
