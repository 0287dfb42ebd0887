//! Cached activity lookups on top of [`PlatformService`].

use std::sync::Arc;
use std::time::Duration;

use cashback_adapters::{Platform, StandardActivityDetail};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::PlatformService;
use crate::cache::{build_cache_key, hash_params, Cache};
use crate::errors::Result;
use crate::provider::{ActivityListResult, FetchDetailOptions, FetchListOptions};
use crate::trace::create_trace_id;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// List query as received from a caller. Missing or non-positive paging
/// values fall back to page 1 of size 10.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub activity_id: Option<String>,
}

fn positive_or(value: Option<i64>, default: u32) -> u32 {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

pub struct ActivityService {
    platforms: Arc<PlatformService>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl ActivityService {
    pub fn new(platforms: Arc<PlatformService>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            platforms,
            cache,
            ttl,
        }
    }

    pub fn platforms(&self) -> &PlatformService {
        &self.platforms
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(hit) => Some(hit),
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        let stored = match serde_json::to_value(value) {
            Ok(json) => self.cache.set(key, json, self.ttl).await,
            Err(e) => {
                warn!("Could not serialize cache entry {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = stored {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }

    pub async fn fetch_list(
        &self,
        platform: Platform,
        query: ListQuery,
    ) -> Result<ActivityListResult> {
        let trace_id = create_trace_id(&format!("{}-list", platform));
        let page = positive_or(query.page, DEFAULT_PAGE);
        let page_size = positive_or(query.page_size, DEFAULT_PAGE_SIZE);

        let key = build_cache_key(&[
            "platform",
            platform.as_str(),
            "api",
            "list",
            &hash_params(&json!({
                "page": page,
                "pageSize": page_size,
                "activityId": query.activity_id,
                "platform": platform,
            })),
        ]);

        if let Some(mut hit) = self.cached::<ActivityListResult>(&key).await {
            debug!("Cache hit {} (trace: {})", key, trace_id);
            hit.cached = true;
            for item in &mut hit.items {
                item.cached = true;
                item.trace_id = trace_id.clone();
            }
            hit.trace_id = trace_id;
            return Ok(hit);
        }

        let mut options = FetchListOptions::new(page, page_size, trace_id);
        options.activity_id = query.activity_id;
        let result = self.platforms.fetch_activity_list(platform, options).await?;
        self.store(&key, &result).await;
        Ok(result)
    }

    pub async fn fetch_detail(
        &self,
        platform: Platform,
        id: &str,
        link_type: Option<i64>,
    ) -> Result<StandardActivityDetail> {
        let trace_id = create_trace_id(&format!("{}-detail", platform));
        let link_type_key = link_type.unwrap_or(0).to_string();
        let key = build_cache_key(&[
            "platform",
            platform.as_str(),
            "api",
            "detail",
            id,
            "linkType",
            &link_type_key,
        ]);

        if let Some(mut hit) = self.cached::<StandardActivityDetail>(&key).await {
            debug!("Cache hit {} (trace: {})", key, trace_id);
            hit.summary.cached = true;
            hit.summary.trace_id = trace_id;
            return Ok(hit);
        }

        let options = FetchDetailOptions {
            id: id.to_string(),
            link_type,
            trace_id,
        };
        let detail = self.platforms.fetch_activity_detail(platform, options).await?;
        self.store(&key, &detail).await;
        Ok(detail)
    }

    /// Drops cached lookups for `platform`, or for every platform.
    pub async fn invalidate(&self, platform: Option<Platform>) -> Result<usize> {
        let pattern = match platform {
            Some(platform) => format!("platform:{}:*", platform),
            None => "platform:*".to_string(),
        };
        self.cache.invalidate_by_pattern(&pattern).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults() {
        assert_eq!(positive_or(None, DEFAULT_PAGE), 1);
        assert_eq!(positive_or(Some(0), DEFAULT_PAGE_SIZE), 10);
        assert_eq!(positive_or(Some(-3), DEFAULT_PAGE_SIZE), 10);
        assert_eq!(positive_or(Some(4), DEFAULT_PAGE), 4);
    }
}
