//! Shared normalization used by every supplier adapter.
//!
//! Each logical field is resolved from an ordered list of alternate upstream
//! keys; the first present and truthy value wins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;

use crate::context::AdapterContext;
use crate::error::{AdapterError, Result};
use crate::format::{
    format_commission, format_date_range, infer_status, parse_commission, parse_time,
};
use crate::models::raw::{
    first_present, first_text, first_truthy, object_items, parse_embedded_json, scalar_text,
    value_at,
};
use crate::models::{
    ExtraField, LinkType, LinkVariant, Platform, QrCode, RawActivity, StandardActivitySummary,
};

pub const ID_KEYS: &[&str] = &[
    "activity_id",
    "activityId",
    "activity_id_long",
    "item_id",
    "id",
    "activityid",
    "actId",
    "act_id",
];
pub const TITLE_KEYS: &[&str] = &["title", "activity_name", "name", "pageName", "page_name"];
pub const COVER_KEYS: &[&str] = &["mainPic", "cover", "image", "thumbnail", "bannerUrl", "pageUrl"];
pub const START_KEYS: &[&str] = &["start_time", "startTime", "start_date", "startDate"];
pub const END_KEYS: &[&str] = &["end_time", "endTime", "end_date", "endDate"];
pub const COMMISSION_KEYS: &[&str] = &[
    "commission_rate",
    "rate",
    "return_money",
    "commission",
    "commissionRate",
    "rateValue",
    "avgCommissionRate",
];

pub const DEFAULT_TITLE: &str = "未命名活动";

/// Envelope paths probed, in order, for the activity list.
pub const LIST_CANDIDATE_PATHS: &[&[&str]] = &[
    &["data", "activity_list"],
    &["data", "list"],
    &["data", "items"],
    &["data", "result"],
    &["data", "info"],
    &["result"],
    &["content"],
    &["content", "list"],
];

fn list_from(candidate: &Value) -> Option<Vec<Value>> {
    match candidate {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => map.get("list").and_then(Value::as_array).cloned(),
        Value::String(_) => parse_embedded_json(candidate).and_then(|decoded| match decoded {
            Value::Array(items) => Some(items),
            Value::Object(map) => map.get("list").and_then(Value::as_array).cloned(),
            _ => None,
        }),
        _ => None,
    }
}

/// Unwraps an activity list from a supplier envelope.
///
/// The first candidate path yielding a non-empty list of objects wins.
pub fn unwrap_list_response(payload: &Value, candidates: &[&[&str]]) -> Result<Vec<RawActivity>> {
    candidates
        .iter()
        .filter_map(|path| value_at(payload, path))
        .filter_map(list_from)
        .map(|items| object_items(&items))
        .find(|items| !items.is_empty())
        .ok_or_else(|| AdapterError::no_activity_data(payload))
}

/// Stringified id, or `fallback` when absent or empty.
pub fn resolve_id(raw: &RawActivity, fallback: &str) -> String {
    first_present(raw, ID_KEYS)
        .map(|value| scalar_text(value).unwrap_or_else(|| value.to_string()))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn resolve_commission(raw: &RawActivity, trace_id: &str) -> f64 {
    let mut seen = false;
    for value in COMMISSION_KEYS.iter().filter_map(|key| raw.get(*key)) {
        if value.is_null() {
            continue;
        }
        seen = true;
        if let Some(rate) = parse_commission(value) {
            return rate;
        }
    }
    if seen {
        debug!("[{}] Unparsable commission, defaulting to 0", trace_id);
    }
    0.0
}

pub fn resolve_window(raw: &RawActivity) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start = first_truthy(raw, START_KEYS).and_then(parse_time);
    let end = first_truthy(raw, END_KEYS).and_then(parse_time);
    (start, end)
}

fn push_unique(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
    }
}

/// Tags from the `tags` field plus the platform name, type and average
/// commission. Only a `tags` array is deduplicated.
pub fn build_tags(raw: &RawActivity) -> Vec<String> {
    let mut tags = Vec::new();
    match raw.get("tags") {
        Some(Value::Array(items)) => {
            for item in items.iter().filter_map(Value::as_str) {
                push_unique(&mut tags, item);
            }
        }
        Some(Value::String(text)) => {
            tags.extend(
                text.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string),
            );
        }
        _ => {}
    }
    if let Some(name) = first_text(raw, &["platformName"]) {
        tags.push(name);
    }
    // A declared but null type still produces a tag.
    match raw.get("platformType") {
        Some(Value::Null) => tags.push("类型:null".to_string()),
        Some(value) => {
            if let Some(kind) = scalar_text(value) {
                tags.push(format!("类型:{}", kind));
            }
        }
        None => {}
    }
    if let Some(avg) = first_text(raw, &["avgCommissionRate"]) {
        tags.push(avg);
    }
    tags
}

pub fn summarize(
    platform: Platform,
    raw: &RawActivity,
    ctx: &AdapterContext,
) -> StandardActivitySummary {
    let commission_rate = resolve_commission(raw, &ctx.trace_id);
    let (start, end) = resolve_window(raw);
    StandardActivitySummary {
        id: resolve_id(raw, &ctx.trace_id),
        platform,
        title: first_text(raw, TITLE_KEYS).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        cover: first_text(raw, COVER_KEYS).unwrap_or_default(),
        commission_rate,
        commission_text: format_commission(commission_rate),
        deadline_text: format_date_range(start, end),
        status: infer_status(ctx.now, start, end),
        tags: build_tags(raw),
        trace_id: ctx.trace_id.clone(),
        cached: ctx.cached,
    }
}

/// Label/value pairs for a detail view. Each label takes the first truthy
/// value among its keys; labels without a value are skipped.
pub fn extra_fields(raw: &RawActivity, fields: &[(&str, &[&str])]) -> Vec<ExtraField> {
    fields
        .iter()
        .filter_map(|(label, keys)| {
            first_text(raw, keys).map(|value| ExtraField::new(*label, value))
        })
        .collect()
}

/// Link variants and QR codes collected for one detail, deduplicated by url.
#[derive(Debug, Default, Clone)]
pub struct LinkSet {
    pub variants: Vec<LinkVariant>,
    pub qrcodes: Vec<QrCode>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_variant(&mut self, link_type: LinkType, label: &str, url: Option<String>) {
        let Some(url) = url.filter(|url| !url.is_empty()) else {
            return;
        };
        if self.variants.iter().any(|variant| variant.url == url) {
            return;
        }
        self.variants.push(LinkVariant {
            link_type,
            label: label.to_string(),
            url,
        });
    }

    pub fn push_qr(
        &mut self,
        label: &str,
        url: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    ) {
        let Some(url) = url.filter(|url| !url.is_empty()) else {
            return;
        };
        if self.qrcodes.iter().any(|qr| qr.url == url) {
            return;
        }
        self.qrcodes.push(QrCode {
            label: label.to_string(),
            url,
            width,
            height,
        });
    }

    /// First url seen for `link_type`.
    pub fn url_of(&self, link_type: &LinkType) -> Option<String> {
        self.variants
            .iter()
            .find(|variant| &variant.link_type == link_type)
            .map(|variant| variant.url.clone())
    }

    /// The preferred type's url, falling back to the first variant.
    pub fn default_link(&self, preferred: &LinkType) -> Option<String> {
        self.url_of(preferred)
            .or_else(|| self.variants.first().map(|variant| variant.url.clone()))
    }

    pub fn links_by_type(&self) -> BTreeMap<String, String> {
        let mut links = BTreeMap::new();
        for variant in &self.variants {
            links
                .entry(variant.link_type.to_string())
                .or_insert_with(|| variant.url.clone());
        }
        links
    }

    /// QR codes rendered as extra fields.
    pub fn qr_extras(&self) -> Vec<ExtraField> {
        self.qrcodes
            .iter()
            .map(|qr| ExtraField::new(qr.label.clone(), qr.url.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawActivity {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unwrap_list_from_nested_list() {
        let payload = json!({"data": {"list": [{"activity_id": "1"}, 7, {"activity_id": "2"}]}});
        let items = unwrap_list_response(&payload, LIST_CANDIDATE_PATHS).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_unwrap_list_decodes_json_string() {
        let payload = json!({"content": "[{\"id\": 5}]"});
        let items = unwrap_list_response(&payload, LIST_CANDIDATE_PATHS).unwrap();
        assert_eq!(items[0]["id"], json!(5));

        let wrapped = json!({"content": "{\"list\": [{\"id\": 6}]}"});
        let items = unwrap_list_response(&wrapped, LIST_CANDIDATE_PATHS).unwrap();
        assert_eq!(items[0]["id"], json!(6));
    }

    #[test]
    fn test_unwrap_list_skips_empty_candidates() {
        let payload = json!({"data": {"activity_list": [], "items": {"list": [{"id": 1}]}}});
        let items = unwrap_list_response(&payload, LIST_CANDIDATE_PATHS).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_unwrap_list_fails_with_payload() {
        let payload = json!({"status": 301, "content": ""});
        let err = unwrap_list_response(&payload, LIST_CANDIDATE_PATHS).unwrap_err();
        assert_eq!(err.payload(), Some(&payload));
    }

    #[test]
    fn test_resolve_id_variants() {
        assert_eq!(resolve_id(&raw(json!({"actId": 42})), "t"), "42");
        assert_eq!(resolve_id(&raw(json!({"activity_id": ""})), "trace"), "trace");
        assert_eq!(resolve_id(&raw(json!({})), "trace"), "trace");
    }

    #[test]
    fn test_resolve_commission_falls_through() {
        let record = raw(json!({"commission_rate": "暂无", "rate": "8.5%"}));
        assert_eq!(resolve_commission(&record, "t"), 8.5);

        let record = raw(json!({"commission_rate": "--"}));
        assert_eq!(resolve_commission(&record, "t"), 0.0);

        let record = raw(json!({"avgCommissionRate": "6%"}));
        assert_eq!(resolve_commission(&record, "t"), 6.0);
    }

    #[test]
    fn test_build_tags() {
        let record = raw(json!({
            "tags": [" 外卖 ", "", "外卖", "新客"],
            "platformName": "美团",
            "platformType": 2,
        }));
        assert_eq!(build_tags(&record), vec!["外卖", "新客", "美团", "类型:2"]);

        let record = raw(json!({"tags": "a, b,,a", "platformType": 0}));
        assert_eq!(build_tags(&record), vec!["a", "b", "a", "类型:0"]);
    }

    #[test]
    fn test_build_tags_null_platform_type() {
        let record = raw(json!({"platformType": null}));
        assert_eq!(build_tags(&record), vec!["类型:null"]);

        let record = raw(json!({"title": "no type"}));
        assert!(build_tags(&record).is_empty());
    }

    #[test]
    fn test_extra_fields_takes_first_alias() {
        let record = raw(json!({"tk_rate": "3%", "official_rate": "", "id": 8}));
        let fields: &[(&str, &[&str])] = &[
            ("推客佣金", &["tk_money", "tk_rate"]),
            ("官方佣金", &["official_rate"]),
            ("ID", &["activity_id", "id"]),
        ];
        let extra = extra_fields(&record, fields);
        assert_eq!(extra, vec![ExtraField::new("推客佣金", "3%"), ExtraField::new("ID", "8")]);
    }

    #[test]
    fn test_link_set_dedups_by_url() {
        let mut links = LinkSet::new();
        links.push_variant(LinkType::LONG_H5, "long", Some("https://a".into()));
        links.push_variant(LinkType::SHORT_H5, "short", Some("https://a".into()));
        links.push_variant(LinkType::SHORT_H5, "short", Some("https://b".into()));
        links.push_variant(LinkType::APP, "app", None);
        assert_eq!(links.variants.len(), 2);
        assert_eq!(links.default_link(&LinkType::SHORT_H5), Some("https://b".into()));
        assert_eq!(links.default_link(&LinkType::TOKEN), Some("https://a".into()));
        assert_eq!(links.links_by_type().get("1"), Some(&"https://a".to_string()));
    }
}
