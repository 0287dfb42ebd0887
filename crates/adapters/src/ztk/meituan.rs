use serde_json::{Map, Value};

use crate::adapter::{ActivityAdapter, DetailSource};
use crate::context::AdapterContext;
use crate::models::raw::{first_text, is_truthy};
use crate::models::{LinkType, LinkVariant, Platform, QrCode, RawActivity, StandardActivityDetail};
use crate::normalize::{extra_fields, LinkSet};

const NO_DESCRIPTION: &str = "官方未提供活动说明";

const QR_KEYS: &[&str] = &["qrcode_chang_pic", "qrcode_wx_pic", "wx_mini_pic"];

/// Base activity fields surfaced verbatim as extras, labelled by key.
const EXTRA_FIELDS: &[(&str, &[&str])] = &[
    ("commission", &["commission"]),
    ("reward", &["reward"]),
    ("start_time", &["start_time"]),
    ("end_time", &["end_time"]),
    ("couponAmount", &["couponAmount"]),
    ("apply_link", &["apply_link"]),
];

/// Zhetaoke Meituan activities.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZtkMeituanAdapter;

impl ZtkMeituanAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn link_label(link_type: i64) -> &'static str {
    match link_type {
        1 => "H5 长链接",
        2 => "H5 短链接",
        3 => "App Deeplink",
        4 => "小程序路径",
        5 => "团口令",
        _ => "链接",
    }
}

fn link_type_of(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn first_item(value: Option<&Value>) -> Option<RawActivity> {
    value?.as_array()?.first()?.as_object().cloned()
}

/// Builds a link record from a bare generate-link response, mapping the
/// returned url onto the requested link type.
fn flat_link_detail(root: &Map<String, Value>, link_type: Option<i64>) -> RawActivity {
    let mut detail = RawActivity::new();
    let url = root.get("data").and_then(Value::as_str).map(str::to_string);

    if let Some(url) = &url {
        detail.insert("shortLink".into(), Value::String(url.clone()));
    }
    for key in QR_KEYS {
        if let Some(value) = root.get(*key) {
            detail.insert((*key).to_string(), value.clone());
        }
    }
    if let Some(url) = url {
        let keys: &[&str] = match link_type {
            Some(1) => &["longLink"],
            Some(2) => &["shortLink"],
            Some(3) => &["deeplink", "deepLink", "appLink"],
            Some(4) => &["wx_mini_path"],
            Some(5) => &["tk_lian", "tkl"],
            _ => &[],
        };
        for key in keys {
            detail.insert((*key).to_string(), Value::String(url.clone()));
        }
    }
    if let Some(link_type) = link_type {
        detail.insert("linkType".into(), Value::from(link_type));
    }
    detail
}

/// Locates the link record inside a generate-link response.
fn extract_link_detail(payload: &Value, link_type: Option<i64>) -> Option<RawActivity> {
    let root = payload.as_object()?;

    let data_is_url = matches!(root.get("data"), Some(Value::String(_)));
    let has_qr = QR_KEYS
        .iter()
        .any(|key| root.get(*key).is_some_and(is_truthy));
    if data_is_url || has_qr {
        return Some(flat_link_detail(root, link_type));
    }

    if let Some(Value::Object(data)) = root.get("data") {
        if let Some(Value::Array(list)) = data.get("list") {
            return list.first().and_then(Value::as_object).cloned();
        }
        return Some(data.clone());
    }
    if let Some(item) = first_item(root.get("content")) {
        return Some(item);
    }
    if let Some(item) = first_item(root.get("result")) {
        return Some(item);
    }

    let looks_like_detail = ["link", "activityLink", "shortLink"]
        .iter()
        .chain(QR_KEYS)
        .any(|key| root.get(*key).is_some_and(is_truthy));
    looks_like_detail.then(|| root.clone())
}

fn build_link_set(detail: Option<&RawActivity>) -> LinkSet {
    let mut links = LinkSet::new();
    let Some(detail) = detail else {
        return links;
    };

    let declared = link_type_of(detail.get("linkType"));
    links.push_variant(
        LinkType::Code(declared.unwrap_or(0)),
        declared.map_or("链接", link_label),
        first_text(detail, &["link"]),
    );
    links.push_variant(
        LinkType::LONG_H5,
        "H5 长链接",
        first_text(detail, &["longLink", "activityLink"]),
    );
    links.push_variant(
        LinkType::SHORT_H5,
        "H5 短链接",
        first_text(detail, &["shortLink", "cpsShortUrl", "h5ShortUrl"]),
    );
    links.push_variant(
        LinkType::APP,
        "App 唤起链接",
        first_text(detail, &["deeplink", "deepLink", "appLink"]),
    );
    links.push_variant(
        LinkType::MINI_PROGRAM,
        "小程序路径",
        first_text(detail, &["wx_mini_path", "wxMiniPath", "miniProgramPath"]),
    );
    links.push_variant(LinkType::TOKEN, "团口令", first_text(detail, &["tk_lian", "tkl"]));

    links.push_qr("H5 二维码", first_text(detail, &["qrcode_chang_pic"]), None, None);
    links.push_qr("微信二维码", first_text(detail, &["qrcode_wx_pic"]), None, None);
    links.push_qr("小程序码", first_text(detail, &["wx_mini_pic"]), None, None);
    links
}

impl ActivityAdapter for ZtkMeituanAdapter {
    fn platform(&self) -> Platform {
        Platform::Meituan
    }

    fn detail_fallback(&self, payload: &Value, link_type: Option<i64>) -> Option<RawActivity> {
        extract_link_detail(payload, link_type)
    }

    fn normalize_detail(&self, source: &DetailSource, ctx: &AdapterContext) -> StandardActivityDetail {
        let base = &source.base;
        let link_detail = extract_link_detail(&source.response, ctx.link_type);
        let links = build_link_set(link_detail.as_ref());
        let links_by_type = links.links_by_type();

        let mut extra = extra_fields(base, EXTRA_FIELDS);
        extra.extend(links.qr_extras());

        let mut raw = base.clone();
        raw.insert(
            "linkDetail".into(),
            link_detail.map(Value::Object).unwrap_or(Value::Null),
        );

        let mut detail = StandardActivityDetail::from_summary(self.normalize_summary(base, ctx));
        detail.description = Some(
            first_text(base, &["activity_desc", "desc"])
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        );
        detail.link = links
            .default_link(&LinkType::SHORT_H5)
            .or_else(|| first_text(base, &["activityLink", "link"]));
        detail.coupon_link = links
            .url_of(&LinkType::SHORT_H5)
            .or_else(|| first_text(base, &["couponLink", "shareUrl"]));
        detail.rules = first_text(base, &["rule", "ext_desc"]);
        detail.extra = extra;
        detail.app_link = links_by_type
            .get("3")
            .cloned()
            .or_else(|| first_text(base, &["deeplink", "deepLink", "appLink"]));
        detail.mini_program_path = links_by_type
            .get("4")
            .cloned()
            .or_else(|| first_text(base, &["wx_mini_path", "wxMiniPath", "miniProgramPath"]));
        detail.links_by_type = links_by_type;
        detail.link_variants = links.variants;
        detail.qrcodes = links.qrcodes;
        detail.raw = Some(Value::Object(raw));
        detail
    }

    fn extract_link_variants(&self, source: &DetailSource) -> Vec<LinkVariant> {
        build_link_set(extract_link_detail(&source.response, None).as_ref()).variants
    }

    fn extract_qr_codes(&self, source: &DetailSource) -> Vec<QrCode> {
        build_link_set(extract_link_detail(&source.response, None).as_ref()).qrcodes
    }
}
