use serde_json::Value;

use crate::adapter::{ActivityAdapter, DetailSource};
use crate::context::AdapterContext;
use crate::models::raw::{scalar_text, text_at, value_at};
use crate::models::{LinkType, LinkVariant, Platform, QrCode, StandardActivityDetail};
use crate::normalize::LinkSet;

/// Conversion results live under `data.data`.
const RESULT_PATH: &[&str] = &["data", "data"];

/// Symbolic link types returned by the Douyin conversion endpoint.
pub mod link_types {
    pub const TOKEN: &str = "tkl";
    pub const DEEPLINK: &str = "deeplink";
    pub const SHORT: &str = "short";
    pub const H5: &str = "h5";
    pub const H5_COUPON: &str = "h5_coupon";
    pub const TOKEN_COUPON: &str = "tkl_coupon";
    pub const DEEPLINK_COUPON: &str = "deeplink_coupon";
}

/// Zhetaoke Douyin link conversion.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZtkDouyinAdapter;

impl ZtkDouyinAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn dimension(qr: &Value, key: &str) -> Option<u32> {
    let value = qr.get(key)?;
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => scalar_text(value).and_then(|text| text.trim().parse().ok()),
    }
}

fn push_qr(links: &mut LinkSet, label: &str, qr: Option<&Value>) {
    let Some(qr) = qr else {
        return;
    };
    links.push_qr(
        label,
        text_at(qr, &["url"]),
        dimension(qr, "width"),
        dimension(qr, "height"),
    );
}

fn build_link_set(response: &Value) -> LinkSet {
    let mut links = LinkSet::new();
    let Some(data) = value_at(response, RESULT_PATH) else {
        return links;
    };

    let variants: [(&str, &str, &[&str]); 7] = [
        (link_types::TOKEN, "抖音口令", &["dy_password"]),
        (link_types::DEEPLINK, "抖音DeepLink", &["dy_deeplink"]),
        (link_types::SHORT, "抖音短链接", &["dy_zlink"]),
        (link_types::H5, "站外H5链接", &["share_link"]),
        (link_types::H5_COUPON, "领券H5链接", &["coupon_link", "share_link"]),
        (link_types::TOKEN_COUPON, "领券口令", &["coupon_link", "share_command"]),
        (link_types::DEEPLINK_COUPON, "领券DeepLink", &["coupon_link", "deeplink"]),
    ];
    for (link_type, label, path) in variants {
        links.push_variant(LinkType::named(link_type), label, text_at(data, path));
    }

    push_qr(&mut links, "商品二维码", data.get("qr_code"));
    push_qr(&mut links, "领券二维码", value_at(data, &["coupon_link", "qrcode"]));
    links
}

impl ActivityAdapter for ZtkDouyinAdapter {
    fn platform(&self) -> Platform {
        Platform::Douyin
    }

    fn normalize_detail(&self, source: &DetailSource, ctx: &AdapterContext) -> StandardActivityDetail {
        let links = build_link_set(&source.response);
        let links_by_type = links.links_by_type();

        let mut detail =
            StandardActivityDetail::from_summary(self.normalize_summary(&source.base, ctx));
        detail.link = links.default_link(&LinkType::named(link_types::SHORT));
        detail.coupon_link = links.url_of(&LinkType::named(link_types::H5_COUPON));
        detail.app_link = links_by_type.get(link_types::DEEPLINK).cloned();
        detail.links_by_type = links_by_type;
        detail.link_variants = links.variants;
        detail.qrcodes = links.qrcodes;
        detail.raw = Some(source.response.clone());
        detail
    }

    fn extract_link_variants(&self, source: &DetailSource) -> Vec<LinkVariant> {
        build_link_set(&source.response).variants
    }

    fn extract_qr_codes(&self, source: &DetailSource) -> Vec<QrCode> {
        build_link_set(&source.response).qrcodes
    }
}
