use serde_json::Value;

use crate::adapter::{ActivityAdapter, DetailSource};
use crate::context::AdapterContext;
use crate::models::raw::{first_text, is_truthy, text_at};
use crate::models::{LinkType, LinkVariant, Platform, QrCode, RawActivity, StandardActivityDetail};
use crate::normalize::{extra_fields, LinkSet};

/// Envelope key of the Alibaba official-activity response.
const OFFICIAL_ACTIVITY_ENVELOPE: &str =
    "alibaba_alsc_union_eleme_promotion_officialactivity_get_response";

const NO_DESCRIPTION: &str = "该活动暂无详细说明";

const EXTRA_FIELDS: &[(&str, &[&str])] = &[
    ("推客佣金", &["tk_money", "tk_rate"]),
    ("官方佣金", &["official_rate"]),
    ("开放平台活动ID", &["activity_id", "campaign_id", "id"]),
    ("活动开始时间", &["start_time", "startTime"]),
    ("活动结束时间", &["end_time", "endTime"]),
];

/// Zhetaoke Eleme activities.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZtkElemeAdapter;

impl ZtkElemeAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// The activity record and its `link` block inside a detail response.
struct ElemeDetail {
    base: RawActivity,
    link: Value,
}

fn unwrap_detail(response: &Value) -> ElemeDetail {
    let entry = response
        .get(OFFICIAL_ACTIVITY_ENVELOPE)
        .filter(|value| value.is_object())
        .unwrap_or(response);
    let base = ["data", "result", "content"]
        .iter()
        .filter_map(|key| entry.get(*key))
        .find(|value| is_truthy(value))
        .unwrap_or(entry)
        .as_object()
        .cloned()
        .unwrap_or_default();
    let link = base
        .get("link")
        .filter(|value| value.is_object())
        .cloned()
        .unwrap_or(Value::Null);
    ElemeDetail { base, link }
}

fn first_text_at(root: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| text_at(root, path))
}

fn build_link_set(link: &Value) -> LinkSet {
    let mut links = LinkSet::new();
    links.push_variant(
        LinkType::SHORT_H5,
        "饿了么 H5",
        text_at(link, &["h5_promotion", "tj_h5_url"]),
    );
    links.push_variant(
        LinkType::APP,
        "支付宝唤起",
        text_at(link, &["alipay_promotion", "alipay_scheme_url"]),
    );
    links.push_variant(
        LinkType::SHORT_H5,
        "支付宝 H5",
        text_at(link, &["alipay_promotion", "h5_url"]),
    );
    links.push_variant(
        LinkType::APP,
        "淘宝唤起",
        text_at(link, &["taobao_promotion", "scheme_url"]),
    );
    links.push_variant(
        LinkType::SHORT_H5,
        "淘宝 H5",
        text_at(link, &["taobao_promotion", "h5_url"]),
    );
    links.push_variant(
        LinkType::MINI_PROGRAM,
        "支付宝小程序",
        first_text_at(
            link,
            &[
                &["alipay_promotion", "app_path"],
                &["alipay_promotion", "alipay_mini_url"],
            ],
        ),
    );
    links.push_variant(
        LinkType::MINI_PROGRAM,
        "微信小程序",
        text_at(link, &["wx_promotion", "wx_path"]),
    );

    links.push_qr(
        "支付宝二维码",
        first_text_at(
            link,
            &[&["alipay_promotion", "alipay_qr_code"], &["tb_qr_code"]],
        ),
        None,
        None,
    );
    links.push_qr(
        "微信二维码",
        text_at(link, &["wx_promotion", "wx_qr_code"]),
        None,
        None,
    );
    links.push_qr(
        "小程序二维码",
        first_text_at(link, &[&["mini_qrcode"], &["tb_mini_qrcode"]]),
        None,
        None,
    );
    links
}

impl ActivityAdapter for ZtkElemeAdapter {
    fn platform(&self) -> Platform {
        Platform::Eleme
    }

    /// Detail responses carry the record directly rather than in a list.
    fn detail_fallback(&self, payload: &Value, _link_type: Option<i64>) -> Option<RawActivity> {
        let ElemeDetail { base, .. } = unwrap_detail(payload);
        (!base.is_empty()).then_some(base)
    }

    fn normalize_detail(&self, source: &DetailSource, ctx: &AdapterContext) -> StandardActivityDetail {
        let ElemeDetail { base, link } = unwrap_detail(&source.response);
        let links = build_link_set(&link);
        let links_by_type = links.links_by_type();

        let mut extra = extra_fields(&base, EXTRA_FIELDS);
        extra.extend(links.qr_extras());

        let mut detail = StandardActivityDetail::from_summary(self.normalize_summary(&base, ctx));
        detail.description = Some(
            first_text(&base, &["description", "desc"])
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        );
        detail.link = links
            .default_link(&LinkType::SHORT_H5)
            .or_else(|| first_text(&base, &["activityLink", "link"]));
        detail.coupon_link = links
            .url_of(&LinkType::SHORT_H5)
            .or_else(|| first_text(&base, &["couponLink", "shortLink"]));
        detail.rules = first_text(&base, &["rule", "notice"]);
        detail.extra = extra;
        detail.app_link = links_by_type.get("3").cloned().or_else(|| {
            first_text_at(
                &link,
                &[
                    &["alipay_promotion", "alipay_scheme_url"],
                    &["taobao_promotion", "scheme_url"],
                ],
            )
            .or_else(|| first_text(&base, &["deeplink", "deepLink"]))
        });
        detail.mini_program_path = links_by_type.get("4").cloned().or_else(|| {
            first_text_at(
                &link,
                &[
                    &["alipay_promotion", "app_path"],
                    &["alipay_promotion", "alipay_mini_url"],
                    &["wx_promotion", "wx_path"],
                    &["mini_program", "path"],
                ],
            )
        });
        detail.links_by_type = links_by_type;
        detail.link_variants = links.variants;
        detail.qrcodes = links.qrcodes;
        detail.raw = Some(Value::Object(base));
        detail
    }

    fn extract_link_variants(&self, source: &DetailSource) -> Vec<LinkVariant> {
        build_link_set(&unwrap_detail(&source.response).link).variants
    }

    fn extract_qr_codes(&self, source: &DetailSource) -> Vec<QrCode> {
        build_link_set(&unwrap_detail(&source.response).link).qrcodes
    }
}
