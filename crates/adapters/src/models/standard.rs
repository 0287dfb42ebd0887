//! The standard activity model every supplier payload is normalized into.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Downstream consumer platform an activity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Meituan,
    Eleme,
    Douyin,
}

impl Platform {
    /// All platforms, in display order.
    pub const ALL: [Platform; 3] = [Platform::Meituan, Platform::Eleme, Platform::Douyin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Meituan => "meituan",
            Platform::Eleme => "eleme",
            Platform::Douyin => "douyin",
        }
    }

    /// Parses a platform code, ignoring ASCII case.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an activity relative to the moment it was normalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Online,
    Offline,
    Upcoming,
    Unknown,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Online => "online",
            ActivityStatus::Offline => "offline",
            ActivityStatus::Upcoming => "upcoming",
            ActivityStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link type code. Zhetaoke uses numeric codes for Meituan and Eleme
/// (1 long H5, 2 short H5, 3 app deeplink, 4 mini-program path, 5 token)
/// and symbolic codes for Douyin (`short`, `deeplink`, `tkl`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkType {
    Code(i64),
    Named(String),
}

impl LinkType {
    pub const LONG_H5: LinkType = LinkType::Code(1);
    pub const SHORT_H5: LinkType = LinkType::Code(2);
    pub const APP: LinkType = LinkType::Code(3);
    pub const MINI_PROGRAM: LinkType = LinkType::Code(4);
    pub const TOKEN: LinkType = LinkType::Code(5);

    pub fn named(name: &str) -> Self {
        LinkType::Named(name.to_string())
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Code(code) => write!(f, "{}", code),
            LinkType::Named(name) => f.write_str(name),
        }
    }
}

/// One rendering of a rebate link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkVariant {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub label: String,
    pub url: String,
}

/// A QR code image offered by the supplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub label: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Free-form label/value pair shown alongside a detail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    pub label: String,
    pub value: String,
}

impl ExtraField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardActivitySummary {
    /// Never empty: falls back to the trace id when the payload carries no id.
    pub id: String,
    pub platform: Platform,
    pub title: String,
    pub cover: String,
    /// Finite and non-negative.
    pub commission_rate: f64,
    pub commission_text: String,
    pub deadline_text: String,
    pub status: ActivityStatus,
    pub tags: Vec<String>,
    pub trace_id: String,
    pub cached: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardActivityDetail {
    #[serde(flatten)]
    pub summary: StandardActivitySummary,
    pub description: Option<String>,
    pub link: Option<String>,
    pub coupon_link: Option<String>,
    pub rules: Option<String>,
    pub extra: Vec<ExtraField>,
    pub link_variants: Vec<LinkVariant>,
    pub qrcodes: Vec<QrCode>,
    /// Link type (as text) to the first url seen for it.
    pub links_by_type: BTreeMap<String, String>,
    pub app_link: Option<String>,
    pub mini_program_path: Option<String>,
    /// Upstream payload kept for diagnostics. Never parsed again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl StandardActivityDetail {
    /// Starts a detail with every detail-only field empty.
    pub fn from_summary(summary: StandardActivitySummary) -> Self {
        Self {
            summary,
            description: None,
            link: None,
            coupon_link: None,
            rules: None,
            extra: Vec::new(),
            link_variants: Vec::new(),
            qrcodes: Vec::new(),
            links_by_type: BTreeMap::new(),
            app_link: None,
            mini_program_path: None,
            raw: None,
        }
    }
}
