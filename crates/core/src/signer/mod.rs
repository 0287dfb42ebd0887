//! Deterministic request signing.
//!
//! Parameters are cleaned (null and empty values dropped, everything else
//! rendered as text), sorted by key and joined as `k=v&k=v`. The signature
//! is the lowercase hex HMAC-SHA256 of that string.

mod reference;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use log::warn;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::Error;

pub use reference::{hmac_sha256, sha256};

type HmacSha256 = Hmac<Sha256>;

/// Name of the appended signature parameter.
pub const SIGN_PARAM: &str = "sign";

/// HMAC implementation used to sign requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningBackend {
    /// The `hmac` and `sha2` crates.
    #[default]
    Native,
    /// The in-crate implementation in [`reference`].
    Reference,
}

impl FromStr for SigningBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "reference" => Ok(Self::Reference),
            other => Err(Error::configuration(
                format!("Unknown signing backend: {}", other),
                "CASHBACK_SIGNING_BACKEND",
            )),
        }
    }
}

/// A scalar request parameter before signing.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl ParamValue {
    /// Text form sent on the wire, or `None` when the value is dropped.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Str(text) if text.is_empty() => None,
            Self::Str(text) => Some(text.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(js_number(*f)),
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Null => None,
        }
    }
}

/// Renders a float the way JavaScript's `Number.prototype.toString` does, so
/// signatures match clients that sign in the browser.
fn js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest round-trip digits, e.g. `1.25e-7`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, fraction) = digits.split_at(n as usize);
        format!("{}.{}", int_part, fraction)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{}", rest)
        };
        let power = n - 1;
        let power_sign = if power < 0 { '-' } else { '+' };
        format!("{}{}e{}{}", lead, fraction, power_sign, power.abs())
    };
    format!("{}{}", sign, body)
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Unsigned request parameters.
pub type Params = HashMap<String, ParamValue>;

/// Cleaned parameters plus the `sign` entry, ordered by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedParams(BTreeMap<String, String>);

impl SignedParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn signature(&self) -> &str {
        self.get(SIGN_PARAM).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for SignedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.0))
    }
}

fn clean(params: &Params) -> BTreeMap<String, String> {
    params
        .iter()
        .filter_map(|(key, value)| value.render().map(|text| (key.clone(), text)))
        .collect()
}

fn join(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signs outbound parameter maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParameterSigner {
    backend: SigningBackend,
}

impl ParameterSigner {
    pub fn new(backend: SigningBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> SigningBackend {
        self.backend
    }

    /// Canonical string: cleaned entries sorted by key, joined as `k=v&k=v`.
    pub fn canonicalize(&self, params: &Params) -> String {
        join(&clean(params))
    }

    /// Lowercase hex HMAC-SHA256 of `message`. An empty secret yields an
    /// empty signature.
    pub fn signature(&self, message: &str, secret: &str) -> String {
        if secret.is_empty() {
            warn!("Signing secret is empty, sending an empty signature");
            return String::new();
        }
        match self.backend {
            SigningBackend::Native => match HmacSha256::new_from_slice(secret.as_bytes()) {
                Ok(mut mac) => {
                    mac.update(message.as_bytes());
                    hex::encode(mac.finalize().into_bytes())
                }
                Err(e) => {
                    warn!("Invalid HMAC key ({}), using reference implementation", e);
                    hex::encode(hmac_sha256(secret.as_bytes(), message.as_bytes()))
                }
            },
            SigningBackend::Reference => {
                hex::encode(hmac_sha256(secret.as_bytes(), message.as_bytes()))
            }
        }
    }

    /// Cleans `params` and appends the `sign` entry.
    pub fn sign(&self, params: &Params, secret: &str) -> SignedParams {
        let mut cleaned = clean(params);
        let signature = self.signature(&join(&cleaned), secret);
        cleaned.insert(SIGN_PARAM.to_string(), signature);
        SignedParams(cleaned)
    }
}
