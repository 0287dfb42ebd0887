//! The adapter seam between a supplier's payloads and the standard model.

use serde_json::Value;

use crate::context::AdapterContext;
use crate::error::Result;
use crate::models::raw::{first_present, scalar_text};
use crate::models::{
    LinkVariant, Platform, QrCode, RawActivity, StandardActivityDetail, StandardActivitySummary,
};
use crate::normalize::{summarize, unwrap_list_response, ID_KEYS, LIST_CANDIDATE_PATHS};

/// Everything a detail normalization needs from one lookup.
#[derive(Clone, Debug, Default)]
pub struct DetailSource {
    /// The activity record, from the detail response or a list fallback.
    pub base: RawActivity,
    /// The full supplier response of the detail (or conversion) call.
    pub response: Value,
}

impl DetailSource {
    pub fn new(base: RawActivity, response: Value) -> Self {
        Self { base, response }
    }

    /// A source for responses that carry no separate base record.
    pub fn from_response(response: Value) -> Self {
        Self {
            base: RawActivity::new(),
            response,
        }
    }
}

fn id_text(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| value.to_string())
}

/// Normalizes one supplier's payloads for one platform.
///
/// List handling and summary normalization are shared through default
/// methods; each adapter supplies its own detail, link and QR extraction.
pub trait ActivityAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Envelope paths probed for the activity list, in order.
    fn list_candidates(&self) -> &'static [&'static [&'static str]] {
        LIST_CANDIDATE_PATHS
    }

    fn extract_activities(&self, payload: &Value) -> Result<Vec<RawActivity>> {
        unwrap_list_response(payload, self.list_candidates())
    }

    fn normalize_list(
        &self,
        payload: &Value,
        ctx: &AdapterContext,
    ) -> Result<Vec<StandardActivitySummary>> {
        Ok(self
            .extract_activities(payload)?
            .iter()
            .map(|raw| self.normalize_summary(raw, ctx))
            .collect())
    }

    fn normalize_summary(&self, raw: &RawActivity, ctx: &AdapterContext) -> StandardActivitySummary {
        summarize(self.platform(), raw, ctx)
    }

    /// The record's id, or `fallback` when it carries none.
    fn activity_id(&self, raw: &RawActivity, fallback: Option<&str>) -> Option<String> {
        first_present(raw, ID_KEYS)
            .map(id_text)
            .or_else(|| fallback.map(str::to_string))
    }

    /// True when any id alias of `raw` equals `id`.
    fn is_same_activity(&self, raw: &RawActivity, id: &str) -> bool {
        ID_KEYS
            .iter()
            .filter_map(|key| raw.get(*key))
            .filter(|value| !value.is_null())
            .any(|value| id_text(value) == id)
    }

    /// Treats a flat, non-list payload as a single detail record.
    fn detail_fallback(&self, _payload: &Value, _link_type: Option<i64>) -> Option<RawActivity> {
        None
    }

    fn normalize_detail(&self, source: &DetailSource, ctx: &AdapterContext) -> StandardActivityDetail;

    fn extract_link_variants(&self, source: &DetailSource) -> Vec<LinkVariant>;

    fn extract_qr_codes(&self, source: &DetailSource) -> Vec<QrCode>;
}
