use chrono::{DateTime, Utc};

/// Per-call normalization context.
///
/// `now` is captured once so every status computed during a single call
/// agrees on the same instant.
#[derive(Clone, Debug)]
pub struct AdapterContext {
    pub trace_id: String,
    pub cached: bool,
    /// Link type requested by the caller, for suppliers that return a bare url.
    pub link_type: Option<i64>,
    pub now: DateTime<Utc>,
}

impl AdapterContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            cached: false,
            link_type: None,
            now: Utc::now(),
        }
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    pub fn with_link_type(mut self, link_type: Option<i64>) -> Self {
        self.link_type = link_type;
        self
    }

    /// Pins the clock, mostly for tests.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}
