//! Cashback Adapters
//!
//! Turns loosely structured supplier payloads into the standard activity
//! model. One adapter exists per supplier and platform pair; all of them share
//! list unwrapping, field alias resolution and display formatting.
//!
//! # Example
//!
//! ```
//! use cashback_adapters::{create_ztk_adapter, AdapterContext, Platform};
//! use serde_json::json;
//!
//! let adapter = create_ztk_adapter(Platform::Meituan);
//! let payload = json!({"data": {"list": [{"activity_id": "9", "title": "X"}]}});
//! let items = adapter.normalize_list(&payload, &AdapterContext::new("trace")).unwrap();
//! assert_eq!(items[0].id, "9");
//! ```

pub mod adapter;
pub mod context;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod ztk;

pub use adapter::{ActivityAdapter, DetailSource};
pub use context::AdapterContext;
pub use error::{AdapterError, Result};
pub use models::{
    ActivityStatus, ExtraField, LinkType, LinkVariant, Platform, QrCode, RawActivity,
    StandardActivityDetail, StandardActivitySummary,
};
pub use ztk::{create_ztk_adapter, ZtkDouyinAdapter, ZtkElemeAdapter, ZtkMeituanAdapter};
