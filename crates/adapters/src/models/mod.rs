//! Activity models
//!
//! - `standard` - the stable model handed to callers
//! - `raw` - untyped supplier records and lookup helpers

pub mod raw;
mod standard;

pub use raw::RawActivity;
pub use standard::{
    ActivityStatus, ExtraField, LinkType, LinkVariant, Platform, QrCode, StandardActivityDetail,
    StandardActivitySummary,
};
