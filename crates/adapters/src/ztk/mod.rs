//! Adapters for the Zhetaoke (折淘客) supplier.

mod douyin;
mod eleme;
mod meituan;

use std::sync::Arc;

pub use douyin::{link_types as douyin_link_types, ZtkDouyinAdapter};
pub use eleme::ZtkElemeAdapter;
pub use meituan::ZtkMeituanAdapter;

use crate::adapter::ActivityAdapter;
use crate::models::Platform;

/// Returns the Zhetaoke adapter for `platform`.
pub fn create_ztk_adapter(platform: Platform) -> Arc<dyn ActivityAdapter> {
    match platform {
        Platform::Meituan => Arc::new(ZtkMeituanAdapter::new()),
        Platform::Eleme => Arc::new(ZtkElemeAdapter::new()),
        Platform::Douyin => Arc::new(ZtkDouyinAdapter::new()),
    }
}
