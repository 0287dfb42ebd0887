//! Service layer: the platform facade and the cached activity service.

mod activity_service;
mod platform_service;

pub use activity_service::{ActivityService, ListQuery, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use platform_service::PlatformService;
