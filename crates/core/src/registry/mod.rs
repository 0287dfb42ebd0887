//! Provider registry module.
//!
//! Keeps the providers registered per platform and picks one for each call
//! according to a [`SelectionStrategy`].

mod registry;
mod strategy;

pub use registry::ProviderRegistry;
pub use strategy::SelectionStrategy;
