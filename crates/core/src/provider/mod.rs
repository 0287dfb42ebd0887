//! Supplier provider abstractions and implementations.
//!
//! This module contains:
//! - The `SupplierProvider` trait every (supplier, platform) pair implements
//! - Static capability tables and credential schemas per supplier
//! - `ProviderFactory` and the `ProviderFactories` catalog
//! - The Zhetaoke providers for Meituan, Eleme and Douyin
//!
//! Providers are stateless per call. They sign the request, send it through
//! the injected [`HttpClient`](crate::http::HttpClient) and hand the payload
//! to the platform's adapter from `cashback-adapters`.

mod capabilities;
mod factory;
mod traits;

pub mod jutuike;
pub mod zhetaoke;

pub use capabilities::{
    CredentialField, CredentialFieldType, PlatformCapability, ProviderCapabilities,
    ProviderFeature, ProviderMeta, SupplierCode,
};
pub use factory::{ensure_platform, ProviderFactories, ProviderFactory};
pub use traits::{
    ActivityListResult, ConvertLinkOptions, ConvertLinkResult, FetchDetailOptions,
    FetchListOptions, SupplierProvider,
};
