//! Cashback Core Crate
//!
//! Supplier abstraction for rebate activities: request signing, provider
//! selection and the service facade used by applications.
//!
//! # Overview
//!
//! - Deterministic HMAC-SHA256 request signing with two interchangeable backends
//! - One provider per (supplier, platform) pair, built by supplier factories
//! - A registry that picks a provider by priority, at random or round-robin
//! - A facade that threads a trace id through every call
//! - An optional cache layer for list and detail lookups
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! | PlatformService  | --> | ProviderRegistry |  (selection strategy)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | SupplierProvider |  (zhetaoke: meituan, eleme, douyin)
//!                          +------------------+
//!                            |             |
//!                            v             v
//!               +-----------------+   +------------------+
//!               | ParameterSigner |   |    HttpClient    |
//!               +-----------------+   +------------------+
//!                                              |
//!                                              v
//!                                  +----------------------+
//!                                  | ActivityAdapter      |  (cashback-adapters)
//!                                  +----------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PlatformService`] - Entry point for list, detail and link conversion
//! - [`ActivityService`] - Cached list and detail lookups
//! - [`SupplierProvider`] - One supplier's implementation for one platform
//! - [`ProviderFactories`] - Catalog of supplier factories
//! - [`ParameterSigner`] - Canonicalizes and signs request parameters
//! - [`ServiceConfig`] - Supplier accounts and service settings

pub mod cache;
pub mod config;
pub mod errors;
pub mod http;
pub mod provider;
pub mod registry;
pub mod service;
pub mod signer;
pub mod trace;

pub use cashback_adapters::{
    ActivityStatus, LinkType, LinkVariant, Platform, QrCode, StandardActivityDetail,
    StandardActivitySummary,
};

pub use cache::{build_cache_key, hash_params, Cache, MemoryCache};
pub use config::{validate_credentials, ProviderConfig, ServiceConfig};
pub use errors::{Error, Result};
pub use http::{HttpClient, HttpError, ReqwestHttpClient, RequestOptions};
pub use provider::{
    ActivityListResult, ConvertLinkOptions, ConvertLinkResult, CredentialField,
    CredentialFieldType, FetchDetailOptions, FetchListOptions, PlatformCapability,
    ProviderCapabilities, ProviderFactories, ProviderFactory, ProviderFeature, ProviderMeta,
    SupplierCode, SupplierProvider,
};
pub use registry::{ProviderRegistry, SelectionStrategy};
pub use service::{ActivityService, ListQuery, PlatformService};
pub use signer::{ParamValue, ParameterSigner, Params, SignedParams, SigningBackend};
pub use trace::create_trace_id;
