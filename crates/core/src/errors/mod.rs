//! Error types for supplier operations.
//!
//! Every failure a caller can observe is one [`Error`] variant. Upstream HTTP
//! and payload failures are folded into [`Error::PlatformRequest`] so the
//! trace id and the raw payload travel with them.

use cashback_adapters::{AdapterError, Platform};
use serde_json::Value;
use thiserror::Error;

use crate::provider::SupplierCode;

/// Result type alias for supplier operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to suppliers.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The upstream call failed or returned an unusable payload.
    #[error("{message} (trace: {trace_id})")]
    PlatformRequest {
        /// Human-readable failure description
        message: String,
        /// Trace id of the logical request
        trace_id: String,
        /// HTTP status, when the failure came from a non-2xx response
        status_code: Option<u16>,
        /// Platform the request targeted
        platform: Option<Platform>,
        /// Supplier that served the request
        supplier: Option<SupplierCode>,
        /// Raw upstream payload, for diagnostics
        details: Option<Value>,
    },

    /// No provider is registered for the platform.
    #[error("No provider available for platform {platform} (trace: {trace_id})")]
    ProviderUnavailable {
        /// The platform with no registered provider
        platform: Platform,
        /// Trace id of the logical request
        trace_id: String,
    },

    /// Configuration is missing or malformed.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
        /// The offending field or environment variable
        field: Option<String>,
    },

    /// The provider does not implement the requested operation.
    /// Raised before any network call.
    #[error("Operation {operation} is not supported by {supplier} for {platform}")]
    UnsupportedOperation {
        /// The operation name, e.g. `convertLink`
        operation: String,
        /// The platform asked for
        platform: Platform,
        /// The supplier asked
        supplier: SupplierCode,
    },

    /// The supplier has no implementation for the platform.
    #[error("Supplier {supplier} does not support platform {platform}")]
    UnsupportedPlatform {
        /// The supplier asked
        supplier: SupplierCode,
        /// The platform asked for
        platform: Platform,
    },

    /// No factory is registered for the supplier code.
    #[error("Unknown supplier: {0}")]
    UnknownSupplier(String),
}

impl Error {
    /// Create a platform request error with no origin attached yet.
    pub fn platform_request(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::PlatformRequest {
            message: message.into(),
            trace_id: trace_id.into(),
            status_code: None,
            platform: None,
            supplier: None,
            details: None,
        }
    }

    /// Create a configuration error naming the offending field.
    pub fn configuration(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn unsupported_operation(
        operation: impl Into<String>,
        supplier: SupplierCode,
        platform: Platform,
    ) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            platform,
            supplier,
        }
    }

    /// Wrap an adapter failure, keeping its payload as details.
    pub fn from_adapter(err: AdapterError, trace_id: impl Into<String>) -> Self {
        let details = err.payload().cloned();
        Self::platform_request(err.to_string(), trace_id).with_details(details)
    }

    /// Attach supplier and platform to a platform request error.
    pub fn with_origin(mut self, origin_supplier: SupplierCode, origin_platform: Platform) -> Self {
        if let Self::PlatformRequest {
            supplier, platform, ..
        } = &mut self
        {
            supplier.get_or_insert(origin_supplier);
            platform.get_or_insert(origin_platform);
        }
        self
    }

    /// Attach the raw upstream payload to a platform request error.
    pub fn with_details(mut self, payload: Option<Value>) -> Self {
        if let Self::PlatformRequest { details, .. } = &mut self {
            *details = payload;
        }
        self
    }

    /// Attach an HTTP status to a platform request error.
    pub fn with_status(mut self, status: u16) -> Self {
        if let Self::PlatformRequest { status_code, .. } = &mut self {
            *status_code = Some(status);
        }
        self
    }

    /// Trace id carried by the error, if any.
    pub fn trace_id(&self) -> Option<&str> {
        match self {
            Self::PlatformRequest { trace_id, .. } | Self::ProviderUnavailable { trace_id, .. } => {
                Some(trace_id)
            }
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::PlatformRequest { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_platform_request_display() {
        let error = Error::platform_request("未找到活动详情", "meituan-1");
        assert_eq!(format!("{}", error), "未找到活动详情 (trace: meituan-1)");
        assert_eq!(error.trace_id(), Some("meituan-1"));
    }

    #[test]
    fn test_with_origin_and_status() {
        let error = Error::platform_request("boom", "t")
            .with_origin(SupplierCode::Zhetaoke, Platform::Eleme)
            .with_status(502);

        match error {
            Error::PlatformRequest {
                status_code,
                platform,
                supplier,
                ..
            } => {
                assert_eq!(status_code, Some(502));
                assert_eq!(platform, Some(Platform::Eleme));
                assert_eq!(supplier, Some(SupplierCode::Zhetaoke));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_adapter_keeps_payload() {
        let payload = json!({"status": 301});
        let error = Error::from_adapter(AdapterError::no_activity_data(&payload), "t");
        match error {
            Error::PlatformRequest { details, .. } => assert_eq!(details, Some(payload)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_builders_ignore_other_variants() {
        let error = Error::UnknownSupplier("taobao".to_string()).with_status(500);
        assert_eq!(error.status_code(), None);
        assert_eq!(error.trace_id(), None);
        assert_eq!(format!("{}", error), "Unknown supplier: taobao");
    }

    #[test]
    fn test_unsupported_operation_display() {
        let error =
            Error::unsupported_operation("convertLink", SupplierCode::Zhetaoke, Platform::Meituan);
        assert_eq!(
            format!("{}", error),
            "Operation convertLink is not supported by zhetaoke for meituan"
        );
    }
}
