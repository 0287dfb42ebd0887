//! Error types for payload normalization.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    /// No candidate envelope path yielded a non-empty activity list.
    #[error("No activity data found in supplier response")]
    NoActivityData {
        /// The untouched supplier payload, kept for diagnostics.
        payload: Value,
    },

    /// The payload was structurally usable but no detail record could be found.
    #[error("No activity detail found: {0}")]
    DetailNotFound(String),
}

impl AdapterError {
    pub fn no_activity_data(payload: &Value) -> Self {
        Self::NoActivityData {
            payload: payload.clone(),
        }
    }

    /// Raw payload attached to the error, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::NoActivityData { payload } => Some(payload),
            Self::DetailNotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_activity_data_keeps_payload() {
        let payload = json!({"code": 0, "data": {}});
        let err = AdapterError::no_activity_data(&payload);
        assert_eq!(err.payload(), Some(&payload));
        assert_eq!(err.to_string(), "No activity data found in supplier response");
    }
}
