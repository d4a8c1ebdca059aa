//! The storefront API's response envelope.

use crate::FetchError;
use serde::{Deserialize, Serialize};

/// Envelope status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// `{status, data, message?, code?}` wrapper around every API payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse<T> {
    pub status: ResponseStatus,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl<T> ServerResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    pub fn error(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            message: Some(message.into()),
            code: code.map(str::to_string),
        }
    }

    /// The payload of a success envelope, or the envelope's error.
    ///
    /// `http_status` is only used to annotate the error.
    pub fn into_result(self, http_status: u16) -> Result<T, FetchError> {
        match (self.status, self.data) {
            (ResponseStatus::Success, Some(data)) => Ok(data),
            (ResponseStatus::Success, None) => Err(FetchError::ParseError(
                "success response without data".to_string(),
            )),
            (ResponseStatus::Error, _) => Err(FetchError::Api {
                status: http_status,
                code: self.code,
                message: self.message.unwrap_or_else(|| "Request failed".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_without_message() {
        let env: ServerResponse<Vec<u32>> =
            serde_json::from_str(r#"{"status": "success", "data": [1, 2]}"#).unwrap();
        assert_eq!(env.into_result(200), Ok(vec![1, 2]));
    }

    #[test]
    fn test_unit_payload() {
        let env: ServerResponse<serde_json::Value> =
            serde_json::from_str(r#"{"status": "success", "data": {"message": "cancelled"}}"#).unwrap();
        assert!(env.into_result(200).is_ok());
    }

    #[test]
    fn test_error_keeps_code() {
        let err = ServerResponse::<()>::error(Some("INVALID_SHIPPING"), "Bad address")
            .into_result(422)
            .unwrap_err();
        assert_eq!(err.code(), Some("INVALID_SHIPPING"));
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_success_missing_data_is_parse_error() {
        let env: ServerResponse<u32> = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(matches!(env.into_result(200), Err(FetchError::ParseError(_))));
    }
}
