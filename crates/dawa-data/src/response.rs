//! HTTP response handling.

use crate::envelope::ServerResponse;
use crate::FetchError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// An HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with no headers, handy for transports built in tests.
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self::new(status, headers, value.to_string().into_bytes())
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Check if the response was a server error (5xx status).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    /// Unwrap the `{status, data, message, code}` envelope.
    ///
    /// Non-2xx responses become [`FetchError::Api`] when the body carries an
    /// error envelope and [`FetchError::HttpError`] otherwise.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        if !self.is_success() {
            return Err(self.into_error());
        }
        let envelope: ServerResponse<T> = self.json()?;
        envelope.into_result(self.status)
    }

    /// Convert a failed response into the matching error.
    pub fn into_error(self) -> FetchError {
        if let Ok(envelope) = serde_json::from_slice::<ServerResponse<serde_json::Value>>(&self.body) {
            if let Err(e) = envelope.into_result(self.status) {
                return e;
            }
        }
        let message = self
            .text()
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        FetchError::HttpError {
            status: self.status,
            message,
        }
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Receipt {
        order_number: String,
    }

    #[test]
    fn test_status_classes() {
        assert!(Response::new(201, HashMap::new(), vec![]).is_success());
        assert!(Response::new(401, HashMap::new(), vec![]).is_unauthorized());
        assert!(Response::new(503, HashMap::new(), vec![]).is_server_error());
        assert!(!Response::new(404, HashMap::new(), vec![]).is_server_error());
    }

    #[test]
    fn test_into_data_unwraps_success_envelope() {
        let resp = Response::json_body(
            201,
            &json!({"status": "success", "data": {"orderNumber": "MP-1"}}),
        );
        let receipt: Receipt = resp.into_data().unwrap();
        assert_eq!(receipt.order_number, "MP-1");
    }

    #[test]
    fn test_error_envelope_on_client_error() {
        let resp = Response::json_body(
            409,
            &json!({"status": "error", "message": "Price changed", "code": "PRICE_MISMATCH"}),
        );
        let err = resp.into_data::<Receipt>().unwrap_err();
        assert_eq!(
            err,
            FetchError::Api {
                status: 409,
                code: Some("PRICE_MISMATCH".into()),
                message: "Price changed".into()
            }
        );
    }

    #[test]
    fn test_error_envelope_on_ok_status() {
        let resp = Response::json_body(200, &json!({"status": "error", "data": null}));
        let err = resp.into_data::<Receipt>().unwrap_err();
        assert_eq!(err.to_string(), "Request failed");
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn test_plain_text_error() {
        let resp = Response::new(502, HashMap::new(), b"Bad Gateway".to_vec());
        assert_eq!(
            resp.into_error(),
            FetchError::HttpError {
                status: 502,
                message: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn test_header_case_insensitive() {
        let resp = Response::json_body(200, &json!({}));
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("X-Missing"), None);
    }

    #[test]
    fn test_invalid_utf8() {
        let resp = Response::new(200, HashMap::new(), vec![0xff, 0xfe]);
        assert!(resp.text().is_err());
    }
}
