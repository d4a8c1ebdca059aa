//! Sending requests over the wire.

use crate::{FetchError, Method, RequestBuilder, Response, TimeoutConfig};
use async_trait::async_trait;
use std::collections::HashMap;

/// Performs one HTTP exchange. No retries, no auth handling.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError>;
}

/// [`Transport`] backed by `reqwest` with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: TimeoutConfig) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .user_agent(concat!("dawa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Wrap an already-configured client.
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let mut builder = self
            .inner
            .request(to_reqwest(request.method), request.url.as_str());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await?.to_vec();
        Ok(Response::new(status, headers, body))
    }
}
