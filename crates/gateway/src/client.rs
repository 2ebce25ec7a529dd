//! HTTP client for the backend service.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use storefront_core::config::GatewayConfig;

const USER_AGENT: &str = concat!("storefront-gateway/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("backend unreachable: {0}")]
    Unavailable(String),
    /// Non-2xx answer; status and body are forwarded to the caller unchanged.
    #[error("backend answered {status}")]
    Backend { status: StatusCode, body: Bytes },
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("http client could not be built: {0}")]
    Client(String),
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl BackendClient {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(&config.backend_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|error| GatewayError::InvalidUrl(format!("{base_url}: {error}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| GatewayError::Client(error.to_string()))?;

        Ok(Self { http, base_url, timeout })
    }

    /// Backend URL for the given path segments. Each segment is percent-encoded, so
    /// values such as `a b&min=10` survive the hop intact. An empty last segment
    /// produces a trailing slash.
    pub fn endpoint(&self, segments: &[&str], query: Option<&str>) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.set_query(query.filter(|query| !query.is_empty()));
        Ok(url)
    }

    /// Sends one request. Non-2xx answers come back as [`GatewayError::Backend`].
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        authorization: Option<&HeaderValue>,
        body: Option<Bytes>,
    ) -> Result<(StatusCode, Bytes), GatewayError> {
        debug!(
            event_name = "gateway.backend.request",
            method = %method,
            url = %url,
            "calling backend"
        );

        let mut request = self.http.request(method, url.clone());
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization.clone());
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|error| self.classify(error, &url))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|error| self.classify(error, &url))?;

        if !status.is_success() {
            warn!(
                event_name = "gateway.backend.rejected",
                status = status.as_u16(),
                url = %url,
                "backend returned an error status"
            );
            return Err(GatewayError::Backend { status, body });
        }
        Ok((status, body))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let (_, body) = self.send(Method::GET, url, None, None).await?;
        decode(&body)
    }

    pub async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        payload: &B,
    ) -> Result<(StatusCode, T), GatewayError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body =
            serde_json::to_vec(payload).map_err(|error| GatewayError::Decode(error.to_string()))?;
        let (status, body) = self.send(method, url, None, Some(Bytes::from(body))).await?;
        Ok((status, decode(&body)?))
    }

    fn classify(&self, error: reqwest::Error, url: &Url) -> GatewayError {
        if error.is_timeout() {
            error!(event_name = "gateway.backend.timeout", url = %url, "backend call timed out");
            GatewayError::Timeout(self.timeout)
        } else {
            error!(
                event_name = "gateway.backend.unavailable",
                url = %url,
                error = %error,
                "backend call failed"
            );
            GatewayError::Unavailable(error.to_string())
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|error| GatewayError::Decode(error.to_string()))
}
