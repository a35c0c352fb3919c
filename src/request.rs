//! Request building and the transport seam
//!
//! The executor turns a normalized query payload into an [`HttpRequest`]:
//! GET requests carry the whole document as a URL-encoded `source` query
//! parameter, POST requests carry it as the JSON body. The actual network
//! call goes through the [`Transport`] trait; [`HttpTransport`] is the
//! stock `reqwest` implementation.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::HolderConfig;
use crate::error::{HolderError, Result};

/// HTTP verb used for search requests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// A fully prepared search request
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub body: Option<Value>,
    pub basic_auth: Option<(String, String)>,
}

impl HttpRequest {
    /// The `Authorization` header value, for transports that assemble raw
    /// headers themselves
    pub fn authorization_header(&self) -> Option<String> {
        self.basic_auth
            .as_ref()
            .map(|(user, pass)| format!("Basic {}", STANDARD.encode(format!("{user}:{pass}"))))
    }
}

/// Builds requests from the widget configuration and a normalized payload
pub struct RequestExecutor;

impl RequestExecutor {
    pub fn build(config: &HolderConfig, payload: &Value) -> Result<HttpRequest> {
        let basic_auth = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        match config.method {
            Method::Get => {
                let mut url = Url::parse(&config.url).map_err(|e| {
                    HolderError::InvalidRequest(format!("bad endpoint '{}': {e}", config.url))
                })?;
                url.query_pairs_mut()
                    .append_pair("source", &payload.to_string());
                Ok(HttpRequest {
                    url: url.as_str().to_string(),
                    method: Method::Get,
                    body: None,
                    basic_auth,
                })
            }
            Method::Post => Ok(HttpRequest {
                url: config.url.clone(),
                method: Method::Post,
                body: Some(payload.clone()),
                basic_auth,
            }),
        }
    }
}

/// Seam to the HTTP layer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the request and return the decoded JSON body
    async fn send(&self, request: &HttpRequest) -> Result<Value>;
}

/// Stock transport backed by a shared `reqwest` client
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if let Some((user, pass)) = &request.basic_auth {
            builder = builder.basic_auth(user, Some(pass));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HolderError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HolderError::Transport(format!("unexpected status {status}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| HolderError::Transport(format!("invalid response body: {e}")))
    }
}
