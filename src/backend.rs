//! Client side of the two service endpoints.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::RequestError;
use crate::payload::{ProcessRequest, ProcessResponse, ResearchRequest, ResearchResponse};

/// Development port of the simplification service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// The simplification service, as seen by a [`crate::session::Session`].
pub trait Backend {
    /// `POST /process {text}`
    fn process(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ProcessResponse, RequestError>> + Send;

    /// `POST /research {topic}`
    fn research(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<ResearchResponse, RequestError>> + Send;
}

/// [`Backend`] over HTTP with JSON bodies.
///
/// No timeout and no retry: a request either completes, or fails once and is
/// reported.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST `body` as JSON to `path` and decode the reply as `R`.
    ///
    /// # Returns
    /// - `Err(RequestError::Connect)` when the connection fails or the body
    ///   cannot be read.
    /// - `Err(RequestError::Http)` on a non-2xx status.
    /// - `Err(RequestError::Decode)` when the body is not the expected JSON.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RequestError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "sending request");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RequestError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(RequestError::Http {
                status: resp.status().as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| RequestError::Connect {
            url: url.clone(),
            detail: e.to_string(),
        })?;

        serde_json::from_slice::<R>(&bytes).map_err(|e| RequestError::Decode {
            url,
            detail: e.to_string(),
        })
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Backend for HttpBackend {
    async fn process(&self, text: &str) -> Result<ProcessResponse, RequestError> {
        let body = ProcessRequest {
            text: text.to_string(),
        };
        self.post_json("/process", &body).await
    }

    async fn research(&self, topic: &str) -> Result<ResearchResponse, RequestError> {
        let body = ResearchRequest {
            topic: topic.to_string(),
        };
        self.post_json("/research", &body).await
    }
}
