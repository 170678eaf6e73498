use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::backend::RagBackend;
use crate::config::{normalize_base_url, ClientConfig, DEFAULT_API_URL};
use crate::document::SelectedFile;
use crate::error::{ClientError, Result};
use crate::models::*;

/// Builder for [`HttpBackend`].
///
/// ```
/// use rag_client::HttpBackendBuilder;
///
/// let backend = HttpBackendBuilder::new()
///     .base_url("http://localhost:8000")
///     .build()
///     .expect("valid url");
/// assert_eq!(backend.base_url().as_str(), "http://localhost:8000/");
/// ```
#[derive(Debug, Default)]
pub struct HttpBackendBuilder {
    base_url: Option<String>,
    client: Option<Client>,
}

impl HttpBackendBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Reuse an existing reqwest client (connection pool, proxies, ...).
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the backend. Without an explicit `base_url` it targets
    /// `http://localhost:8000`; environment lookup belongs to `ClientConfig`.
    pub fn build(self) -> Result<HttpBackend> {
        let raw = self.base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let normalized = normalize_base_url(&raw);

        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", normalized, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("{}: not a base URL", normalized)));
        }

        Ok(HttpBackend {
            client: self.client.unwrap_or_default(),
            base_url,
        })
    }
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        HttpBackendBuilder::new().base_url(config.base_url.clone()).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Reads the whole body first so that both the status check and a decode
/// failure can report what the backend actually sent.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let detail = ErrorBody::detail_of(&body).unwrap_or_else(|| body.clone());
        log::warn!("Backend returned {}: {}", status, detail);
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|source| {
        log::error!("Could not parse backend response: {}", source);
        ClientError::Decode { source, body }
    })
}

#[async_trait]
impl RagBackend for HttpBackend {
    async fn upload(&self, file: SelectedFile) -> Result<UploadResponse> {
        let url = self.endpoint(&["upload"])?;
        log::info!("Uploading {} ({} bytes) to {}", file.file_name, file.bytes.len(), url);

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        read_json(response).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let url = self.endpoint(&["query"])?;
        log::info!("Sending query for session {}", request.session_id);

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }

    async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint(&["health"])?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        read_json(response).await
    }

    async fn end_session(&self, session_id: &str) -> Result<SessionCleanupResponse> {
        let url = self.endpoint(&["session", session_id])?;
        log::info!("Cleaning up session {}", session_id);

        let response = self
            .client
            .delete(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        read_json(response).await
    }
}
