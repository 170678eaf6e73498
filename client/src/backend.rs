use async_trait::async_trait;

use crate::document::SelectedFile;
use crate::error::Result;
use crate::models::*;

/// The remote RAG service the controller talks to.
///
/// `HttpBackend` is the real implementation; tests substitute recording mocks.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// `POST /upload` with the file as multipart field `file`.
    async fn upload(&self, file: SelectedFile) -> Result<UploadResponse>;

    /// `POST /query` with a JSON body.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    /// `GET /health`.
    async fn health(&self) -> Result<HealthResponse>;

    /// `DELETE /session/{session_id}`.
    async fn end_session(&self, session_id: &str) -> Result<SessionCleanupResponse>;
}
