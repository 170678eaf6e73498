use std::path::Path;

use tokio::sync::RwLock;

use crate::backend::RagBackend;
use crate::busy::{BusyFlag, BusyGuard};
use crate::config::ClientConfig;
use crate::document::SelectedFile;
use crate::error::{Action, ClientError, Result, ValidationError};
use crate::http_backend::HttpBackend;
use crate::models::*;
use crate::view::ViewModel;

#[derive(Debug, Default)]
struct UiState {
    session_id: Option<String>,
    answer: Option<String>,
    context: Vec<String>,
    show_context: bool,
    response_visible: bool,
    error: Option<String>,
}

/// Owns the session identifier and per-action busy flags, and drives the
/// upload / query cycles against a [`RagBackend`].
///
/// The state lock is only ever held for short synchronous updates, never
/// across a backend call, so reads (`view`) and the context toggle stay
/// responsive while a request is in flight.
pub struct QueryController<B = HttpBackend> {
    backend: B,
    state: RwLock<UiState>,
    upload_busy: BusyFlag,
    query_busy: BusyFlag,
}

impl QueryController<HttpBackend> {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let backend = HttpBackend::from_config(config)?;
        log::info!("Query client targeting {}", backend.base_url());
        Ok(Self::new(backend, config.show_context))
    }
}

impl<B: RagBackend> QueryController<B> {
    pub fn new(backend: B, show_context: bool) -> Self {
        Self {
            backend,
            state: RwLock::new(UiState {
                show_context,
                ..UiState::default()
            }),
            upload_busy: BusyFlag::new(Action::Upload),
            query_busy: BusyFlag::new(Action::Query),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn session_id(&self) -> Option<String> {
        self.state.read().await.session_id.clone()
    }

    pub async fn view(&self) -> ViewModel {
        let state = self.state.read().await;
        ViewModel {
            session_id: state.session_id.clone(),
            upload_busy: self.upload_busy.is_busy(),
            query_busy: self.query_busy.is_busy(),
            answer: state.answer.clone(),
            context: state.context.clone(),
            show_context: state.show_context,
            response_visible: state.response_visible,
            error: state.error.clone(),
        }
    }

    /// Uploads the selected file and stores the session identifier the
    /// backend hands back. `None` means nothing was selected.
    pub async fn upload(&self, path: Option<&Path>) -> Result<String> {
        let Some(path) = path else {
            return Err(self.record(Action::Upload, ValidationError::NoFileSelected.into()).await);
        };
        let _busy = self.acquire(&self.upload_busy).await?;

        let outcome = match SelectedFile::read(path).await {
            Ok(file) => self.send_upload(file).await,
            Err(e) => Err(e),
        };
        self.finish_upload(outcome).await
    }

    /// Same as [`upload`](Self::upload) for a file already held in memory.
    pub async fn upload_file(&self, file: SelectedFile) -> Result<String> {
        let _busy = self.acquire(&self.upload_busy).await?;
        let outcome = self.send_upload(file).await;
        self.finish_upload(outcome).await
    }

    async fn send_upload(&self, file: SelectedFile) -> Result<String> {
        self.state.write().await.error = None;

        let response = self.backend.upload(file).await?;
        let session_id = response.session_id.trim();
        if session_id.is_empty() {
            return Err(ClientError::UnexpectedResponse(
                "No session ID received".to_string(),
            ));
        }
        if let Some(message) = &response.message {
            log::debug!("Upload message: {}", message);
        }
        Ok(session_id.to_string())
    }

    async fn finish_upload(&self, outcome: Result<String>) -> Result<String> {
        match outcome {
            Ok(session_id) => {
                log::info!("Upload successful, session ID: {}", session_id);
                let mut state = self.state.write().await;
                state.session_id = Some(session_id.clone());
                state.error = None;
                Ok(session_id)
            }
            Err(e) => Err(self.record(Action::Upload, e).await),
        }
    }

    /// Asks a question against the current session and updates the displayed
    /// answer and context on success.
    pub async fn query(&self, question: &str) -> Result<QueryResponse> {
        let Some(session_id) = self.session_id().await else {
            return Err(self.record(Action::Query, ValidationError::DocumentRequired.into()).await);
        };
        if question.trim().is_empty() {
            return Err(self.record(Action::Query, ValidationError::BlankQuestion.into()).await);
        }
        let _busy = self.acquire(&self.query_busy).await?;
        self.state.write().await.error = None;

        let request = QueryRequest {
            session_id,
            query: question.to_string(),
        };

        match self.send_query(&request).await {
            Ok(response) => {
                log::info!(
                    "Received answer with {} context passages",
                    response.context.len()
                );
                let mut state = self.state.write().await;
                state.answer = Some(response.answer.clone());
                state.context = response.context.clone();
                state.response_visible = true;
                state.error = None;
                Ok(response)
            }
            Err(e) => Err(self.record(Action::Query, e).await),
        }
    }

    async fn send_query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let response = self.backend.query(request).await?;
        if response.answer.is_empty() {
            return Err(ClientError::UnexpectedResponse(
                "No answer received from the server".to_string(),
            ));
        }
        Ok(response)
    }

    pub async fn set_show_context(&self, show: bool) {
        self.state.write().await.show_context = show;
    }

    /// Flips the context preference and returns the new value.
    pub async fn toggle_context(&self) -> bool {
        let mut state = self.state.write().await;
        state.show_context = !state.show_context;
        state.show_context
    }

    /// Asks the backend to drop the current session, then forgets it locally.
    ///
    /// A 404 means the backend already lost the session, so the local copy is
    /// cleared in that case too. Holds the query flag so no answer for the
    /// ended session can land afterwards.
    pub async fn end_session(&self) -> Result<()> {
        let Some(session_id) = self.session_id().await else {
            return Err(self.record(Action::Query, ValidationError::DocumentRequired.into()).await);
        };
        let _busy = self.acquire(&self.query_busy).await?;

        match self.backend.end_session(&session_id).await {
            Ok(response) => log::info!("{}", response.message),
            Err(e) if e.status() == Some(404) => {
                log::warn!("Session {} was already gone on the backend", session_id);
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.error = Some(format!("Session cleanup failed: {}", e));
                return Err(e);
            }
        }

        let mut state = self.state.write().await;
        if state.session_id.as_deref() == Some(session_id.as_str()) {
            state.session_id = None;
        }
        state.answer = None;
        state.context.clear();
        state.response_visible = false;
        state.error = None;
        Ok(())
    }

    pub async fn health(&self) -> Result<String> {
        let response = self.backend.health().await?;
        Ok(response.status)
    }

    async fn acquire<'a>(&self, flag: &'a BusyFlag) -> Result<BusyGuard<'a>> {
        match flag.try_acquire() {
            Ok(guard) => Ok(guard),
            Err(e) => Err(self.record(flag.action(), e.into()).await),
        }
    }

    async fn record(&self, action: Action, error: ClientError) -> ClientError {
        let message = error.user_message(action);
        if error.is_validation() {
            log::warn!("{}", message);
        } else {
            log::error!("{}", message);
        }
        self.state.write().await.error = Some(message);
        error
    }
}
