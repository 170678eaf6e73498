pub mod models;
pub mod error;
pub mod config;
pub mod document;
pub mod backend;
pub mod http_backend;
pub mod busy;
pub mod view;
pub mod controller;

pub use models::*;
pub use error::{Action, ClientError, Result, ValidationError};
pub use config::ClientConfig;
pub use document::SelectedFile;
pub use backend::RagBackend;
pub use http_backend::{HttpBackend, HttpBackendBuilder};
pub use busy::{BusyFlag, BusyGuard};
pub use view::{ViewModel, CONTEXT_SEPARATOR};
pub use controller::QueryController;
