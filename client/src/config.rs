use std::env;

use crate::error::{ClientError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_VAR: &str = "RAG_API_URL";
pub const SHOW_CONTEXT_VAR: &str = "RAG_SHOW_CONTEXT";

/// Settings the client starts from. Explicit values win over the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub show_context: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            show_context: false,
        }
    }
}

impl ClientConfig {
    /// Reads `RAG_API_URL` / `RAG_SHOW_CONTEXT`. Loading `.env` is left to
    /// the binary.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let show_context = env::var(SHOW_CONTEXT_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let config = Self {
            base_url: normalize_base_url(&base_url),
            show_context,
        };
        config.validate()?;
        log::debug!("Client configuration: {:?}", config);
        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    pub fn with_show_context(mut self, show: bool) -> Self {
        self.show_context = show;
        self
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        Ok(())
    }
}

/// Strips trailing slashes so endpoint paths can be appended verbatim.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(!config.show_context);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ClientConfig::default().with_base_url("http://example.com:8000//");
        assert_eq!(config.base_url, "http://example.com:8000");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn flag_values_are_parsed_leniently() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }
}
