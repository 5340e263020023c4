//! Client configuration.
//!
//! Values come from an optional `blog-client.{toml,json,yaml}` file and
//! `BLOG_*` environment variables (a `.env` file is honoured), e.g.
//! `BLOG_BASE_URL=https://blog.example.com/api`. Retrying failed GETs is off
//! unless `BLOG_RETRY_IDEMPOTENT=true`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ConfigError;
use crate::session::{FileStorage, Session};
use crate::transport::{ReqwestTransport, RetryTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset means wait as long as the OS allows.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Resend GETs once after a network failure. Off unless asked for.
    #[serde(default)]
    pub retry_idempotent: bool,
    /// Interactive clients persist the session; headless ones never touch storage.
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: None,
            retry_idempotent: false,
            interactive: false,
            session_file: None,
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("blog-client").required(false))
            .add_source(Environment::with_prefix("BLOG").try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Restores a persisted token only when interactive and a file is configured.
    pub fn session(&self) -> Session {
        match (&self.session_file, self.interactive) {
            (Some(path), true) => Session::new(FileStorage::new(path)),
            _ => Session::ephemeral(),
        }
    }

    pub fn transport(&self) -> Result<Arc<dyn Transport>, ConfigError> {
        let http = reqwest::Client::builder().build()?;
        let mut transport = ReqwestTransport::new(http);
        if let Some(timeout) = self.timeout() {
            transport = transport.with_timeout(timeout);
        }
        Ok(if self.retry_idempotent {
            Arc::new(RetryTransport::new(transport))
        } else {
            Arc::new(transport)
        })
    }
}

impl ApiClient {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            &config.base_url,
            Arc::new(config.session()),
            config.transport()?,
        ))
    }
}
