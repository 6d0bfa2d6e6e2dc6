//! Server configuration: TOML file with defaults
//!
//! One configuration surface covers what used to vary between service
//! deployments: CORS origins, the preferred-translator list, and the
//! upstream base URL.

use anyhow::Context;
use rezka_core::TranslatorRef;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Base URL of the catalog site
    pub base_url: String,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Translator preferences, evaluated in order; each entry is an
    /// integer id or an exact display name
    pub preferred_translators: Vec<String>,
    /// Timeout for each outbound request, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().expect("valid default bind address"),
            base_url: "https://hdrezka.ag/".to_string(),
            allowed_origins: vec![
                "http://localhost:5500".to_string(),
                "http://localhost:8000".to_string(),
            ],
            preferred_translators: vec![
                "Оригинал (+субтитры)".to_string(),
                "238".to_string(),
            ],
            request_timeout_ms: 15_000,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// The preference list parsed into translator references
    pub fn preferred_refs(&self) -> Vec<TranslatorRef> {
        self.preferred_translators
            .iter()
            .map(|s| TranslatorRef::parse(s))
            .collect()
    }
}
