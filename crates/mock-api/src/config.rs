//! Runtime configuration and the optional response seed file.

use crate::control::MockState;
use crate::registry::PathResponse;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ADMIN_PORT: u16 = 8081;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_RESPONSE_BODY: &str = r#"{"status":"ok"}"#;
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_port: u16,
    /// Body of the default (`/`) response, served with status 200
    pub default_response: String,
    pub static_dir: PathBuf,
    pub responses_file: Option<PathBuf>,
    /// Request log cap; `None` keeps every entry
    pub max_log_entries: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            admin_port: DEFAULT_ADMIN_PORT,
            default_response: DEFAULT_RESPONSE_BODY.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            responses_file: None,
            max_log_entries: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.port != 0 && self.port == self.admin_port {
            anyhow::bail!(
                "Public and admin listeners cannot share port {}",
                self.port
            );
        }
        self.bind_ip()?;
        Ok(())
    }

    pub fn public_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(SocketAddr::new(self.bind_ip()?, self.port))
    }

    pub fn admin_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(SocketAddr::new(self.bind_ip()?, self.admin_port))
    }

    fn bind_ip(&self) -> Result<IpAddr, anyhow::Error> {
        self.host
            .parse()
            .with_context(|| format!("Invalid listen host '{}'", self.host))
    }

    /// Build the shared state, applying the seed file when configured
    pub fn build_state(&self) -> Result<MockState, anyhow::Error> {
        let state = MockState::with_log_capacity(
            PathResponse::ok(self.default_response.clone()),
            self.max_log_entries,
        );

        if let Some(path) = &self.responses_file {
            let seed = SeedFile::from_file(path)?;
            let applied = seed.apply(&state)?;
            info!(file = %path.display(), applied, "Seeded path responses");
        }

        Ok(state)
    }
}

/// YAML file of path responses loaded at startup
///
/// ```yaml
/// responses:
///   /webhook:
///     statusCode: 201
///     body: '{"received":true}'
///   /slow:
///     statusCode: 200
///     advanced:
///       delay: 1.5
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub responses: BTreeMap<String, PathResponse>,
}

impl SeedFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read responses file {}", path.display()))?;
        let seed: SeedFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse responses file {}", path.display()))?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (path, response) in &self.responses {
            if !path.starts_with('/') {
                anyhow::bail!("Seeded path '{}' must start with '/'", path);
            }
            response
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid response for '{}': {}", path, e))?;
        }
        Ok(())
    }

    /// Upsert every entry into `state`, returning how many were applied
    pub fn apply(&self, state: &MockState) -> Result<usize, anyhow::Error> {
        for (path, response) in &self.responses {
            state
                .upsert_response(path, response.clone())
                .with_context(|| format!("Failed to seed '{}'", path))?;
        }
        Ok(self.responses.len())
    }
}
