// Connection Configuration

use crate::client::OpenErp;
use crate::types::*;
use crate::utils::{validate_range, StringValidator};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Configuration for building a connection
///
/// The defaults mirror a stock server install: a local instance on the
/// conventional port, plain HTTP, with credentials left to be filled in.
/// Deserializable so it can be sourced from a config file as well as
/// from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub login: String,
    pub password: String,
    pub https: bool,
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 8069,
            database: String::new(),
            login: String::new(),
            password: String::new(),
            https: false,
            timeout_secs: 300,
        }
    }
}

impl ConnectionConfig {
    pub fn new(
        database: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            login: login.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build a configuration from `OPENERP_*` environment variables
    ///
    /// `OPENERP_DATABASE`, `OPENERP_LOGIN` and `OPENERP_PASSWORD` are
    /// required; `OPENERP_SERVER`, `OPENERP_PORT` and `OPENERP_HTTPS`
    /// fall back to the defaults.
    pub fn from_env() -> ErpResult<Self> {
        let mut config = Self::default();

        config.database = required_var("OPENERP_DATABASE")?;
        config.login = required_var("OPENERP_LOGIN")?;
        config.password = required_var("OPENERP_PASSWORD")?;

        if let Ok(server) = std::env::var("OPENERP_SERVER") {
            config.server = server;
        }
        if let Ok(port) = std::env::var("OPENERP_PORT") {
            config.port = port.parse().map_err(|_| {
                ErpError::InvalidParameter(format!("OPENERP_PORT is not a port number: {}", port))
            })?;
        }
        if let Ok(https) = std::env::var("OPENERP_HTTPS") {
            config.https = matches!(https.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// The base URL this configuration points at
    pub fn endpoint(&self) -> ErpResult<Url> {
        let server = StringValidator::not_empty(self.server.clone(), "server")?;
        let scheme = if self.https { "https" } else { "http" };
        let raw = format!("{}://{}:{}", scheme, server, self.port);
        Url::parse(&raw).map_err(|e| {
            ErpError::InvalidParameter(format!("Invalid server endpoint {}: {}", raw, e))
        })
    }

    /// Build a client from this configuration
    pub fn connect(self) -> ErpResult<OpenErp> {
        let database = StringValidator::not_empty(self.database.clone(), "database")?;
        let login = StringValidator::not_empty(self.login.clone(), "login")?;
        let timeout_secs = validate_range(self.timeout_secs, 1, 3600, "timeout_secs")?;
        let endpoint = self.endpoint()?;

        Ok(OpenErp::new(database, login, self.password)
            .with_base_url(endpoint.as_str())
            .with_timeout(Duration::from_secs(timeout_secs)))
    }
}

fn required_var(name: &str) -> ErpResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ErpError::MissingCredentials { location: Some(name.to_string()) }),
    }
}
