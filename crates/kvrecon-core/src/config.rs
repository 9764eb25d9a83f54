//! Reconciler configuration
//!
//! Two static values drive a reconciler: where the store lives and which
//! declared value means "leave this key alone". Both are read from the
//! storage section handed over by the caller, either as a generic map or
//! as TOML:
//!
//! ```toml
//! addr = "http://127.0.0.1:8500"
//! ignore = "_ignore"
//! ```

use crate::errors::{ReconcileError, Result};
use serde_json::{Map, Value};

/// Ignore sentinel used when the configuration does not name one
pub const DEFAULT_IGNORE_VALUE: &str = "_ignore";

/// Store endpoint extracted from the `addr` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// URL scheme, e.g. `http`
    pub scheme: String,
    /// Host with an explicit port when one was given, e.g. `127.0.0.1:8500`
    pub host: String,
}

impl Endpoint {
    /// Parse a store address URL
    ///
    /// # Errors
    ///
    /// Returns `Config` if `addr` is not a URL or has no host.
    pub fn parse(addr: &str) -> Result<Self> {
        let url = url::Url::parse(addr).map_err(|e| ReconcileError::Config {
            reason: format!("invalid addr `{}`: {}", addr, e),
        })?;

        let host = url.host_str().ok_or_else(|| ReconcileError::Config {
            reason: format!("addr `{}` has no host", addr),
        })?;

        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
        })
    }
}

/// Static configuration of a reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    endpoint: Option<Endpoint>,
    ignore: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            ignore: DEFAULT_IGNORE_VALUE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Configuration for `endpoint` with the default ignore sentinel
    pub fn new(endpoint: Option<Endpoint>) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    /// Replace the ignore sentinel; an empty string disables ignore filtering
    pub fn with_ignore(mut self, ignore: impl Into<String>) -> Self {
        self.ignore = ignore.into();
        self
    }

    /// Build from an address string; empty means the client's default endpoint
    ///
    /// # Errors
    ///
    /// Returns `Config` if a non-empty `addr` cannot be parsed.
    pub fn from_addr(addr: &str) -> Result<Self> {
        let endpoint = if addr.is_empty() {
            None
        } else {
            Some(Endpoint::parse(addr)?)
        };
        Ok(Self::new(endpoint))
    }

    /// Build from a storage configuration map
    ///
    /// `addr` must be present and a string. `ignore` is optional; when absent
    /// the default sentinel applies.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `addr` is missing, not a string or not a URL, or if
    /// `ignore` is present but not a string.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let addr = match map.get("addr") {
            Some(Value::String(addr)) => addr,
            Some(_) => {
                return Err(ReconcileError::Config {
                    reason: "addr must be a string".to_string(),
                })
            }
            None => {
                return Err(ReconcileError::Config {
                    reason: "addr is missing".to_string(),
                })
            }
        };

        let config = Self::from_addr(addr)?;

        match map.get("ignore") {
            None => Ok(config),
            Some(Value::String(ignore)) => Ok(config.with_ignore(ignore.clone())),
            Some(_) => Err(ReconcileError::Config {
                reason: "ignore must be a string".to_string(),
            }),
        }
    }

    /// Build from a TOML document with the same keys as [`StoreConfig::from_map`]
    ///
    /// # Errors
    ///
    /// Returns `Config` if the TOML is malformed or its values are invalid.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(source).map_err(|e| ReconcileError::Config {
            reason: format!("invalid TOML: {}", e),
        })?;

        match serde_json::to_value(table) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(_) => Err(ReconcileError::Config {
                reason: "configuration must be a table".to_string(),
            }),
            Err(e) => Err(ReconcileError::Config {
                reason: e.to_string(),
            }),
        }
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Configured sentinel; empty when ignore filtering is disabled
    pub fn ignore_value(&self) -> &str {
        &self.ignore
    }

    pub fn ignore_enabled(&self) -> bool {
        !self.ignore.is_empty()
    }
}
