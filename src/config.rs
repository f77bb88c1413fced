// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use dotenvy::{dotenv, var};
use tonic::transport::Uri;

use crate::{error::ClientError, interceptor::API_KEY_HEADER};

/// Neynar's public hub, reached over TLS.
pub const DEFAULT_HUB_ADDRESS: &str = "hub-grpc-api.neynar.com:443";

/// Hubs answer a page of casts in one message, which easily outgrows
/// tonic's 4 MiB decoding default.
pub const DEFAULT_MAX_RECEIVE_BYTES: usize = 20 * 1024 * 1024;

/// Longest deadline `grpc-timeout` can carry: eight digits of hours.
pub const MAX_TIMEOUT_MS: u64 = 99_999_999 * 60 * 60 * 1000;

/// Everything needed to open a connection to a hub. Built once, then only
/// read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig {
    /// `host:port`. A leading `http://` or `https://` is tolerated.
    pub address: String,
    pub use_tls: bool,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub max_receive_bytes: usize,
    /// Deadline for each call. `None` waits for as long as the transport does.
    pub timeout: Option<Duration>,
    /// Skip the initial dial; the first call connects instead.
    pub connect_lazily: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_ADDRESS)
    }
}

impl HubConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            use_tls: true,
            api_key: None,
            api_key_header: API_KEY_HEADER.to_string(),
            max_receive_bytes: DEFAULT_MAX_RECEIVE_BYTES,
            timeout: None,
            connect_lazily: false,
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    pub fn with_max_receive_bytes(mut self, limit: usize) -> Self {
        self.max_receive_bytes = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_lazy_connect(mut self, lazy: bool) -> Self {
        self.connect_lazily = lazy;
        self
    }

    /// Reads the configuration from the environment, loading `.env` first
    /// when one exists.
    ///
    /// | variable | default |
    /// |---|---|
    /// | `HUB_ADDRESS` | required |
    /// | `HUB_USE_TLS` | `true` |
    /// | `HUB_API_KEY` | unset |
    /// | `HUB_API_KEY_HEADER` | `x-api-key` |
    /// | `HUB_MAX_RECEIVE_BYTES` | 20 MiB |
    /// | `HUB_TIMEOUT_MS` | unset |
    pub fn from_env() -> Result<Self, ClientError> {
        match dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_lookup(|name| var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let address = lookup("HUB_ADDRESS").ok_or(std::env::VarError::NotPresent)?;
        let mut config = Self::new(address);

        if let Some(value) = lookup("HUB_USE_TLS") {
            config.use_tls = parse_bool(&value).ok_or(ClientError::InvalidEnvValue {
                name: "HUB_USE_TLS",
                value,
            })?;
        }
        config.api_key = lookup("HUB_API_KEY").filter(|key| !key.is_empty());
        if let Some(header) = lookup("HUB_API_KEY_HEADER") {
            config.api_key_header = header;
        }
        if let Some(value) = lookup("HUB_MAX_RECEIVE_BYTES") {
            config.max_receive_bytes = value.parse().map_err(|_| ClientError::InvalidEnvValue {
                name: "HUB_MAX_RECEIVE_BYTES",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("HUB_TIMEOUT_MS") {
            let millis: u64 = value.parse().map_err(|_| ClientError::InvalidEnvValue {
                name: "HUB_TIMEOUT_MS",
                value: value.clone(),
            })?;
            if millis > MAX_TIMEOUT_MS {
                return Err(ClientError::InvalidEnvValue {
                    name: "HUB_TIMEOUT_MS",
                    value,
                });
            }
            config.timeout = Some(Duration::from_millis(millis));
        }
        Ok(config)
    }

    /// The endpoint URI. The scheme always follows `use_tls`; one written
    /// into `address` is replaced, since tonic only does TLS for `https`.
    pub fn uri(&self) -> Result<Uri, ClientError> {
        let address = self.address.trim();
        let authority = address
            .strip_prefix("https://")
            .or_else(|| address.strip_prefix("http://"))
            .unwrap_or(address);
        let scheme = if self.use_tls { "https" } else { "http" };
        Ok(format!("{scheme}://{authority}").parse::<Uri>()?)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "y" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "n" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
