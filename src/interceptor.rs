// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use tonic::{
    metadata::{AsciiMetadataKey, AsciiMetadataValue},
    service::Interceptor,
    Request, Status,
};

use crate::error::ClientError;

/// Header hosted hubs such as Neynar read the API key from.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Adds one fixed metadata entry to every outgoing call. The request body is
/// never touched.
#[derive(Clone)]
pub struct HeaderInterceptor {
    name: AsciiMetadataKey,
    value: AsciiMetadataValue,
}

impl HeaderInterceptor {
    pub fn new(name: &str, value: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidHeader {
            name: name.to_string(),
            reason,
        };
        let key = AsciiMetadataKey::from_str(name).map_err(|e| invalid(e.to_string()))?;
        let mut value = AsciiMetadataValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        value.set_sensitive(true);
        Ok(Self { name: key, value })
    }

    /// Builds the API-key interceptor, or `None` when no key is configured.
    /// An empty key means "no auth", so nothing gets installed.
    pub fn for_api_key(header: &str, api_key: Option<&str>) -> Result<Option<Self>, ClientError> {
        match api_key {
            Some(key) if !key.is_empty() => Self::new(header, key).map(Some),
            _ => Ok(None),
        }
    }

    pub fn header_name(&self) -> &str {
        self.name.as_str()
    }
}

impl std::fmt::Debug for HeaderInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderInterceptor")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl Interceptor for HeaderInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(self.name.clone(), self.value.clone());
        Ok(request)
    }
}
