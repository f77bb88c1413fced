// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("dial failed: {0}")]
    Dial(#[from] tonic::transport::Error),

    #[error("call failed: {}: {}", .0.code(), .0.message())]
    Rpc(#[from] tonic::Status),

    #[error("serialize failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("call cancelled before the hub responded")]
    Cancelled,

    #[error("invalid metadata header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid hub address: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("missing environment variable: {0}")]
    MissingEnvVar(#[from] std::env::VarError),

    #[error("failed to load .env file: {0}")]
    Dotenvy(#[from] dotenvy::Error),

    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnvValue { name: &'static str, value: String },

    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The bootstrap stage an error belongs to, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Dial(_) => "dial",
            Self::Rpc(_) => "call",
            Self::Serialization(_) | Self::Io(_) => "serialize",
            Self::Cancelled => "cancel",
            Self::InvalidHeader { .. }
            | Self::InvalidUri(_)
            | Self::MissingEnvVar(_)
            | Self::Dotenvy(_)
            | Self::InvalidEnvValue { .. } => "config",
        }
    }

    /// The remote status code, when the hub answered with a non-OK status.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::Rpc(status) => Some(status.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_reports_code_and_message() {
        let err = ClientError::from(tonic::Status::unauthenticated("bad key"));
        assert_eq!(err.stage(), "call");
        assert_eq!(err.code(), Some(tonic::Code::Unauthenticated));
        let text = err.to_string();
        assert!(text.starts_with("call failed:"), "{text}");
        assert!(text.contains("bad key"), "{text}");
    }

    #[test]
    fn stages() {
        assert_eq!(ClientError::Cancelled.stage(), "cancel");
        assert_eq!(ClientError::Cancelled.code(), None);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ClientError::from(json_err).stage(), "serialize");

        let uri_err = "not a uri\u{0}".parse::<http::Uri>().unwrap_err();
        assert_eq!(ClientError::from(uri_err).stage(), "config");
    }
}
