// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Rust Farcaster Hub Client
//!
//! Rust client for the `GetCastsByFid` call of a [Farcaster](https://docs.farcaster.xyz/)
//! Hub's gRPC API, with optional TLS and API-key header authentication.
//!
//! ## Fetching the latest casts of an account
//!
//! ```no_run
//! # use hub_client::{CastsQuery, HubClient, HubConfig};
//! # #[tokio::main]
//! # async fn main() -> Result<(), hub_client::ClientError> {
//! let config = HubConfig::new("hub-grpc-api.neynar.com:443").with_api_key("my-api-key");
//! let mut client = HubClient::connect(&config).await?;
//!
//! let response = client
//!     .get_casts_by_fid(CastsQuery::most_recent(280, 10))
//!     .await?;
//! assert!(response.messages.len() <= 10);
//!
//! println!("{}", hub_client::render_json(&response)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Following pages
//!
//! ```no_run
//! # use hub_client::{CastsQuery, HubClient, HubConfig};
//! # #[tokio::main]
//! # async fn main() -> Result<(), hub_client::ClientError> {
//! let mut client = HubClient::connect(&HubConfig::from_env()?).await?;
//! let mut query = CastsQuery::most_recent(280, 100);
//!
//! loop {
//!     let page = client.get_casts_by_fid(query.clone()).await?;
//!     // Do something with page.messages.
//!     match page.next_page_token {
//!         Some(token) if !token.is_empty() => query = query.page_token(token),
//!         _ => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!

mod client;
mod config;
mod error;
mod interceptor;
mod json;
pub mod proto;
mod tls;

pub use crate::client::{CastsQuery, Credentials, HubClient};
pub use crate::config::{
    HubConfig, DEFAULT_HUB_ADDRESS, DEFAULT_MAX_RECEIVE_BYTES, MAX_TIMEOUT_MS,
};
pub use crate::error::ClientError;
pub use crate::interceptor::{HeaderInterceptor, API_KEY_HEADER};
pub use crate::json::{parse_json, render_json, write_json};
pub use tokio_util::sync::CancellationToken;
