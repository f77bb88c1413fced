// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Prints the latest casts of a Farcaster account as one line of JSON.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{builder::BoolishValueParser, ArgAction, Parser};
use hub_client::{
    write_json, CancellationToken, CastsQuery, HubClient, HubConfig, API_KEY_HEADER,
    DEFAULT_HUB_ADDRESS, DEFAULT_MAX_RECEIVE_BYTES, MAX_TIMEOUT_MS,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hub-casts")]
#[command(about = "Fetch the latest casts of a Farcaster account from a hub", long_about = None)]
struct Args {
    /// Hub gRPC address (host:port)
    #[arg(long, env = "HUB_ADDRESS", default_value = DEFAULT_HUB_ADDRESS)]
    hub: String,

    /// Use TLS (pass `--tls false` for plaintext hubs)
    #[arg(
        long,
        env = "HUB_USE_TLS",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    tls: bool,

    /// API key sent with every call, if the hub requires one
    #[arg(long, env = "HUB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Metadata header carrying the API key
    #[arg(long, env = "HUB_API_KEY_HEADER", default_value = API_KEY_HEADER)]
    api_key_header: String,

    /// Account to fetch casts for
    #[arg(long, default_value_t = 280)]
    fid: u64,

    /// Maximum number of casts to return
    #[arg(long, default_value_t = 10)]
    page_size: u32,

    /// Newest first
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    reverse: bool,

    /// Base64 page token from a previous response's `nextPageToken`
    #[arg(long, value_parser = parse_page_token)]
    page_token: Option<PageToken>,

    /// Call deadline in milliseconds (none by default)
    #[arg(
        long,
        env = "HUB_TIMEOUT_MS",
        value_parser = clap::value_parser!(u64).range(..=MAX_TIMEOUT_MS)
    )]
    timeout_ms: Option<u64>,

    /// Largest response accepted, in bytes
    #[arg(long, env = "HUB_MAX_RECEIVE_BYTES", default_value_t = DEFAULT_MAX_RECEIVE_BYTES)]
    max_receive_bytes: usize,

    /// Connect on the first call instead of up front
    #[arg(long)]
    lazy: bool,

    /// Log level for stderr output
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn hub_config(&self) -> HubConfig {
        let mut config = HubConfig::new(self.hub.clone())
            .with_tls(self.tls)
            .with_api_key_header(self.api_key_header.clone())
            .with_max_receive_bytes(self.max_receive_bytes)
            .with_lazy_connect(self.lazy);
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(millis) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(millis));
        }
        config
    }

    fn query(&self) -> CastsQuery {
        let query = CastsQuery::new(self.fid)
            .reverse(self.reverse)
            .page_size(self.page_size);
        match &self.page_token {
            Some(PageToken(token)) => query.page_token(token.clone()),
            None => query,
        }
    }
}

#[derive(Clone, Debug)]
struct PageToken(Vec<u8>);

fn parse_page_token(value: &str) -> Result<PageToken, String> {
    STANDARD
        .decode(value)
        .map(PageToken)
        .map_err(|e| format!("page token is not base64: {e}"))
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn env_file_loaded<T>(result: Result<T, dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    env_file_loaded(dotenvy::dotenv())?;

    let args = Args::parse();

    // Logs go to stderr; stdout carries only the JSON response.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("hub_client={0},hub_casts={0}", args.log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let config = args.hub_config();
    info!(hub = %config.address, tls = config.use_tls, "Using hub");

    let mut client = HubClient::connect(&config).await?;
    let response = client
        .get_casts_by_fid_with_cancel(args.query(), &cancel)
        .await?;
    client.close();

    write_json(&response, std::io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_call() {
        let args = Args::try_parse_from(["hub-casts"]).unwrap();
        let config = args.hub_config();
        assert!(config.use_tls);
        assert_eq!(config.max_receive_bytes, DEFAULT_MAX_RECEIVE_BYTES);
        assert_eq!(args.query(), CastsQuery::most_recent(280, 10));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "hub-casts",
            "--hub",
            "localhost:3383",
            "--tls",
            "false",
            "--api-key",
            "k",
            "--fid",
            "3",
            "--reverse",
            "false",
            "--page-token",
            "AQI=",
            "--timeout-ms",
            "250",
        ])
        .unwrap();
        let config = args.hub_config();
        assert!(!config.use_tls);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert_eq!(
            args.query(),
            CastsQuery::new(3)
                .reverse(false)
                .page_size(10)
                .page_token(vec![1, 2])
        );
    }

    #[test]
    fn rejects_bad_page_token() {
        assert!(Args::try_parse_from(["hub-casts", "--page-token", "%%%"]).is_err());
    }

    #[test]
    fn tls_accepts_the_same_spellings_as_the_library() {
        for (value, expected) in [("1", true), ("on", true), ("0", false), ("no", false)] {
            let args = Args::try_parse_from(["hub-casts", "--tls", value]).unwrap();
            assert_eq!(args.tls, expected, "{value}");
        }
        assert!(Args::try_parse_from(["hub-casts", "--tls", "maybe"]).is_err());
    }

    #[test]
    fn rejects_timeout_beyond_grpc_limit() {
        let at_limit = MAX_TIMEOUT_MS.to_string();
        let args = Args::try_parse_from(["hub-casts", "--timeout-ms", at_limit.as_str()]).unwrap();
        assert_eq!(
            args.hub_config().timeout,
            Some(Duration::from_millis(MAX_TIMEOUT_MS))
        );

        let beyond = (MAX_TIMEOUT_MS + 1).to_string();
        assert!(Args::try_parse_from(["hub-casts", "--timeout-ms", beyond.as_str()]).is_err());
    }

    #[test]
    fn only_a_missing_env_file_is_ignored() {
        let dir = std::env::temp_dir().join(format!("hub-casts-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        assert!(env_file_loaded(dotenvy::from_path(dir.join("absent.env"))).is_ok());

        let malformed = dir.join("malformed.env");
        std::fs::write(&malformed, "HUB_ADDRESS='never closed\n").unwrap();
        assert!(env_file_loaded(dotenvy::from_path(&malformed)).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
