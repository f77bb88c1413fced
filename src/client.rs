// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tonic::{
    codegen::InterceptedService,
    transport::{Channel, ClientTlsConfig, Uri},
    Status,
};
use tracing::{debug, info, warn};

use crate::{
    config::{HubConfig, MAX_TIMEOUT_MS},
    error::ClientError,
    interceptor::HeaderInterceptor,
    proto::{hub_service_client::HubServiceClient, FidRequest, MessagesResponse},
};

/// Transport security for the hub connection.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// Plaintext HTTP/2. Only for local or otherwise trusted networks.
    Insecure,
    /// TLS validated against the platform's native root store.
    Tls(ClientTlsConfig),
}

impl Credentials {
    /// Never fails: bad server certificates surface when the connection is
    /// first used.
    pub fn select(use_tls: bool) -> Self {
        if use_tls {
            Self::Tls(crate::tls::config().clone())
        } else {
            Self::Insecure
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

/// Parameters of a `GetCastsByFid` call. Unset options leave the choice to
/// the hub.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CastsQuery {
    pub fid: u64,
    pub reverse: Option<bool>,
    pub page_size: Option<u32>,
    pub page_token: Option<Vec<u8>>,
}

impl CastsQuery {
    pub fn new(fid: u64) -> Self {
        Self {
            fid,
            ..Default::default()
        }
    }

    /// The newest `page_size` casts of `fid`, newest first.
    pub fn most_recent(fid: u64, page_size: u32) -> Self {
        Self::new(fid).reverse(true).page_size(page_size)
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = Some(reverse);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Continues from the `next_page_token` of a previous response.
    pub fn page_token(mut self, token: Vec<u8>) -> Self {
        self.page_token = Some(token);
        self
    }
}

impl From<CastsQuery> for FidRequest {
    fn from(query: CastsQuery) -> Self {
        FidRequest {
            fid: query.fid,
            page_size: query.page_size,
            page_token: query.page_token,
            reverse: query.reverse,
        }
    }
}

#[derive(Clone)]
enum HubStub {
    Plain(HubServiceClient<Channel>),
    Authenticated(HubServiceClient<InterceptedService<Channel, HeaderInterceptor>>),
}

/// A connection to a Farcaster hub.
///
/// Dropping the client (or calling [`HubClient::close`]) releases the
/// connection. Clones share the underlying channel, which accepts calls
/// from several tasks at once.
#[derive(Clone)]
pub struct HubClient {
    stub: HubStub,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient")
            .field("authenticated", &self.is_authenticated())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HubClient {
    /// Dials the hub described by `config`.
    ///
    /// Unless `config.connect_lazily` is set, the TCP (and TLS) handshake
    /// happens here and a failure is returned as [`ClientError::Dial`]. A lazy
    /// client connects on its first call, so an unreachable hub shows up as
    /// an `Unavailable` [`ClientError::Rpc`] instead.
    pub async fn connect(config: &HubConfig) -> Result<Self, ClientError> {
        let credentials = Credentials::select(config.use_tls);
        let interceptor =
            HeaderInterceptor::for_api_key(&config.api_key_header, config.api_key.as_deref())?;
        let uri = config.uri()?;

        debug!(
            %uri,
            tls = credentials.is_tls(),
            authenticated = interceptor.is_some(),
            lazy = config.connect_lazily,
            "Connecting to hub"
        );
        let channel = build_and_connect_channel(uri, &credentials, config.connect_lazily).await?;

        Ok(Self::from_channel(channel, interceptor, config))
    }

    /// Wraps an existing channel, attaching `interceptor` to every call when
    /// one is given.
    pub fn from_channel(
        channel: Channel,
        interceptor: Option<HeaderInterceptor>,
        config: &HubConfig,
    ) -> Self {
        let limit = config.max_receive_bytes;
        let stub = match interceptor {
            Some(interceptor) => HubStub::Authenticated(
                HubServiceClient::with_interceptor(channel, interceptor)
                    .max_decoding_message_size(limit),
            ),
            None => HubStub::Plain(HubServiceClient::new(channel).max_decoding_message_size(limit)),
        };
        Self {
            stub,
            timeout: config.timeout,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.stub, HubStub::Authenticated(_))
    }

    /// Issues one `GetCastsByFid` call. No retries.
    pub async fn get_casts_by_fid(
        &mut self,
        query: CastsQuery,
    ) -> Result<MessagesResponse, ClientError> {
        info!(
            fid = query.fid,
            page_size = ?query.page_size,
            reverse = ?query.reverse,
            "Requesting casts by fid"
        );

        let mut request = tonic::Request::new(FidRequest::from(query));
        let call = match self.timeout {
            Some(timeout) => {
                // Beyond what `grpc-timeout` can encode only the local timer applies.
                if timeout <= Duration::from_millis(MAX_TIMEOUT_MS) {
                    request.set_timeout(timeout);
                }
                match tokio::time::timeout(timeout, self.stub.get_casts_by_fid(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(Status::deadline_exceeded(format!(
                        "no response within {timeout:?}"
                    ))),
                }
            }
            None => self.stub.get_casts_by_fid(request).await,
        };

        let response = call?.into_inner();
        debug!(casts = response.messages.len(), "Received casts");
        Ok(response)
    }

    /// Like [`HubClient::get_casts_by_fid`], but gives up with
    /// [`ClientError::Cancelled`] as soon as `cancel` fires. The in-flight
    /// call is dropped, never half-returned.
    pub async fn get_casts_by_fid_with_cancel(
        &mut self,
        query: CastsQuery,
        cancel: &CancellationToken,
    ) -> Result<MessagesResponse, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Call to hub cancelled");
                Err(ClientError::Cancelled)
            }
            result = self.get_casts_by_fid(query) => result,
        }
    }

    /// Releases the connection. Consuming `self` keeps it from being used
    /// afterwards.
    pub fn close(self) {
        debug!("Closing hub connection");
    }
}

impl HubStub {
    async fn get_casts_by_fid(
        &mut self,
        request: tonic::Request<FidRequest>,
    ) -> Result<tonic::Response<MessagesResponse>, Status> {
        match self {
            Self::Plain(client) => client.get_casts_by_fid(request).await,
            Self::Authenticated(client) => client.get_casts_by_fid(request).await,
        }
    }
}

async fn build_and_connect_channel(
    uri: Uri,
    credentials: &Credentials,
    lazy: bool,
) -> Result<Channel, tonic::transport::Error> {
    let mut endpoint = Channel::builder(uri);
    if let Credentials::Tls(config) = credentials {
        endpoint = endpoint.tls_config(config.clone())?;
    }

    if lazy {
        return Ok(endpoint.connect_lazy());
    }
    endpoint.connect().await
}
