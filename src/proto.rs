// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hand-maintained prost types for the subset of the Farcaster Hub schema
//! used by `HubService/GetCastsByFid`.
//!
//! Tags and field types match the Hub's `.proto` files, so the messages are
//! wire-compatible with any hub. Fields outside this subset are skipped on
//! decode. The serde derives produce the canonical proto3 JSON mapping, see
//! [`crate::json`].

use serde::{Deserialize, Serialize};

use crate::json;

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FidRequest {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::u64_string", skip_serializing_if = "json::is_default")]
    pub fid: u64,
    #[prost(uint32, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    #[serde(with = "json::opt_base64", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagesResponse {
    #[prost(message, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[prost(bytes = "vec", optional, tag = "2")]
    #[serde(with = "json::opt_base64", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<Vec<u8>>,
}

/// A signed envelope around [`MessageData`].
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64", skip_serializing_if = "Vec::is_empty")]
    pub hash: Vec<u8>,
    #[prost(enumeration = "HashScheme", tag = "3")]
    #[serde(with = "json::hash_scheme", skip_serializing_if = "json::is_default")]
    pub hash_scheme: i32,
    #[prost(bytes = "vec", tag = "4")]
    #[serde(with = "json::base64", skip_serializing_if = "Vec::is_empty")]
    pub signature: Vec<u8>,
    #[prost(enumeration = "SignatureScheme", tag = "5")]
    #[serde(with = "json::signature_scheme", skip_serializing_if = "json::is_default")]
    pub signature_scheme: i32,
    #[prost(bytes = "vec", tag = "6")]
    #[serde(with = "json::base64", skip_serializing_if = "Vec::is_empty")]
    pub signer: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "7")]
    #[serde(with = "json::opt_base64", skip_serializing_if = "Option::is_none")]
    pub data_bytes: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageData {
    #[prost(enumeration = "MessageType", tag = "1")]
    #[serde(with = "json::message_type", skip_serializing_if = "json::is_default")]
    pub r#type: i32,
    #[prost(uint64, tag = "2")]
    #[serde(with = "json::u64_string", skip_serializing_if = "json::is_default")]
    pub fid: u64,
    /// Seconds since the Farcaster epoch (2021-01-01T00:00:00Z).
    #[prost(uint32, tag = "3")]
    #[serde(skip_serializing_if = "json::is_default")]
    pub timestamp: u32,
    #[prost(enumeration = "FarcasterNetwork", tag = "4")]
    #[serde(with = "json::farcaster_network", skip_serializing_if = "json::is_default")]
    pub network: i32,
    #[prost(oneof = "message_data::Body", tags = "5, 6")]
    #[serde(flatten)]
    pub body: Option<message_data::Body>,
}

pub mod message_data {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, ::prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Body {
        #[prost(message, tag = "5")]
        CastAddBody(super::CastAddBody),
        #[prost(message, tag = "6")]
        CastRemoveBody(super::CastRemoveBody),
    }
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CastAddBody {
    #[prost(string, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds_deprecated: Vec<String>,
    #[prost(uint64, repeated, tag = "2")]
    #[serde(with = "json::u64_string_seq", skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<u64>,
    #[prost(string, tag = "4")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[prost(uint32, repeated, tag = "5")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions_positions: Vec<u32>,
    #[prost(message, repeated, tag = "6")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[prost(enumeration = "CastType", tag = "8")]
    #[serde(with = "json::cast_type", skip_serializing_if = "json::is_default")]
    pub r#type: i32,
    #[prost(oneof = "cast_add_body::Parent", tags = "3, 7")]
    #[serde(flatten)]
    pub parent: Option<cast_add_body::Parent>,
}

pub mod cast_add_body {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, ::prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Parent {
        #[prost(message, tag = "3")]
        ParentCastId(super::CastId),
        #[prost(string, tag = "7")]
        ParentUrl(String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CastRemoveBody {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::base64", skip_serializing_if = "Vec::is_empty")]
    pub target_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CastId {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::u64_string", skip_serializing_if = "json::is_default")]
    pub fid: u64,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64", skip_serializing_if = "Vec::is_empty")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Embed {
    #[prost(oneof = "embed::Embed", tags = "1, 2")]
    #[serde(flatten)]
    pub embed: Option<embed::Embed>,
}

pub mod embed {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, ::prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Embed {
        #[prost(string, tag = "1")]
        Url(String),
        #[prost(message, tag = "2")]
        CastId(super::CastId),
    }
}

/// Names and numbers of a protobuf enum, for the JSON mapping.
pub trait ProtoEnum: Sized + Copy + Into<i32> + TryFrom<i32> {
    fn as_str_name(&self) -> &'static str;
    fn from_str_name(value: &str) -> Option<Self>;
}

macro_rules! proto_enum {
    ($name:ident { $($variant:ident = $value:literal => $text:literal,)+ }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl ProtoEnum for $name {
            fn as_str_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            fn from_str_name(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

proto_enum!(HashScheme {
    None = 0 => "HASH_SCHEME_NONE",
    Blake3 = 1 => "HASH_SCHEME_BLAKE3",
});

proto_enum!(SignatureScheme {
    None = 0 => "SIGNATURE_SCHEME_NONE",
    Ed25519 = 1 => "SIGNATURE_SCHEME_ED25519",
    Eip712 = 2 => "SIGNATURE_SCHEME_EIP712",
});

proto_enum!(MessageType {
    None = 0 => "MESSAGE_TYPE_NONE",
    CastAdd = 1 => "MESSAGE_TYPE_CAST_ADD",
    CastRemove = 2 => "MESSAGE_TYPE_CAST_REMOVE",
    ReactionAdd = 3 => "MESSAGE_TYPE_REACTION_ADD",
    ReactionRemove = 4 => "MESSAGE_TYPE_REACTION_REMOVE",
    LinkAdd = 5 => "MESSAGE_TYPE_LINK_ADD",
    LinkRemove = 6 => "MESSAGE_TYPE_LINK_REMOVE",
    VerificationAddEthAddress = 7 => "MESSAGE_TYPE_VERIFICATION_ADD_ETH_ADDRESS",
    VerificationRemove = 8 => "MESSAGE_TYPE_VERIFICATION_REMOVE",
    UserDataAdd = 11 => "MESSAGE_TYPE_USER_DATA_ADD",
    UsernameProof = 12 => "MESSAGE_TYPE_USERNAME_PROOF",
    FrameAction = 13 => "MESSAGE_TYPE_FRAME_ACTION",
    LinkCompactState = 14 => "MESSAGE_TYPE_LINK_COMPACT_STATE",
});

proto_enum!(FarcasterNetwork {
    None = 0 => "FARCASTER_NETWORK_NONE",
    Mainnet = 1 => "FARCASTER_NETWORK_MAINNET",
    Testnet = 2 => "FARCASTER_NETWORK_TESTNET",
    Devnet = 3 => "FARCASTER_NETWORK_DEVNET",
});

proto_enum!(CastType {
    Cast = 0 => "CAST",
    LongCast = 1 => "LONG_CAST",
    TenKCast = 2 => "TEN_K_CAST",
});

/// Minimal tonic client for the `HubService` gRPC service.
pub mod hub_service_client {
    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct HubServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> HubServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            Self {
                inner: tonic::client::Grpc::new(inner),
            }
        }

        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> HubServiceClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::Body>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<http::Request<tonic::body::Body>>>::Error:
                Into<StdError> + std::marker::Send + std::marker::Sync,
        {
            HubServiceClient::new(InterceptedService::new(inner, interceptor))
        }

        /// Limits the maximum size of a decoded message.
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }

        pub async fn get_casts_by_fid(
            &mut self,
            request: impl tonic::IntoRequest<super::FidRequest>,
        ) -> std::result::Result<tonic::Response<super::MessagesResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/HubService/GetCastsByFid");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("HubService", "GetCastsByFid"));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Server side of `HubService`, limited to `GetCastsByFid`. Used to stand up
/// local hubs in tests.
pub mod hub_service_server {
    use async_trait::async_trait;
    use tonic::codegen::*;

    #[async_trait]
    pub trait HubService: std::marker::Send + std::marker::Sync + 'static {
        async fn get_casts_by_fid(
            &self,
            request: tonic::Request<super::FidRequest>,
        ) -> std::result::Result<tonic::Response<super::MessagesResponse>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct HubServiceServer<T> {
        inner: Arc<T>,
    }

    impl<T> HubServiceServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }

    impl<T> Clone for HubServiceServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    struct GetCastsByFidSvc<T: HubService>(Arc<T>);

    impl<T: HubService> tonic::server::UnaryService<super::FidRequest> for GetCastsByFidSvc<T> {
        type Response = super::MessagesResponse;
        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

        fn call(&mut self, request: tonic::Request<super::FidRequest>) -> Self::Future {
            let inner = Arc::clone(&self.0);
            Box::pin(async move { <T as HubService>::get_casts_by_fid(&inner, request).await })
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for HubServiceServer<T>
    where
        T: HubService,
        B: Body + std::marker::Send + 'static,
        B::Error: Into<StdError> + std::marker::Send + 'static,
    {
        type Response = http::Response<tonic::body::Body>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/HubService/GetCastsByFid" => {
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let method = GetCastsByFidSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        Ok(grpc.unary(method, req).await)
                    })
                }
                _ => Box::pin(async move { Ok(tonic::Status::unimplemented("").into_http()) }),
            }
        }
    }

    pub const SERVICE_NAME: &str = "HubService";

    impl<T> tonic::server::NamedService for HubServiceServer<T> {
        const NAME: &'static str = SERVICE_NAME;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    #[test]
    fn optional_request_fields_keep_presence() {
        let explicit = FidRequest {
            fid: 280,
            page_size: Some(0),
            page_token: None,
            reverse: Some(false),
        };
        let decoded = FidRequest::decode(explicit.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.reverse, Some(false));
        assert_eq!(decoded.page_size, Some(0));

        let unset = FidRequest {
            fid: 280,
            ..Default::default()
        };
        let decoded = FidRequest::decode(unset.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.reverse, None);
        assert_eq!(decoded.page_size, None);
    }

    #[test]
    fn enum_names() {
        assert_eq!(MessageType::CastAdd.as_str_name(), "MESSAGE_TYPE_CAST_ADD");
        assert_eq!(
            SignatureScheme::from_str_name("SIGNATURE_SCHEME_ED25519"),
            Some(SignatureScheme::Ed25519)
        );
        assert_eq!(CastType::from_str_name("cast"), None);
        assert_eq!(MessageType::try_from(11), Ok(MessageType::UserDataAdd));
        assert!(MessageType::try_from(9).is_err());
    }

    #[test]
    fn cast_body_survives_the_wire() {
        let data = MessageData {
            r#type: MessageType::CastAdd.into(),
            fid: 280,
            timestamp: 98_765_432,
            network: FarcasterNetwork::Mainnet.into(),
            body: Some(message_data::Body::CastAddBody(CastAddBody {
                text: "gm".into(),
                mentions: vec![3],
                mentions_positions: vec![0],
                parent: Some(cast_add_body::Parent::ParentUrl(
                    "chain://eip155:1/erc721:0xabc".into(),
                )),
                ..Default::default()
            })),
        };
        let decoded = MessageData::decode(data.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.r#type(), MessageType::CastAdd);
    }
}
