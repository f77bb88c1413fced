// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Canonical proto3 JSON for the hub messages.
//!
//! Field names are the schema's lowerCamelCase JSON names, 64-bit integers
//! are decimal strings, bytes are standard base64 and enums are written by
//! name. Scalars holding their default value and empty repeated fields are
//! left out; fields with explicit presence are written whenever set.

use std::{fmt, io::Write, marker::PhantomData};

use serde::{
    de::{self, DeserializeOwned, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{error::ClientError, proto::ProtoEnum};

/// Renders `message` as a single line of JSON.
pub fn render_json<T: Serialize>(message: &T) -> Result<String, ClientError> {
    Ok(serde_json::to_string(message)?)
}

/// Writes `message` as one JSON line followed by a newline.
pub fn write_json<T: Serialize, W: Write>(message: &T, mut out: W) -> Result<(), ClientError> {
    serde_json::to_writer(&mut out, message)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ClientError> {
    Ok(serde_json::from_str(text)?)
}

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

struct U64Visitor;

impl Visitor<'_> for U64Visitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an unsigned 64-bit integer or its decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

struct FlexU64(u64);

impl<'de> Deserialize<'de> for FlexU64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(U64Visitor).map(FlexU64)
    }
}

pub(crate) mod u64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(U64Visitor)
    }
}

pub(crate) mod u64_string_seq {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[u64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(u64::to_string))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u64>, D::Error> {
        let values = Vec::<FlexU64>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.0).collect())
    }
}

fn decode_base64<E: de::Error>(text: &str) -> Result<Vec<u8>, E> {
    use ::base64::{
        engine::general_purpose::{STANDARD, URL_SAFE},
        Engine as _,
    };
    // Parsers must also accept the URL-safe alphabet.
    STANDARD
        .decode(text)
        .or_else(|_| URL_SAFE.decode(text))
        .map_err(E::custom)
}

fn encode_base64(bytes: &[u8]) -> String {
    use ::base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(bytes)
}

pub(crate) mod base64 {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_base64(&text)
    }
}

pub(crate) mod opt_base64 {
    use super::*;

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&encode_base64(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| decode_base64(&text))
            .transpose()
    }
}

fn serialize_enum<E: ProtoEnum, S: Serializer>(value: i32, serializer: S) -> Result<S::Ok, S::Error> {
    match E::try_from(value) {
        Ok(known) => serializer.serialize_str(known.as_str_name()),
        // Values this build doesn't know are written as numbers.
        Err(_) => serializer.serialize_i32(value),
    }
}

struct EnumVisitor<E>(PhantomData<E>);

impl<E: ProtoEnum> Visitor<'_> for EnumVisitor<E> {
    type Value = i32;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an enum value name or number")
    }

    fn visit_str<DeErr: de::Error>(self, v: &str) -> Result<i32, DeErr> {
        E::from_str_name(v)
            .map(Into::into)
            .ok_or_else(|| DeErr::unknown_variant(v, &[]))
    }

    fn visit_i64<DeErr: de::Error>(self, v: i64) -> Result<i32, DeErr> {
        i32::try_from(v).map_err(|_| DeErr::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<DeErr: de::Error>(self, v: u64) -> Result<i32, DeErr> {
        i32::try_from(v).map_err(|_| DeErr::invalid_value(de::Unexpected::Unsigned(v), &self))
    }
}

fn deserialize_enum<'de, E: ProtoEnum, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<i32, D::Error> {
    deserializer.deserialize_any(EnumVisitor::<E>(PhantomData))
}

macro_rules! enum_json {
    ($module:ident, $ty:ident) => {
        pub(crate) mod $module {
            use super::*;
            use crate::proto::$ty;

            pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_enum::<$ty, S>(*value, serializer)
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
                deserialize_enum::<$ty, D>(deserializer)
            }
        }
    };
}

enum_json!(hash_scheme, HashScheme);
enum_json!(signature_scheme, SignatureScheme);
enum_json!(message_type, MessageType);
enum_json!(farcaster_network, FarcasterNetwork);
enum_json!(cast_type, CastType);

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::proto::{
        cast_add_body, embed, message_data, CastAddBody, CastId, Embed, FarcasterNetwork,
        FidRequest, HashScheme, Message, MessageData, MessageType, MessagesResponse,
        SignatureScheme,
    };

    fn cast(fid: u64, timestamp: u32, text: &str) -> Message {
        Message {
            data: Some(MessageData {
                r#type: MessageType::CastAdd.into(),
                fid,
                timestamp,
                network: FarcasterNetwork::Mainnet.into(),
                body: Some(message_data::Body::CastAddBody(CastAddBody {
                    text: text.into(),
                    mentions: vec![2, u64::MAX],
                    mentions_positions: vec![0, 4],
                    embeds: vec![Embed {
                        embed: Some(embed::Embed::Url("https://example.com".into())),
                    }],
                    parent: Some(cast_add_body::Parent::ParentCastId(CastId {
                        fid: 3,
                        hash: vec![0x01, 0x02],
                    })),
                    ..Default::default()
                })),
            }),
            hash: vec![0xde, 0xad, 0xbe, 0xef],
            hash_scheme: HashScheme::Blake3.into(),
            signature: vec![0xff; 4],
            signature_scheme: SignatureScheme::Ed25519.into(),
            signer: vec![0x00, 0x01],
            data_bytes: None,
        }
    }

    #[test]
    fn projection_follows_proto3_json_rules() {
        let response = MessagesResponse {
            messages: vec![cast(280, 120_000_000, "gm")],
            next_page_token: Some(vec![0x0a]),
        };
        let value: Value = serde_json::from_str(&render_json(&response).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "messages": [{
                    "data": {
                        "type": "MESSAGE_TYPE_CAST_ADD",
                        "fid": "280",
                        "timestamp": 120000000,
                        "network": "FARCASTER_NETWORK_MAINNET",
                        "castAddBody": {
                            "mentions": ["2", "18446744073709551615"],
                            "parentCastId": { "fid": "3", "hash": "AQI=" },
                            "text": "gm",
                            "mentionsPositions": [0, 4],
                            "embeds": [{ "url": "https://example.com" }]
                        }
                    },
                    "hash": "3q2+7w==",
                    "hashScheme": "HASH_SCHEME_BLAKE3",
                    "signature": "/////w==",
                    "signatureScheme": "SIGNATURE_SCHEME_ED25519",
                    "signer": "AAE="
                }],
                "nextPageToken": "Cg=="
            })
        );
    }

    #[test]
    fn defaults_are_omitted_and_presence_is_kept() {
        assert_eq!(render_json(&MessagesResponse::default()).unwrap(), "{}");

        let request = FidRequest {
            fid: 280,
            page_size: Some(0),
            page_token: None,
            reverse: Some(false),
        };
        assert_eq!(
            render_json(&request).unwrap(),
            r#"{"fid":"280","pageSize":0,"reverse":false}"#
        );
    }

    #[test]
    fn unknown_enum_values_are_numbers() {
        let message = Message {
            hash_scheme: 42,
            ..Default::default()
        };
        assert_eq!(render_json(&message).unwrap(), r#"{"hashScheme":42}"#);
        let parsed: Message = parse_json(r#"{"hashScheme":42}"#).unwrap();
        assert_eq!(parsed.hash_scheme, 42);
    }

    #[test]
    fn round_trip_is_lossless() {
        let response = MessagesResponse {
            messages: vec![cast(280, 2, "first"), cast(280, 1, "second")],
            next_page_token: None,
        };
        let parsed: MessagesResponse = parse_json(&render_json(&response).unwrap()).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn parser_accepts_numeric_u64_and_url_safe_base64() {
        let parsed: CastId = parse_json(r#"{"fid":7,"hash":"-_8="}"#).unwrap();
        assert_eq!(parsed.fid, 7);
        assert_eq!(parsed.hash, vec![0xfb, 0xff]);

        assert!(parse_json::<CastId>(r#"{"fid":"-1"}"#).is_err());
        assert!(parse_json::<Message>(r#"{"hashScheme":"NOPE"}"#).is_err());
    }

    #[test]
    fn write_json_appends_newline() {
        let mut out = Vec::new();
        write_json(&CastId { fid: 1, hash: vec![] }, &mut out).unwrap();
        assert_eq!(out, b"{\"fid\":\"1\"}\n");
    }
}
