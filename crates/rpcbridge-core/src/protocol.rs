//! JSON-RPC 2.0 protocol definitions

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Number, Value};

use crate::{Error, Result};

/// The only protocol version the bridge accepts.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request ID (string or number). A missing or null id is `None` on the
/// envelope, never a variant here.
///
/// Numbers are kept as `serde_json::Number` so fractional ids and ids beyond
/// `i64` are echoed back exactly as they were sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(Number),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Outer fields common to every incoming message.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub jsonrpc: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub method: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub params: Option<Value>,
}

// An explicit null reads the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Envelope {
    /// Decode the envelope fields of an already validated JSON document.
    pub fn from_raw(raw: &RawValue) -> Result<Self> {
        if !raw.get().starts_with('{') {
            return Err(Error::InvalidMessage("expected a JSON object".to_string()));
        }
        Ok(serde_json::from_str(raw.get())?)
    }

    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }

    /// Notifications carry no id and must never be answered.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Standard JSON-RPC error codes produced by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InternalError,
}

impl ErrorCode {
    pub const fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InternalError => -32603,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method {} not supported", method),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// A single outgoing JSON-RPC response line.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Result {
        id: RequestId,
        result: Value,
    },
    Error {
        id: Option<RequestId>,
        error: JsonRpcError,
    },
    /// Upstream response passed through untouched.
    Forwarded(Value),
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Response::Result { id, result }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Response::Error { id, error }
    }

    /// Accept an upstream body as a response message. The id and payload are
    /// trusted as-is; only the overall shape is checked.
    pub fn from_upstream(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        let Some(object) = value.as_object() else {
            return Err(Error::InvalidMessage(
                "upstream response is not a JSON object".to_string(),
            ));
        };
        if !object.contains_key("result") && !object.contains_key("error") {
            return Err(Error::InvalidMessage(
                "upstream response has neither result nor error".to_string(),
            ));
        }
        Ok(Response::Forwarded(value))
    }

    pub fn is_error(&self) -> bool {
        match self {
            Response::Result { .. } => false,
            Response::Error { .. } => true,
            Response::Forwarded(value) => value.get("error").is_some(),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    jsonrpc: &'static str,
    id: Option<&'a RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a JsonRpcError>,
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = match self {
            Response::Forwarded(value) => return value.serialize(serializer),
            Response::Result { id, result } => WireMessage {
                jsonrpc: JSONRPC_VERSION,
                id: Some(id),
                result: Some(result),
                error: None,
            },
            Response::Error { id, error } => WireMessage {
                jsonrpc: JSONRPC_VERSION,
                id: id.as_ref(),
                result: None,
                error: Some(error),
            },
        };
        wire.serialize(serializer)
    }
}
