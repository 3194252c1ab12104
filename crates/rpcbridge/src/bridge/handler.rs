use rpcbridge_client::Forwarder;
use rpcbridge_core::{Envelope, JsonRpcError, RequestId, Response};
use serde_json::value::RawValue;
use serde_json::{json, Value};

/// Methods relayed to the upstream endpoint untouched.
const FORWARDED_METHODS: [&str; 3] = ["initialize", "tools/list", "tools/call"];

const UPSTREAM_ENDPOINT: &str = "/";

/// Turn one input line into at most one response.
///
/// Checks run in a fixed order: JSON syntax, envelope fields, protocol
/// version, then notification. A notification is never answered, even when
/// its method is unknown or malformed.
pub(super) async fn handle_message<F: Forwarder>(forwarder: &F, line: &[u8]) -> Option<Response> {
    let raw: Box<RawValue> = match serde_json::from_slice(line) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("Failed to parse line as JSON: {}", e);
            return Some(Response::error(None, JsonRpcError::parse_error("Parse error")));
        }
    };

    let envelope = match Envelope::from_raw(&raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("Failed to decode envelope: {}", e);
            return Some(Response::error(
                None,
                JsonRpcError::parse_error("Failed to parse message"),
            ));
        }
    };

    if !envelope.has_valid_version() {
        return Some(Response::error(
            envelope.id,
            JsonRpcError::invalid_request("Invalid JSON-RPC version"),
        ));
    }

    let Some(id) = envelope.id.clone() else {
        tracing::debug!(method = %envelope.method, "Dropping notification");
        return None;
    };

    tracing::debug!(method = %envelope.method, %id, "Handling request");

    let response = match envelope.method.as_str() {
        "ping" => handle_ping(&envelope, id),
        method if FORWARDED_METHODS.contains(&method) => {
            forward(forwarder, &raw, method, id).await
        }
        method => Response::error(Some(id), JsonRpcError::method_not_found(method)),
    };
    Some(response)
}

fn handle_ping(envelope: &Envelope, id: RequestId) -> Response {
    match &envelope.params {
        None | Some(Value::Object(_)) => Response::success(id, json!({})),
        Some(_) => Response::error(Some(id), JsonRpcError::invalid_request("Invalid ping request")),
    }
}

async fn forward<F: Forwarder>(forwarder: &F, raw: &RawValue, method: &str, id: RequestId) -> Response {
    let body = match forwarder.post(UPSTREAM_ENDPOINT, Some(raw)).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(method, %id, "Failed to forward request: {}", e);
            return Response::error(Some(id), JsonRpcError::internal_error("Failed to make request"));
        }
    };

    match Response::from_upstream(&body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method, %id, "Failed to parse upstream response: {}", e);
            Response::error(Some(id), JsonRpcError::internal_error("Failed to parse response"))
        }
    }
}
