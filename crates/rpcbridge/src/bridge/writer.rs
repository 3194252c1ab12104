use rpcbridge_core::Response;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::Result;

/// Write `response` as a single newline-terminated line.
///
/// The line is fully serialized before anything touches `output`, so a
/// serialization failure leaves the stream untouched.
pub(super) async fn write_response<W>(response: &Response, output: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');

    output.write_all(&line).await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcbridge_core::{JsonRpcError, RequestId};
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_one_terminated_line() {
        let mut output = Vec::new();
        let response = Response::success(RequestId::Number(1.into()), json!({}));

        write_response(&response, &mut output).await.unwrap();
        assert_eq!(output, b"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n");
    }

    #[tokio::test]
    async fn test_consecutive_responses_keep_framing() {
        let mut output = Vec::new();

        write_response(
            &Response::error(
                Some(RequestId::String("a".to_string())),
                JsonRpcError::method_not_found("x"),
            ),
            &mut output,
        )
        .await
        .unwrap();
        write_response(&Response::Forwarded(json!({"jsonrpc": "2.0", "id": 2, "result": {"text": "multi\nline"}})), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(lines[1]).unwrap()["result"]["text"],
            "multi\nline"
        );
    }
}
