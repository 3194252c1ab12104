//! Stdio bridge: reads JSON-RPC lines, answers or forwards them, and writes
//! one response line per request.

mod handler;
mod reader;
mod writer;

use rpcbridge_client::Forwarder;
use rpcbridge_core::Response;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio_util::sync::CancellationToken;

use reader::ReadOutcome;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input read task failed: {0}")]
    ReadTask(#[from] tokio::task::JoinError),

    #[error("Bridge cancelled")]
    Cancelled,
}

impl BridgeError {
    /// The peer stopped listening; treated as a normal end of session.
    fn is_closed_stream(&self) -> bool {
        match self {
            BridgeError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

pub struct Bridge<F> {
    forwarder: F,
}

impl<F: Forwarder> Bridge<F> {
    pub fn new(forwarder: F) -> Self {
        Self { forwarder }
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// Adjust the forwarder before serving. `listen` borrows the bridge, so
    /// this cannot be reached while lines are being handled.
    pub fn forwarder_mut(&mut self) -> &mut F {
        &mut self.forwarder
    }

    /// Handle a single input line, returning the response to write, if any.
    pub async fn handle_line(&self, line: &[u8]) -> Option<Response> {
        handler::handle_message(&self.forwarder, line).await
    }

    /// Serve `input` until end-of-input, cancellation or a stream failure.
    ///
    /// Lines are handled strictly one at a time, so responses come out in the
    /// order their requests came in. Cancellation yields
    /// [`BridgeError::Cancelled`]; end-of-input yields `Ok(())`.
    pub async fn listen<R, W>(&self, token: CancellationToken, input: R, mut output: W) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let mut input = BufReader::new(input);

        loop {
            if token.is_cancelled() {
                return Err(BridgeError::Cancelled);
            }

            let line = match reader::read_line(input, &token).await {
                Ok(ReadOutcome::Line { reader, line }) => {
                    input = reader;
                    line
                }
                Ok(ReadOutcome::Eof) => {
                    tracing::debug!("Input closed");
                    return Ok(());
                }
                Ok(ReadOutcome::Cancelled) => {
                    tracing::debug!("Cancelled while waiting for input");
                    return Err(BridgeError::Cancelled);
                }
                Err(e) => {
                    tracing::error!("Error reading input: {}", e);
                    return Err(e);
                }
            };

            if let Err(e) = self.proxy_line(&line, &mut output).await {
                if e.is_closed_stream() {
                    tracing::debug!("Output closed: {}", e);
                    return Ok(());
                }
                tracing::error!("Error handling message: {}", e);
                return Err(e);
            }
        }
    }

    async fn proxy_line<W>(&self, line: &[u8], output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self.handle_line(line).await {
            Some(response) => writer::write_response(&response, output).await,
            None => Ok(()),
        }
    }
}
