use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use super::Result;

pub(super) enum ReadOutcome<R> {
    Line { reader: R, line: Vec<u8> },
    Eof,
    Cancelled,
}

/// Read one `\n`-terminated line, giving up as soon as `token` fires.
///
/// The read runs on its own task which owns the reader until the line is
/// complete. If cancellation wins the task is detached, not aborted: it may
/// stay parked on the stream until the process exits, and whatever it reads
/// is dropped along with the reader.
pub(super) async fn read_line<R>(mut reader: R, token: &CancellationToken) -> Result<ReadOutcome<R>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let mut read_task = tokio::spawn(async move {
        let mut line = Vec::new();
        let result = reader.read_until(b'\n', &mut line).await;
        (reader, result.map(|_| line))
    });

    tokio::select! {
        biased;
        _ = token.cancelled() => Ok(ReadOutcome::Cancelled),
        joined = &mut read_task => {
            let (reader, result) = joined?;
            let line = result?;
            if line.is_empty() {
                Ok(ReadOutcome::Eof)
            } else {
                Ok(ReadOutcome::Line { reader, line })
            }
        }
    }
}
