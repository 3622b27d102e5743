//! Line framing: each message is one JSON document followed by `\n`.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::service::models::GraphRequest;
use crate::{Error, Result};

/// Byte that terminates every message in both directions
pub const FRAME_DELIMITER: u8 = b'\n';

/// `what` of the [`Error::LimitExceeded`] raised for an oversized frame
pub const OVERSIZED_FRAME: &str = "request bytes";

/// Reads one frame, without its delimiter.
///
/// Returns `None` if the peer closed the stream before sending anything. A
/// final frame that ends at EOF without a delimiter is still returned. Frames
/// longer than `max_len` bytes are rejected without buffering the excess.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut frame = Vec::new();
    let limit = (max_len as u64).saturating_add(1);
    let read = reader.take(limit).read_until(FRAME_DELIMITER, &mut frame).await?;
    if read == 0 {
        return Ok(None);
    }

    if frame.last() == Some(&FRAME_DELIMITER) {
        frame.pop();
    } else if frame.len() > max_len {
        return Err(Error::LimitExceeded {
            what: OVERSIZED_FRAME,
            limit: max_len,
            actual: frame.len(),
        });
    }
    Ok(Some(frame))
}

/// Reads and drops input up to the next delimiter or EOF, giving up after
/// `max_len` bytes. Returns whether the end of the frame was reached.
pub async fn discard_frame<R>(reader: &mut R, max_len: u64) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarded = 0u64;
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(true);
        }
        let (consumed, complete) = match buf.iter().position(|&b| b == FRAME_DELIMITER) {
            Some(end) => (end + 1, true),
            None => (buf.len(), false),
        };
        reader.consume(consumed);
        discarded += consumed as u64;

        if complete {
            return Ok(true);
        }
        if discarded >= max_len {
            return Ok(false);
        }
    }
}

/// Serializes `message` and writes it as one frame
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(FRAME_DELIMITER);
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Decodes a request frame
pub fn decode_request(frame: &[u8]) -> Result<GraphRequest> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| Error::MalformedRequest(format!("request is not valid UTF-8: {}", e)))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::MalformedRequest("empty request".to_string()));
    }
    serde_json::from_str(text).map_err(|e| Error::MalformedRequest(e.to_string()))
}
