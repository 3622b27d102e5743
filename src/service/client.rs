use std::io;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::service::models::{GraphRequest, Reply};
use crate::service::protocol::{read_frame, write_frame};
use crate::{Error, Result};

/// Largest reply the client will buffer
pub const MAX_REPLY_BYTES: usize = 1024 * 1024 * 1024;

/// Sends one request and waits for the reply
pub async fn send_request<A: ToSocketAddrs>(addr: A, request: &GraphRequest) -> Result<Reply> {
    let stream = TcpStream::connect(addr).await?;
    let (read_half, mut write_half) = stream.into_split();

    write_frame(&mut write_half, request).await?;
    write_half.shutdown().await?;

    let mut reader = BufReader::new(read_half);
    let frame = read_frame(&mut reader, MAX_REPLY_BYTES)
        .await?
        .ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection without a reply",
            ))
        })?;
    Ok(serde_json::from_slice(&frame)?)
}

/// Sends raw bytes as they are and returns the raw reply line
pub async fn send_raw<A: ToSocketAddrs>(addr: A, payload: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(payload).await?;
    stream.shutdown().await?;

    let mut reader = BufReader::new(stream);
    read_frame(&mut reader, MAX_REPLY_BYTES).await
}
