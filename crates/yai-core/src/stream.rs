//! Per-connection byte transport handed to request handlers.
//!
//! [`Stream`] hides the concrete socket type from handlers so that the same
//! handler runs over TCP in production and over in-memory duplex pipes in
//! tests. Writes always deliver the whole buffer; reads may return short and
//! report end-of-stream as `Ok(0)`.

use std::io;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Errors surfaced by [`Stream`] operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The peer closed the connection before the operation completed.
    #[error("connection closed by peer")]
    Closed,
    /// Any other transport failure.
    #[error("stream I/O failed: {source}")]
    Io {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl StreamError {
    /// Returns `true` when the error is an orderly or abrupt peer close.
    pub fn is_peer_close(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<io::Error> for StreamError {
    fn from(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Closed,
            _ => Self::Io { source },
        }
    }
}

/// Duplex byte stream for a single connection.
#[async_trait]
pub trait Stream: Send {
    /// Writes every byte of `bytes`, returning the number written.
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, StreamError>;

    /// Reads at most `buffer.len()` bytes in a single attempt.
    ///
    /// Returns `Ok(0)` at end-of-stream.
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StreamError>;

    /// Fills `buffer` completely, looping over short reads.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Closed`] if the stream ends first.
    async fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), StreamError> {
        let mut filled = 0;
        while let Some(rest) = buffer.get_mut(filled..) {
            if rest.is_empty() {
                break;
            }
            let read = self.read(rest).await?;
            if read == 0 {
                return Err(StreamError::Closed);
            }
            filled += read;
        }
        Ok(())
    }

    /// Reads a big-endian `u32`.
    async fn read_u32(&mut self) -> Result<u32, StreamError> {
        let mut bytes = [0_u8; 4];
        self.read_exact(&mut bytes).await?;
        Ok(u32::from_be_bytes(bytes))
    }
}

/// [`Stream`] over any tokio duplex IO object.
#[derive(Debug)]
pub struct ConnectionStream<T = TcpStream> {
    inner: T,
}

impl<T> ConnectionStream<T> {
    /// Wraps a transport object.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T> Stream for ConnectionStream<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, StreamError> {
        self.inner.write_all(bytes).await?;
        self.inner.flush().await?;
        Ok(bytes.len())
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StreamError> {
        Ok(self.inner.read(buffer).await?)
    }
}
