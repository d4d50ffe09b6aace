//! Byte-stream transports
//!
//! The frame reader is generic over [`Transport`], which hides the one
//! behavioral difference between live and recorded input: what a short read
//! means. A socket that stops delivering bytes mid-block has been closed by
//! the peer ([`ProtocolError::ConnectionClosed`]); a file that runs out of
//! bytes mid-block has simply reached the end of the recording
//! ([`ProtocolError::EndOfStream`]).

use std::io;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProtocolError;

/// A byte stream that can fill fixed-size blocks.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Fill `buf` completely or fail with the transport's end condition.
    async fn read_block(&mut self, buf: &mut [u8]) -> Result<(), ProtocolError>;
}

/// Live socket input.
///
/// Accumulates into the block across as many reads as the peer needs; a
/// zero-length read means the connection is gone.
pub struct SocketTransport<S> {
    inner: S,
}

impl<S> SocketTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: AsyncRead + Unpin> Transport for SocketTransport<S> {
    async fn read_block(&mut self, buf: &mut [u8]) -> Result<(), ProtocolError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(ProtocolError::ConnectionClosed);
            }
            filled += n;
        }
        Ok(())
    }
}

/// Recorded file input.
///
/// A read that hits end-of-file before the block is full is not retried;
/// it marks the end of playback.
pub struct FileTransport<R> {
    inner: R,
}

impl FileTransport<File> {
    /// Open a recorded visibility stream.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            inner: File::open(path).await?,
        })
    }
}

impl<R> FileTransport<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: AsyncRead + Unpin> Transport for FileTransport<R> {
    async fn read_block(&mut self, buf: &mut [u8]) -> Result<(), ProtocolError> {
        match self.inner.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(ProtocolError::EndOfStream)
            }
            Err(e) => Err(ProtocolError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn file_transport_fills_block() {
        let mut transport = FileTransport::new(Cursor::new(vec![7u8; 16]));
        let mut buf = [0u8; 16];
        transport.read_block(&mut buf).await.unwrap();
        assert_eq!(buf, [7u8; 16]);
    }

    #[tokio::test]
    async fn file_transport_short_read_is_end_of_stream() {
        let mut transport = FileTransport::new(Cursor::new(vec![7u8; 10]));
        let mut buf = [0u8; 16];
        let err = transport.read_block(&mut buf).await.unwrap_err();
        assert!(matches!(err, ProtocolError::EndOfStream));
    }

    #[tokio::test]
    async fn socket_transport_accumulates_partial_reads() {
        let (mut tx, rx) = tokio::io::duplex(4);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            for chunk in [0u8; 16].chunks(4) {
                tx.write_all(chunk).await.unwrap();
            }
        });

        let mut transport = SocketTransport::new(rx);
        let mut buf = [1u8; 16];
        transport.read_block(&mut buf).await.unwrap();
        assert_eq!(buf, [0u8; 16]);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn socket_transport_peer_close_is_connection_closed() {
        let (mut tx, rx) = tokio::io::duplex(64);
        {
            use tokio::io::AsyncWriteExt;
            tx.write_all(&[5u8; 6]).await.unwrap();
        }
        drop(tx);

        let mut transport = SocketTransport::new(rx);
        let mut buf = [0u8; 16];
        let err = transport.read_block(&mut buf).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }
}
