//! Frame reader
//!
//! Pulls fixed-size header and body blocks off a [`Transport`] and decodes
//! them into [`Frame`]s. The magic constant is checked before the body is
//! read, so a misaligned stream fails fast instead of producing garbage
//! timestamps.

use bytes::Buf;
use num_complex::Complex32;

use crate::constants::{LEN_BDY, LEN_HDR};
use crate::error::ProtocolError;
use crate::protocol::frame::{Frame, FrameHeader};
use crate::protocol::transport::Transport;

/// Decodes visibility frames from a byte-stream transport.
pub struct FrameReader<T> {
    transport: T,
    header_buf: Vec<u8>,
    body_buf: Vec<u8>,
}

impl<T: Transport> FrameReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            header_buf: vec![0u8; LEN_HDR],
            body_buf: vec![0u8; LEN_BDY],
        }
    }

    /// Read and decode the next frame.
    ///
    /// Fails with the transport's end condition when the stream runs out
    /// mid-block, and with [`ProtocolError::BadMagic`] on a corrupt header.
    pub async fn read_frame(&mut self) -> Result<Frame, ProtocolError> {
        self.transport.read_block(&mut self.header_buf).await?;
        let header = FrameHeader::parse(&self.header_buf)?;

        self.transport.read_block(&mut self.body_buf).await?;
        let samples = decode_samples(&self.body_buf);

        Ok(Frame { header, samples })
    }
}

/// Decode an interleaved little-endian complex64 byte stream.
fn decode_samples(body: &[u8]) -> Vec<Complex32> {
    let mut cursor = body;
    let mut samples = Vec::with_capacity(body.len() / 8);
    while cursor.remaining() >= 8 {
        let re = cursor.get_f32_le();
        let im = cursor.get_f32_le();
        samples.push(Complex32::new(re, im));
    }
    samples
}
