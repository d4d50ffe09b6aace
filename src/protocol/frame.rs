//! Frame header and decoded frame types

use bytes::Buf;
use chrono::{DateTime, Utc};
use num_complex::Complex32;

use crate::constants::HDR_MAGIC;
use crate::error::ProtocolError;

/// Decoded fields of the fixed-size frame header.
///
/// Timestamps are kept as the raw `f64` Unix seconds from the wire;
/// [`FrameHeader::start_utc`] gives the UTC-normalized form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    /// Integration start, Unix seconds.
    pub start: f64,
    /// Integration end, Unix seconds.
    pub end: f64,
}

impl FrameHeader {
    /// Parse the leading bytes of a header block.
    ///
    /// Layout: magic `u32`, reserved `u32`, start `f64`, end `f64`, all
    /// little-endian. Fails with [`ProtocolError::BadMagic`] when the magic
    /// constant does not match; that stream cannot be resynchronized.
    pub fn parse(header: &[u8]) -> Result<Self, ProtocolError> {
        if header.len() < 24 {
            return Err(ProtocolError::ShortHeader {
                expected: 24,
                actual: header.len(),
            });
        }

        let mut cursor = header;
        let magic = cursor.get_u32_le();
        let _reserved = cursor.get_u32_le();
        let start = cursor.get_f64_le();
        let end = cursor.get_f64_le();

        if magic != HDR_MAGIC {
            return Err(ProtocolError::BadMagic {
                expected: HDR_MAGIC,
                actual: magic,
            });
        }

        Ok(Self { start, end })
    }

    /// Integration start as a UTC timestamp.
    pub fn start_utc(&self) -> DateTime<Utc> {
        utc_from_unix(self.start)
    }
}

/// One decoded correlator frame: header timestamps plus the flat complex64
/// sample stream, still in wire order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: FrameHeader,
    pub samples: Vec<Complex32>,
}

impl Frame {
    /// Integration start as a UTC timestamp.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.header.start_utc()
    }
}

fn utc_from_unix(seconds: f64) -> DateTime<Utc> {
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9).min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}
