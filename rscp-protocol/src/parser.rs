//! Decoding of complete frames.

use crate::container::ContainerParser;
use crate::error::RscpError;
use crate::frame::{Frame, CHECKSUM_FLAG, FRAME_HEADER_SIZE, MAGIC};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Knobs controlling how strictly frames are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Reject frames that do not start with the magic bytes.
    pub strict_magic: bool,
    /// Check the CRC32 trailer of frames that announce one.
    pub verify_checksum: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict_magic: true,
            verify_checksum: false,
        }
    }
}

/// Decodes raw frame bytes into [`Frame`]s.
#[derive(Debug, Clone, Default)]
pub struct FrameParser {
    elements: ContainerParser,
    options: ParserOptions,
}

impl FrameParser {
    pub fn new(elements: ContainerParser, options: ParserOptions) -> Self {
        Self { elements, options }
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self::new(ContainerParser::default(), options)
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    pub fn container_parser(&self) -> &ContainerParser {
        &self.elements
    }

    /// Decodes one frame from `buf`.
    pub fn parse(&self, buf: &[u8]) -> Result<Frame, RscpError> {
        self.parse_bytes(Bytes::copy_from_slice(buf))
    }

    /// Decodes one frame from `buf` without copying element payloads.
    ///
    /// Bytes past the declared data section (and trailer) are ignored.
    pub fn parse_bytes(&self, buf: Bytes) -> Result<Frame, RscpError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Err(RscpError::BufferUnderflow {
                offset: 0,
                needed: FRAME_HEADER_SIZE,
                remaining: buf.len(),
            });
        }

        let magic = [buf[0], buf[1]];
        if magic != MAGIC {
            if self.options.strict_magic {
                return Err(RscpError::InvalidMagic(magic));
            }
            tracing::debug!("ignoring unexpected magic {:02x?}", magic);
        }

        let control = [buf[2], buf[3]];
        let seconds = i64::from_be_bytes([
            buf[4], buf[5], buf[6], buf[7], buf[8], buf[9], buf[10], buf[11],
        ]);
        let nanos = i32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]);
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .and_then(|t| t.checked_add_signed(TimeDelta::nanoseconds(i64::from(nanos))))
            .ok_or(RscpError::InvalidTimestamp { seconds, nanos })?;

        let data_len = u16::from_le_bytes([buf[16], buf[17]]) as usize;
        let remaining = buf.len() - FRAME_HEADER_SIZE;
        if remaining < data_len {
            return Err(RscpError::BufferUnderflow {
                offset: FRAME_HEADER_SIZE,
                needed: data_len,
                remaining,
            });
        }

        if self.options.verify_checksum && control[1] == CHECKSUM_FLAG {
            Frame::verify_checksum(&buf)?;
        }

        let data = buf.slice(FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + data_len);
        let elements = self.elements.parse_bytes(data)?;

        tracing::debug!(
            "decoded frame: {} element(s), {} data bytes, checksum {}",
            elements.len(),
            data_len,
            if control[1] == CHECKSUM_FLAG { "on" } else { "off" }
        );

        Ok(Frame::from_parts(timestamp, control, elements))
    }
}
