//! Encoder and streaming decoder for RSCP frames.
//!
//! A transport hands over bytes as they arrive; [`FrameDecoder`] buffers
//! them and yields a frame once the declared data length (plus trailer) is
//! available.

use crate::element::DataElement;
use crate::error::RscpError;
use crate::frame::{Frame, FRAME_HEADER_SIZE, MAGIC};
use crate::parser::{FrameParser, ParserOptions};
use bytes::{Buf, BytesMut};

/// Encodes outgoing requests into frames.
pub struct Encoder;

impl Encoder {
    /// Encodes a frame.
    pub fn encode_frame(frame: &Frame) -> Result<BytesMut, RscpError> {
        frame.encode()
    }

    /// Wraps `elements` in a checksummed frame stamped now and encodes it.
    pub fn encode_request(elements: Vec<DataElement>) -> Result<BytesMut, RscpError> {
        Frame::new(elements).encode()
    }
}

/// Buffers partial reads and decodes complete frames.
pub struct FrameDecoder {
    buffer: BytesMut,
    parser: FrameParser,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_parser(FrameParser::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self::with_parser(FrameParser::with_options(options))
    }

    pub fn with_parser(parser: FrameParser) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            parser,
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next frame from the buffer.
    ///
    /// Returns `Ok(None)` while the frame is incomplete. A frame is consumed
    /// from the buffer before it is parsed, so a malformed frame is dropped
    /// and the next call starts at the following one.
    pub fn decode_frame(&mut self) -> Result<Option<Frame>, RscpError> {
        if self.buffer.len() >= MAGIC.len() && self.parser.options().strict_magic {
            let magic = [self.buffer[0], self.buffer[1]];
            if magic != MAGIC {
                // Resynchronization is left to the transport
                return Err(RscpError::InvalidMagic(magic));
            }
        }

        let total = match Frame::wire_length(&self.buffer) {
            Some(total) => total,
            None => return Ok(None),
        };
        if self.buffer.len() < total {
            tracing::trace!(
                "frame incomplete: have {} of {} bytes",
                self.buffer.len(),
                total
            );
            return Ok(None);
        }

        let raw = self.buffer.split_to(total).freeze();
        self.parser.parse_bytes(raw).map(Some)
    }

    /// Number of bytes still needed for the frame at the head of the buffer,
    /// if known.
    pub fn needed(&self) -> Option<usize> {
        if self.buffer.len() < FRAME_HEADER_SIZE {
            return Some(FRAME_HEADER_SIZE - self.buffer.len());
        }
        Frame::wire_length(&self.buffer).map(|total| total.saturating_sub(self.buffer.len()))
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discards `n` buffered bytes, e.g. to skip past garbage.
    pub fn skip(&mut self, n: usize) {
        let n = n.min(self.buffer.len());
        self.buffer.advance(n);
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
