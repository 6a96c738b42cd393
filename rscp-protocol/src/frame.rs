//! Binary frame format for RSCP.
//!
//! Frame layout (18 bytes header + data + optional checksum):
//!
//! ```text
//! +--------+---------+-------------+-------------+-------------+
//! | magic  | control | seconds     | nanoseconds | data_len    |
//! | 2 bytes| 2 bytes | 8 bytes BE  | 4 bytes BE  | 2 bytes LE  |
//! +--------+---------+-------------+-------------+-------------+
//! | data (data_len bytes)        | [crc32, 4 bytes BE]          |
//! +------------------------------+------------------------------+
//! ```
//!
//! The checksum trailer is present iff the second control byte is
//! [`CHECKSUM_FLAG`]. It covers every byte before it.

use crate::container::find_element;
use crate::element::{encode_elements, encode_timestamp, DataElement, MAX_PAYLOAD_SIZE};
use crate::error::{ErrorCode, ResultCode, RscpError};
use crate::tag::ElementId;
use crate::PROTOCOL_VERSION;
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, TimeDelta, Utc};

/// Magic bytes opening every frame.
pub const MAGIC: [u8; 2] = [0xE3, 0xDC];

/// Size of the fixed frame header (2+2+8+4+2 = 18).
pub const FRAME_HEADER_SIZE: usize = 18;

/// Size of the CRC32 trailer.
pub const CHECKSUM_SIZE: usize = 4;

/// Control byte value marking a checksum trailer (version 1, CRC on).
pub const CHECKSUM_FLAG: u8 = (PROTOCOL_VERSION << 4) | 0x01;

/// Control bytes for a frame with checksum.
pub const CONTROL_WITH_CHECKSUM: [u8; 2] = [0x00, CHECKSUM_FLAG];

/// Control bytes for a frame without checksum.
pub const CONTROL_WITHOUT_CHECKSUM: [u8; 2] = [0x00, PROTOCOL_VERSION << 4];

/// CRC32 (IEEE) over `bytes`.
pub fn compute_checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// A complete RSCP frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    timestamp: DateTime<Utc>,
    control: [u8; 2],
    elements: Vec<DataElement>,
}

impl Frame {
    /// Creates a checksummed frame stamped with the current time.
    pub fn new(elements: Vec<DataElement>) -> Self {
        Self {
            timestamp: Utc::now(),
            control: CONTROL_WITH_CHECKSUM,
            elements,
        }
    }

    pub fn builder() -> FrameBuilder {
        FrameBuilder::default()
    }

    /// Assembles a frame from decoded parts.
    pub fn from_parts(
        timestamp: DateTime<Utc>,
        control: [u8; 2],
        elements: Vec<DataElement>,
    ) -> Self {
        Self {
            timestamp,
            control,
            elements,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn control(&self) -> [u8; 2] {
        self.control
    }

    /// Protocol version from the high nibble of the control byte.
    pub fn version(&self) -> u8 {
        self.control[1] >> 4
    }

    pub fn checksum_enabled(&self) -> bool {
        self.control[1] == CHECKSUM_FLAG
    }

    pub fn elements(&self) -> &[DataElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<DataElement> {
        self.elements
    }

    /// Encodes the frame into bytes, appending the checksum when enabled.
    pub fn encode(&self) -> Result<BytesMut, RscpError> {
        let data = encode_elements(&self.elements)?;
        if data.len() > MAX_PAYLOAD_SIZE {
            return Err(RscpError::DataSectionTooLarge {
                size: data.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let trailer = if self.checksum_enabled() {
            CHECKSUM_SIZE
        } else {
            0
        };
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + data.len() + trailer);

        // Magic (2 bytes)
        buf.put_slice(&MAGIC);

        // Control (2 bytes)
        buf.put_slice(&self.control);

        // Seconds and nanoseconds (12 bytes)
        buf.put_slice(&encode_timestamp(self.timestamp));

        // Data length, little-endian (2 bytes)
        buf.put_u16_le(data.len() as u16);

        // Data
        buf.put_slice(&data);

        // CRC32 of everything above (4 bytes)
        if self.checksum_enabled() {
            let crc = compute_checksum(&buf);
            buf.put_u32(crc);
        }

        Ok(buf)
    }

    /// Total wire size of the frame starting with `header`, if the header is
    /// complete.
    pub fn wire_length(header: &[u8]) -> Option<usize> {
        if header.len() < FRAME_HEADER_SIZE {
            return None;
        }
        let data_len = u16::from_le_bytes([header[16], header[17]]) as usize;
        let trailer = if header[3] == CHECKSUM_FLAG {
            CHECKSUM_SIZE
        } else {
            0
        };
        Some(FRAME_HEADER_SIZE + data_len + trailer)
    }

    /// Checks the CRC32 trailer of a raw frame.
    ///
    /// Returns `Ok(false)` when the frame carries no checksum.
    pub fn verify_checksum(raw: &[u8]) -> Result<bool, RscpError> {
        let total = Self::wire_length(raw).ok_or(RscpError::BufferUnderflow {
            offset: 0,
            needed: FRAME_HEADER_SIZE,
            remaining: raw.len(),
        })?;
        if raw[3] != CHECKSUM_FLAG {
            return Ok(false);
        }
        if raw.len() < total {
            return Err(RscpError::MissingChecksum {
                needed: total - raw.len(),
            });
        }

        let covered = total - CHECKSUM_SIZE;
        let expected = u32::from_be_bytes([
            raw[covered],
            raw[covered + 1],
            raw[covered + 2],
            raw[covered + 3],
        ]);
        let actual = compute_checksum(&raw[..covered]);
        if expected != actual {
            tracing::warn!(
                "checksum mismatch: expected {:#010x}, got {:#010x}",
                expected,
                actual
            );
            return Err(RscpError::ChecksumMismatch { expected, actual });
        }
        Ok(true)
    }

    /// Finds `tag` among the top-level elements, or inside the containers
    /// named by `path`.
    pub fn data_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> Option<DataElement> {
        find_element(&self.elements, tag, path)
    }

    pub fn byte_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> i8 {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_byte())
            .unwrap_or(0)
    }

    pub fn short_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> i16 {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_short())
            .unwrap_or(0)
    }

    pub fn int_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> i32 {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_int())
            .unwrap_or(0)
    }

    pub fn long_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> i64 {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_long())
            .unwrap_or(0)
    }

    pub fn float_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> f32 {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_float())
            .unwrap_or(0.0)
    }

    pub fn double_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> f64 {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_double())
            .unwrap_or(0.0)
    }

    pub fn bool_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> bool {
        self.data_by_tag(tag, path)
            .and_then(|e| e.value_as_boolean())
            .unwrap_or(false)
    }

    pub fn string_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> String {
        self.data_by_tag(tag, path)
            .map(|e| e.value_as_string())
            .unwrap_or_default()
    }

    pub fn container_by_tag(
        &self,
        tag: &dyn ElementId,
        path: &[&dyn ElementId],
    ) -> Vec<DataElement> {
        self.data_by_tag(tag, path)
            .map(|e| e.value_as_container())
            .unwrap_or_default()
    }

    pub fn try_instant_by_tag(
        &self,
        tag: &dyn ElementId,
        path: &[&dyn ElementId],
    ) -> Option<DateTime<Utc>> {
        self.data_by_tag(tag, path)?.value_as_instant()
    }

    /// Like [`Frame::try_instant_by_tag`], falling back to the current time.
    pub fn instant_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> DateTime<Utc> {
        self.try_instant_by_tag(tag, path).unwrap_or_else(Utc::now)
    }

    pub fn try_duration_by_tag(
        &self,
        tag: &dyn ElementId,
        path: &[&dyn ElementId],
    ) -> Option<TimeDelta> {
        self.data_by_tag(tag, path)?.value_as_duration()
    }

    /// Like [`Frame::try_duration_by_tag`], falling back to the time elapsed
    /// since the Unix epoch.
    pub fn duration_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> TimeDelta {
        self.try_duration_by_tag(tag, path)
            .unwrap_or_else(|| Utc::now() - DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn result_code_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> ResultCode {
        self.data_by_tag(tag, path)
            .map(|e| e.value_as_result_code())
            .unwrap_or(ResultCode::Unknown)
    }

    pub fn error_code_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> ErrorCode {
        self.data_by_tag(tag, path)
            .map(|e| e.value_as_error_code())
            .unwrap_or(ErrorCode::Unknown)
    }

    /// Whether the device answered `tag` with an error. `false` when absent.
    pub fn is_error_response_by_tag(&self, tag: &dyn ElementId, path: &[&dyn ElementId]) -> bool {
        self.data_by_tag(tag, path)
            .map(|e| e.is_error_response())
            .unwrap_or(false)
    }
}

/// Builder for outgoing frames.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    timestamp: Option<DateTime<Utc>>,
    control: [u8; 2],
    elements: Vec<DataElement>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self {
            timestamp: None,
            control: CONTROL_WITH_CHECKSUM,
            elements: Vec::new(),
        }
    }
}

impl FrameBuilder {
    /// Sets the creation time. Defaults to the time of [`FrameBuilder::build`].
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the creation time from raw seconds and nanoseconds.
    pub fn timestamp_parts(self, seconds: i64, nanos: i32) -> Result<Self, RscpError> {
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .and_then(|t| t.checked_add_signed(TimeDelta::nanoseconds(i64::from(nanos))))
            .ok_or(RscpError::InvalidTimestamp { seconds, nanos })?;
        Ok(self.timestamp(timestamp))
    }

    /// Sets the raw control bytes.
    pub fn control(mut self, control: [u8; 2]) -> Self {
        self.control = control;
        self
    }

    pub fn with_checksum(mut self) -> Self {
        self.control = CONTROL_WITH_CHECKSUM;
        self
    }

    pub fn without_checksum(mut self) -> Self {
        self.control = CONTROL_WITHOUT_CHECKSUM;
        self
    }

    pub fn element(mut self, element: DataElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn elements(mut self, elements: impl IntoIterator<Item = DataElement>) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn build(self) -> Frame {
        Frame {
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            control: self.control,
            elements: self.elements,
        }
    }
}
