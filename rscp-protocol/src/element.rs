//! Data elements: the atomic tag/type/length/value unit.
//!
//! Element layout on the wire:
//!
//! ```text
//! +-----------------+---------+-----------+------------------+
//! | tag (reversed)  | type    | length    | payload          |
//! | 4 bytes         | 1 byte  | 2 bytes LE| length bytes     |
//! +-----------------+---------+-----------+------------------+
//! ```
//!
//! The tag code is stored byte-reversed; payload bytes are written as-is and
//! numeric payloads are big-endian. Typed accessors never fail on a type
//! mismatch, they return `None` instead.

use crate::container::ContainerParser;
use crate::error::{ErrorCode, ResultCode, RscpError};
use crate::tag::ElementId;
use crate::types::DataType;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Size of the element header (4 tag + 1 type + 2 length).
pub const ELEMENT_HEADER_SIZE: usize = 7;

/// Largest payload expressible in the 16-bit length field.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Size of a `TIMESTAMP` payload (8 seconds + 4 nanoseconds).
pub const TIMESTAMP_SIZE: usize = 12;

/// A single tag/type/length/value record.
///
/// Equality and hashing consider the tag code and payload only. The wire
/// type is excluded because a device answers a failed request with the same
/// tag retyped as `ERROR`.
#[derive(Clone)]
pub struct DataElement {
    id: Arc<dyn ElementId>,
    wire_type: u8,
    payload: Bytes,
    parser: ContainerParser,
}

impl DataElement {
    /// Creates an element with an explicit type and raw payload.
    pub fn new<I: ElementId + 'static>(
        id: I,
        data_type: DataType,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self::from_parts(
            Arc::new(id),
            data_type.code(),
            payload.into(),
            ContainerParser::default(),
        )
    }

    /// Assembles an element from already resolved parts.
    pub fn from_parts(
        id: Arc<dyn ElementId>,
        wire_type: u8,
        payload: Bytes,
        parser: ContainerParser,
    ) -> Self {
        Self {
            id,
            wire_type,
            payload,
            parser,
        }
    }

    pub fn none<I: ElementId + 'static>(id: I) -> Self {
        Self::new(id, DataType::None, Bytes::new())
    }

    pub fn bool<I: ElementId + 'static>(id: I, value: bool) -> Self {
        Self::new(id, DataType::Bool, vec![value as u8])
    }

    pub fn char8<I: ElementId + 'static>(id: I, value: i8) -> Self {
        Self::new(id, DataType::Char8, value.to_be_bytes().to_vec())
    }

    pub fn uchar8<I: ElementId + 'static>(id: I, value: u8) -> Self {
        Self::new(id, DataType::UChar8, vec![value])
    }

    pub fn int16<I: ElementId + 'static>(id: I, value: i16) -> Self {
        Self::new(id, DataType::Int16, value.to_be_bytes().to_vec())
    }

    pub fn uint16<I: ElementId + 'static>(id: I, value: u16) -> Self {
        Self::new(id, DataType::UInt16, value.to_be_bytes().to_vec())
    }

    pub fn int32<I: ElementId + 'static>(id: I, value: i32) -> Self {
        Self::new(id, DataType::Int32, value.to_be_bytes().to_vec())
    }

    pub fn uint32<I: ElementId + 'static>(id: I, value: u32) -> Self {
        Self::new(id, DataType::UInt32, value.to_be_bytes().to_vec())
    }

    pub fn int64<I: ElementId + 'static>(id: I, value: i64) -> Self {
        Self::new(id, DataType::Int64, value.to_be_bytes().to_vec())
    }

    pub fn uint64<I: ElementId + 'static>(id: I, value: u64) -> Self {
        Self::new(id, DataType::UInt64, value.to_be_bytes().to_vec())
    }

    pub fn float32<I: ElementId + 'static>(id: I, value: f32) -> Self {
        Self::new(id, DataType::Float32, value.to_be_bytes().to_vec())
    }

    pub fn double64<I: ElementId + 'static>(id: I, value: f64) -> Self {
        Self::new(id, DataType::Double64, value.to_be_bytes().to_vec())
    }

    pub fn bitfield<I: ElementId + 'static>(id: I, value: u8) -> Self {
        Self::new(id, DataType::Bitfield, vec![value])
    }

    pub fn string<I: ElementId + 'static>(id: I, value: &str) -> Self {
        Self::new(id, DataType::String, value.as_bytes().to_vec())
    }

    pub fn bytearray<I: ElementId + 'static>(id: I, value: impl Into<Bytes>) -> Self {
        Self::new(id, DataType::ByteArray, value)
    }

    /// Timestamp element: 8-byte seconds followed by 4-byte nanoseconds.
    pub fn timestamp<I: ElementId + 'static>(id: I, value: DateTime<Utc>) -> Self {
        Self::new(id, DataType::Timestamp, encode_timestamp(value).to_vec())
    }

    /// Timestamp element holding a relative duration.
    pub fn duration<I: ElementId + 'static>(id: I, value: TimeDelta) -> Self {
        let mut buf = [0u8; TIMESTAMP_SIZE];
        buf[..8].copy_from_slice(&value.num_seconds().to_be_bytes());
        buf[8..].copy_from_slice(&value.subsec_nanos().to_be_bytes());
        Self::new(id, DataType::Timestamp, buf.to_vec())
    }

    /// Protocol error response carrying `code`.
    pub fn error<I: ElementId + 'static>(id: I, code: i32) -> Self {
        Self::new(id, DataType::Error, code.to_be_bytes().to_vec())
    }

    /// Container element whose payload is the serialized `children`.
    pub fn container<I: ElementId + 'static>(
        id: I,
        children: &[DataElement],
    ) -> Result<Self, RscpError> {
        let payload = encode_elements(children)?;
        Ok(Self::new(id, DataType::Container, payload.freeze()))
    }

    /// Identifier of this element.
    pub fn id(&self) -> &Arc<dyn ElementId> {
        &self.id
    }

    /// Canonical tag code.
    pub fn code(&self) -> u32 {
        self.id.code()
    }

    /// Raw type byte as received or built.
    pub fn wire_type(&self) -> u8 {
        self.wire_type
    }

    pub fn data_type(&self) -> DataType {
        DataType::from_code(self.wire_type)
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Whether the device answered this tag with an error.
    pub fn is_error_response(&self) -> bool {
        self.data_type() == DataType::Error
    }

    // Numeric payloads are big-endian. Shorter payloads are sign- or
    // zero-extended by the declared type, longer ones keep the low-order bytes.
    fn integer_value(&self, unsigned: bool) -> Option<i64> {
        if self.payload.is_empty() {
            return None;
        }
        let start = self.payload.len().saturating_sub(8);
        let bytes = &self.payload[start..];
        let negative = !unsigned && bytes[0] & 0x80 != 0;
        let mut buf = if negative { [0xFF; 8] } else { [0u8; 8] };
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        Some(i64::from_be_bytes(buf))
    }

    fn typed_integer(&self) -> Option<i64> {
        self.integer_value(self.data_type().is_unsigned())
    }

    pub fn value_as_byte(&self) -> Option<i8> {
        if !self.data_type().is_byte_type() {
            return None;
        }
        self.typed_integer().map(|v| v as i8)
    }

    pub fn value_as_short(&self) -> Option<i16> {
        if !self.data_type().is_short_type() {
            return None;
        }
        self.typed_integer().map(|v| v as i16)
    }

    pub fn value_as_int(&self) -> Option<i32> {
        if !self.data_type().is_int_type() {
            return None;
        }
        self.typed_integer().map(|v| v as i32)
    }

    pub fn value_as_long(&self) -> Option<i64> {
        if !self.data_type().is_long_type() {
            return None;
        }
        self.typed_integer()
    }

    pub fn value_as_float(&self) -> Option<f32> {
        if self.data_type() != DataType::Float32 {
            return None;
        }
        let bytes: [u8; 4] = self.payload[..].try_into().ok()?;
        Some(f32::from_be_bytes(bytes))
    }

    pub fn value_as_double(&self) -> Option<f64> {
        if self.data_type() != DataType::Double64 {
            return None;
        }
        let bytes: [u8; 8] = self.payload[..].try_into().ok()?;
        Some(f64::from_be_bytes(bytes))
    }

    /// `BOOL` with exactly one payload byte; `true` iff that byte is 1.
    pub fn value_as_boolean(&self) -> Option<bool> {
        if self.data_type() != DataType::Bool || self.payload.len() != 1 {
            return None;
        }
        Some(self.payload[0] == 1)
    }

    fn timestamp_parts(&self) -> Option<(i64, i32)> {
        if self.data_type() != DataType::Timestamp || self.payload.len() != TIMESTAMP_SIZE {
            return None;
        }
        let seconds = i64::from_be_bytes(self.payload[..8].try_into().ok()?);
        let nanos = i32::from_be_bytes(self.payload[8..].try_into().ok()?);
        Some((seconds, nanos))
    }

    pub fn value_as_instant(&self) -> Option<DateTime<Utc>> {
        let (seconds, nanos) = self.timestamp_parts()?;
        DateTime::from_timestamp(seconds, 0)?
            .checked_add_signed(TimeDelta::nanoseconds(i64::from(nanos)))
    }

    /// The timestamp payload read as elapsed time rather than a point in time.
    pub fn value_as_duration(&self) -> Option<TimeDelta> {
        let (seconds, nanos) = self.timestamp_parts()?;
        TimeDelta::try_seconds(seconds)?.checked_add(&TimeDelta::nanoseconds(i64::from(nanos)))
    }

    /// Decoded children of a `CONTAINER`.
    ///
    /// Returns `Ok(None)` when this element is not a container and an error
    /// when the payload is truncated.
    pub fn try_value_as_container(&self) -> Result<Option<Vec<DataElement>>, RscpError> {
        if self.data_type() != DataType::Container {
            return Ok(None);
        }
        self.parser.parse_bytes(self.payload.clone()).map(Some)
    }

    /// Decoded children of a `CONTAINER`, empty for any other type.
    pub fn value_as_container(&self) -> Vec<DataElement> {
        match self.try_value_as_container() {
            Ok(children) => children.unwrap_or_default(),
            Err(e) => {
                tracing::debug!("container {} not decodable: {}", self.id.hex(), e);
                Vec::new()
            }
        }
    }

    /// Payload decoded as UTF-8 regardless of the declared type.
    pub fn value_as_string(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub fn value_as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Setter outcome. Forced to `Unknown` for error responses.
    pub fn value_as_result_code(&self) -> ResultCode {
        if self.is_error_response() {
            return ResultCode::Unknown;
        }
        self.value_as_int()
            .map(ResultCode::from_code)
            .unwrap_or(ResultCode::Unknown)
    }

    /// Error code reported in an integer field. Forced to `Unknown` for error
    /// responses, whose payload carries no meaning.
    pub fn value_as_error_code(&self) -> ErrorCode {
        if self.is_error_response() {
            return ErrorCode::Unknown;
        }
        self.value_as_int()
            .map(ErrorCode::from_code)
            .unwrap_or(ErrorCode::Unknown)
    }

    /// Renders the payload according to its wire type.
    pub fn to_display_string(&self) -> String {
        let rendered = match self.data_type() {
            DataType::None => Some("[NONE]".to_string()),
            DataType::Bool => self.value_as_boolean().map(|v| v.to_string()),
            DataType::UInt64 => self.value_as_long().map(|v| (v as u64).to_string()),
            t if t.is_long_type() => self.value_as_long().map(|v| v.to_string()),
            DataType::Float32 => self.value_as_float().map(|v| format!("{:.2}", v)),
            DataType::Double64 => self.value_as_double().map(|v| format!("{:.2}", v)),
            DataType::Bitfield => self.payload.first().map(|b| b.to_string()),
            DataType::String => Some(self.value_as_string()),
            DataType::Container => Some("[CONTAINER]".to_string()),
            DataType::Timestamp => self.value_as_instant().map(format_local_date_time),
            _ => None,
        };
        rendered.unwrap_or_else(|| hex::encode(&self.payload))
    }

    /// Number of bytes this element occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        ELEMENT_HEADER_SIZE + self.payload.len()
    }

    /// Appends the wire form of this element to `buf`.
    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<(), RscpError> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(RscpError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        buf.reserve(self.encoded_len());

        // Tag, byte-reversed (4 bytes)
        buf.put_u32_le(self.code());

        // Type (1 byte)
        buf.put_u8(self.wire_type);

        // Payload length, little-endian (2 bytes)
        buf.put_u16_le(self.payload.len() as u16);

        // Payload
        buf.put_slice(&self.payload);

        Ok(())
    }

    /// Encodes this element into a fresh buffer.
    pub fn encode(&self) -> Result<BytesMut, RscpError> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }
}

/// Serializes `elements` back to back, without separators.
pub fn encode_elements(elements: &[DataElement]) -> Result<BytesMut, RscpError> {
    let len = elements.iter().map(DataElement::encoded_len).sum();
    let mut buf = BytesMut::with_capacity(len);
    for element in elements {
        element.encode_into(&mut buf)?;
    }
    Ok(buf)
}

/// ISO-8601 local date-time of the UTC value. Seconds are always printed, the
/// fraction only when non-zero and without trailing zeros.
fn format_local_date_time(time: DateTime<Utc>) -> String {
    let mut out = time.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = time.timestamp_subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

pub(crate) fn encode_timestamp(value: DateTime<Utc>) -> [u8; TIMESTAMP_SIZE] {
    let mut buf = [0u8; TIMESTAMP_SIZE];
    buf[..8].copy_from_slice(&value.timestamp().to_be_bytes());
    buf[8..].copy_from_slice(&(value.timestamp_subsec_nanos() as i32).to_be_bytes());
    buf
}

impl PartialEq for DataElement {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code() && self.payload == other.payload
    }
}

impl Eq for DataElement {}

impl Hash for DataElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
        self.payload.hash(state);
    }
}

impl fmt::Debug for DataElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataElement")
            .field("tag", &self.id.hex())
            .field("name", &self.id.name())
            .field("type", &self.data_type())
            .field("payload", &hex::encode(&self.payload))
            .finish()
    }
}
