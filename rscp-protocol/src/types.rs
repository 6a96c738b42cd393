//! Wire data types.
//!
//! Every data element carries a single type byte that declares how its
//! payload is to be interpreted. Lookup from a raw byte never fails: codes
//! outside the known set map to [`DataType::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire type of a data element payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum DataType {
    None = 0x00,
    Bool = 0x01,
    Char8 = 0x02,
    UChar8 = 0x03,
    Int16 = 0x04,
    UInt16 = 0x05,
    Int32 = 0x06,
    UInt32 = 0x07,
    Int64 = 0x08,
    UInt64 = 0x09,
    Float32 = 0x0A,
    Double64 = 0x0B,
    Bitfield = 0x0C,
    String = 0x0D,
    Container = 0x0E,
    Timestamp = 0x0F,
    ByteArray = 0x10,
    /// Synthetic type for codes not in the known set.
    Unknown = 0xFE,
    Error = 0xFF,
}

impl DataType {
    /// All known wire types, excluding the synthetic [`DataType::Unknown`].
    pub const ALL: [DataType; 18] = [
        DataType::None,
        DataType::Bool,
        DataType::Char8,
        DataType::UChar8,
        DataType::Int16,
        DataType::UInt16,
        DataType::Int32,
        DataType::UInt32,
        DataType::Int64,
        DataType::UInt64,
        DataType::Float32,
        DataType::Double64,
        DataType::Bitfield,
        DataType::String,
        DataType::Container,
        DataType::Timestamp,
        DataType::ByteArray,
        DataType::Error,
    ];

    /// Resolves a wire code. Unrecognized codes yield [`DataType::Unknown`].
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => DataType::None,
            0x01 => DataType::Bool,
            0x02 => DataType::Char8,
            0x03 => DataType::UChar8,
            0x04 => DataType::Int16,
            0x05 => DataType::UInt16,
            0x06 => DataType::Int32,
            0x07 => DataType::UInt32,
            0x08 => DataType::Int64,
            0x09 => DataType::UInt64,
            0x0A => DataType::Float32,
            0x0B => DataType::Double64,
            0x0C => DataType::Bitfield,
            0x0D => DataType::String,
            0x0E => DataType::Container,
            0x0F => DataType::Timestamp,
            0x10 => DataType::ByteArray,
            0xFF => DataType::Error,
            _ => DataType::Unknown,
        }
    }

    /// Returns the wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Types that fit into a single byte.
    pub fn is_byte_type(self) -> bool {
        matches!(self, DataType::Char8 | DataType::UChar8)
    }

    /// Types that fit into 16 bits.
    pub fn is_short_type(self) -> bool {
        self.is_byte_type() || matches!(self, DataType::Int16 | DataType::UInt16)
    }

    /// Types that fit into 32 bits.
    pub fn is_int_type(self) -> bool {
        self.is_short_type() || matches!(self, DataType::Int32 | DataType::UInt32)
    }

    /// Types that fit into 64 bits.
    pub fn is_long_type(self) -> bool {
        self.is_int_type() || matches!(self, DataType::Int64 | DataType::UInt64)
    }

    /// Whether the payload of this type is an unsigned integer.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            DataType::UChar8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        )
    }

    /// Wire name, e.g. `FLOAT32`.
    pub fn name(self) -> &'static str {
        match self {
            DataType::None => "NONE",
            DataType::Bool => "BOOL",
            DataType::Char8 => "CHAR8",
            DataType::UChar8 => "UCHAR8",
            DataType::Int16 => "INT16",
            DataType::UInt16 => "UINT16",
            DataType::Int32 => "INT32",
            DataType::UInt32 => "UINT32",
            DataType::Int64 => "INT64",
            DataType::UInt64 => "UINT64",
            DataType::Float32 => "FLOAT32",
            DataType::Double64 => "DOUBLE64",
            DataType::Bitfield => "BITFIELD",
            DataType::String => "STRING",
            DataType::Container => "CONTAINER",
            DataType::Timestamp => "TIMESTAMP",
            DataType::ByteArray => "BYTEARRAY",
            DataType::Unknown => "UNKNOWN",
            DataType::Error => "ERROR",
        }
    }

    /// Looks up a type by its wire name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .chain(std::iter::once(DataType::Unknown))
            .find(|t| t.name() == upper)
    }
}

impl From<u8> for DataType {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
