//! # rscp-protocol
//!
//! Codec for RSCP, the tag/type/length/value protocol spoken by home
//! energy-management appliances.
//!
//! This crate provides:
//! - Data elements with typed, fail-safe accessors
//! - Lazy decoding of nested containers
//! - Frame encoding/decoding with an optional CRC32 trailer
//! - Tag/path lookup over decoded frames
//! - A tag catalog abstraction with unknown-tag fallback
//!
//! The transport is out of scope: the codec consumes and produces byte
//! buffers only.

pub mod codec;
pub mod container;
pub mod element;
pub mod error;
pub mod frame;
pub mod parser;
pub mod tag;
pub mod tags;
pub mod types;

pub use codec::{Encoder, FrameDecoder};
pub use container::{find_element, ContainerParser};
pub use element::{DataElement, ELEMENT_HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use error::{ErrorCode, ResultCode, RscpError};
pub use frame::{compute_checksum, Frame, FrameBuilder, FRAME_HEADER_SIZE, MAGIC};
pub use parser::{FrameParser, ParserOptions};
pub use tag::{ElementId, Namespace, StaticCatalog, TagCatalog, TagDef, UnknownTag};
pub use types::DataType;

/// Protocol version written into the high nibble of the control byte.
pub const PROTOCOL_VERSION: u8 = 1;
