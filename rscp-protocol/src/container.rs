//! Decoding of concatenated data elements.
//!
//! A buffer is a plain sequence of elements with no terminator; parsing stops
//! when the bytes run out. Container payloads are left undecoded until a
//! caller asks for them, see [`DataElement::value_as_container`].

use crate::element::{DataElement, ELEMENT_HEADER_SIZE};
use crate::error::RscpError;
use crate::tag::{ElementId, StaticCatalog, TagCatalog};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Parses element sequences, resolving tags against a catalog.
#[derive(Clone)]
pub struct ContainerParser {
    catalog: Arc<dyn TagCatalog>,
}

impl ContainerParser {
    pub fn new(catalog: Arc<dyn TagCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn TagCatalog> {
        &self.catalog
    }

    /// Parses the top-level elements in `buf`.
    pub fn parse(&self, buf: &[u8]) -> Result<Vec<DataElement>, RscpError> {
        self.parse_bytes(Bytes::copy_from_slice(buf))
    }

    /// Parses the top-level elements in `buf` without copying payloads.
    pub fn parse_bytes(&self, buf: Bytes) -> Result<Vec<DataElement>, RscpError> {
        let mut elements = Vec::new();
        let mut offset = 0;
        while offset < buf.len() {
            let (element, consumed) = self.read_element(&buf, offset)?;
            offset += consumed;
            elements.push(element);
        }
        Ok(elements)
    }

    /// Reads one element starting at `offset`, returning it with its size.
    fn read_element(&self, buf: &Bytes, offset: usize) -> Result<(DataElement, usize), RscpError> {
        let remaining = buf.len() - offset;
        if remaining < ELEMENT_HEADER_SIZE {
            return Err(RscpError::BufferUnderflow {
                offset,
                needed: ELEMENT_HEADER_SIZE,
                remaining,
            });
        }

        let header = &buf[offset..offset + ELEMENT_HEADER_SIZE];
        let code = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let wire_type = header[4];
        let payload_len = u16::from_le_bytes([header[5], header[6]]) as usize;

        let payload_start = offset + ELEMENT_HEADER_SIZE;
        if buf.len() - payload_start < payload_len {
            return Err(RscpError::BufferUnderflow {
                offset: payload_start,
                needed: payload_len,
                remaining: buf.len() - payload_start,
            });
        }
        let payload = buf.slice(payload_start..payload_start + payload_len);

        tracing::trace!(
            "element 0x{:08X} type 0x{:02X} len {} at {}",
            code,
            wire_type,
            payload_len,
            offset
        );

        let id = self.catalog.resolve(code);
        let element = DataElement::from_parts(id, wire_type, payload, self.clone());
        Ok((element, ELEMENT_HEADER_SIZE + payload_len))
    }
}

impl Default for ContainerParser {
    fn default() -> Self {
        Self::new(StaticCatalog::builtin())
    }
}

impl fmt::Debug for ContainerParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerParser").finish_non_exhaustive()
    }
}

/// Finds `tag` by walking `path` through nested containers.
///
/// Each path segment names a container among the current elements; the
/// first match is entered and the search continues in its children. With an
/// empty path only `elements` itself is scanned. Any miss along the way
/// yields `None`.
pub fn find_element(
    elements: &[DataElement],
    tag: &dyn ElementId,
    path: &[&dyn ElementId],
) -> Option<DataElement> {
    match path.split_first() {
        None => elements.iter().find(|e| e.code() == tag.code()).cloned(),
        Some((head, rest)) => {
            let container = elements.iter().find(|e| e.code() == head.code())?;
            let children = match container.try_value_as_container() {
                Ok(children) => children?,
                Err(e) => {
                    tracing::debug!("path segment {} not decodable: {}", head.hex(), e);
                    return None;
                }
            };
            find_element(&children, tag, rest)
        }
    }
}
