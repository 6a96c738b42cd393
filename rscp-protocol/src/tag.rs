//! Element identifiers ("tags") and the catalog that resolves them.
//!
//! A tag is a 4-byte code. Its first byte selects the [`Namespace`]. Known
//! tags live in a [`TagCatalog`]; codes the catalog does not know resolve to
//! an [`UnknownTag`], so resolution never fails.

use crate::types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Protocol area a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Namespace {
    Rscp = 0x00,
    Ems = 0x01,
    Pvi = 0x02,
    Bat = 0x03,
    Dcdc = 0x04,
    Pm = 0x05,
    Db = 0x06,
    Fms = 0x07,
    Srv = 0x08,
    Ha = 0x09,
    Info = 0x0A,
    Ep = 0x0B,
    Sys = 0x0C,
    Um = 0x0D,
    Wb = 0x0E,
    Unknown = 0xFF,
}

impl Namespace {
    /// Resolves a namespace byte, defaulting to [`Namespace::Unknown`].
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Namespace::Rscp,
            0x01 => Namespace::Ems,
            0x02 => Namespace::Pvi,
            0x03 => Namespace::Bat,
            0x04 => Namespace::Dcdc,
            0x05 => Namespace::Pm,
            0x06 => Namespace::Db,
            0x07 => Namespace::Fms,
            0x08 => Namespace::Srv,
            0x09 => Namespace::Ha,
            0x0A => Namespace::Info,
            0x0B => Namespace::Ep,
            0x0C => Namespace::Sys,
            0x0D => Namespace::Um,
            0x0E => Namespace::Wb,
            _ => Namespace::Unknown,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Namespace::Rscp => "RSCP",
            Namespace::Ems => "EMS",
            Namespace::Pvi => "PVI",
            Namespace::Bat => "BAT",
            Namespace::Dcdc => "DCDC",
            Namespace::Pm => "PM",
            Namespace::Db => "DB",
            Namespace::Fms => "FMS",
            Namespace::Srv => "SRV",
            Namespace::Ha => "HA",
            Namespace::Info => "INFO",
            Namespace::Ep => "EP",
            Namespace::Sys => "SYS",
            Namespace::Um => "UM",
            Namespace::Wb => "WB",
            Namespace::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a 4-byte wire code means.
pub trait ElementId: fmt::Debug + Send + Sync {
    /// Protocol area of this tag.
    fn namespace(&self) -> Namespace;

    /// Canonical code, e.g. `0x0380_0001`.
    fn code(&self) -> u32;

    /// Type the catalog declares for this tag.
    fn data_type(&self) -> DataType;

    /// Display name.
    fn name(&self) -> &str;

    /// Canonical code as bytes in hex order.
    fn code_bytes(&self) -> [u8; 4] {
        self.code().to_be_bytes()
    }

    /// Canonical code formatted as `0x03800001`.
    fn hex(&self) -> String {
        format!("0x{:08X}", self.code())
    }
}

/// A statically known catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagDef {
    pub namespace: Namespace,
    pub code: u32,
    pub data_type: DataType,
    pub name: &'static str,
}

impl TagDef {
    pub const fn new(
        namespace: Namespace,
        code: u32,
        data_type: DataType,
        name: &'static str,
    ) -> Self {
        Self {
            namespace,
            code,
            data_type,
            name,
        }
    }
}

impl ElementId for TagDef {
    fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn code(&self) -> u32 {
        self.code
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Identifier reconstructed from raw bytes that no catalog entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownTag {
    code: u32,
}

impl UnknownTag {
    pub const NAME: &'static str = "UNKNOWN";

    pub fn new(code: u32) -> Self {
        Self { code }
    }

    /// Builds from the canonical (hex-order) bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(u32::from_be_bytes(bytes))
    }
}

impl ElementId for UnknownTag {
    fn namespace(&self) -> Namespace {
        Namespace::from_code(self.code_bytes()[0])
    }

    fn code(&self) -> u32 {
        self.code
    }

    fn data_type(&self) -> DataType {
        DataType::Unknown
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Source of tag definitions.
pub trait TagCatalog: fmt::Debug + Send + Sync {
    /// Returns the known definition for `code`, if any.
    fn lookup(&self, code: u32) -> Option<Arc<dyn ElementId>>;

    /// Resolves `code`, synthesizing an [`UnknownTag`] on a miss.
    fn resolve(&self, code: u32) -> Arc<dyn ElementId> {
        match self.lookup(code) {
            Some(id) => id,
            None => {
                tracing::trace!("unknown tag 0x{:08X}", code);
                Arc::new(UnknownTag::new(code))
            }
        }
    }
}

/// In-memory catalog keyed by tag code.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    by_code: HashMap<u32, Arc<dyn ElementId>>,
}

impl StaticCatalog {
    /// Creates an empty catalog; every code resolves to [`UnknownTag`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a catalog from the given definitions.
    pub fn with_tags(defs: impl IntoIterator<Item = TagDef>) -> Self {
        let mut catalog = Self::empty();
        for def in defs {
            catalog.insert(def);
        }
        catalog
    }

    /// Shared catalog holding every definition in [`crate::tags::ALL`].
    pub fn builtin() -> Arc<StaticCatalog> {
        static BUILTIN: OnceLock<Arc<StaticCatalog>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Arc::new(Self::with_tags(crate::tags::ALL.iter().copied())))
            .clone()
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, def: TagDef) {
        self.by_code.insert(def.code, Arc::new(def));
    }

    /// Finds a definition by display name.
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn ElementId>> {
        self.by_code.values().find(|id| id.name() == name).cloned()
    }

    /// Iterates over all definitions in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ElementId>> {
        let mut ids: Vec<_> = self.by_code.values().collect();
        ids.sort_by_key(|id| id.code());
        ids.into_iter()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl TagCatalog for StaticCatalog {
    fn lookup(&self, code: u32) -> Option<Arc<dyn ElementId>> {
        self.by_code.get(&code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;
    use proptest::prelude::*;

    #[test]
    fn test_namespace_lookup() {
        assert_eq!(Namespace::from_code(0x03), Namespace::Bat);
        assert_eq!(Namespace::from_code(0x0E), Namespace::Wb);
        assert_eq!(Namespace::from_code(0x42), Namespace::Unknown);
        assert_eq!(Namespace::Info.to_string(), "INFO");
    }

    #[test]
    fn test_unknown_tag() {
        let tag = UnknownTag::from_bytes([0x05, 0x12, 0x34, 0x56]);
        assert_eq!(tag.code(), 0x0512_3456);
        assert_eq!(tag.namespace(), Namespace::Pm);
        assert_eq!(tag.data_type(), DataType::Unknown);
        assert_eq!(tag.name(), "UNKNOWN");
        assert_eq!(tag.hex(), "0x05123456");
    }

    #[test]
    fn test_unknown_tag_foreign_namespace() {
        let tag = UnknownTag::new(0xAB00_0001);
        assert_eq!(tag.namespace(), Namespace::Unknown);
    }

    #[test]
    fn test_builtin_resolves_known() {
        let catalog = StaticCatalog::builtin();
        let id = catalog.resolve(tags::BAT_RSOC.code);
        assert_eq!(id.name(), "BAT_RSOC");
        assert_eq!(id.data_type(), DataType::Float32);
        assert_eq!(id.namespace(), Namespace::Bat);
    }

    #[test]
    fn test_by_name() {
        let catalog = StaticCatalog::builtin();
        let id = catalog.by_name("INFO_SERIAL_NUMBER").unwrap();
        assert_eq!(id.code(), tags::INFO_SERIAL_NUMBER.code);
        assert!(catalog.by_name("NOT_A_TAG").is_none());
    }

    #[test]
    fn test_catalog_insert_and_iter() {
        let mut catalog = StaticCatalog::empty();
        assert!(catalog.is_empty());
        catalog.insert(TagDef::new(Namespace::Wb, 0x0E80_0002, DataType::UChar8, "B"));
        catalog.insert(TagDef::new(Namespace::Wb, 0x0E80_0001, DataType::UChar8, "A"));
        let names: Vec<_> = catalog.iter().map(|id| id.name().to_string()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(catalog.len(), 2);
    }

    proptest! {
        #[test]
        fn test_resolve_never_fails(code in any::<u32>()) {
            let id = StaticCatalog::empty().resolve(code);
            prop_assert_eq!(id.code(), code);
            prop_assert_eq!(id.data_type(), DataType::Unknown);
            prop_assert_eq!(id.namespace(), Namespace::from_code((code >> 24) as u8));
        }
    }
}
