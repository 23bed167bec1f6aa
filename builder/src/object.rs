// Licensed under the Apache-2.0 license

//! Section and symbol lookups over a linked firmware object.
//!
//! The locator only needs a handful of rows from the section header and symbol
//! tables, so it goes through [`ObjectInfo`]. [`crate::Objdump`] asks the cross
//! toolchain, [`crate::ElfObject`] reads the ELF in process and
//! [`ObjectTables`] serves fixed rows (fixtures, tests).

use crate::error::{DigestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub name: String,
    /// Load (virtual) address.
    pub address: u64,
    pub size: u64,
    /// Byte offset of the section contents in the object file.
    pub file_offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: String,
    pub section: String,
    pub address: u64,
    pub size: u64,
}

pub trait ObjectInfo {
    /// Fails with [`DigestError::SectionNotFound`] when the object has no such section.
    fn section(&self, name: &str) -> Result<SectionInfo>;

    /// Fails with [`DigestError::SymbolNotFound`] when `section` has no symbol `name`.
    fn symbol(&self, name: &str, section: &str) -> Result<SymbolInfo>;
}

#[derive(Debug, Clone, Default)]
pub struct ObjectTables {
    pub sections: Vec<SectionInfo>,
    pub symbols: Vec<SymbolInfo>,
}

impl ObjectTables {
    pub fn new(sections: Vec<SectionInfo>, symbols: Vec<SymbolInfo>) -> Self {
        Self { sections, symbols }
    }

    pub fn with_section(mut self, name: &str, address: u64, size: u64, file_offset: u64) -> Self {
        self.sections.push(SectionInfo {
            name: name.into(),
            address,
            size,
            file_offset,
        });
        self
    }

    pub fn with_symbol(mut self, name: &str, section: &str, address: u64, size: u64) -> Self {
        self.symbols.push(SymbolInfo {
            name: name.into(),
            section: section.into(),
            address,
            size,
        });
        self
    }
}

impl ObjectInfo for ObjectTables {
    fn section(&self, name: &str) -> Result<SectionInfo> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| DigestError::SectionNotFound(name.into()))
    }

    fn symbol(&self, name: &str, section: &str) -> Result<SymbolInfo> {
        self.symbols
            .iter()
            .find(|s| s.name == name && s.section == section)
            .cloned()
            .ok_or_else(|| DigestError::SymbolNotFound {
                symbol: name.into(),
                section: section.into(),
            })
    }
}
