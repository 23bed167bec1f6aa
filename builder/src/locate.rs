// Licensed under the Apache-2.0 license

use crate::error::{DigestError, Result};
use crate::object::ObjectInfo;
use fw_config::DigestConfig;
use fw_info::{FwInfoError, MIN_FW_INFO_SIZE};
use log::debug;

/// Where `fw_info` lives in the ELF file, and where the code starts in flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOffsets {
    /// Byte offset of the block in the ELF file (not in the flash binary).
    pub fwinfo_start: usize,
    pub fwinfo_size: usize,
    /// Flash-relative start of `.irom0.text`, aligned down to the erase sector.
    pub irom0_addr: u32,
}

pub struct MetadataLocator {
    config: DigestConfig,
}

impl MetadataLocator {
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    /// Re-bases the `fw_info` symbol address onto the ELF file offset of the
    /// data section and derives the flash address of the code section.
    pub fn resolve(
        &self,
        object: &impl ObjectInfo,
        object_size: usize,
    ) -> Result<ResolvedOffsets> {
        let cfg = &self.config;
        let data = object.section(cfg.data_section)?;
        let code = object.section(cfg.code_section)?;
        let symbol = object.symbol(cfg.fwinfo_symbol, cfg.data_section)?;
        if symbol.size < MIN_FW_INFO_SIZE as u64 {
            return Err(DigestError::MalformedMetadata(FwInfoError::Truncated {
                len: symbol.size as usize,
            }));
        }

        let outside = || DigestError::SymbolOutsideSection {
            symbol: symbol.name.clone(),
            section: data.name.clone(),
            address: symbol.address,
            size: symbol.size,
        };
        let fwinfo_start = symbol
            .address
            .checked_sub(data.address)
            .and_then(|rel| rel.checked_add(data.file_offset))
            .ok_or_else(outside)?;
        let fwinfo_end = fwinfo_start.checked_add(symbol.size).ok_or_else(outside)?;
        if fwinfo_start >= object_size as u64 || fwinfo_end > object_size as u64 {
            return Err(outside());
        }

        let map_start = u64::from(cfg.irom_map_start);
        let map_end = u64::from(cfg.irom_map_end);
        if code.address < map_start || code.address >= map_end {
            return Err(DigestError::AddressOutsideMap {
                section: code.name,
                address: code.address,
                start: cfg.irom_map_start,
                end: cfg.irom_map_end,
            });
        }
        // In range of a 32-bit map, so the difference fits.
        let irom0_addr = cfg.sector_align_down((code.address - map_start) as u32);

        let offsets = ResolvedOffsets {
            fwinfo_start: fwinfo_start as usize,
            fwinfo_size: symbol.size as usize,
            irom0_addr,
        };
        debug!(
            "fw_info at ELF offset 0x{:x} ({} bytes), irom0 at 0x{:06x}",
            offsets.fwinfo_start, offsets.fwinfo_size, offsets.irom0_addr
        );
        Ok(offsets)
    }
}
