// Licensed under the Apache-2.0 license

use crate::digest::ImageDigest;
use crate::error::Result;
use crate::locate::ResolvedOffsets;
use crate::scan::ImageLocation;
use fw_info::MetadataBlock;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// Build provenance for one digested image, written to `<elf>.info.json`.
/// Field order is the key order in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRecord {
    pub file_name: String,
    pub product: String,
    pub version: String,
    pub initial_digest: String,
    pub digest: String,
    pub digest_pos: usize,
    pub fw_addr: String,
    pub fw_info: String,
    pub fw_info_start: usize,
    pub fw_info_size: usize,
    pub bin_size: usize,
}

impl PatchRecord {
    /// `info` is the block as read from the ELF, before patching. `fw_info`
    /// is the re-encoded block with the new trailer, which is byte for byte
    /// what gets written into the ELF.
    pub fn new(
        file_name: &str,
        info: &MetadataBlock,
        offsets: &ResolvedOffsets,
        location: &ImageLocation,
        digest: &ImageDigest,
    ) -> Self {
        let patched = info.with_digest(
            location.digest_pos as u32,
            location.bin_size as u32,
            *digest,
        );
        Self {
            file_name: file_name.into(),
            product: info.product(),
            version: info.version_string(),
            initial_digest: hex::encode(info.digest),
            digest: hex::encode(digest),
            digest_pos: location.digest_pos,
            fw_addr: format!("0x{:06x}", offsets.irom0_addr),
            fw_info: hex::encode(patched.encode()),
            fw_info_start: location.fwinfo_pos,
            fw_info_size: location.fwinfo_size,
            bin_size: location.bin_size,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }
}

/// `<elf>.info.json`, next to the ELF.
pub fn report_path(elf: &Path) -> PathBuf {
    let mut name = elf.as_os_str().to_owned();
    name.push(".info.json");
    PathBuf::from(name)
}

/// JSON with 4-space indentation, the layout the firmware bundle tooling expects.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
