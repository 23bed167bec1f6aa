// Licensed under the Apache-2.0 license

//! Locate `fw_info`, hash the flashable binary, patch the ELF, write the report.

use crate::digest::DigestEngine;
use crate::elf_object::ElfObject;
use crate::error::{DigestError, Result};
use crate::image_gen::generate_image;
use crate::locate::MetadataLocator;
use crate::objdump::Objdump;
use crate::object::ObjectInfo;
use crate::patch::{patch_fwinfo, StagedFile};
use crate::report::{report_path, PatchRecord};
use crate::scan::ImageScanner;
use fw_config::{DigestConfig, ImageGenProfile};
use fw_info::{check_unset, FwInfoTrailer, MetadataBlock};
use log::info;
use std::fs;
use std::path::Path;

/// How section and symbol rows are read from the ELF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Introspect {
    /// Run the given `objdump` binary.
    Objdump(String),
    /// Parse the ELF in process.
    Elf,
}

#[derive(Debug, Clone)]
pub struct ImageGen {
    pub tool: String,
    pub profile: ImageGenProfile,
}

#[derive(Debug, Clone)]
pub struct EmbedOptions {
    pub config: DigestConfig,
    pub introspect: Introspect,
    /// Regenerate the binary from the patched ELF; `None` leaves that to the caller.
    pub image_gen: Option<ImageGen>,
}

fn check_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(DigestError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Embeds the digest of `bin` into `elf` and regenerates `bin` when asked to.
pub fn embed_digest(elf: &Path, bin: &Path, options: &EmbedOptions) -> Result<PatchRecord> {
    check_file_exists(elf)?;
    check_file_exists(bin)?;

    let record = match &options.introspect {
        Introspect::Objdump(tool) => {
            let object = Objdump::new(tool.as_str(), elf);
            embed_digest_with(&object, elf, bin, &options.config)?
        }
        Introspect::Elf => {
            let object = ElfObject::parse(&fs::read(elf)?)?;
            embed_digest_with(&object, elf, bin, &options.config)?
        }
    };

    if let Some(image_gen) = &options.image_gen {
        generate_image(&image_gen.tool, &image_gen.profile, elf, bin)?;
    }
    Ok(record)
}

/// Everything but image regeneration, with section and symbol rows from `object`.
///
/// On error neither the ELF nor the report file is written.
pub fn embed_digest_with(
    object: &impl ObjectInfo,
    elf: &Path,
    bin: &Path,
    config: &DigestConfig,
) -> Result<PatchRecord> {
    check_file_exists(elf)?;
    check_file_exists(bin)?;

    let mut elf_bytes = fs::read(elf)?;
    let offsets = MetadataLocator::new(config.clone()).resolve(object, elf_bytes.len())?;
    let fwinfo_end = offsets.fwinfo_start + offsets.fwinfo_size;
    let fwinfo = elf_bytes[offsets.fwinfo_start..fwinfo_end].to_vec();
    check_unset(&fwinfo)?;
    let info = MetadataBlock::decode(&fwinfo)?;

    let image = fs::read(bin)?;
    let location = ImageScanner::new(config).find(&image, &fwinfo)?;
    let digest = DigestEngine::new(config).compute(&image, location.digest_pos)?;
    info!("Signing digest: {}", hex::encode(digest));

    // Both fit in 32 bits, the digest engine has checked them.
    let trailer = FwInfoTrailer::new(
        location.digest_pos as u32,
        location.bin_size as u32,
        digest,
    );
    patch_fwinfo(&mut elf_bytes, &offsets, &trailer)?;

    let file_name = bin
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let record = PatchRecord::new(&file_name, &info, &offsets, &location, &digest);

    let staged_elf = StagedFile::new(elf, &elf_bytes)?;
    let staged_report = StagedFile::new(&report_path(elf), record.to_json()?.as_bytes())?;
    staged_elf.commit()?;
    staged_report.commit()?;

    Ok(record)
}
