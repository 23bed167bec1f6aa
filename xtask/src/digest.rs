// Licensed under the Apache-2.0 license

use crate::IntrospectKind;
use anyhow::{bail, Result};
use fw_builder::{embed_digest, EmbedOptions, ImageGen, Introspect};
use fw_config::{DigestConfig, ESP8266_DIGEST_CONFIG, ESP8266_IMAGE_PROFILE};
use std::path::Path;

pub(crate) struct DigestArgs<'a> {
    pub elf: &'a Path,
    pub bin: &'a Path,
    pub introspect: IntrospectKind,
    pub objdump: Option<String>,
    pub esptool: Option<String>,
    pub skip_image_gen: bool,
    pub sector_size: Option<u32>,
    pub irom_map_start: Option<u32>,
}

fn digest_config(args: &DigestArgs) -> Result<DigestConfig> {
    let mut config = ESP8266_DIGEST_CONFIG;
    if let Some(sector_size) = args.sector_size {
        if !sector_size.is_power_of_two() {
            bail!("Sector size must be a power of two: 0x{:x}", sector_size);
        }
        config.flash_sector_size = sector_size;
    }
    if let Some(start) = args.irom_map_start {
        if start >= config.irom_map_end {
            bail!(
                "IROM map start 0x{:08x} is past the end of the map 0x{:08x}",
                start,
                config.irom_map_end
            );
        }
        config.irom_map_start = start;
    }
    Ok(config)
}

pub(crate) fn embed(args: DigestArgs) -> Result<()> {
    let introspect = match args.introspect {
        IntrospectKind::Objdump => {
            Introspect::Objdump(args.objdump.clone().unwrap_or_else(fw_builder::objdump))
        }
        IntrospectKind::Elf => Introspect::Elf,
    };
    let image_gen = (!args.skip_image_gen).then(|| ImageGen {
        tool: args.esptool.clone().unwrap_or_else(fw_builder::esptool),
        profile: ESP8266_IMAGE_PROFILE,
    });
    let options = EmbedOptions {
        config: digest_config(&args)?,
        introspect,
        image_gen,
    };

    let record = embed_digest(args.elf, args.bin, &options)?;
    println!("{}", record.to_json()?);
    Ok(())
}
