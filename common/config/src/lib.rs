// Licensed under the Apache-2.0 license

//! Build-time constants describing the ESP8266 flash layout and the image
//! generator profile used when embedding the firmware digest.

/// Flash and memory map values used to resolve `fw_info` and the code base address.
/// These are the defaults that can be overridden from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestConfig {
    /// Minimum erase unit of the flash device.
    pub flash_sector_size: u32,
    /// Address at which the IROM (flash) region is mapped into the CPU address space.
    pub irom_map_start: u32,
    pub irom_map_end: u32,
    /// Length of the checksum footer appended by the image generator.
    pub checksum_size: usize,
    pub fwinfo_symbol: &'static str,
    pub data_section: &'static str,
    pub code_section: &'static str,
}

pub const ESP8266_DIGEST_CONFIG: DigestConfig = DigestConfig {
    flash_sector_size: 0x1000,
    irom_map_start: 0x4020_0000,
    irom_map_end: 0x4030_0000,
    checksum_size: 1,
    fwinfo_symbol: "fw_info",
    data_section: ".data",
    code_section: ".irom0.text",
};

impl Default for DigestConfig {
    fn default() -> Self {
        ESP8266_DIGEST_CONFIG
    }
}

impl DigestConfig {
    /// Rounds a flash-relative address down to the start of its erase sector.
    pub fn sector_align_down(&self, addr: u32) -> u32 {
        addr & !(self.flash_sector_size - 1)
    }
}

/// Parameters handed to `esptool.py elf2image`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageGenProfile {
    pub image_version: u8,
    pub flash_freq: &'static str,
    pub flash_mode: &'static str,
    pub flash_size: &'static str,
}

pub const ESP8266_IMAGE_PROFILE: ImageGenProfile = ImageGenProfile {
    image_version: 2,
    flash_freq: "80m",
    flash_mode: "dio",
    flash_size: "32m",
};

impl Default for ImageGenProfile {
    fn default() -> Self {
        ESP8266_IMAGE_PROFILE
    }
}

impl ImageGenProfile {
    /// Arguments for `esptool.py` that convert `elf` into the flashable `bin`.
    pub fn elf2image_args(&self, elf: &str, bin: &str) -> Vec<String> {
        vec![
            "elf2image".into(),
            format!("--version={}", self.image_version),
            "--flash_freq".into(),
            self.flash_freq.into(),
            "--flash_mode".into(),
            self.flash_mode.into(),
            "--flash_size".into(),
            self.flash_size.into(),
            "-o".into(),
            bin.into(),
            elf.into(),
        ]
    }
}
