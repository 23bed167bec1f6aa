// Licensed under the Apache-2.0 license

use crate::error::{DigestError, Result};
use fw_config::DigestConfig;
use fw_info::{FwInfoError, DIGEST_SIZE, MIN_FW_INFO_SIZE};
use log::warn;

/// Where `fw_info` sits inside the flashable binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLocation {
    /// Offset of the block in the binary (not in the ELF).
    pub fwinfo_pos: usize,
    pub fwinfo_size: usize,
    /// Offset of the 32-byte digest in the binary.
    pub digest_pos: usize,
    /// Total binary size, checksum footer included.
    pub bin_size: usize,
}

pub struct ImageScanner {
    checksum_size: usize,
}

impl ImageScanner {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            checksum_size: config.checksum_size,
        }
    }

    /// Finds the pre-patch `fw_info` bytes in `image`, ignoring the checksum
    /// footer. The first match wins.
    pub fn find(&self, image: &[u8], fwinfo: &[u8]) -> Result<ImageLocation> {
        if fwinfo.len() < MIN_FW_INFO_SIZE {
            return Err(FwInfoError::Truncated { len: fwinfo.len() }.into());
        }
        let data = &image[..image.len().saturating_sub(self.checksum_size)];
        let not_found = || DigestError::PatternNotFound {
            fwinfo_size: fwinfo.len(),
            image_size: image.len(),
        };
        if data.len() < fwinfo.len() {
            return Err(not_found());
        }

        // Single pass; stops at the second hit.
        let mut hits = data
            .windows(fwinfo.len())
            .enumerate()
            .filter(|(_, w)| *w == fwinfo)
            .map(|(pos, _)| pos);
        let fwinfo_pos = hits.next().ok_or_else(not_found)?;
        if let Some(next) = hits.next() {
            warn!(
                "fw_info appears more than once in the image (0x{fwinfo_pos:x}, 0x{next:x}), using the first"
            );
        }

        Ok(ImageLocation {
            fwinfo_pos,
            fwinfo_size: fwinfo.len(),
            digest_pos: fwinfo_pos + fwinfo.len() - DIGEST_SIZE,
            bin_size: image.len(),
        })
    }
}
