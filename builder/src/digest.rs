// Licensed under the Apache-2.0 license

//! The digest the bootloader checks before jumping into a firmware image.
//!
//! SHA-256 over the flashable binary without its checksum footer, with the
//! 8 bytes in front of the digest replaced by the final
//! `(digest_pos, bin_size)` pair:
//!
//! ```text
//! data[..digest_pos - 8] || le32(digest_pos) || le32(bin_size) || data[digest_pos..]
//! ```
//!
//! The tail still carries the placeholder digest bytes; the bootloader swaps
//! the stored digest back to that placeholder while re-hashing flash.

use crate::error::{DigestError, Result};
use fw_config::DigestConfig;
use fw_info::DIGEST_SIZE;
use sha2::{Digest, Sha256};

const POS_SIZE_LEN: usize = 8;

pub type ImageDigest = [u8; DIGEST_SIZE];

pub struct DigestEngine {
    checksum_size: usize,
}

impl DigestEngine {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            checksum_size: config.checksum_size,
        }
    }

    /// Hashes `image` (the whole binary, footer included) for a digest
    /// stored at `digest_pos`.
    pub fn compute(&self, image: &[u8], digest_pos: usize) -> Result<ImageDigest> {
        let bin_size = image.len();
        let data = &image[..bin_size.saturating_sub(self.checksum_size)];
        if digest_pos < POS_SIZE_LEN || digest_pos > data.len() {
            return Err(DigestError::DigestOutOfRange {
                digest_pos,
                len: data.len(),
            });
        }
        let pos = u32::try_from(digest_pos).map_err(|_| DigestError::ImageTooLarge {
            what: "digest position",
            value: digest_pos,
        })?;
        let size = u32::try_from(bin_size).map_err(|_| DigestError::ImageTooLarge {
            what: "binary size",
            value: bin_size,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&data[..digest_pos - POS_SIZE_LEN]);
        hasher.update(pos.to_le_bytes());
        hasher.update(size.to_le_bytes());
        hasher.update(&data[digest_pos..]);
        Ok(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_config::ESP8266_DIGEST_CONFIG;

    fn engine() -> DigestEngine {
        DigestEngine::new(&ESP8266_DIGEST_CONFIG)
    }

    fn image() -> Vec<u8> {
        let mut image: Vec<u8> = (0..=255u8).cycle().take(0x300).collect();
        image[0x1f8..0x200].fill(0xff);
        image[0x200..0x220].fill(0x00);
        image
    }

    #[test]
    fn test_segments() {
        let image = image();
        let mut flat = image[..0x1f8].to_vec();
        flat.extend_from_slice(&0x200u32.to_le_bytes());
        flat.extend_from_slice(&0x300u32.to_le_bytes());
        flat.extend_from_slice(&image[0x200..0x2ff]);
        let expected: ImageDigest = Sha256::digest(&flat).into();

        assert_eq!(engine().compute(&image, 0x200).unwrap(), expected);
    }

    #[test]
    fn test_deterministic() {
        let image = image();
        assert_eq!(
            engine().compute(&image, 0x200).unwrap(),
            engine().compute(&image, 0x200).unwrap()
        );
    }

    #[test]
    fn test_pair_is_not_read_from_image() {
        // Whatever sits in front of the digest is replaced by the final pair.
        let image = image();
        let mut other = image.clone();
        other[0x1f8..0x200].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            engine().compute(&image, 0x200).unwrap(),
            engine().compute(&other, 0x200).unwrap()
        );
    }

    #[test]
    fn test_footer_excluded() {
        let image = image();
        let mut other = image.clone();
        *other.last_mut().unwrap() ^= 0xff;
        assert_eq!(
            engine().compute(&image, 0x200).unwrap(),
            engine().compute(&other, 0x200).unwrap()
        );

        other[0x2fe] ^= 0xff;
        assert_ne!(
            engine().compute(&image, 0x200).unwrap(),
            engine().compute(&other, 0x200).unwrap()
        );
    }

    #[test]
    fn test_out_of_range() {
        let image = image();
        assert!(matches!(
            engine().compute(&image, 4),
            Err(DigestError::DigestOutOfRange { .. })
        ));
        assert!(matches!(
            engine().compute(&image, 0x300),
            Err(DigestError::DigestOutOfRange { .. })
        ));
    }
}
