// Licensed under the Apache-2.0 license

//! Layout of the `fw_info` block the firmware embeds in its `.data` section.
//!
//! ```text
//! 0        product[40]
//! 40       major u8, minor u8, patch u16, build_tag[8], build u32
//! 56       firmware-owned bytes (opaque here)
//! size-40  digest_pos u32, bin_size u32, digest[32]
//! ```
//!
//! All multi-byte fields are little-endian. Until the digest is embedded, the
//! word at `size - 36` holds [`DIGEST_UNSET`].

use thiserror::Error;
use zerocopy::byteorder::{LittleEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const PRODUCT_LEN: usize = 40;
pub const BUILD_TAG_LEN: usize = 8;
pub const DIGEST_SIZE: usize = 32;
pub const HEAD_SIZE: usize = core::mem::size_of::<FwInfoHead>();
pub const TRAILER_SIZE: usize = core::mem::size_of::<FwInfoTrailer>();
/// Smallest block that still holds both the head and the trailer.
pub const MIN_FW_INFO_SIZE: usize = HEAD_SIZE + TRAILER_SIZE;

/// Marker left in the last word before the digest by the firmware build.
pub const DIGEST_UNSET: [u8; 4] = [0xff; 4];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FwInfoError {
    #[error("fw_info block is {len} bytes, expected at least {MIN_FW_INFO_SIZE}")]
    Truncated { len: usize },
    #[error("fw_info already carries a digest (marker {marker:02x?})")]
    AlreadyDigested { marker: [u8; 4] },
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct FwInfoHead {
    pub product: [u8; PRODUCT_LEN],
    pub major: u8,
    pub minor: u8,
    pub patch: U16<LittleEndian>,
    pub build_tag: [u8; BUILD_TAG_LEN],
    pub build: U32<LittleEndian>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct FwInfoTrailer {
    pub digest_pos: U32<LittleEndian>,
    pub bin_size: U32<LittleEndian>,
    pub digest: [u8; DIGEST_SIZE],
}

impl FwInfoTrailer {
    pub fn new(digest_pos: u32, bin_size: u32, digest: [u8; DIGEST_SIZE]) -> Self {
        Self {
            digest_pos: digest_pos.into(),
            bin_size: bin_size.into(),
            digest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u16,
    /// NUL-padded, as stored.
    pub build_tag: [u8; BUILD_TAG_LEN],
    pub build: u32,
}

impl FirmwareVersion {
    pub fn build_tag(&self) -> String {
        trim_nul(&self.build_tag)
    }
}

impl core::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{}.{}{}({})",
            self.major,
            self.minor,
            self.patch,
            self.build_tag(),
            self.build
        )
    }
}

/// Decoded view of an `fw_info` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    /// NUL-padded, as stored.
    pub product: [u8; PRODUCT_LEN],
    pub version: FirmwareVersion,
    /// Bytes between the version fields and the trailer, kept verbatim.
    pub reserved: Vec<u8>,
    pub digest_pos: u32,
    pub bin_size: u32,
    pub digest: [u8; DIGEST_SIZE],
}

/// Drops trailing NULs; bytes that aren't UTF-8 come out as U+FFFD.
fn trim_nul(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Fails with [`FwInfoError::AlreadyDigested`] unless the block still holds the
/// [`DIGEST_UNSET`] marker right before the digest.
pub fn check_unset(block: &[u8]) -> Result<(), FwInfoError> {
    if block.len() < MIN_FW_INFO_SIZE {
        return Err(FwInfoError::Truncated { len: block.len() });
    }
    let end = block.len() - DIGEST_SIZE;
    let mut marker = [0u8; 4];
    marker.copy_from_slice(&block[end - 4..end]);
    if marker != DIGEST_UNSET {
        return Err(FwInfoError::AlreadyDigested { marker });
    }
    Ok(())
}

impl MetadataBlock {
    pub fn decode(bytes: &[u8]) -> Result<Self, FwInfoError> {
        if bytes.len() < MIN_FW_INFO_SIZE {
            return Err(FwInfoError::Truncated { len: bytes.len() });
        }
        let trailer_start = bytes.len() - TRAILER_SIZE;
        let head = FwInfoHead::read_from_bytes(&bytes[..HEAD_SIZE])
            .map_err(|_| FwInfoError::Truncated { len: bytes.len() })?;
        let trailer = FwInfoTrailer::read_from_bytes(&bytes[trailer_start..])
            .map_err(|_| FwInfoError::Truncated { len: bytes.len() })?;

        Ok(Self {
            product: head.product,
            version: FirmwareVersion {
                major: head.major,
                minor: head.minor,
                patch: head.patch.get(),
                build_tag: head.build_tag,
                build: head.build.get(),
            },
            reserved: bytes[HEAD_SIZE..trailer_start].to_vec(),
            digest_pos: trailer.digest_pos.get(),
            bin_size: trailer.bin_size.get(),
            digest: trailer.digest,
        })
    }

    /// Inverse of [`MetadataBlock::decode`], byte for byte.
    pub fn encode(&self) -> Vec<u8> {
        let head = FwInfoHead {
            product: self.product,
            major: self.version.major,
            minor: self.version.minor,
            patch: self.version.patch.into(),
            build_tag: self.version.build_tag,
            build: self.version.build.into(),
        };
        let trailer = FwInfoTrailer::new(self.digest_pos, self.bin_size, self.digest);

        let mut out = Vec::with_capacity(HEAD_SIZE + self.reserved.len() + TRAILER_SIZE);
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.reserved);
        out.extend_from_slice(trailer.as_bytes());
        out
    }

    pub fn size(&self) -> usize {
        HEAD_SIZE + self.reserved.len() + TRAILER_SIZE
    }

    pub fn product(&self) -> String {
        trim_nul(&self.product)
    }

    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// The block as it reads once the digest has been embedded.
    pub fn with_digest(&self, digest_pos: u32, bin_size: u32, digest: [u8; DIGEST_SIZE]) -> Self {
        Self {
            digest_pos,
            bin_size,
            digest,
            ..self.clone()
        }
    }
}
