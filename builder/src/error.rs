// Licensed under the Apache-2.0 license

use fw_info::FwInfoError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while embedding the firmware digest. None of them are retried.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("File {0:?} not exists")]
    FileNotFound(PathBuf),
    #[error("symbol {symbol} not found in section {section}")]
    SymbolNotFound { symbol: String, section: String },
    #[error("section {0} not found")]
    SectionNotFound(String),
    #[error("malformed fw_info: {0}")]
    MalformedMetadata(FwInfoError),
    #[error("fw_info already has a digest (marker {marker:02x?})")]
    AlreadyDigested { marker: [u8; 4] },
    #[error("can't find the {fwinfo_size}-byte fw_info block in the {image_size}-byte image")]
    PatternNotFound {
        fwinfo_size: usize,
        image_size: usize,
    },
    #[error("symbol {symbol} (0x{address:08x}, {size} bytes) lies outside section {section}")]
    SymbolOutsideSection {
        symbol: String,
        section: String,
        address: u64,
        size: u64,
    },
    #[error("section {section} at 0x{address:08x} is outside the flash map 0x{start:08x}..0x{end:08x}")]
    AddressOutsideMap {
        section: String,
        address: u64,
        start: u32,
        end: u32,
    },
    #[error("{what} 0x{value:x} does not fit in 32 bits")]
    ImageTooLarge { what: &'static str, value: usize },
    #[error("digest position 0x{digest_pos:x} is outside the {len}-byte hashed region")]
    DigestOutOfRange { digest_pos: usize, len: usize },
    #[error("unexpected {tool} output: {line:?}")]
    ToolOutput { tool: String, line: String },
    #[error("failed to run {tool}: {reason}")]
    ToolFailed { tool: String, reason: String },
    #[error("image generation failed: {0}")]
    ImageGenFailed(String),
    #[error(transparent)]
    Elf(#[from] elf::ParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<FwInfoError> for DigestError {
    fn from(e: FwInfoError) -> Self {
        match e {
            FwInfoError::AlreadyDigested { marker } => DigestError::AlreadyDigested { marker },
            other => DigestError::MalformedMetadata(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
