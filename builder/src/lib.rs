// Licensed under the Apache-2.0 license

//! Host-side tooling that embeds the `fw_info` digest into ESP8266 firmware.

pub mod bundle;
pub mod digest;
mod elf_object;
mod embed;
pub mod error;
pub mod image_gen;
pub mod locate;
pub mod objdump;
pub mod object;
pub mod patch;
pub mod report;
pub mod scan;

pub use bundle::bundle_info;
pub use digest::{DigestEngine, ImageDigest};
pub use elf_object::ElfObject;
pub use embed::{embed_digest, embed_digest_with, EmbedOptions, ImageGen, Introspect};
pub use error::DigestError;
pub use image_gen::{esptool, generate_image};
pub use locate::{MetadataLocator, ResolvedOffsets};
pub use objdump::{objdump, Objdump};
pub use object::{ObjectInfo, ObjectTables, SectionInfo, SymbolInfo};
pub use report::PatchRecord;
pub use scan::{ImageLocation, ImageScanner};
