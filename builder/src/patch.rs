// Licensed under the Apache-2.0 license

use crate::error::{DigestError, Result};
use crate::locate::ResolvedOffsets;
use fw_info::{FwInfoError, FwInfoTrailer, TRAILER_SIZE};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zerocopy::IntoBytes;

/// Overwrites the `(digest_pos, bin_size, digest)` trailer of the ELF's copy of
/// `fw_info`. Exactly [`TRAILER_SIZE`] bytes change.
pub fn patch_fwinfo(
    elf: &mut [u8],
    offsets: &ResolvedOffsets,
    trailer: &FwInfoTrailer,
) -> Result<()> {
    if offsets.fwinfo_size < TRAILER_SIZE {
        return Err(FwInfoError::Truncated {
            len: offsets.fwinfo_size,
        }
        .into());
    }
    let elf_len = elf.len();
    let at = offsets.fwinfo_start + offsets.fwinfo_size - TRAILER_SIZE;
    let Some(window) = elf.get_mut(at..at + TRAILER_SIZE) else {
        return Err(DigestError::MalformedMetadata(FwInfoError::Truncated {
            len: elf_len.saturating_sub(offsets.fwinfo_start),
        }));
    };
    window.copy_from_slice(trailer.as_bytes());
    Ok(())
}

/// A file written next to its destination and not yet moved into place.
///
/// Dropping it without [`StagedFile::commit`] removes the temporary file and
/// leaves the destination untouched.
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn new(target: &Path, contents: &[u8]) -> Result<Self> {
        let dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(contents)?;
        temp.as_file().sync_all()?;
        if let Ok(meta) = fs::metadata(target) {
            temp.as_file().set_permissions(meta.permissions())?;
        }
        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    /// Renames the staged file over the destination.
    pub fn commit(self) -> Result<()> {
        self.temp.persist(&self.target).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn offsets() -> ResolvedOffsets {
        ResolvedOffsets {
            fwinfo_start: 0x20,
            fwinfo_size: 0x68,
            irom0_addr: 0,
        }
    }

    #[test]
    fn test_patch_touches_only_trailer() {
        let original = vec![0x77u8; 0x100];
        let mut elf = original.clone();
        let trailer = FwInfoTrailer::new(0x1234, 0x5678, [0xab; 32]);
        patch_fwinfo(&mut elf, &offsets(), &trailer).unwrap();

        let at = 0x20 + 0x68 - 40;
        assert_eq!(&elf[..at], &original[..at]);
        assert_eq!(&elf[at..at + 4], &0x1234u32.to_le_bytes());
        assert_eq!(&elf[at + 4..at + 8], &0x5678u32.to_le_bytes());
        assert_eq!(&elf[at + 8..at + 40], &[0xab; 32]);
        assert_eq!(&elf[at + 40..], &original[at + 40..]);
    }

    #[test]
    fn test_patch_out_of_bounds() {
        let mut elf = vec![0u8; 0x60];
        let trailer = FwInfoTrailer::new(0, 0, [0; 32]);
        assert!(matches!(
            patch_fwinfo(&mut elf, &offsets(), &trailer),
            Err(DigestError::MalformedMetadata(_))
        ));
        assert_eq!(elf, vec![0u8; 0x60]);
    }

    #[test]
    fn test_staged_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("app.elf");
        fs::write(&target, b"old").unwrap();

        let staged = StagedFile::new(&target, b"new contents").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"old");
        staged.commit().unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new contents");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_staged_file_dropped() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("app.elf");
        fs::write(&target, b"old").unwrap();

        drop(StagedFile::new(&target, b"new contents").unwrap());
        assert_eq!(fs::read(&target).unwrap(), b"old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
