// Licensed under the Apache-2.0 license

//! Regenerates the flashable binary from the patched ELF.

use crate::error::{DigestError, Result};
use fw_config::ImageGenProfile;
use log::info;
use std::path::Path;
use std::process::Command;

pub const DEFAULT_ESPTOOL: &str = "esptool.py";

/// The image generator to run: `$ESPTOOL` if set, otherwise `esptool.py` on `PATH`.
pub fn esptool() -> String {
    std::env::var("ESPTOOL").unwrap_or_else(|_| DEFAULT_ESPTOOL.to_string())
}

pub fn generate_image(
    tool: &str,
    profile: &ImageGenProfile,
    elf: &Path,
    bin: &Path,
) -> Result<()> {
    info!("Generating final bin: {}", bin.display());
    let args = profile.elf2image_args(&elf.to_string_lossy(), &bin.to_string_lossy());
    let status = Command::new(tool)
        .args(&args)
        .status()
        .map_err(|e| DigestError::ToolFailed {
            tool: tool.into(),
            reason: e.to_string(),
        })?;
    if !status.success() {
        return Err(DigestError::ImageGenFailed(format!(
            "{tool} {} exited with {status}",
            args.join(" ")
        )));
    }
    Ok(())
}
