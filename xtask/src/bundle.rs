// Licensed under the Apache-2.0 license

use anyhow::{bail, Result};
use std::path::PathBuf;

pub(crate) fn bundle(files: &[PathBuf]) -> Result<()> {
    let Some((output, inputs)) = files.split_last() else {
        bail!("No output file given");
    };
    if inputs.is_empty() {
        bail!("No info files given");
    }
    fw_builder::bundle_info(inputs, output)?;
    Ok(())
}
