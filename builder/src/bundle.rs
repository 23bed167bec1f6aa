// Licensed under the Apache-2.0 license

//! Collects per-image `*.info.json` records into one bundle info file.

use crate::error::{DigestError, Result};
use crate::report::to_pretty_json;
use log::info;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the JSON array of `inputs`, in order, to `output`.
pub fn bundle_info(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let mut records = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.is_file() {
            return Err(DigestError::FileNotFound(input.clone()));
        }
        let record: Value = serde_json::from_str(&fs::read_to_string(input)?)?;
        records.push(record);
    }

    info!("Writing bundle info file: {}", output.display());
    fs::write(output, to_pretty_json(&records)?)?;
    Ok(())
}
