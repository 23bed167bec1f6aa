// Licensed under the Apache-2.0 license

//! [`ObjectInfo`] backed by the cross toolchain's `objdump`.

use crate::error::{DigestError, Result};
use crate::object::{ObjectInfo, SectionInfo, SymbolInfo};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_OBJDUMP: &str = "xtensa-lx106-elf-objdump";

/// The `objdump` to run: `$OBJDUMP` if set, otherwise the xtensa toolchain binary on `PATH`.
pub fn objdump() -> String {
    std::env::var("OBJDUMP").unwrap_or_else(|_| DEFAULT_OBJDUMP.to_string())
}

pub struct Objdump {
    tool: String,
    object: PathBuf,
}

impl Objdump {
    pub fn new(tool: impl Into<String>, object: &Path) -> Self {
        Self {
            tool: tool.into(),
            object: object.to_path_buf(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.tool)
            .args(args)
            .arg(&self.object)
            .output()
            .map_err(|e| DigestError::ToolFailed {
                tool: self.tool.clone(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(DigestError::ToolFailed {
                tool: self.tool.clone(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ObjectInfo for Objdump {
    fn section(&self, name: &str) -> Result<SectionInfo> {
        let text = self.run(&["-j", name, "-h"])?;
        parse_section(&self.tool, &text, name)
    }

    fn symbol(&self, name: &str, section: &str) -> Result<SymbolInfo> {
        let text = self.run(&["-j", section, "-t"])?;
        parse_symbol(&self.tool, &text, name, section)
    }
}

fn hex_field(tool: &str, line: &str, field: &str) -> Result<u64> {
    u64::from_str_radix(field, 16).map_err(|_| DigestError::ToolOutput {
        tool: tool.into(),
        line: line.into(),
    })
}

/// Finds `name` in `objdump -h` output.
///
/// ```text
/// Idx Name          Size      VMA       LMA       File off  Algn
///   1 .data         00000570  3ffe8000  3ffe8000  000a5000  2**4
/// ```
pub fn parse_section(tool: &str, text: &str, name: &str) -> Result<SectionInfo> {
    for line in text.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.get(1) != Some(&name) || cols[0].parse::<u32>().is_err() {
            continue;
        }
        if cols.len() < 6 {
            return Err(DigestError::ToolOutput {
                tool: tool.into(),
                line: line.into(),
            });
        }
        return Ok(SectionInfo {
            name: name.into(),
            size: hex_field(tool, line, cols[2])?,
            address: hex_field(tool, line, cols[3])?,
            file_offset: hex_field(tool, line, cols[5])?,
        });
    }
    Err(DigestError::SectionNotFound(name.into()))
}

/// Finds `name` in `objdump -t` output.
///
/// The flag column has a variable number of blanks, so fields are taken from
/// both ends of the row:
///
/// ```text
/// 3ffe8134 g     O .data  00000068 fw_info
/// ```
pub fn parse_symbol(tool: &str, text: &str, name: &str, section: &str) -> Result<SymbolInfo> {
    for line in text.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        let n = cols.len();
        if n < 4 || cols[n - 1] != name || cols[n - 3] != section {
            continue;
        }
        return Ok(SymbolInfo {
            name: name.into(),
            section: section.into(),
            address: hex_field(tool, line, cols[0])?,
            size: hex_field(tool, line, cols[n - 2])?,
        });
    }
    Err(DigestError::SymbolNotFound {
        symbol: name.into(),
        section: section.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: &str = "
app.elf:     file format elf32-xtensa-le

Sections:
Idx Name          Size      VMA       LMA       File off  Algn
  1 .data         00000570  3ffe8000  3ffe8000  000a5000  2**4
                  CONTENTS, ALLOC, LOAD, DATA
  6 .irom0.text   0004c2b8  40210000  40210000  00059000  2**4
                  CONTENTS, ALLOC, LOAD, READONLY, CODE
";

    const SYMBOLS: &str = "
app.elf:     file format elf32-xtensa-le

SYMBOL TABLE:
3ffe8000 l    d  .data  00000000 .data
3ffe8100 l     O .data  00000004 fw_info_ptr
3ffe8134 g     O .data  00000068 fw_info
";

    #[test]
    fn test_parse_section() {
        let data = parse_section(DEFAULT_OBJDUMP, SECTIONS, ".data").unwrap();
        assert_eq!(
            data,
            SectionInfo {
                name: ".data".into(),
                address: 0x3ffe_8000,
                size: 0x570,
                file_offset: 0xa_5000,
            }
        );
        let code = parse_section(DEFAULT_OBJDUMP, SECTIONS, ".irom0.text").unwrap();
        assert_eq!(code.address, 0x4021_0000);
    }

    #[test]
    fn test_parse_section_missing() {
        assert!(matches!(
            parse_section(DEFAULT_OBJDUMP, SECTIONS, ".text"),
            Err(DigestError::SectionNotFound(_))
        ));
    }

    #[test]
    fn test_parse_section_bad_row() {
        let text = "  1 .data         0000zz70  3ffe8000  3ffe8000  000a5000  2**4";
        assert!(matches!(
            parse_section(DEFAULT_OBJDUMP, text, ".data"),
            Err(DigestError::ToolOutput { .. })
        ));
    }

    #[test]
    fn test_parse_symbol() {
        let sym = parse_symbol(DEFAULT_OBJDUMP, SYMBOLS, "fw_info", ".data").unwrap();
        assert_eq!(sym.address, 0x3ffe_8134);
        assert_eq!(sym.size, 0x68);
    }

    #[test]
    fn test_parse_symbol_exact_name() {
        // fw_info_ptr must not be taken for fw_info
        let text = "3ffe8100 l     O .data  00000004 fw_info_ptr\n";
        assert!(matches!(
            parse_symbol(DEFAULT_OBJDUMP, text, "fw_info", ".data"),
            Err(DigestError::SymbolNotFound { .. })
        ));
    }
}
