// Licensed under the Apache-2.0 license

use crate::error::Result;
use crate::object::{ObjectInfo, ObjectTables, SectionInfo, SymbolInfo};
use elf::endian::AnyEndian;
use elf::ElfBytes;

/// [`ObjectInfo`] read straight from ELF bytes, for hosts without the cross toolchain.
pub struct ElfObject {
    tables: ObjectTables,
}

impl ElfObject {
    pub fn parse(elf_bytes: &[u8]) -> Result<Self> {
        let elf_file = ElfBytes::<AnyEndian>::minimal_parse(elf_bytes)?;

        let mut tables = ObjectTables::default();
        let (shdrs, shstrtab) = elf_file.section_headers_with_strtab()?;
        if let (Some(shdrs), Some(shstrtab)) = (shdrs, shstrtab) {
            for shdr in shdrs.iter() {
                tables.sections.push(SectionInfo {
                    name: shstrtab.get(shdr.sh_name as usize)?.to_string(),
                    address: shdr.sh_addr,
                    size: shdr.sh_size,
                    file_offset: shdr.sh_offset,
                });
            }
        }

        if let Some((symtab, strtab)) = elf_file.symbol_table()? {
            for sym in symtab.iter() {
                // SHN_UNDEF, SHN_ABS and friends have no section row
                let Some(section) = tables.sections.get(sym.st_shndx as usize) else {
                    continue;
                };
                let name = strtab.get(sym.st_name as usize)?;
                if name.is_empty() || section.name.is_empty() {
                    continue;
                }
                tables.symbols.push(SymbolInfo {
                    name: name.to_string(),
                    section: section.name.clone(),
                    address: sym.st_value,
                    size: sym.st_size,
                });
            }
        }

        Ok(Self { tables })
    }
}

impl ObjectInfo for ElfObject {
    fn section(&self, name: &str) -> Result<SectionInfo> {
        self.tables.section(name)
    }

    fn symbol(&self, name: &str, section: &str) -> Result<SymbolInfo> {
        self.tables.symbol(name, section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DigestError;

    const SHSTRTAB: &[u8] = b"\0.data\0.irom0.text\0.symtab\0.strtab\0.shstrtab\0";
    const STRTAB: &[u8] = b"\0fw_info\0abs_sym\0";

    fn push32(out: &mut Vec<u8>, values: &[u32]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Little-endian ELF32 with .data, .irom0.text and a symbol table holding
    /// `fw_info` plus one absolute symbol.
    fn tiny_elf() -> Vec<u8> {
        const DATA_OFF: u32 = 0x40;
        const CODE_OFF: u32 = 0xc0;
        const SYMTAB_OFF: u32 = 0xe0;
        const STRTAB_OFF: u32 = 0x110;
        const SHSTRTAB_OFF: u32 = 0x128;
        const SHDR_OFF: u32 = 0x158;

        let mut elf = vec![0x7f, b'E', b'L', b'F', 1, 1, 1, 0];
        elf.resize(16, 0);
        elf.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
        elf.extend_from_slice(&94u16.to_le_bytes()); // EM_XTENSA
        push32(&mut elf, &[1, 0x4021_0000, 0, SHDR_OFF, 0]);
        for half in [52u16, 32, 0, 40, 6, 5] {
            elf.extend_from_slice(&half.to_le_bytes());
        }

        elf.resize(DATA_OFF as usize, 0);
        elf.resize(CODE_OFF as usize, 0xdd);
        elf.resize(SYMTAB_OFF as usize, 0xcc);

        elf.extend_from_slice(&[0u8; 16]);
        push32(&mut elf, &[1, 0x3ffe_8010, 0x68]);
        elf.extend_from_slice(&[0x11, 0]);
        elf.extend_from_slice(&1u16.to_le_bytes());
        push32(&mut elf, &[9, 0x1234, 0]);
        elf.extend_from_slice(&[0x10, 0]);
        elf.extend_from_slice(&0xfff1u16.to_le_bytes());

        elf.extend_from_slice(STRTAB);
        elf.resize(SHSTRTAB_OFF as usize, 0);
        elf.extend_from_slice(SHSTRTAB);
        elf.resize(SHDR_OFF as usize, 0);

        // name, type, flags, addr, offset, size, link, info, addralign, entsize
        push32(&mut elf, &[0; 10]);
        push32(&mut elf, &[1, 1, 3, 0x3ffe_8000, DATA_OFF, 0x80, 0, 0, 4, 0]);
        push32(&mut elf, &[7, 1, 6, 0x4021_0000, CODE_OFF, 0x20, 0, 0, 4, 0]);
        push32(&mut elf, &[19, 2, 0, 0, SYMTAB_OFF, 48, 4, 1, 4, 16]);
        push32(&mut elf, &[27, 3, 0, 0, STRTAB_OFF, STRTAB.len() as u32, 0, 0, 1, 0]);
        push32(&mut elf, &[35, 3, 0, 0, SHSTRTAB_OFF, SHSTRTAB.len() as u32, 0, 0, 1, 0]);
        elf
    }

    #[test]
    fn test_sections_and_symbols() {
        let object = ElfObject::parse(&tiny_elf()).unwrap();

        let data = object.section(".data").unwrap();
        assert_eq!(data.address, 0x3ffe_8000);
        assert_eq!(data.file_offset, 0x40);
        assert_eq!(data.size, 0x80);
        assert_eq!(object.section(".irom0.text").unwrap().address, 0x4021_0000);

        let fw_info = object.symbol("fw_info", ".data").unwrap();
        assert_eq!(fw_info.address, 0x3ffe_8010);
        assert_eq!(fw_info.size, 0x68);

        assert!(matches!(
            object.symbol("abs_sym", ".data"),
            Err(DigestError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn test_rejects_non_elf() {
        assert!(matches!(
            ElfObject::parse(b"definitely not an elf file"),
            Err(DigestError::Elf(_))
        ));
    }
}
