// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use clap_num::maybe_hex;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod bundle;
mod digest;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Xtask {
    /// Log resolved offsets and other details
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum IntrospectKind {
    /// Run objdump on the ELF
    Objdump,
    /// Parse the ELF directly
    Elf,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the image digest into the fw_info block of an ELF and regenerate the binary
    Digest {
        /// Linked firmware ELF, patched in place
        elf: PathBuf,

        /// Flashable binary generated from the ELF
        bin: PathBuf,

        /// Where section and symbol tables come from
        #[arg(long, value_enum, default_value_t = IntrospectKind::Objdump)]
        introspect: IntrospectKind,

        /// objdump binary. Default: $OBJDUMP, then xtensa-lx106-elf-objdump
        #[arg(long)]
        objdump: Option<String>,

        /// Image generator. Default: $ESPTOOL, then esptool.py
        #[arg(long)]
        esptool: Option<String>,

        /// Don't regenerate the binary after patching the ELF
        #[arg(long, default_value_t = false)]
        skip_image_gen: bool,

        /// Flash erase sector size
        #[arg(long, value_parser=maybe_hex::<u32>)]
        sector_size: Option<u32>,

        /// CPU address where flash is mapped for code execution
        #[arg(long, value_parser=maybe_hex::<u32>)]
        irom_map_start: Option<u32>,
    },
    /// Merge several <elf>.info.json files into one bundle file
    BundleInfo {
        /// Input info files followed by the output file
        #[arg(required = true, num_args = 2.., value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Xtask::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = SimpleLogger::new().with_level(level).init();

    let result = match &cli.xtask {
        Commands::Digest {
            elf,
            bin,
            introspect,
            objdump,
            esptool,
            skip_image_gen,
            sector_size,
            irom_map_start,
        } => digest::embed(digest::DigestArgs {
            elf,
            bin,
            introspect: *introspect,
            objdump: objdump.clone(),
            esptool: esptool.clone(),
            skip_image_gen: *skip_image_gen,
            sector_size: *sector_size,
            irom_map_start: *irom_map_start,
        }),
        Commands::BundleInfo { files } => bundle::bundle(files),
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
}
