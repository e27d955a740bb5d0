//! Decode and print the header of an ELF file.
//!
//! Usage:
//!   elf_header [OPTIONS] FILE [FILE ...]
//!
//! Options:
//!   --offset N, -o N   Decode the header at absolute offset N instead of 0
//!   --big, -b          Treat multi-byte fields as big-endian
//!
//! Set `RUST_LOG=structdecode=debug` (or `trace`) to see the decoder's diagnostics.

use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use structdecode::{ByteOrder, Decoder, EnumMapping, FieldSpec, Record, Schema, SchemaRef, Value};
use tracing_subscriber::EnvFilter;

fn elf_class() -> Arc<EnumMapping> {
    Arc::new(
        EnumMapping::new("ELF_CLASS", "ELFCLASSNONE")
            .variant("ELFCLASSNONE", 0)
            .variant("ELFCLASS32", 1)
            .variant("ELFCLASS64", 2),
    )
}

fn elf_data() -> Arc<EnumMapping> {
    Arc::new(
        EnumMapping::new("ELF_DATA", "ELFDATANONE")
            .variant("ELFDATANONE", 0)
            .variant("ELFDATA2LSB", 1)
            .variant("ELFDATA2MSB", 2),
    )
}

fn elf_version() -> Arc<EnumMapping> {
    Arc::new(
        EnumMapping::new("ELF_VERSION", "EV_NONE")
            .variant("EV_NONE", 0)
            .variant("EV_CURRENT", 1),
    )
}

fn elf_osabi() -> Arc<EnumMapping> {
    Arc::new(
        EnumMapping::new("ELF_OSABI", "ELFOSABI_NONE")
            .variant("ELFOSABI_NONE", 0)
            .variant("ELFOSABI_HPUX", 1)
            .variant("ELFOSABI_NETBSD", 2)
            .variant("ELFOSABI_LINUX", 3)
            .variant("ELFOSABI_SOLARIS", 6)
            .variant("ELFOSABI_AIX", 7)
            .variant("ELFOSABI_IRIX", 8)
            .variant("ELFOSABI_FREEBSD", 9)
            .variant("ELFOSABI_TRU64", 10)
            .variant("ELFOSABI_MODESTO", 11)
            .variant("ELFOSABI_OPENBSD", 12)
            .variant("ELFOSABI_ARM_AEABI", 64)
            .variant("ELFOSABI_ARM", 97)
            .variant("ELFOSABI_STANDALONE", 255),
    )
}

fn elf_type() -> Arc<EnumMapping> {
    Arc::new(
        EnumMapping::new("ELF_TYPE", "ET_NONE")
            .variant("ET_NONE", 0)
            .variant("ET_REL", 1)
            .variant("ET_EXEC", 2)
            .variant("ET_DYN", 3)
            .variant("ET_CORE", 4)
            .variant("ET_LOOS", 0xfe00)
            .variant("ET_HIOS", 0xfeff)
            .variant("ET_LOPROC", 0xff00)
            .variant("ET_HIPROC", 0xffff),
    )
}

// Common machines only; anything else prints as EM_NONE with its raw value.
fn elf_machine() -> Arc<EnumMapping> {
    Arc::new(
        EnumMapping::new("ELF_MACHINE", "EM_NONE")
            .variant("EM_NONE", 0)
            .variant("EM_SPARC", 2)
            .variant("EM_386", 3)
            .variant("EM_68K", 4)
            .variant("EM_MIPS", 8)
            .variant("EM_PARISC", 15)
            .variant("EM_PPC", 20)
            .variant("EM_PPC64", 21)
            .variant("EM_S390", 22)
            .variant("EM_ARM", 40)
            .variant("EM_SH", 42)
            .variant("EM_SPARCV9", 43)
            .variant("EM_IA_64", 50)
            .variant("EM_X86_64", 62)
            .variant("EM_AARCH64", 183)
            .variant("EM_RISCV", 243),
    )
}

fn build_schemas(order: ByteOrder) -> anyhow::Result<SchemaRef> {
    let version = elf_version();
    let ident = Schema::builder("ELF_IDENT")
        .field(FieldSpec::bytes("magic"))
        .field(FieldSpec::enumeration("class", &elf_class()))
        .field(FieldSpec::enumeration("data", &elf_data()))
        .field(FieldSpec::enumeration("version", &version))
        .field(FieldSpec::enumeration("osabi", &elf_osabi()))
        .field(FieldSpec::integer("abiversion"))
        .grammar("4s5B7x")
        .byte_order(order)
        .build()?;

    let header = Schema::builder("ELFHeader")
        .field(FieldSpec::nested("ident", &ident))
        .field(FieldSpec::enumeration("type", &elf_type()))
        .field(FieldSpec::enumeration("machine", &elf_machine()))
        .field(FieldSpec::enumeration("version", &version))
        .fields(
            [
                "entry", "phoff", "shoff", "flags", "ehsize", "phentsize", "phnum",
                "shentsize", "shnum", "shstrndx",
            ]
            .into_iter()
            .map(FieldSpec::integer),
        )
        .grammar("THHI3QI6H")
        .byte_order(order)
        .on_read(check_header)
        .build()?;
    Ok(header)
}

fn check_header(header: &Record) -> Result<(), String> {
    let ident = header
        .field("ident")
        .and_then(Value::as_record)
        .ok_or("missing ident")?;
    if ident.field("magic").and_then(Value::as_bytes) != Some(b"\x7fELF".as_slice()) {
        return Err("bad magic".to_string());
    }
    let version = ident.field("version").and_then(Value::as_enum);
    if version.map(|v| v.name.as_str()) != Some("EV_CURRENT") {
        return Err("unsupported ident version".to_string());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let order = if let Some(pos) = args.iter().position(|a| a == "--big" || a == "-b") {
        args.remove(pos);
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };
    let offset = if let Some(pos) = args.iter().position(|a| a == "--offset" || a == "-o") {
        args.remove(pos);
        if pos >= args.len() {
            anyhow::bail!("--offset needs a value");
        }
        let raw = args.remove(pos);
        Some(raw.parse::<u64>().with_context(|| format!("invalid offset: {}", raw))?)
    } else {
        None
    };
    if args.is_empty() {
        eprintln!("usage: elf_header [--offset N] [--big] FILE [FILE ...]");
        std::process::exit(2);
    }

    let header = build_schemas(order)?;
    let decoder = Decoder::new();
    let mut has_error = false;
    for path in &args {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                has_error = true;
                continue;
            }
        };
        let mut reader = BufReader::new(file);
        match decoder.decode(&header, &mut reader, offset) {
            Ok(record) => {
                println!("{}:", path);
                println!("{}", record);
            }
            Err(e) => {
                eprintln!("{}: {}", path, e);
                has_error = true;
            }
        }
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
