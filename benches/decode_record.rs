//! Benchmark: decode a stream of records laid out back to back.
//! Fixed-width: a 64-byte ELF-style header with a nested ident record.
//! Variable: a length-prefixed string plus a back-referenced u16 array per record.
//! Grammar parsing is measured separately.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Cursor;
use structdecode::{parse, Decoder, FieldSpec, Schema, SchemaRef};

const RECORDS: usize = 1000;

fn elf_header_schema() -> SchemaRef {
    let ident = Schema::builder("ELF_IDENT")
        .field(FieldSpec::bytes("magic"))
        .fields(
            ["class", "data", "version", "osabi", "abiversion"]
                .into_iter()
                .map(FieldSpec::integer),
        )
        .grammar("4s5B7x")
        .build()
        .expect("ident schema");
    Schema::builder("ELFHeader")
        .field(FieldSpec::nested("ident", &ident))
        .fields(
            [
                "type", "machine", "version", "entry", "phoff", "shoff", "flags", "ehsize",
                "phentsize", "phnum", "shentsize", "shnum", "shstrndx",
            ]
            .into_iter()
            .map(FieldSpec::integer),
        )
        .grammar("THHI3QI6H")
        .build()
        .expect("header schema")
}

fn elf_header_bytes() -> Vec<u8> {
    let mut h = vec![0x7f, b'E', b'L', b'F', 2, 1, 1, 0, 0];
    h.resize(16, 0);
    h.extend_from_slice(&2u16.to_le_bytes());
    h.extend_from_slice(&62u16.to_le_bytes());
    h.extend_from_slice(&1u32.to_le_bytes());
    h.extend_from_slice(&0x401000u64.to_le_bytes());
    h.extend_from_slice(&64u64.to_le_bytes());
    h.extend_from_slice(&0x2000u64.to_le_bytes());
    h.extend_from_slice(&0u32.to_le_bytes());
    for v in [64u16, 56, 4, 64, 12, 11] {
        h.extend_from_slice(&v.to_le_bytes());
    }
    h
}

fn variable_schema() -> SchemaRef {
    Schema::builder("Entry")
        .field(FieldSpec::integer("name_len"))
        .field(FieldSpec::bytes("name"))
        .field(FieldSpec::integer("count"))
        .field(FieldSpec::integer("samples"))
        .grammar("B(0)sH(2)H")
        .build()
        .expect("entry schema")
}

fn variable_bytes(i: usize) -> Vec<u8> {
    let name = format!("entry-{}", i);
    let samples = (i % 16) as u16;
    let mut out = vec![name.len() as u8];
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(&samples.to_le_bytes());
    for s in 0..samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

/// Decode every record in `buf` back to back; returns the record count.
fn decode_stream(decoder: &Decoder, schema: &SchemaRef, buf: &[u8]) -> usize {
    let mut cursor = Cursor::new(buf);
    let mut offset = 0u64;
    let mut records = 0usize;
    while (offset as usize) < buf.len() {
        match decoder.decode(schema, &mut cursor, Some(offset)) {
            Ok(record) => {
                offset += record.length();
                records += 1;
            }
            Err(_) => break,
        }
    }
    records
}

fn bench_decode(c: &mut Criterion) {
    let decoder = Decoder::new();

    let header = elf_header_schema();
    let one = elf_header_bytes();
    let fixed: Vec<u8> = one.iter().copied().cycle().take(one.len() * RECORDS).collect();
    assert_eq!(decode_stream(&decoder, &header, &fixed), RECORDS);

    let entry = variable_schema();
    let variable: Vec<u8> = (0..RECORDS).flat_map(variable_bytes).collect();
    assert_eq!(decode_stream(&decoder, &entry, &variable), RECORDS);
    eprintln!(
        "decode_record: {} records, {} fixed bytes, {} variable bytes",
        RECORDS,
        fixed.len(),
        variable.len()
    );

    c.bench_function("decode_elf_header_stream", |b| {
        b.iter(|| black_box(decode_stream(&decoder, &header, black_box(&fixed))));
    });

    c.bench_function("decode_backref_stream", |b| {
        b.iter(|| black_box(decode_stream(&decoder, &entry, black_box(&variable))));
    });

    c.bench_function("parse_grammar", |b| {
        b.iter(|| black_box(parse(black_box("4s5B7xHHI3QI6HB(0)sH(2)H"))));
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
