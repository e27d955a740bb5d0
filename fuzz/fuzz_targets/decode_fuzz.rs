//! Decode fuzz target: the first input byte selects a grammar, the rest is the stream.
//! Decoding must not panic or allocate unboundedly; it returns Ok(Record) or Err(DecodeError).
//! Grammar text itself is covered by grammar_fuzz.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
const GRAMMARS: &[&str] = &[
    "B(0)s",
    "I(0)H",
    "U(0)B",
    "S(0)s",
    "4s5B7xHHI3QI6H",
    "BB(1)sV",
    "B(0)T",
];

#[cfg(fuzzing)]
fn schema_for(grammar: &str) -> Option<structdecode::SchemaRef> {
    use structdecode::{FieldSpec, Schema};
    let point = Schema::builder("Point")
        .fields([FieldSpec::integer("x"), FieldSpec::integer("y")])
        .grammar("bb")
        .build()
        .ok()?;
    let items = structdecode::parse(grammar).ok()?;
    let mut fields = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let produces = match (item.code, item.count) {
            (structdecode::FormatCode::Pad, _) => 0,
            (structdecode::FormatCode::Bytes, _) => 1,
            (_, structdecode::Count::Literal(n)) => n as usize,
            _ => 1,
        };
        for j in 0..produces {
            let name = format!("f{}_{}", i, j);
            if item.code == structdecode::FormatCode::Nested {
                fields.push(FieldSpec::nested(name, &point));
            } else {
                fields.push(FieldSpec::integer(name));
            }
        }
    }
    Schema::builder("Fuzz").fields(fields).grammar(grammar).build().ok()
}

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let (selector, stream) = match data.split_first() {
        Some(x) => x,
        None => return,
    };
    let grammar = GRAMMARS[*selector as usize % GRAMMARS.len()];
    if let Some(schema) = schema_for(grammar) {
        let _ = structdecode::Decoder::new().decode_slice(&schema, stream);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
