//! Format grammar tests: syntax (parse success/failure) and back-reference semantics
//! checked during a decode pass.

use structdecode::{
    parse, Count, DecodeError, Decoder, FieldSpec, FormatCode, Schema, SchemaRef,
};

fn malformed_at(source: &str) -> usize {
    match parse(source) {
        Err(DecodeError::MalformedGrammar { position, .. }) => position,
        Err(other) => panic!("{source:?}: expected MalformedGrammar, got {other}"),
        Ok(items) => panic!("{source:?}: expected an error, parsed {} items", items.len()),
    }
}

fn schema(fields: &[&str], grammar: &str) -> SchemaRef {
    Schema::builder("S")
        .fields(fields.iter().map(|n| FieldSpec::integer(*n)))
        .grammar(grammar)
        .build()
        .expect("build schema")
}

// ==================== Syntax: valid grammars ====================

#[test]
fn parse_empty_grammar() {
    let items = parse("").expect("empty grammar can parse");
    assert!(items.is_empty());
}

#[test]
fn parse_every_code() {
    let items = parse("xcbB?hHiIlLqQfdsUVST").expect("parse");
    let codes: Vec<FormatCode> = items.iter().map(|i| i.code).collect();
    assert_eq!(
        codes,
        vec![
            FormatCode::Pad,
            FormatCode::Char,
            FormatCode::I8,
            FormatCode::U8,
            FormatCode::Bool,
            FormatCode::I16,
            FormatCode::U16,
            FormatCode::I32,
            FormatCode::U32,
            FormatCode::I32,
            FormatCode::U32,
            FormatCode::I64,
            FormatCode::U64,
            FormatCode::F32,
            FormatCode::F64,
            FormatCode::Bytes,
            FormatCode::ULeb128,
            FormatCode::ULeb128P1,
            FormatCode::SLeb128,
            FormatCode::Nested,
        ]
    );
    assert!(items.iter().all(|i| i.count == Count::Implicit));
}

#[test]
fn parse_counts_and_positions() {
    let items = parse("4s12B(1)H").expect("parse");
    assert_eq!(items.len(), 3);
    assert_eq!((items[0].count, items[0].position), (Count::Literal(4), 0));
    assert_eq!((items[1].count, items[1].position), (Count::Literal(12), 2));
    assert_eq!((items[2].count, items[2].position), (Count::BackRef(1), 5));
    assert_eq!(items[2].symbol, 'H');
}

#[test]
fn parse_elf_ident_layout() {
    let items = parse("4s5B7x").expect("parse");
    assert_eq!(items[2].code, FormatCode::Pad);
    assert_eq!(items[2].count, Count::Literal(7));
}

#[test]
fn code_widths() {
    assert_eq!(FormatCode::U16.width(), Some(2));
    assert_eq!(FormatCode::F64.width(), Some(8));
    assert_eq!(FormatCode::Bytes.width(), None);
    assert_eq!(FormatCode::Nested.width(), None);
    assert!(FormatCode::SLeb128.is_varint());
    assert!(!FormatCode::U64.is_varint());
}

// ==================== Syntax: invalid grammars ====================

#[test]
fn leading_backref_rejected() {
    assert_eq!(malformed_at("(0)B"), 0);
}

#[test]
fn empty_backref_index_rejected() {
    assert_eq!(malformed_at("B()H"), 1);
    let err = parse("B()H").unwrap_err();
    assert!(err.to_string().contains("index number was expected"), "{err}");
}

#[test]
fn non_numeric_backref_index_rejected() {
    assert_eq!(malformed_at("B(a)H"), 1);
}

#[test]
fn unterminated_backref_rejected() {
    assert_eq!(malformed_at("B(1H"), 1);
}

#[test]
fn backref_without_code_rejected() {
    malformed_at("B(0)");
    malformed_at("B(0)(1)H");
}

#[test]
fn dangling_count_rejected() {
    malformed_at("3");
    malformed_at("B12");
}

#[test]
fn unknown_code_rejected() {
    assert_eq!(malformed_at("BZ"), 1);
}

#[test]
fn whitespace_rejected() {
    malformed_at("B H");
}

#[test]
fn backref_padding_rejected() {
    let err = parse("B(0)x").unwrap_err();
    assert!(matches!(err, DecodeError::MalformedGrammar { position: 1, .. }), "{err}");
}

#[test]
fn schema_build_surfaces_grammar_errors() {
    let err = Schema::builder("Bad")
        .field(FieldSpec::integer("a"))
        .grammar("B(")
        .build()
        .unwrap_err();
    assert!(matches!(err, DecodeError::MalformedGrammar { .. }), "{err}");
}

// ==================== Semantics: back-references during decode ====================

#[test]
fn backref_out_of_range_at_decode() {
    let s = schema(&["a", "b"], "B(5)H");
    let err = Decoder::new().decode_slice(&s, &[1, 0, 0]).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedGrammar { position: 1, .. }), "{err}");
}

#[test]
fn backref_to_float_rejected() {
    let s = schema(&["a", "b"], "f(0)B");
    let err = Decoder::new()
        .decode_slice(&s, &[0, 0, 0x80, 0x3f, 1])
        .unwrap_err();
    assert!(matches!(err, DecodeError::MalformedGrammar { .. }), "{err}");
}

#[test]
fn backref_to_byte_string_rejected() {
    let s = schema(&["a", "b"], "2s(0)B");
    let err = Decoder::new().decode_slice(&s, &[1, 1, 1]).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedGrammar { .. }), "{err}");
}

#[test]
fn backref_to_empty_field_rejected() {
    let s = schema(&["n", "empty", "b"], "B(0)B(1)H");
    let err = Decoder::new().decode_slice(&s, &[0, 0, 0]).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedGrammar { .. }), "{err}");
}

#[test]
fn backref_to_negative_rejected() {
    let s = schema(&["n", "b"], "b(0)B");
    let err = Decoder::new().decode_slice(&s, &[0xff, 0]).unwrap_err();
    assert!(err.to_string().contains("negative"), "{err}");
}

#[test]
fn backref_to_earlier_array_element_counts_values() {
    // `3B` yields three values; `(2)` points at the third.
    let s = schema(&["a", "b", "c", "d"], "3B(2)B");
    let rec = Decoder::new().decode_slice(&s, &[9, 9, 2, 5, 6]).unwrap();
    assert_eq!(rec.length(), 5);
    assert_eq!(
        rec.field("d").and_then(|v| v.as_list()).map(|l| l.len()),
        Some(2)
    );
}
