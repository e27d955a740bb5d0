//! Grammar fuzz target: arbitrary text as a format string, then as a schema grammar.
//! Neither step may panic; malformed input must come back as MalformedGrammar.
//! Build with: cargo fuzz run grammar_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let parsed = structdecode::parse(s);
    let built = structdecode::Schema::builder("Fuzz").grammar(s).build();
    assert_eq!(parsed.is_ok(), built.is_ok());
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run grammar_fuzz");
}
