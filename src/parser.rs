//! Parse a format grammar string into [`FormatItem`]s using PEST.

use crate::ast::*;
use crate::error::{DecodeError, Result};
use pest::error::InputLocation;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "format.pest"]
struct FormatParser;

/// Parse a format grammar into items, in order.
///
/// Back-reference indices are validated syntactically here; whether they point at a
/// decoded integer is only known during a decode pass (see [`crate::lexer::Lexer`]).
pub fn parse(source: &str) -> Result<Vec<FormatItem>> {
    check_backrefs(source)?;
    let pairs = FormatParser::parse(Rule::format, source).map_err(|e| {
        let position = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((start, _)) => start,
        };
        DecodeError::grammar(position, e.variant.message().into_owned())
    })?;
    let format = pairs
        .into_iter()
        .next()
        .ok_or_else(|| DecodeError::grammar(0, "empty parse"))?;

    let mut items = Vec::new();
    for item in format.into_inner() {
        if item.as_rule() != Rule::item {
            continue;
        }
        items.push(build_item(item)?);
    }
    Ok(items)
}

fn build_item(pair: pest::iterators::Pair<Rule>) -> Result<FormatItem> {
    let position = pair.as_span().start();
    let mut count = Count::Implicit;
    let mut symbol = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::literal => {
                let n = inner
                    .as_str()
                    .parse::<u64>()
                    .map_err(|_| DecodeError::grammar(position, "repeat count out of range"))?;
                count = Count::Literal(n);
            }
            Rule::backref => {
                let index = inner
                    .into_inner()
                    .next()
                    .ok_or_else(|| DecodeError::grammar(position, "back-reference: missing index"))?;
                let i = index
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| DecodeError::grammar(position, "back-reference index out of range"))?;
                count = Count::BackRef(i);
            }
            Rule::code => symbol = inner.as_str().chars().next(),
            _ => {}
        }
    }
    let symbol = symbol.ok_or_else(|| DecodeError::grammar(position, "missing format code"))?;
    let code = FormatCode::from_char(symbol)
        .ok_or_else(|| DecodeError::grammar(position, format!("unknown format code '{}'", symbol)))?;
    if code == FormatCode::Pad && matches!(count, Count::BackRef(_)) {
        return Err(DecodeError::grammar(
            position,
            "pad bytes need a literal count, not a back-reference",
        ));
    }
    Ok(FormatItem {
        count,
        code,
        symbol,
        position,
    })
}

/// Reject the back-reference mistakes PEST would only report as "expected ...".
fn check_backrefs(source: &str) -> Result<()> {
    if source.starts_with('(') {
        return Err(DecodeError::grammar(
            0,
            "a back-reference cannot be the first field; the grammar must start with a format code",
        ));
    }
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'(' {
            i += 1;
            continue;
        }
        let open = i;
        let close = match source[open + 1..].find(')') {
            Some(off) => open + 1 + off,
            None => return Err(DecodeError::grammar(open, "unterminated back-reference")),
        };
        let digits = &source[open + 1..close];
        if digits.is_empty() {
            return Err(DecodeError::grammar(
                open,
                "an index number was expected within the parentheses",
            ));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecodeError::grammar(
                open,
                format!("back-reference index '{}' is not a decimal number", digits),
            ));
        }
        i = close + 1;
    }
    Ok(())
}
