//! Text rendering of decoded values and record metadata.

use crate::value::Value;

/// Format a scalar without any interpretation.
pub fn format_scalar_raw(v: &Value) -> String {
    match v {
        Value::U8(x) => format!("{}", x),
        Value::U16(x) => format!("{}", x),
        Value::U32(x) => format!("{}", x),
        Value::U64(x) => format!("{}", x),
        Value::I8(x) => format!("{}", x),
        Value::I16(x) => format!("{}", x),
        Value::I32(x) => format!("{}", x),
        Value::I64(x) => format!("{}", x),
        Value::Bool(x) => format!("{}", x),
        Value::Float(x) => format!("{}", x),
        Value::Double(x) => format!("{}", x),
        _ => format!("{:?}", v),
    }
}

pub fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

fn char_repr(c: u8) -> String {
    if c.is_ascii_graphic() || c == b' ' {
        format!("'{}'", c as char)
    } else {
        format!("'\\x{:02x}'", c)
    }
}

/// One-line rendering of any value; nested records render as `Name { field: value, ... }`.
pub fn format_value(v: &Value) -> String {
    match v {
        Value::Char(c) => char_repr(*c),
        Value::Bytes(b) => format!("[{}]", hex_string(b)),
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Record(r) => {
            let fields: Vec<String> = r
                .metadata()
                .iter()
                .map(|(name, item)| format!("{}: {}", name, format_value(&item.value)))
                .collect();
            format!("{} {{ {} }}", r.schema().name(), fields.join(", "))
        }
        Value::Enum(e) => format!("{}({})", e.name, e.raw),
        Value::Null => "null".to_string(),
        _ => format_scalar_raw(v),
    }
}
