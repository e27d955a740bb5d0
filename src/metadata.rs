//! Metadata collection: turn a bound value list into typed field values plus a per-field
//! summary (format label, byte size, value).

use crate::dump::format_value;
use crate::schema::{FieldSpec, Schema, SemanticKind};
use crate::value::{DecodedValue, EnumValue, RawValue, Value};
use std::fmt;

/// Externally visible summary of one decoded field.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataItem {
    /// Format label; nested records render as `T[Name(grammar)]`.
    pub format: String,
    pub size: u64,
    pub value: Value,
}

impl fmt::Display for MetadataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes) = {}", self.format, self.size, format_value(&self.value))
    }
}

/// Ordered metadata of a record, addressable by field name or position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructMetadata {
    items: Vec<(String, MetadataItem)>,
}

impl StructMetadata {
    pub fn get(&self, name: &str) -> Option<&MetadataItem> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, item)| item)
    }

    pub fn get_index(&self, index: usize) -> Option<&MetadataItem> {
        self.items.get(index).map(|(_, item)| item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataItem)> {
        self.items.iter().map(|(n, item)| (n.as_str(), item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the item sizes (pad bytes are not items; see [`crate::Record::length`]).
    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|(_, item)| item.size).sum()
    }
}

impl fmt::Display for StructMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, item)) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", name, item)?;
        }
        Ok(())
    }
}

/// Enum-translation hook: the symbol for `raw` if `field` is an enum field.
pub fn translate_enum(field: &FieldSpec, raw: i128) -> Option<EnumValue> {
    match &field.kind {
        SemanticKind::Enum(mapping) => Some(mapping.resolve(raw)),
        _ => None,
    }
}

/// Collect typed values and metadata for every field of `schema`.
///
/// `bound` is aligned with `schema.fields()`: synthetic fields carry `None`, receive
/// [`Value::Null`] and produce no metadata item.
pub(crate) fn collect_metadata(
    schema: &Schema,
    bound: Vec<Option<DecodedValue>>,
) -> (Vec<Value>, StructMetadata) {
    let mut values = Vec::with_capacity(bound.len());
    let mut meta = StructMetadata::default();

    for (field, slot) in schema.fields().iter().zip(bound) {
        let decoded = match slot {
            Some(d) => d,
            None => {
                values.push(Value::Null);
                continue;
            }
        };

        let format = match &field.kind {
            SemanticKind::NestedRecord(nested) => {
                format!("T[{}({})]", nested.name(), nested.grammar())
            }
            _ => decoded.format.clone(),
        };
        let size = match &decoded.raw {
            RawValue::Nested(r) => r.length(),
            RawValue::List(items) => items.iter().map(element_size).sum(),
            _ => decoded.byte_size,
        };
        let value = bind_value(field, decoded.into_value());

        meta.items.push((
            field.name.clone(),
            MetadataItem {
                format,
                size,
                value: value.clone(),
            },
        ));
        values.push(value);
    }
    (values, meta)
}

fn element_size(item: &DecodedValue) -> u64 {
    match &item.raw {
        RawValue::Nested(r) => r.length(),
        _ => item.byte_size,
    }
}

/// Apply the field's semantic kind to a decoded value (element-wise for lists).
fn bind_value(field: &FieldSpec, value: Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.into_iter().map(|v| bind_value(field, v)).collect()),
        Value::Null => Value::Null,
        v => match &field.kind {
            SemanticKind::Enum(_) => match v.as_i128().and_then(|raw| translate_enum(field, raw)) {
                Some(e) => Value::Enum(e),
                None => v,
            },
            SemanticKind::Boolean if v.is_integer() => Value::Bool(v.as_u64() != Some(0)),
            _ => v,
        },
    }
}
