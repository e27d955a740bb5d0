//! Decoded record: bound field values plus metadata, immutable once built.

use crate::metadata::StructMetadata;
use crate::schema::SchemaRef;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Record {
    schema: SchemaRef,
    /// One value per schema field, synthetic fields included (as `Null`).
    values: Vec<Value>,
    meta: StructMetadata,
    /// Bytes consumed by `x` codes.
    padding: u64,
}

impl Record {
    pub(crate) fn new(schema: SchemaRef, values: Vec<Value>, meta: StructMetadata, padding: u64) -> Self {
        Record {
            schema,
            values,
            meta,
            padding,
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Field value by declaration position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        let index = self.schema.fields().iter().position(|f| f.name == name)?;
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    pub fn metadata(&self) -> &StructMetadata {
        &self.meta
    }

    pub fn padding(&self) -> u64 {
        self.padding
    }

    /// Total bytes this record occupies in the stream, pad bytes included.
    pub fn length(&self) -> u64 {
        self.meta.total_size() + self.padding
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema.name() == other.schema.name())
            && self.values == other.values
            && self.meta == other.meta
            && self.padding == other.padding
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} bytes)", self.schema.name(), self.length())?;
        write!(f, "{}", self.meta)
    }
}
