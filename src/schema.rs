//! Schema model: record types, field kinds, composition and the schema registry.
//!
//! A [`Schema`] is built once per record type and shared read-only (`Arc`) by every decode
//! call. Inheritance is resolved eagerly when the schema is built: base fields come first,
//! the base grammar is prefixed verbatim, and synthetic fields of the base do not carry
//! over into the derived field list.

use crate::ast::FormatItem;
use crate::error::{DecodeError, Result};
use crate::parser;
use crate::record::Record;
use crate::value::EnumValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type SchemaRef = Arc<Schema>;

/// Post-read hook: runs after binding and metadata collection.
pub type OnRead = Arc<dyn Fn(&Record) -> std::result::Result<(), String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Declared meaning of a field; decides how its decoded value is bound.
#[derive(Debug, Clone)]
pub enum SemanticKind {
    Integer,
    Boolean,
    Float,
    ByteString,
    NestedRecord(SchemaRef),
    Enum(Arc<EnumMapping>),
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: SemanticKind,
    /// Receives no decoded bytes; only occupies a slot in the record.
    pub synthetic: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: SemanticKind) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
            synthetic: false,
        }
    }

    pub fn synthetic(name: impl Into<String>, kind: SemanticKind) -> Self {
        FieldSpec {
            synthetic: true,
            ..FieldSpec::new(name, kind)
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        FieldSpec::new(name, SemanticKind::Integer)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        FieldSpec::new(name, SemanticKind::Boolean)
    }

    pub fn float(name: impl Into<String>) -> Self {
        FieldSpec::new(name, SemanticKind::Float)
    }

    pub fn bytes(name: impl Into<String>) -> Self {
        FieldSpec::new(name, SemanticKind::ByteString)
    }

    pub fn nested(name: impl Into<String>, schema: &SchemaRef) -> Self {
        FieldSpec::new(name, SemanticKind::NestedRecord(Arc::clone(schema)))
    }

    pub fn enumeration(name: impl Into<String>, mapping: &Arc<EnumMapping>) -> Self {
        FieldSpec::new(name, SemanticKind::Enum(Arc::clone(mapping)))
    }

    pub fn nested_schema(&self) -> Option<&SchemaRef> {
        match &self.kind {
            SemanticKind::NestedRecord(s) => Some(s),
            _ => None,
        }
    }
}

/// Integer-to-symbol table for an enum field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMapping {
    name: String,
    variants: Vec<(String, i64)>,
    /// Symbol used when no variant matches.
    fallback: String,
}

impl EnumMapping {
    pub fn new(name: impl Into<String>, fallback: impl Into<String>) -> Self {
        EnumMapping {
            name: name.into(),
            variants: Vec::new(),
            fallback: fallback.into(),
        }
    }

    pub fn variant(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push((name.into(), value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First variant declared with `raw`; aliases resolve to the earliest name.
    pub fn resolve(&self, raw: i128) -> EnumValue {
        match self.variants.iter().find(|(_, v)| i128::from(*v) == raw) {
            Some((name, _)) => EnumValue {
                name: name.clone(),
                raw,
                known: true,
            },
            None => EnumValue {
                name: self.fallback.clone(),
                raw,
                known: false,
            },
        }
    }
}

/// Immutable description of a record type.
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
    grammar: String,
    items: Vec<FormatItem>,
    byte_order: ByteOrder,
    base: Option<SchemaRef>,
    on_read: Option<OnRead>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("grammar", &self.grammar)
            .field("byte_order", &self.byte_order)
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .field("on_read", &self.on_read.is_some())
            .finish()
    }
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields in decode order, synthetic ones included.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Fields that receive decoded values, in decode order.
    pub fn decodable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.synthetic)
    }

    pub fn decodable_count(&self) -> usize {
        self.decodable_fields().count()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Composed grammar: every ancestor's fragment, base first.
    pub fn grammar(&self) -> &str {
        &self.grammar
    }

    pub(crate) fn items(&self) -> &[FormatItem] {
        &self.items
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn base(&self) -> Option<&SchemaRef> {
        self.base.as_ref()
    }

    pub(crate) fn on_read(&self) -> Option<&OnRead> {
        self.on_read.as_ref()
    }
}

/// Compose a schema from its own fields and grammar fragment and an optional base.
///
/// `fields = base.fields (minus synthetic) ++ fields`, `grammar = base.grammar ++ fragment`.
/// The composed grammar is parsed here, so syntax errors surface before any decode.
pub fn compose(
    name: impl Into<String>,
    fields: Vec<FieldSpec>,
    fragment: &str,
    byte_order: ByteOrder,
    base: Option<&SchemaRef>,
) -> Result<SchemaRef> {
    let mut builder = SchemaBuilder::new(name)
        .fields(fields)
        .grammar(fragment)
        .byte_order(byte_order);
    if let Some(b) = base {
        builder = builder.base(b);
    }
    builder.build()
}

pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    fragment: String,
    byte_order: Option<ByteOrder>,
    base: Option<SchemaRef>,
    on_read: Option<OnRead>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            fragment: String::new(),
            byte_order: None,
            base: None,
            on_read: None,
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// This type's own grammar fragment (appended after the base grammar).
    pub fn grammar(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = fragment.into();
        self
    }

    /// Defaults to the base's byte order, or little-endian without a base.
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = Some(order);
        self
    }

    pub fn base(mut self, base: &SchemaRef) -> Self {
        self.base = Some(Arc::clone(base));
        self
    }

    pub fn on_read<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Record) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.on_read = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<SchemaRef> {
        let (mut fields, mut grammar, inherited_order) = match &self.base {
            Some(b) => (
                b.fields.iter().filter(|f| !f.synthetic).cloned().collect(),
                b.grammar.clone(),
                Some(b.byte_order),
            ),
            None => (Vec::new(), String::new(), None),
        };
        fields.extend(self.fields);
        grammar.push_str(&self.fragment);
        let items = parser::parse(&grammar)?;
        Ok(Arc::new(Schema {
            name: self.name,
            fields,
            grammar,
            items,
            byte_order: self.byte_order.or(inherited_order).unwrap_or_default(),
            base: self.base,
            on_read: self.on_read,
        }))
    }
}

/// Write-once map from type name to schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<SchemaRef>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its name. A name can only be registered once.
    pub fn register(&mut self, schema: SchemaRef) -> Result<SchemaRef> {
        if self.by_name.contains_key(schema.name()) {
            return Err(DecodeError::DuplicateSchema(schema.name().to_string()));
        }
        self.by_name
            .insert(schema.name().to_string(), self.schemas.len());
        self.schemas.push(Arc::clone(&schema));
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaRef> {
        self.by_name.get(name).map(|&i| &self.schemas[i])
    }

    pub fn require(&self, name: &str) -> Result<&SchemaRef> {
        self.get(name)
            .ok_or_else(|| DecodeError::UnknownSchema(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaRef> {
        self.schemas.iter()
    }
}
