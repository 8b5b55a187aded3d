//! Schema type definitions for command argument modeling.
//!
//! This module defines the data model shared by every other part of the
//! crate: the [`Schema`] shape of one argument position, the named
//! [`Slot`] that places a schema in a command's argument list, the
//! [`CommandSpec`] that groups slots under a command name, and the
//! [`DecodedValue`] tree produced by a successful decode.
//!
//! Schemas are designed for serialization with [`serde`] and round-trip
//! through JSON and YAML.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::numeric::format_number;

/// Version of the schema contract (semver).
///
/// Embedded in every [`SchemaPackage`](crate::SchemaPackage) to track
/// compatibility across schema versions.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Shape of one argument position.
///
/// Serialized with a `"type"` discriminator. Unrecognised type tags (for
/// example an `"object"` schema emitted by a newer generator) deserialize
/// to [`Schema::Unknown`] so they can be reported during decoding instead
/// of failing the whole load.
///
/// # Examples
///
/// ```
/// use command_args_core::Schema;
///
/// let schema: Schema = serde_json::from_str(
///     r#"{"type": "enum", "values": ["EX", "PX"]}"#,
/// ).unwrap();
/// assert_eq!(schema, Schema::one_of(["EX", "PX"]));
///
/// let odd: Schema = serde_json::from_str(r#"{"type": "object"}"#).unwrap();
/// assert_eq!(odd, Schema::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    /// Token must equal this exact string.
    Literal { value: String },
    /// Token must be one of these strings.
    Enum { values: Vec<String> },
    /// Any token, kept as-is.
    #[serde(rename = "string")]
    Text,
    /// Base-10 integer that renders back to the exact token.
    Integer,
    /// Floating-point value that renders back to the exact token.
    Number,
    /// Untyped position; decodes any token like [`Schema::Text`].
    Any,
    /// Fixed-length heterogeneous sequence.
    Tuple { items: Vec<Slot> },
    /// Homogeneous variadic sequence. Only valid in final position.
    List { item: Box<Schema> },
    /// First variant that decodes (with continuation) wins.
    Union { variants: Vec<Schema> },
    /// No decode strategy exists for this shape.
    #[serde(other)]
    Unknown,
}

impl Schema {
    /// Creates a literal schema.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// Creates an enum schema from the allowed values, keeping their order.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a tuple schema.
    pub fn tuple(items: Vec<Slot>) -> Self {
        Self::Tuple { items }
    }

    /// Creates a variadic list schema.
    pub fn list(item: Schema) -> Self {
        Self::List {
            item: Box::new(item),
        }
    }

    /// Creates a union schema.
    pub fn union(variants: Vec<Schema>) -> Self {
        Self::Union { variants }
    }

    /// Short lowercase name of the schema's shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::Enum { .. } => "enum",
            Self::Text => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Any => "any",
            Self::Tuple { .. } => "tuple",
            Self::List { .. } => "list",
            Self::Union { .. } => "union",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for the variadic list shape.
    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Number of tokens this schema always consumes, if fixed.
    ///
    /// Every scalar (and [`Schema::Unknown`]) is one token wide, a tuple is
    /// the sum of its items, and a union is fixed only when all of its
    /// variants agree. Lists have no fixed width.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{Schema, Slot};
    ///
    /// let pair = Schema::tuple(vec![
    ///     Slot::required("unit", Schema::one_of(["EX", "PX"])),
    ///     Slot::required("ttl", Schema::Integer),
    /// ]);
    /// assert_eq!(pair.token_width(), Some(2));
    /// assert_eq!(Schema::list(Schema::Text).token_width(), None);
    /// ```
    pub fn token_width(&self) -> Option<usize> {
        match self {
            Self::Tuple { items } => items
                .iter()
                .try_fold(0usize, |sum, slot| Some(sum + slot.schema.token_width()?)),
            Self::List { .. } => None,
            Self::Union { variants } => {
                let mut widths = variants.iter().map(Schema::token_width);
                let first = widths.next()??;
                widths.all(|w| w == Some(first)).then_some(first)
            }
            _ => Some(1),
        }
    }
}

/// One named, possibly optional, schema-typed argument position.
///
/// Order within a command's slot list is significant.
///
/// # Examples
///
/// ```
/// use command_args_core::{Schema, Slot};
///
/// let key = Slot::required("key", Schema::Text);
/// assert!(!key.optional);
///
/// let count = Slot::optional("count", Schema::Integer);
/// assert!(count.optional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Argument name as declared by the schema source.
    pub name: String,
    /// Whether overloads may omit this slot.
    #[serde(default)]
    pub optional: bool,
    /// Shape of the tokens this slot accepts.
    pub schema: Schema,
}

impl Slot {
    /// Creates a required slot.
    pub fn required(name: &str, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            optional: false,
            schema,
        }
    }

    /// Creates an optional slot.
    pub fn optional(name: &str, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            optional: true,
            schema,
        }
    }
}

/// Argument slot list for a single command.
///
/// # Examples
///
/// ```
/// use command_args_core::{CommandSpec, Schema, Slot};
///
/// let spec = CommandSpec::new("GET").with_arg(Slot::required("key", Schema::Text));
/// assert_eq!(spec.command, "GET");
/// assert_eq!(spec.arguments.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command name (e.g. "SET", "CLIENT KILL").
    pub command: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Declared argument slots, in order.
    #[serde(default)]
    pub arguments: Vec<Slot>,
}

impl CommandSpec {
    /// Creates a command spec with no arguments.
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ..Default::default()
        }
    }

    /// Appends an argument slot.
    pub fn with_arg(mut self, slot: Slot) -> Self {
        self.arguments.push(slot);
        self
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }
}

/// Leaf value of a decoded tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Token kept as text (literals, enums, strings, untyped slots).
    Text(String),
    /// Integer slot value.
    Integer(i64),
    /// Number slot value.
    Number(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => f.write_str(&format_number(*value)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Number(value) => serializer.serialize_f64(*value),
        }
    }
}

/// Structured result of decoding tokens against a slot list.
///
/// The tuple/list distinction is carried on the value itself: a
/// [`DecodedValue::Tuple`] stays bracketed when flattened, while a trailing
/// [`DecodedValue::List`] spreads into its parent (see
/// [`flatten`](crate::flatten)).
///
/// Serializes as plain nested arrays.
///
/// # Examples
///
/// ```
/// use command_args_core::DecodedValue;
///
/// let value = DecodedValue::Tuple(vec![
///     DecodedValue::text("EX"),
///     DecodedValue::integer(123),
/// ]);
/// assert_eq!(serde_json::to_string(&value).unwrap(), r#"["EX",123]"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Scalar(Scalar),
    Tuple(Vec<DecodedValue>),
    List(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    /// Integer scalar.
    pub fn integer(value: i64) -> Self {
        Self::Scalar(Scalar::Integer(value))
    }

    /// Number scalar.
    pub fn number(value: f64) -> Self {
        Self::Scalar(Scalar::Number(value))
    }

    /// Renders the unflattened tree as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Scalar(Scalar::Text(text)) => serde_json::Value::String(text.clone()),
            Self::Scalar(Scalar::Integer(value)) => serde_json::Value::from(*value),
            Self::Scalar(Scalar::Number(value)) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(format_number(*value))),
            Self::Tuple(items) | Self::List(items) => {
                serde_json::Value::Array(items.iter().map(DecodedValue::to_json).collect())
            }
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Tuple(items) | Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_deserializes_tagged_shapes() {
        let json = r#"{
            "type": "union",
            "variants": [
                {"type": "tuple", "items": [
                    {"name": "unit", "schema": {"type": "enum", "values": ["EX", "PX"]}},
                    {"name": "ttl", "schema": {"type": "integer"}}
                ]},
                {"type": "literal", "value": "KEEPTTL"}
            ]
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();

        let expected = Schema::union(vec![
            Schema::tuple(vec![
                Slot::required("unit", Schema::one_of(["EX", "PX"])),
                Slot::required("ttl", Schema::Integer),
            ]),
            Schema::literal("KEEPTTL"),
        ]);
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_schema_string_tag_maps_to_text() {
        let schema: Schema = serde_json::from_str(r#"{"type": "string"}"#).unwrap();
        assert_eq!(schema, Schema::Text);
        assert_eq!(
            serde_json::to_string(&Schema::Text).unwrap(),
            r#"{"type":"string"}"#
        );
    }

    #[test]
    fn test_unrecognised_schema_is_unknown() {
        let schema: Schema =
            serde_json::from_str(r#"{"type": "object", "properties": {}}"#).unwrap();
        assert_eq!(schema, Schema::Unknown);
    }

    #[test]
    fn test_slot_optional_defaults_to_false() {
        let slot: Slot =
            serde_json::from_str(r#"{"name": "key", "schema": {"type": "string"}}"#).unwrap();
        assert!(!slot.optional);
    }

    #[test]
    fn test_token_width() {
        assert_eq!(Schema::Text.token_width(), Some(1));
        assert_eq!(Schema::Unknown.token_width(), Some(1));
        let nested = Schema::tuple(vec![
            Slot::required("a", Schema::Text),
            Slot::required(
                "b",
                Schema::tuple(vec![
                    Slot::required("c", Schema::Integer),
                    Slot::required("d", Schema::Number),
                ]),
            ),
        ]);
        assert_eq!(nested.token_width(), Some(3));

        let mixed = Schema::union(vec![
            Schema::literal("KEEPTTL"),
            Schema::tuple(vec![
                Slot::required("unit", Schema::Text),
                Slot::required("ttl", Schema::Integer),
            ]),
        ]);
        assert_eq!(mixed.token_width(), None);
        assert_eq!(Schema::union(Vec::new()).token_width(), None);
    }

    #[test]
    fn test_decoded_value_serializes_as_nested_arrays() {
        let values = vec![
            DecodedValue::text("AND"),
            DecodedValue::List(vec![DecodedValue::text("k1"), DecodedValue::number(0.5)]),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"["AND",["k1",0.5]]"#
        );
    }
}
