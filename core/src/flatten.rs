//! Decoded value serialization.
//!
//! A trailing variadic slot becomes a rest parameter at the call site, so a
//! [`DecodedValue::List`] in the last position of its parent sequence is
//! spread into the parent. Tuples, and lists in any other position, stay
//! nested.

use serde_json::Value;

use crate::DecodedValue;

/// Flattens a decoded argument list into call-site form.
///
/// # Examples
///
/// ```
/// use command_args_core::{DecodedValue, flatten};
///
/// let values = vec![
///     DecodedValue::text("AND"),
///     DecodedValue::text("dest"),
///     DecodedValue::List(vec![DecodedValue::text("key1"), DecodedValue::text("key2")]),
/// ];
/// assert_eq!(
///     flatten(&values),
///     serde_json::json!(["AND", "dest", "key1", "key2"]),
/// );
/// ```
pub fn flatten(values: &[DecodedValue]) -> Value {
    Value::Array(flatten_sequence(values))
}

/// Re-emits the textual tokens a decoded argument list was read from, in
/// canonical form.
///
/// Decoding the result against the same overload reproduces `values`.
///
/// # Examples
///
/// ```
/// use command_args_core::{DecodedValue, to_tokens};
///
/// let values = vec![
///     DecodedValue::text("foo"),
///     DecodedValue::Tuple(vec![DecodedValue::text("EX"), DecodedValue::integer(123)]),
/// ];
/// assert_eq!(to_tokens(&values), vec!["foo", "EX", "123"]);
/// ```
pub fn to_tokens(values: &[DecodedValue]) -> Vec<String> {
    let mut tokens = Vec::new();
    for value in values {
        push_tokens(value, &mut tokens);
    }
    tokens
}

fn flatten_sequence(values: &[DecodedValue]) -> Vec<Value> {
    let mut out = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let last = index + 1 == values.len();
        match value {
            DecodedValue::List(items) if last => out.extend(flatten_sequence(items)),
            DecodedValue::List(items) | DecodedValue::Tuple(items) => {
                out.push(Value::Array(flatten_sequence(items)));
            }
            DecodedValue::Scalar(_) => out.push(value.to_json()),
        }
    }
    out
}

fn push_tokens(value: &DecodedValue, tokens: &mut Vec<String>) {
    match value {
        DecodedValue::Scalar(scalar) => tokens.push(scalar.to_string()),
        DecodedValue::Tuple(items) | DecodedValue::List(items) => {
            for item in items {
                push_tokens(item, tokens);
            }
        }
    }
}
