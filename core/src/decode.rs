//! Recursive-descent token decoding.
//!
//! [`Decoder::decode`] matches a flat token list against one overload's
//! slot list, one slot at a time:
//!
//! - scalars (`literal`, `enum`, `string`, `any`, `integer`, `number`)
//!   consume one token each;
//! - a `tuple` consumes a fixed window of tokens and decodes it as its own
//!   slot list;
//! - a `list` must be the final slot and consumes every remaining token,
//!   one item at a time;
//! - a `union` tries each variant in the head position together with the
//!   remaining slots, and the first variant whose whole continuation
//!   decodes wins.
//!
//! Every step is recorded in the caller's [`Trail`]; on failure the trail is
//! the explanation of why the overload was rejected.
//!
//! # Example
//!
//! ```
//! use command_args_core::{DecodedValue, Schema, Slot, Trail, decode};
//!
//! let slots = vec![
//!     Slot::required("key", Schema::Text),
//!     Slot::required("field", Schema::Text),
//!     Slot::required("increment", Schema::Number),
//! ];
//! let tokens: Vec<String> = ["mykey", "field", "0.1"].map(String::from).to_vec();
//!
//! let mut trail = Trail::new();
//! let decoded = decode(&tokens, &slots, &mut trail).unwrap();
//! assert!(decoded.leftover.is_empty());
//! assert_eq!(decoded.values[2], DecodedValue::number(0.1));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::numeric::{Parsed, format_number, integer_prefix, number_prefix};
use crate::signature::render_schema;
use crate::{DecodedValue, Schema, Slot, Trail};

/// Default bound on tuple/list nesting depth.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 8;

/// Tunables for decoding and overload selection.
///
/// # Examples
///
/// ```
/// use command_args_core::DecodeOptions;
///
/// let options: DecodeOptions = serde_json::from_str(r#"{"max_nesting_depth": 4}"#).unwrap();
/// assert_eq!(options.max_nesting_depth, 4);
/// assert!(!options.prune_redundant_overloads);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Deepest tuple/list nesting accepted before decoding aborts.
    pub max_nesting_depth: usize,
    /// Attempt only the pruned overload list during selection.
    pub prune_redundant_overloads: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            prune_redundant_overloads: false,
        }
    }
}

/// Which numeric scalar a slot expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Number,
}

impl std::fmt::Display for NumericKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// Why a decode attempt was rejected.
///
/// The `Display` text of each variant is exactly the trail entry recorded
/// when the failure happens. Only [`is_fatal`](DecodeError::is_fatal)
/// variants indicate a broken schema; every other variant is an ordinary
/// mismatch between tokens and an overload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The schema source has no entry for the command.
    #[error("command {0:?} not found")]
    CommandNotFound(String),
    /// Slots remain but every token has been consumed.
    #[error("target args remain but no tokens left: {}", .remaining.join(", "))]
    TokenExhausted { remaining: Vec<String> },
    /// Token differs from the slot's literal.
    #[error("expected {expected:?} for `{slot}`, got {found:?}")]
    LiteralMismatch {
        slot: String,
        expected: String,
        found: String,
    },
    /// Token is not among the slot's allowed values.
    #[error("expected one of [{}] for `{slot}`, got {found:?}", .allowed.join(", "))]
    EnumMismatch {
        slot: String,
        allowed: Vec<String>,
        found: String,
    },
    /// Token's numeric prefix does not render back to the token.
    #[error("expected {kind} for `{slot}`, got {found:?} (parsed as {parsed})")]
    NumericParseFailure {
        slot: String,
        kind: NumericKind,
        found: String,
        parsed: String,
    },
    /// The slot's schema has no decode strategy.
    #[error("no decode strategy for `{slot}` ({shape})")]
    UnsupportedSchemaShape { slot: String, shape: String },
    /// No union variant decoded together with the remaining slots.
    #[error("no variant of `{slot}` matched")]
    UnionExhausted { slot: String },
    /// A variadic slot is followed by further slots.
    #[error("variadic `{slot}` is not the last argument")]
    VariadicMisplaced { slot: String },
    /// Tuple/list nesting exceeds the configured bound.
    #[error("`{slot}` is nested deeper than {limit} levels")]
    NestingTooDeep { slot: String, limit: usize },
    /// Every slot matched but tokens remain.
    #[error("tokens left unconsumed: {}", quote_tokens(.tokens))]
    LeftoverTokensUnconsumed { tokens: Vec<String> },
}

impl DecodeError {
    /// Returns `true` for errors caused by the schema itself rather than the
    /// tokens; these abort selection instead of moving to the next overload.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::VariadicMisplaced { .. } | Self::NestingTooDeep { .. }
        )
    }
}

/// Successful decode of a slot list.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<'t> {
    /// One value per slot, in slot order.
    pub values: Vec<DecodedValue>,
    /// Tokens left after the last slot matched.
    pub leftover: &'t [String],
}

/// Borrowed view of a slot, so union variants can stand in for the head
/// slot without cloning schemas.
#[derive(Debug, Clone, Copy)]
struct SlotRef<'s> {
    name: &'s str,
    optional: bool,
    schema: &'s Schema,
}

impl<'s> From<&'s Slot> for SlotRef<'s> {
    fn from(slot: &'s Slot) -> Self {
        Self {
            name: &slot.name,
            optional: slot.optional,
            schema: &slot.schema,
        }
    }
}

/// Reusable decoder configured with [`DecodeOptions`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    /// Creates a decoder with the given options.
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Options this decoder was built with.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes `tokens` against `slots`, recording every step in `trail`.
    ///
    /// Leftover tokens are not an error here; they are reported in
    /// [`Decoded::leftover`] and noted in the trail, and the caller decides
    /// whether they reject the overload.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] that stopped the decode. The same
    /// message is the last entry written to `trail`.
    pub fn decode<'t>(
        &self,
        tokens: &'t [String],
        slots: &[Slot],
        trail: &mut Trail,
    ) -> Result<Decoded<'t>, DecodeError> {
        let refs: Vec<SlotRef<'_>> = slots.iter().map(SlotRef::from).collect();
        let decoded = self.decode_slots(tokens, &refs, trail, 0)?;
        if !decoded.leftover.is_empty() {
            trail.note(format!(
                "tokens remain but no target args left: {}",
                quote_tokens(decoded.leftover)
            ));
        }
        debug!(
            slots = slots.len(),
            tokens = tokens.len(),
            leftover = decoded.leftover.len(),
            "decoded slot list"
        );
        Ok(decoded)
    }

    fn decode_slots<'t>(
        &self,
        tokens: &'t [String],
        slots: &[SlotRef<'_>],
        trail: &mut Trail,
        depth: usize,
    ) -> Result<Decoded<'t>, DecodeError> {
        let Some((head, tail)) = slots.split_first() else {
            return Ok(Decoded {
                values: Vec::new(),
                leftover: tokens,
            });
        };

        if depth > self.options.max_nesting_depth {
            return Err(reject(
                trail,
                DecodeError::NestingTooDeep {
                    slot: head.name.to_string(),
                    limit: self.options.max_nesting_depth,
                },
            ));
        }

        let Some((token, rest)) = tokens.split_first() else {
            if tail.is_empty() && head.optional && head.schema.is_variadic() {
                trail.note(format!(
                    "matched `{}` with no items (0 tokens, 0 args remaining)",
                    head.name
                ));
                return Ok(Decoded {
                    values: vec![DecodedValue::List(Vec::new())],
                    leftover: tokens,
                });
            }
            return Err(reject(
                trail,
                DecodeError::TokenExhausted {
                    remaining: slots.iter().map(|slot| slot.name.to_string()).collect(),
                },
            ));
        };

        match head.schema {
            Schema::Literal { value } => {
                if token != value {
                    return Err(reject(
                        trail,
                        DecodeError::LiteralMismatch {
                            slot: head.name.to_string(),
                            expected: value.clone(),
                            found: token.clone(),
                        },
                    ));
                }
                self.accept(DecodedValue::text(token.as_str()), head, token, rest, tail, trail, depth)
            }
            Schema::Enum { values } => {
                if !values.contains(token) {
                    return Err(reject(
                        trail,
                        DecodeError::EnumMismatch {
                            slot: head.name.to_string(),
                            allowed: values.clone(),
                            found: token.clone(),
                        },
                    ));
                }
                self.accept(DecodedValue::text(token.as_str()), head, token, rest, tail, trail, depth)
            }
            Schema::Text | Schema::Any => {
                self.accept(DecodedValue::text(token.as_str()), head, token, rest, tail, trail, depth)
            }
            Schema::Integer => match integer_prefix(token) {
                Parsed::Value(value) if value.to_string() == *token => {
                    self.accept(DecodedValue::integer(value), head, token, rest, tail, trail, depth)
                }
                parsed => Err(reject(
                    trail,
                    DecodeError::NumericParseFailure {
                        slot: head.name.to_string(),
                        kind: NumericKind::Integer,
                        found: token.clone(),
                        parsed: parsed.to_string(),
                    },
                )),
            },
            Schema::Number => match number_prefix(token) {
                Parsed::Value(value) if format_number(value) == *token => {
                    self.accept(DecodedValue::number(value), head, token, rest, tail, trail, depth)
                }
                parsed => Err(reject(
                    trail,
                    DecodeError::NumericParseFailure {
                        slot: head.name.to_string(),
                        kind: NumericKind::Number,
                        found: token.clone(),
                        parsed: match parsed {
                            Parsed::Value(value) => format_number(value),
                            other => other.to_string(),
                        },
                    },
                )),
            },
            Schema::Tuple { items } => self.decode_tuple(tokens, head, items, tail, trail, depth),
            Schema::List { item } => self.decode_list(tokens, head, item, tail, trail, depth),
            Schema::Union { variants } => {
                self.decode_union(tokens, head, variants, tail, trail, depth)
            }
            Schema::Unknown => Err(reject(
                trail,
                DecodeError::UnsupportedSchemaShape {
                    slot: head.name.to_string(),
                    shape: "unknown schema".to_string(),
                },
            )),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn accept<'t>(
        &self,
        value: DecodedValue,
        head: &SlotRef<'_>,
        token: &str,
        rest: &'t [String],
        tail: &[SlotRef<'_>],
        trail: &mut Trail,
        depth: usize,
    ) -> Result<Decoded<'t>, DecodeError> {
        trail.note(format!(
            "matched `{}` with {token:?} ({} tokens, {} args remaining)",
            head.name,
            rest.len(),
            tail.len()
        ));
        self.prepend(value, rest, tail, trail, depth)
    }

    fn prepend<'t>(
        &self,
        value: DecodedValue,
        rest: &'t [String],
        tail: &[SlotRef<'_>],
        trail: &mut Trail,
        depth: usize,
    ) -> Result<Decoded<'t>, DecodeError> {
        let mut decoded = self.decode_slots(rest, tail, trail, depth)?;
        decoded.values.insert(0, value);
        Ok(decoded)
    }

    fn decode_tuple<'t>(
        &self,
        tokens: &'t [String],
        head: &SlotRef<'_>,
        items: &[Slot],
        tail: &[SlotRef<'_>],
        trail: &mut Trail,
        depth: usize,
    ) -> Result<Decoded<'t>, DecodeError> {
        let Some(width) = head.schema.token_width() else {
            return Err(reject(
                trail,
                DecodeError::UnsupportedSchemaShape {
                    slot: head.name.to_string(),
                    shape: "tuple with variable-width items".to_string(),
                },
            ));
        };

        let (window, rest) = tokens.split_at(width.min(tokens.len()));
        trail.note(format!(
            "decoding tuple `{}` from {} of {} tokens",
            head.name,
            window.len(),
            tokens.len()
        ));

        let item_refs: Vec<SlotRef<'_>> = items.iter().map(SlotRef::from).collect();
        let inner = trail.nested(|t| self.decode_slots(window, &item_refs, t, depth + 1))?;
        if !inner.leftover.is_empty() {
            return Err(reject(
                trail,
                DecodeError::LeftoverTokensUnconsumed {
                    tokens: inner.leftover.to_vec(),
                },
            ));
        }

        trail.note(format!(
            "matched tuple `{}` ({} tokens, {} args remaining)",
            head.name,
            rest.len(),
            tail.len()
        ));
        self.prepend(DecodedValue::Tuple(inner.values), rest, tail, trail, depth)
    }

    fn decode_list<'t>(
        &self,
        tokens: &'t [String],
        head: &SlotRef<'_>,
        item: &Schema,
        tail: &[SlotRef<'_>],
        trail: &mut Trail,
        depth: usize,
    ) -> Result<Decoded<'t>, DecodeError> {
        if !tail.is_empty() {
            return Err(reject(
                trail,
                DecodeError::VariadicMisplaced {
                    slot: head.name.to_string(),
                },
            ));
        }

        let item_slot = [SlotRef {
            name: head.name,
            optional: false,
            schema: item,
        }];
        let mut items = Vec::new();
        let mut remaining = tokens;

        while !remaining.is_empty() {
            trail.note(format!(
                "decoding array item {} of `{}` ({} tokens remaining)",
                items.len() + 1,
                head.name,
                remaining.len()
            ));
            let decoded =
                trail.nested(|t| self.decode_slots(remaining, &item_slot, t, depth + 1))?;
            if decoded.leftover.len() == remaining.len() {
                return Err(reject(
                    trail,
                    DecodeError::UnsupportedSchemaShape {
                        slot: head.name.to_string(),
                        shape: "list item consumes no tokens".to_string(),
                    },
                ));
            }
            items.extend(decoded.values);
            remaining = decoded.leftover;
        }

        trail.note(format!(
            "matched list `{}` with {} items ({} tokens, {} args remaining)",
            head.name,
            items.len(),
            remaining.len(),
            tail.len()
        ));
        Ok(Decoded {
            values: vec![DecodedValue::List(items)],
            leftover: remaining,
        })
    }

    fn decode_union<'t>(
        &self,
        tokens: &'t [String],
        head: &SlotRef<'_>,
        variants: &[Schema],
        tail: &[SlotRef<'_>],
        trail: &mut Trail,
        depth: usize,
    ) -> Result<Decoded<'t>, DecodeError> {
        // first variant that leaves tokens behind, kept in case none uses them all
        let mut partial = None;

        for (index, variant) in variants.iter().enumerate() {
            trail.note(format!(
                "trying variant {}/{} of `{}`: {}",
                index + 1,
                variants.len(),
                head.name,
                render_schema(variant)
            ));

            let mut candidate = Vec::with_capacity(tail.len() + 1);
            candidate.push(SlotRef {
                schema: variant,
                ..*head
            });
            candidate.extend_from_slice(tail);

            match trail.nested(|t| self.decode_slots(tokens, &candidate, t, depth)) {
                Ok(decoded) if decoded.leftover.is_empty() => {
                    debug!(slot = head.name, variant = index, "union variant matched");
                    return Ok(decoded);
                }
                Ok(decoded) => {
                    trail.note(format!(
                        "variant {}/{} of `{}` leaves {} tokens unconsumed",
                        index + 1,
                        variants.len(),
                        head.name,
                        decoded.leftover.len()
                    ));
                    partial.get_or_insert((index, decoded));
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => {}
            }
        }

        if let Some((index, decoded)) = partial {
            debug!(slot = head.name, variant = index, "union variant matched with leftover");
            return Ok(decoded);
        }

        Err(reject(
            trail,
            DecodeError::UnionExhausted {
                slot: head.name.to_string(),
            },
        ))
    }
}

/// Decodes `tokens` against `slots` with default [`DecodeOptions`].
///
/// See [`Decoder::decode`].
pub fn decode<'t>(
    tokens: &'t [String],
    slots: &[Slot],
    trail: &mut Trail,
) -> Result<Decoded<'t>, DecodeError> {
    Decoder::default().decode(tokens, slots, trail)
}

fn reject(trail: &mut Trail, err: DecodeError) -> DecodeError {
    trail.note(err.to_string());
    err
}

fn quote_tokens(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| format!("{token:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    fn expiration() -> Schema {
        Schema::union(vec![Schema::tuple(vec![
            Slot::required("unit", Schema::one_of(["EX", "PX"])),
            Slot::required("ttl", Schema::Integer),
        ])])
    }

    #[test]
    fn test_empty_tokens_and_slots_succeed() {
        let mut trail = Trail::new();
        let decoded = decode(&[], &[], &mut trail).unwrap();
        assert!(decoded.values.is_empty());
        assert!(decoded.leftover.is_empty());
        assert!(trail.is_empty());
    }

    #[test]
    fn test_token_exhausted_lists_remaining_slots() {
        let slots = vec![
            Slot::required("key", Schema::Text),
            Slot::required("value", Schema::Text),
        ];
        let input = tokens(&["k"]);
        let mut trail = Trail::new();

        let err = decode(&input, &slots, &mut trail).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TokenExhausted {
                remaining: vec!["value".to_string()]
            }
        );
        assert_eq!(
            trail.entries(),
            [
                r#"matched `key` with "k" (0 tokens, 1 args remaining)"#,
                "target args remain but no tokens left: value",
            ]
        );
    }

    #[test]
    fn test_leftover_tokens_are_soft() {
        let slots = vec![Slot::required("key", Schema::Text)];
        let input = tokens(&["k", "extra"]);
        let mut trail = Trail::new();

        let decoded = decode(&input, &slots, &mut trail).unwrap();
        assert_eq!(decoded.leftover, ["extra".to_string()]);
        assert_eq!(
            trail.entries().last().unwrap(),
            r#"tokens remain but no target args left: "extra""#
        );
    }

    #[test]
    fn test_literal_mismatch() {
        let slots = vec![Slot::required("operation", Schema::literal("AND"))];
        let input = tokens(&["OR"]);
        let mut trail = Trail::new();

        let err = decode(&input, &slots, &mut trail).unwrap_err();
        assert_eq!(err.to_string(), r#"expected "AND" for `operation`, got "OR""#);
    }

    #[test]
    fn test_enum_mismatch_lists_allowed_values() {
        let slots = vec![Slot::required("condition", Schema::one_of(["NX", "XX"]))];
        let input = tokens(&["GT"]);
        let mut trail = Trail::new();

        let err = decode(&input, &slots, &mut trail).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"expected one of [NX, XX] for `condition`, got "GT""#
        );
    }

    #[test]
    fn test_integer_round_trip_is_required() {
        let slots = vec![Slot::required("count", Schema::Integer)];
        for (raw, parsed) in [("1.2", "1"), ("007", "7"), ("not_an_integer", "NaN")] {
            let input = tokens(&[raw]);
            let mut trail = Trail::new();
            let err = decode(&input, &slots, &mut trail).unwrap_err();
            assert_eq!(
                err,
                DecodeError::NumericParseFailure {
                    slot: "count".to_string(),
                    kind: NumericKind::Integer,
                    found: raw.to_string(),
                    parsed: parsed.to_string(),
                }
            );
        }

        let input = tokens(&["-15"]);
        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(decoded.values, vec![DecodedValue::integer(-15)]);
    }

    #[test]
    fn test_number_round_trip_is_required() {
        let slots = vec![Slot::required("score", Schema::Number)];

        let input = tokens(&["1.0"]);
        let err = decode(&input, &slots, &mut Trail::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"expected number for `score`, got "1.0" (parsed as 1)"#
        );

        let input = tokens(&["2.5"]);
        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(decoded.values, vec![DecodedValue::number(2.5)]);
    }

    #[test]
    fn test_tuple_consumes_fixed_window() {
        let slots = vec![
            Slot::required(
                "pair",
                Schema::tuple(vec![
                    Slot::required("field", Schema::Text),
                    Slot::required("value", Schema::Integer),
                ]),
            ),
            Slot::required("after", Schema::Text),
        ];
        let input = tokens(&["f", "1", "z"]);
        let mut trail = Trail::new();

        let decoded = decode(&input, &slots, &mut trail).unwrap();
        assert_eq!(
            decoded.values,
            vec![
                DecodedValue::Tuple(vec![DecodedValue::text("f"), DecodedValue::integer(1)]),
                DecodedValue::text("z"),
            ]
        );
        assert_eq!(
            trail.entries(),
            [
                "decoding tuple `pair` from 2 of 3 tokens",
                r#"  matched `field` with "f" (1 tokens, 1 args remaining)"#,
                r#"  matched `value` with "1" (0 tokens, 0 args remaining)"#,
                "matched tuple `pair` (1 tokens, 1 args remaining)",
                r#"matched `after` with "z" (0 tokens, 0 args remaining)"#,
            ]
        );
    }

    #[test]
    fn test_tuple_short_window_fails() {
        let slots = vec![Slot::required(
            "pair",
            Schema::tuple(vec![
                Slot::required("field", Schema::Text),
                Slot::required("value", Schema::Text),
            ]),
        )];
        let input = tokens(&["f"]);

        let err = decode(&input, &slots, &mut Trail::new()).unwrap_err();
        assert!(matches!(err, DecodeError::TokenExhausted { .. }));
    }

    #[test]
    fn test_list_consumes_all_remaining_tokens() {
        let slots = vec![
            Slot::required("operation", Schema::literal("AND")),
            Slot::required("destkey", Schema::Text),
            Slot::required("key", Schema::list(Schema::Text)),
        ];
        let input = tokens(&["AND", "dest", "key1", "key2"]);

        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(
            decoded.values,
            vec![
                DecodedValue::text("AND"),
                DecodedValue::text("dest"),
                DecodedValue::List(vec![DecodedValue::text("key1"), DecodedValue::text("key2")]),
            ]
        );
    }

    #[test]
    fn test_list_item_failure_propagates() {
        let slots = vec![Slot::required("ids", Schema::list(Schema::Integer))];
        let input = tokens(&["1", "x"]);
        let mut trail = Trail::new();

        let err = decode(&input, &slots, &mut trail).unwrap_err();
        assert!(matches!(err, DecodeError::NumericParseFailure { .. }));
        assert_eq!(
            trail.entries(),
            [
                "decoding array item 1 of `ids` (2 tokens remaining)",
                r#"  matched `ids` with "1" (1 tokens, 0 args remaining)"#,
                "decoding array item 2 of `ids` (1 tokens remaining)",
                r#"  expected integer for `ids`, got "x" (parsed as NaN)"#,
            ]
        );
    }

    #[test]
    fn test_list_of_tuples() {
        let slots = vec![Slot::required(
            "pairs",
            Schema::list(Schema::tuple(vec![
                Slot::required("field", Schema::Text),
                Slot::required("value", Schema::Text),
            ])),
        )];
        let input = tokens(&["a", "1", "b", "2"]);

        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(
            decoded.values,
            vec![DecodedValue::List(vec![
                DecodedValue::Tuple(vec![DecodedValue::text("a"), DecodedValue::text("1")]),
                DecodedValue::Tuple(vec![DecodedValue::text("b"), DecodedValue::text("2")]),
            ])]
        );
    }

    #[test]
    fn test_misplaced_list_is_fatal() {
        let slots = vec![
            Slot::required("keys", Schema::list(Schema::Text)),
            Slot::required("count", Schema::Integer),
        ];
        let input = tokens(&["a", "1"]);

        let err = decode(&input, &slots, &mut Trail::new()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::VariadicMisplaced {
                slot: "keys".to_string()
            }
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_optional_list_with_no_tokens_is_empty() {
        let slots = vec![
            Slot::required("key", Schema::Text),
            Slot::optional("fields", Schema::list(Schema::Text)),
        ];
        let input = tokens(&["k"]);

        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(
            decoded.values,
            vec![DecodedValue::text("k"), DecodedValue::List(Vec::new())]
        );
    }

    #[test]
    fn test_required_list_with_no_tokens_is_exhausted() {
        let slots = vec![Slot::required("keys", Schema::list(Schema::Text))];
        let err = decode(&[], &slots, &mut Trail::new()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TokenExhausted {
                remaining: vec!["keys".to_string()]
            }
        );
    }

    #[test]
    fn test_union_decodes_with_continuation() {
        let slots = vec![
            Slot::required("key", Schema::Text),
            Slot::required("value", Schema::Text),
            Slot::required("expiration", expiration()),
        ];
        let input = tokens(&["foo", "bar", "EX", "123"]);

        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(
            decoded.values,
            vec![
                DecodedValue::text("foo"),
                DecodedValue::text("bar"),
                DecodedValue::Tuple(vec![DecodedValue::text("EX"), DecodedValue::integer(123)]),
            ]
        );
    }

    #[test]
    fn test_union_variant_rejected_by_tail_falls_through() {
        let slots = vec![
            Slot::required(
                "target",
                Schema::union(vec![Schema::Text, Schema::literal("ALL")]),
            ),
            Slot::required("count", Schema::Integer),
        ];
        let input = tokens(&["ALL", "3"]);
        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(
            decoded.values,
            vec![DecodedValue::text("ALL"), DecodedValue::integer(3)]
        );

        // both variants accept "ALL" and are then rejected by `count`
        let input = tokens(&["ALL", "x"]);
        let mut trail = Trail::new();
        let err = decode(&input, &slots, &mut trail).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnionExhausted {
                slot: "target".to_string()
            }
        );
        assert!(trail.mentions("trying variant 2/2 of `target`: \"ALL\""));
    }

    #[test]
    fn test_union_prefers_variant_using_every_token() {
        let slots = vec![Slot::required(
            "u",
            Schema::union(vec![
                Schema::Text,
                Schema::tuple(vec![
                    Slot::required("a", Schema::Text),
                    Slot::required("b", Schema::Text),
                ]),
            ]),
        )];
        let input = tokens(&["a", "b"]);
        let mut trail = Trail::new();

        let decoded = decode(&input, &slots, &mut trail).unwrap();
        assert!(decoded.leftover.is_empty());
        assert_eq!(
            decoded.values,
            vec![DecodedValue::Tuple(vec![
                DecodedValue::text("a"),
                DecodedValue::text("b"),
            ])]
        );
        assert!(trail.mentions("variant 1/2 of `u` leaves 1 tokens unconsumed"));
        assert!(trail.mentions("trying variant 2/2 of `u`"));
    }

    #[test]
    fn test_union_falls_back_to_first_partial_variant() {
        let slots = vec![Slot::required(
            "u",
            Schema::union(vec![Schema::Text, Schema::Integer]),
        )];
        let input = tokens(&["7", "extra"]);

        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(decoded.values, vec![DecodedValue::text("7")]);
        assert_eq!(decoded.leftover, ["extra".to_string()]);
    }

    #[test]
    fn test_union_declaration_order_wins() {
        let slots = vec![Slot::required(
            "pair",
            Schema::union(vec![
                Schema::tuple(vec![
                    Slot::required("name", Schema::Text),
                    Slot::required("count", Schema::Integer),
                ]),
                Schema::tuple(vec![
                    Slot::required("name", Schema::Text),
                    Slot::required("label", Schema::Text),
                ]),
            ]),
        )];
        let input = tokens(&["x", "1"]);
        let mut trail = Trail::new();

        let decoded = decode(&input, &slots, &mut trail).unwrap();
        assert_eq!(
            decoded.values,
            vec![DecodedValue::Tuple(vec![
                DecodedValue::text("x"),
                DecodedValue::integer(1),
            ])]
        );
        assert!(!trail.mentions("trying variant 2/2"));
    }

    #[test]
    fn test_unknown_list_item_has_array_context() {
        let slots = vec![Slot::required("xs", Schema::list(Schema::Unknown))];
        let input = tokens(&["x"]);
        let mut trail = Trail::new();

        let err = decode(&input, &slots, &mut trail).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedSchemaShape { .. }));
        assert_eq!(
            trail.entries(),
            [
                "decoding array item 1 of `xs` (1 tokens remaining)",
                "  no decode strategy for `xs` (unknown schema)",
            ]
        );
    }

    #[test]
    fn test_any_decodes_token_as_text() {
        let slots = vec![
            Slot::required("key", Schema::Text),
            Slot::required("payload", Schema::Any),
        ];
        let input = tokens(&["k", "{\"a\": 1}"]);

        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(
            decoded.values,
            vec![DecodedValue::text("k"), DecodedValue::text("{\"a\": 1}")]
        );
    }

    #[test]
    fn test_list_match_entry_counts_remaining() {
        let slots = vec![Slot::required("keys", Schema::list(Schema::Text))];
        let input = tokens(&["a", "b"]);
        let mut trail = Trail::new();

        decode(&input, &slots, &mut trail).unwrap();
        assert_eq!(
            trail.entries().last().unwrap(),
            "matched list `keys` with 2 items (0 tokens, 0 args remaining)"
        );
    }

    #[test]
    fn test_number_exponent_forms() {
        let slots = vec![Slot::required("score", Schema::Number)];

        let input = tokens(&["1e-7"]);
        let decoded = decode(&input, &slots, &mut Trail::new()).unwrap();
        assert_eq!(decoded.values, vec![DecodedValue::number(1e-7)]);

        let input = tokens(&["0.0000001"]);
        let err = decode(&input, &slots, &mut Trail::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"expected number for `score`, got "0.0000001" (parsed as 1e-7)"#
        );
    }

    #[test]
    fn test_unknown_schema_has_no_strategy() {
        let slots = vec![Slot::required("options", Schema::Unknown)];
        let input = tokens(&["x"]);
        let err = decode(&input, &slots, &mut Trail::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no decode strategy for `options` (unknown schema)"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_nesting_bound_is_enforced() {
        let mut schema = Schema::Text;
        for level in 0..4 {
            schema = Schema::tuple(vec![Slot::required(&format!("level{level}"), schema)]);
        }
        let slots = vec![Slot::required("deep", schema)];
        let input = tokens(&["x"]);
        let decoder = Decoder::new(DecodeOptions {
            max_nesting_depth: 2,
            ..DecodeOptions::default()
        });

        let err = decoder.decode(&input, &slots, &mut Trail::new()).unwrap_err();
        assert!(matches!(err, DecodeError::NestingTooDeep { limit: 2, .. }));
        assert!(decode(&input, &slots, &mut Trail::new()).is_ok());
    }

    #[test]
    fn test_decode_is_deterministic() {
        let slots = vec![
            Slot::required("key", Schema::Text),
            Slot::required("expiration", expiration()),
        ];
        let input = tokens(&["k", "EX", "nope"]);

        let mut first = Trail::new();
        let mut second = Trail::new();
        let a = decode(&input, &slots, &mut first);
        let b = decode(&input, &slots, &mut second);
        assert_eq!(a, b);
        assert_eq!(first, second);
    }
}
