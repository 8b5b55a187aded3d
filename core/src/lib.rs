//! Schema-driven command argument decoding with overload resolution.
//!
//! Given the declared argument slots of a command and a flat list of
//! textual tokens, this crate determines which concrete overload the tokens
//! satisfy and produces either a structured value tree or a diagnostic trail
//! explaining every rejected attempt.
//!
//! - [`Schema`] / [`Slot`] / [`CommandSpec`]: the declarative argument
//!   model (literals, enums, scalars, tuples, variadic lists, unions).
//! - [`expand_overloads`] / [`enumerate_overloads`]: every ordered
//!   selection of optional slots, with or without redundant truncations.
//! - [`Decoder`]: recursive token matching against one overload, recording
//!   a [`Trail`].
//! - [`Selector`]: tries each overload in order against a
//!   [`CommandSource`], returning the first full match and every attempt.
//! - [`flatten`] / [`to_tokens`]: call-site and textual forms of a
//!   [`DecodedValue`] tree.
//! - [`command_signatures`]: best-effort call signatures for client code
//!   generation.
//!
//! Validation ([`validate_command`], [`validate_package`]) rejects
//! malformed command tables before they are used.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let bitop = CommandSpec::new("BITOP")
//!     .with_arg(Slot::required("operation", Schema::one_of(["AND", "OR", "XOR"])))
//!     .with_arg(Slot::required("destkey", Schema::Text))
//!     .with_arg(Slot::required("key", Schema::list(Schema::Text)));
//! assert!(validate_command(&bitop, DEFAULT_MAX_NESTING_DEPTH).is_empty());
//!
//! let commands = vec![bitop];
//! let tokens: Vec<String> = ["AND", "dest", "key1", "key2"].map(String::from).to_vec();
//! let selection = select_overload("BITOP", &tokens, commands.as_slice()).unwrap();
//!
//! assert_eq!(
//!     selection.flattened().unwrap(),
//!     serde_json::json!(["AND", "dest", "key1", "key2"]),
//! );
//! ```

mod decode;
mod flatten;
mod numeric;
mod overload;
mod package;
mod select;
mod signature;
mod trail;
mod types;
mod validate;

pub use decode::{
    DEFAULT_MAX_NESTING_DEPTH, DecodeError, DecodeOptions, Decoded, Decoder, NumericKind, decode,
};
pub use flatten::{flatten, to_tokens};
pub use overload::{Overload, enumerate_overloads, expand_overloads, prune_redundant};
pub use package::SchemaPackage;
pub use select::{Attempt, CommandSource, Selection, Selector, select_overload};
pub use signature::{command_signatures, render_schema, render_slot, render_slots};
pub use trail::Trail;
pub use types::*;
pub use validate::{ValidationError, validate_command, validate_package};
