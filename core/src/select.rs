//! Overload selection.
//!
//! [`Selector::select`] looks up a command's slot list in a
//! [`CommandSource`], enumerates its overloads, and decodes the tokens
//! against each one in order. The first overload that consumes every token
//! wins; every attempt made up to that point is kept with its own trail.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::decode::{DecodeError, DecodeOptions, Decoder};
use crate::flatten::flatten;
use crate::overload::{Overload, enumerate_overloads, expand_overloads};
use crate::{CommandSpec, DecodedValue, Slot, Trail};

/// Supplies the declared slot list of a command.
///
/// Implemented for plain maps of command name to slots, for slices of
/// [`CommandSpec`], and by the database crate's loaded schema tables.
pub trait CommandSource {
    /// Slot list declared for `command`, or `None` if it is unknown.
    fn arguments(&self, command: &str) -> Option<&[Slot]>;

    /// Returns `true` if `command` is known.
    fn contains_command(&self, command: &str) -> bool {
        self.arguments(command).is_some()
    }
}

impl<S: BuildHasher> CommandSource for HashMap<String, Vec<Slot>, S> {
    fn arguments(&self, command: &str) -> Option<&[Slot]> {
        self.get(command).map(Vec::as_slice)
    }
}

impl CommandSource for BTreeMap<String, Vec<Slot>> {
    fn arguments(&self, command: &str) -> Option<&[Slot]> {
        self.get(command).map(Vec::as_slice)
    }
}

impl CommandSource for [CommandSpec] {
    fn arguments(&self, command: &str) -> Option<&[Slot]> {
        self.iter()
            .find(|spec| spec.command == command)
            .map(|spec| spec.arguments.as_slice())
    }
}

impl<T: CommandSource + ?Sized> CommandSource for &T {
    fn arguments(&self, command: &str) -> Option<&[Slot]> {
        (**self).arguments(command)
    }
}

/// One decode attempt against one overload.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    /// Index of the overload in enumeration order; `None` when the command
    /// itself was not found.
    pub overload: Option<usize>,
    /// Rendered parameter list of the overload.
    pub signature: Option<String>,
    /// Everything the decoder recorded for this attempt.
    pub trail: Trail,
    /// Why the attempt was rejected, if it was.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<DecodeError>,
}

/// Outcome of selecting an overload for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// Command that was looked up.
    pub command: String,
    /// Index of the winning overload.
    pub overload: Option<usize>,
    /// Decoded values of the winning overload.
    pub decoded: Option<Vec<DecodedValue>>,
    /// Every attempt made, in order; the winning attempt is last.
    pub attempts: Vec<Attempt>,
}

impl Selection {
    /// Returns `true` if some overload consumed every token.
    pub fn is_match(&self) -> bool {
        self.decoded.is_some()
    }

    /// Trails of every attempt, in order.
    pub fn trails(&self) -> impl Iterator<Item = &Trail> {
        self.attempts.iter().map(|attempt| &attempt.trail)
    }

    /// The winning attempt.
    pub fn matched_attempt(&self) -> Option<&Attempt> {
        self.overload
            .and_then(|_| self.attempts.last())
            .filter(|attempt| attempt.error.is_none())
    }

    /// Decoded values with trailing lists spread (see [`flatten`]).
    pub fn flattened(&self) -> Option<serde_json::Value> {
        self.decoded.as_deref().map(flatten)
    }
}

/// Runs the decoder over a command's overloads.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use command_args_core::{Schema, Selector, Slot};
///
/// let mut commands = HashMap::new();
/// commands.insert(
///     "GETRANGE".to_string(),
///     vec![
///         Slot::required("key", Schema::Text),
///         Slot::required("start", Schema::Integer),
///         Slot::required("end", Schema::Integer),
///     ],
/// );
///
/// let tokens: Vec<String> = ["mykey", "0", "-1"].map(String::from).to_vec();
/// let selection = Selector::default().select("GETRANGE", &tokens, &commands).unwrap();
/// assert!(selection.is_match());
/// assert_eq!(selection.flattened().unwrap(), serde_json::json!(["mykey", 0, -1]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Selector {
    decoder: Decoder,
}

impl Selector {
    /// Creates a selector with the given options.
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            decoder: Decoder::new(options),
        }
    }

    /// Overloads attempted for `slots`, in attempt order.
    pub fn overloads(&self, slots: &[Slot]) -> Vec<Overload> {
        if self.decoder.options().prune_redundant_overloads {
            enumerate_overloads(slots)
        } else {
            expand_overloads(slots)
        }
    }

    /// Selects the first overload of `command` that `tokens` satisfy.
    ///
    /// An unknown command yields a single attempt whose trail states that
    /// the command was not found.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`DecodeError`] (see [`DecodeError::is_fatal`]) when
    /// the command's schema is malformed. Ordinary mismatches are reported
    /// in the returned [`Selection`].
    pub fn select<S: CommandSource + ?Sized>(
        &self,
        command: &str,
        tokens: &[String],
        source: &S,
    ) -> Result<Selection, DecodeError> {
        let Some(slots) = source.arguments(command) else {
            debug!(command, "command not found");
            let err = DecodeError::CommandNotFound(command.to_string());
            return Ok(Selection {
                command: command.to_string(),
                overload: None,
                decoded: None,
                attempts: vec![Attempt {
                    overload: None,
                    signature: None,
                    trail: Trail::with_header(err.to_string()),
                    error: Some(err),
                }],
            });
        };

        let overloads = self.overloads(slots);
        debug!(
            command,
            overloads = overloads.len(),
            tokens = tokens.len(),
            "selecting overload"
        );

        let mut attempts = Vec::new();
        for (index, overload) in overloads.iter().enumerate() {
            let signature = overload.signature();
            let mut trail = Trail::with_header(format!("overload {index}: {command}{signature}"));

            let error = match self.decoder.decode(tokens, &overload.slots, &mut trail) {
                Ok(decoded) if decoded.leftover.is_empty() => {
                    debug!(command, overload = index, "overload matched");
                    attempts.push(Attempt {
                        overload: Some(index),
                        signature: Some(signature),
                        trail,
                        error: None,
                    });
                    return Ok(Selection {
                        command: command.to_string(),
                        overload: Some(index),
                        decoded: Some(decoded.values),
                        attempts,
                    });
                }
                Ok(decoded) => {
                    let err = DecodeError::LeftoverTokensUnconsumed {
                        tokens: decoded.leftover.to_vec(),
                    };
                    trail.note(err.to_string());
                    err
                }
                Err(err) if err.is_fatal() => {
                    warn!(command, overload = index, error = %err, "malformed command schema");
                    return Err(err);
                }
                Err(err) => err,
            };

            attempts.push(Attempt {
                overload: Some(index),
                signature: Some(signature),
                trail,
                error: Some(error),
            });
        }

        debug!(command, attempts = attempts.len(), "no overload matched");
        Ok(Selection {
            command: command.to_string(),
            overload: None,
            decoded: None,
            attempts,
        })
    }
}

/// Selects an overload with default [`DecodeOptions`].
///
/// See [`Selector::select`].
pub fn select_overload<S: CommandSource + ?Sized>(
    command: &str,
    tokens: &[String],
    source: &S,
) -> Result<Selection, DecodeError> {
    Selector::default().select(command, tokens, source)
}

fn serialize_error<S: Serializer>(
    error: &Option<DecodeError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
