//! Command and package validation.
//!
//! Catches configuration-level problems in a command table before any
//! tokens are decoded against it: variadic slots in non-final positions,
//! empty enums/tuples/unions, unnamed slots and excessive nesting. These
//! indicate a broken schema source rather than bad input, so loaders refuse
//! the table instead of failing every call.
//!
//! # Examples
//!
//! ```
//! use command_args_core::*;
//!
//! let spec = CommandSpec::new("BITOP")
//!     .with_arg(Slot::required("operation", Schema::one_of(["AND", "OR"])))
//!     .with_arg(Slot::required("key", Schema::list(Schema::Text)));
//! assert!(validate_command(&spec, DEFAULT_MAX_NESTING_DEPTH).is_empty());
//!
//! // Invalid: variadic slot followed by another slot
//! let bad = CommandSpec::new("BITOP")
//!     .with_arg(Slot::required("key", Schema::list(Schema::Text)))
//!     .with_arg(Slot::required("destkey", Schema::Text));
//! assert_eq!(
//!     validate_command(&bad, DEFAULT_MAX_NESTING_DEPTH),
//!     vec![ValidationError::VariadicMisplaced("BITOP.key".to_string())],
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandSpec, Schema, SchemaPackage, Slot};

/// Command table validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package version string is empty.
    #[error("package version cannot be empty")]
    EmptyPackageVersion,
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Two commands in the same table share a name.
    #[error("duplicate command in package: {0}")]
    DuplicateCommand(String),
    /// A slot has an empty name.
    #[error("argument name cannot be empty at: {0}")]
    EmptySlotName(String),
    /// A list appears anywhere but the final position.
    #[error("variadic argument is not in final position at: {0}")]
    VariadicMisplaced(String),
    /// An enum declares no values.
    #[error("enum declares no values at: {0}")]
    EmptyEnum(String),
    /// A tuple declares no items.
    #[error("tuple declares no items at: {0}")]
    EmptyTuple(String),
    /// A union declares no variants.
    #[error("union declares no variants at: {0}")]
    EmptyUnion(String),
    /// Tuple/list nesting exceeds the configured bound.
    #[error("schema nested deeper than {limit} levels at: {path}")]
    NestingTooDeep { path: String, limit: usize },
}

/// Validates every command of a package.
///
/// Checks for an empty version string and duplicate command names, then
/// validates each command. Stops at the first error.
pub fn validate_package(package: &SchemaPackage, max_depth: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.version.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageVersion);
        return errors;
    }

    let mut seen_commands: HashSet<&str> = HashSet::new();
    for spec in &package.commands {
        let command = spec.command.as_str();
        if !seen_commands.insert(command) {
            errors.push(ValidationError::DuplicateCommand(command.to_string()));
            return errors;
        }
        errors.extend(validate_command(spec, max_depth));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Validates one command's slot list. Stops at the first error.
pub fn validate_command(spec: &CommandSpec, max_depth: usize) -> Vec<ValidationError> {
    if spec.command.trim().is_empty() {
        return vec![ValidationError::EmptyCommandName];
    }

    let checker = Checker { max_depth };
    checker
        .slots(&spec.arguments, &spec.command, 0, true)
        .err()
        .into_iter()
        .collect()
}

struct Checker {
    max_depth: usize,
}

impl Checker {
    fn slots(
        &self,
        slots: &[Slot],
        parent: &str,
        depth: usize,
        final_position: bool,
    ) -> Result<(), ValidationError> {
        for (index, slot) in slots.iter().enumerate() {
            let path = format!("{parent}.{}", slot.name);
            if slot.name.trim().is_empty() {
                return Err(ValidationError::EmptySlotName(format!("{parent}[{index}]")));
            }
            let last = final_position && index + 1 == slots.len();
            self.schema(&slot.schema, &path, depth, last)?;
        }
        Ok(())
    }

    fn schema(
        &self,
        schema: &Schema,
        path: &str,
        depth: usize,
        last: bool,
    ) -> Result<(), ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::NestingTooDeep {
                path: path.to_string(),
                limit: self.max_depth,
            });
        }

        match schema {
            Schema::Enum { values } if values.is_empty() => {
                Err(ValidationError::EmptyEnum(path.to_string()))
            }
            Schema::Tuple { items } => {
                if items.is_empty() {
                    return Err(ValidationError::EmptyTuple(path.to_string()));
                }
                self.slots(items, path, depth + 1, false)
            }
            Schema::List { item } => {
                if !last {
                    return Err(ValidationError::VariadicMisplaced(path.to_string()));
                }
                self.schema(item, &format!("{path}[]"), depth + 1, true)
            }
            Schema::Union { variants } => {
                if variants.is_empty() {
                    return Err(ValidationError::EmptyUnion(path.to_string()));
                }
                for (index, variant) in variants.iter().enumerate() {
                    self.schema(variant, &format!("{path}|{index}"), depth, last)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
