use serde::{Deserialize, Serialize};

use crate::{CommandSpec, Slot};

/// Serializable command table used for distribution.
///
/// A package groups the [`CommandSpec`] of many commands with version
/// metadata, making it suitable for shipping as a single JSON or YAML file.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.name = Some("string-commands".into());
/// package.commands.push(
///     CommandSpec::new("GET").with_arg(Slot::required("key", Schema::Text)),
/// );
///
/// assert_eq!(package.command_count(), 1);
/// assert_eq!(package.arguments("GET").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// Schema contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package format version (semver string).
    pub version: String,
    /// Optional package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Commands included in this package.
    pub commands: Vec<CommandSpec>,
}

impl SchemaPackage {
    /// Creates an empty package.
    ///
    /// The `schema_version` is set from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION).
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            commands: Vec::new(),
        }
    }

    /// Returns the number of commands in this package.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Slot list of `command`, if present.
    pub fn arguments(&self, command: &str) -> Option<&[Slot]> {
        self.commands
            .iter()
            .find(|spec| spec.command == command)
            .map(|spec| spec.arguments.as_slice())
    }
}
