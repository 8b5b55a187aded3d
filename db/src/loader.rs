//! Schema table loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaDatabase`] for in-memory command lookup and
//! [`DatabaseBuilder`] for constructing a database from multiple sources with
//! automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use command_args_db::SchemaDatabase;
//!
//! // Load from a directory of per-command JSON/YAML files
//! let db = SchemaDatabase::from_dir("schemas/commands/").unwrap();
//! assert!(db.get("SET").is_some());
//!
//! // Load from a single bundle (a SchemaPackage or a plain command table)
//! let db = SchemaDatabase::from_bundle("schemas/commands.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let db = SchemaDatabase::builder()
//!     .from_dir("schemas/commands/")
//!     .from_bundle("schemas/commands.json")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Every load validates the whole table before returning it, so a
//! [`SchemaDatabase`] never holds a command the decoder would reject as
//! malformed.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use command_args_core::{
    CommandSource, CommandSpec, DEFAULT_MAX_NESTING_DEPTH, SchemaPackage, Slot, ValidationError,
    validate_package,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{DatabaseError, Result};

/// Describes where a [`SchemaDatabase`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSource {
    /// Loaded from a directory of individual command files.
    Directory(PathBuf),
    /// Loaded from a single bundle file.
    Bundle(PathBuf),
    /// Built from an in-memory [`SchemaPackage`].
    Package,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<DatabaseSource>),
}

/// Bundle file contents: either a full package or the bare
/// `{ "COMMAND": [slots...] }` table emitted by schema generators.
#[derive(Deserialize)]
#[serde(untagged)]
enum Bundle {
    Package(SchemaPackage),
    Table(BTreeMap<String, Vec<Slot>>),
}

impl Bundle {
    fn into_package(self) -> SchemaPackage {
        match self {
            Self::Package(package) => package,
            Self::Table(table) => {
                let mut package = SchemaPackage::new("1.0.0");
                package.commands = table
                    .into_iter()
                    .map(|(command, arguments)| CommandSpec {
                        command,
                        summary: None,
                        arguments,
                    })
                    .collect();
                package
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    fn read<T: DeserializeOwned>(self, path: &Path) -> Result<T> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(match self {
            Self::Json => serde_json::from_reader(reader)?,
            Self::Yaml => serde_yaml::from_reader(reader)?,
        })
    }
}

/// In-memory command table with O(1) lookup by name.
///
/// Implements [`CommandSource`], so it can be handed straight to
/// [`Selector::select`](command_args_core::Selector::select).
///
/// # Examples
///
/// ```
/// use command_args_core::*;
/// use command_args_db::SchemaDatabase;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.commands.push(
///     CommandSpec::new("GET").with_arg(Slot::required("key", Schema::Text)),
/// );
/// let db = SchemaDatabase::from_package(package).unwrap();
///
/// let tokens = vec!["mykey".to_string()];
/// let selection = select_overload("GET", &tokens, &db).unwrap();
/// assert!(selection.is_match());
/// ```
#[derive(Debug)]
pub struct SchemaDatabase {
    commands: HashMap<String, CommandSpec>,
    source: DatabaseSource,
}

impl SchemaDatabase {
    /// Returns a new [`DatabaseBuilder`] for configuring a fallback chain.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Loads commands from a directory of `*.json`, `*.yaml` and `*.yml`
    /// files, each holding one [`CommandSpec`]. Other files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the directory or a file cannot
    /// be read, a [`JsonError`](DatabaseError::JsonError) or
    /// [`YamlError`](DatabaseError::YamlError) if a file does not parse, and
    /// [`DatabaseError::InvalidSchema`] if the resulting table fails
    /// validation (including two files declaring the same command).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_dir(path.as_ref(), DEFAULT_MAX_NESTING_DEPTH)
    }

    /// Loads commands from a single bundle file.
    ///
    /// The bundle may be a [`SchemaPackage`] or a plain mapping from
    /// command name to slot list, in JSON or YAML (chosen by extension).
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnsupportedFormat`] for an unknown
    /// extension, I/O and parse errors as they occur, and
    /// [`DatabaseError::InvalidSchema`] if the table fails validation.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_bundle(path.as_ref(), DEFAULT_MAX_NESTING_DEPTH)
    }

    /// Builds a database from an in-memory package.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidSchema`] if the package fails
    /// validation.
    pub fn from_package(package: SchemaPackage) -> Result<Self> {
        Self::load_package(package, DatabaseSource::Package, DEFAULT_MAX_NESTING_DEPTH)
    }

    fn load_dir(path: &Path, max_depth: usize) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if let Some(format) = Format::of(&file_path) {
                files.push((file_path, format));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut package = SchemaPackage::new("1.0.0");
        for (file_path, format) in &files {
            debug!(path = %file_path.display(), "reading command file");
            package.commands.push(format.read(file_path)?);
        }

        Self::load_package(
            package,
            DatabaseSource::Directory(path.to_path_buf()),
            max_depth,
        )
    }

    fn load_bundle(path: &Path, max_depth: usize) -> Result<Self> {
        let format = Format::of(path)
            .ok_or_else(|| DatabaseError::UnsupportedFormat(path.display().to_string()))?;
        let bundle: Bundle = format.read(path)?;

        Self::load_package(
            bundle.into_package(),
            DatabaseSource::Bundle(path.to_path_buf()),
            max_depth,
        )
    }

    fn load_package(
        package: SchemaPackage,
        source: DatabaseSource,
        max_depth: usize,
    ) -> Result<Self> {
        let errors = validate_package(&package, max_depth);
        if !errors.is_empty() {
            return Err(DatabaseError::InvalidSchema(describe(&errors)));
        }

        let commands: HashMap<String, CommandSpec> = package
            .commands
            .into_iter()
            .map(|spec| (spec.command.clone(), spec))
            .collect();
        info!(commands = commands.len(), source = ?source, "loaded command table");

        Ok(Self { commands, source })
    }

    /// Looks up a command by name in O(1) time.
    pub fn get(&self, command: &str) -> Option<&CommandSpec> {
        self.commands.get(command)
    }

    /// Inserts a command, replacing any existing entry of the same name.
    ///
    /// The spec is not validated; use
    /// [`validate_command`](command_args_core::validate_command) first when
    /// it comes from an untrusted source.
    pub fn insert(&mut self, spec: CommandSpec) {
        self.commands.insert(spec.command.clone(), spec);
    }

    /// Returns `true` if the database contains `command`.
    pub fn contains(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Returns the number of commands in the database.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the database contains no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the command names in sorted order.
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &DatabaseSource {
        &self.source
    }
}

impl CommandSource for SchemaDatabase {
    fn arguments(&self, command: &str) -> Option<&[Slot]> {
        self.get(command).map(|spec| spec.arguments.as_slice())
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builder for constructing a [`SchemaDatabase`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`DatabaseError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use command_args_db::SchemaDatabase;
///
/// let db = SchemaDatabase::builder()
///     .from_dir("/opt/schemas/commands/")
///     .from_bundle("/opt/schemas/commands.json")
///     .max_nesting_depth(4)
///     .build()
///     .unwrap();
/// ```
pub struct DatabaseBuilder {
    sources: Vec<DatabaseSource>,
    max_depth: usize,
}

impl DatabaseBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Adds a directory of command files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DatabaseSource::Directory(path.into()));
        self
    }

    /// Adds a bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DatabaseSource::Bundle(path.into()));
        self
    }

    /// Adds `path` as a directory source if it is a directory, otherwise as
    /// a bundle source.
    pub fn from_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            self.from_dir(path)
        } else {
            self.from_bundle(path)
        }
    }

    /// Sets the nesting bound used when validating loaded tables.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Attempts to load commands from configured sources in order.
    ///
    /// Returns the first successfully loaded database. If all sources fail,
    /// returns [`DatabaseError::NoSourcesAvailable`]; each failure is
    /// logged at `warn` level.
    pub fn build(self) -> Result<SchemaDatabase> {
        if self.sources.is_empty() {
            return Err(DatabaseError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                DatabaseSource::Directory(path) => SchemaDatabase::load_dir(path, self.max_depth),
                DatabaseSource::Bundle(path) => SchemaDatabase::load_bundle(path, self.max_depth),
                DatabaseSource::Package | DatabaseSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut db) => {
                    db.source = DatabaseSource::Multiple(all_sources);
                    return Ok(db);
                }
                Err(err) => warn!(source = ?source, error = %err, "schema source failed"),
            }
        }

        Err(DatabaseError::NoSourcesAvailable)
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
