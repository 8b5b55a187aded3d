//! Decoder configuration.
//!
//! Defines the YAML-serializable configuration naming the schema sources to
//! load and the decoding tunables to apply.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! schemas:
//!   - schemas/commands.json
//!   - schemas/commands/
//! decode:
//!   max_nesting_depth: 8
//!   prune_redundant_overloads: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use command_args_core::DecodeOptions;
use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, Result};
use crate::loader::SchemaDatabase;

/// Top-level decoder configuration.
///
/// Loaded from a YAML file (typically `.command-args.yml` next to the
/// schema files). Missing `schemas` and `decode` keys take their defaults.
///
/// # Examples
///
/// ```
/// use command_args_db::DecoderConfig;
///
/// let config: DecoderConfig = serde_yaml::from_str(r#"
/// version: "1.0"
/// schemas: [commands.json]
/// decode: { max_nesting_depth: 4 }
/// "#).unwrap();
///
/// assert_eq!(config.decode.max_nesting_depth, 4);
/// assert!(!config.decode.prune_redundant_overloads);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Schema sources, tried in order. Directories are loaded as
    /// directories of command files, anything else as a bundle.
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    /// Decoding and selection tunables.
    #[serde(default)]
    pub decode: DecodeOptions,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            schemas: Vec::new(),
            decode: DecodeOptions::default(),
        }
    }
}

impl DecoderConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Schema paths with relative entries resolved against `base`
    /// (usually the directory holding the config file).
    pub fn schema_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.schemas
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }

    /// Loads the first available schema source.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NoSourcesAvailable`] if `schemas` is empty
    /// or every source fails to load.
    pub fn open_database(&self, base: &Path) -> Result<SchemaDatabase> {
        if self.schemas.is_empty() {
            return Err(DatabaseError::NoSourcesAvailable);
        }
        self.schema_paths(base)
            .into_iter()
            .fold(
                SchemaDatabase::builder().max_nesting_depth(self.decode.max_nesting_depth),
                |builder, path| builder.from_path(path),
            )
            .build()
    }
}
