//! Schema table loading and decoder configuration.
//!
//! This crate loads command argument tables (from directories of command
//! files, bundle files or in-memory packages), validates them, and serves
//! them to the decoder through
//! [`CommandSource`](command_args_core::CommandSource).
//!
//! # Quick start
//!
//! ```no_run
//! use command_args_core::Selector;
//! use command_args_db::{DecoderConfig, SchemaDatabase};
//!
//! // Load commands from a directory
//! let db = SchemaDatabase::from_dir("schemas/commands/").unwrap();
//! if let Some(spec) = db.get("SET") {
//!     println!("SET declares {} arguments", spec.arguments.len());
//! }
//!
//! // Or let a config file name the sources and tunables
//! let config = DecoderConfig::load(".command-args.yml").unwrap();
//! let db = config.open_database(std::path::Path::new(".")).unwrap();
//!
//! let tokens = vec!["foo".to_string(), "bar".to_string()];
//! let selection = Selector::new(config.decode).select("SET", &tokens, &db).unwrap();
//! println!("matched: {}", selection.is_match());
//! ```

mod config;
mod error;
mod loader;

pub use config::DecoderConfig;
pub use error::{DatabaseError, Result};
pub use loader::{DatabaseBuilder, DatabaseSource, SchemaDatabase};
