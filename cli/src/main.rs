mod output;
mod tokenize;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_args_core::{DecodeOptions, Selection, Selector, enumerate_overloads, expand_overloads};
use command_args_db::{DecoderConfig, SchemaDatabase};
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

use crate::output::{CheckOutcome, DecodeReport, OutputFormat, format_check, format_decode};
use crate::tokenize::tokenize;

#[derive(Debug, Parser)]
#[command(name = "args-decode")]
#[command(about = "Decode command invocations against argument schemas")]
struct Cli {
    /// Log decoder activity to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode one invocation and report the matching overload.
    Decode(DecodeArgs),
    /// Decode every invocation in an examples file.
    Check(CheckArgs),
    /// List the overloads of a command.
    Overloads(OverloadsArgs),
    /// Load and validate schema files or directories.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema bundle file or directory of command files (repeatable; tried in order).
    #[arg(long = "schemas")]
    schemas: Vec<PathBuf>,
    /// Decoder config YAML naming schema sources and decode options.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    #[command(flatten)]
    source: SchemaArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Treat the inputs as one shell-quoted line instead of pre-split tokens.
    #[arg(long)]
    line: bool,
    /// Print every attempt's trail, even on success.
    #[arg(long)]
    trace: bool,
    /// Command name followed by its argument tokens.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    inputs: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    source: SchemaArgs,
    /// Number of parallel decode jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// File with one invocation per line; blank lines and `#` comments are skipped.
    file: PathBuf,
}

#[derive(Debug, Args)]
struct OverloadsArgs {
    #[command(flatten)]
    source: SchemaArgs,
    /// Include overloads that are truncations of longer ones.
    #[arg(long)]
    all: bool,
    /// Command name (multi-word names may be given as separate words).
    #[arg(required = true)]
    command: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema bundle files and/or directories of command files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Decode(args) => run_decode(args),
        Command::Check(args) => run_check(args),
        Command::Overloads(args) => run_overloads(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// decode command
// ---------------------------------------------------------------------------

fn run_decode(args: DecodeArgs) -> Result<(), String> {
    let (db, options) = open_database(&args.source)?;

    let words = if args.line {
        tokenize(&args.inputs.join(" ")).map_err(|e| e.to_string())?
    } else {
        args.inputs
    };
    if words.is_empty() {
        return Err("no command given".to_string());
    }

    let (command, tokens) = resolve_command(&db, &words);
    let selection = Selector::new(options)
        .select(&command, tokens, &db)
        .map_err(|e| format!("schema for '{command}' is malformed: {e}"))?;

    let report = DecodeReport::new(&selection);
    print!("{}", format_decode(&report, args.format, args.trace)?);

    if selection.is_match() {
        Ok(())
    } else {
        Err(failure_reason(&selection))
    }
}

// ---------------------------------------------------------------------------
// check command
// ---------------------------------------------------------------------------

fn run_check(args: CheckArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let (db, options) = open_database(&args.source)?;
    let raw = fs::read_to_string(&args.file)
        .map_err(|err| format!("Failed to read '{}': {err}", args.file.display()))?;

    let lines: Vec<(usize, &str)> = raw
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let selector = Selector::new(options);
    let outcomes: Vec<CheckOutcome> = pool.install(|| {
        lines
            .par_iter()
            .map(|&(line, input)| check_line(&selector, &db, line, input))
            .collect()
    });

    print!("{}", format_check(&outcomes, args.format)?);

    let failed = outcomes.iter().filter(|outcome| !outcome.matched).count();
    if failed > 0 {
        return Err(format!(
            "{failed} of {} line(s) failed to decode",
            outcomes.len()
        ));
    }
    Ok(())
}

fn check_line(selector: &Selector, db: &SchemaDatabase, line: usize, input: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome {
        line,
        input: input.to_string(),
        command: None,
        matched: false,
        overload: None,
        arguments: None,
        error: None,
    };

    let words = match tokenize(input) {
        Ok(words) => words,
        Err(err) => {
            outcome.error = Some(err.to_string());
            return outcome;
        }
    };

    let (command, tokens) = resolve_command(db, &words);
    match selector.select(&command, tokens, db) {
        Ok(selection) => {
            outcome.matched = selection.is_match();
            outcome.overload = selection.overload;
            outcome.arguments = selection.flattened();
            if !outcome.matched {
                outcome.error = Some(failure_reason(&selection));
            }
        }
        Err(err) => outcome.error = Some(err.to_string()),
    }
    debug!(line, command = %command, matched = outcome.matched, "checked line");
    outcome.command = Some(command);
    outcome
}

// ---------------------------------------------------------------------------
// overloads command
// ---------------------------------------------------------------------------

fn run_overloads(args: OverloadsArgs) -> Result<(), String> {
    let (db, _) = open_database(&args.source)?;

    let (command, rest) = resolve_command(&db, &args.command);
    if !rest.is_empty() {
        return Err(format!("unknown command '{}'", args.command.join(" ")));
    }
    let spec = db
        .get(&command)
        .ok_or_else(|| format!("unknown command '{command}'"))?;

    let overloads = if args.all {
        expand_overloads(&spec.arguments)
    } else {
        enumerate_overloads(&spec.arguments)
    };
    for (index, overload) in overloads.iter().enumerate() {
        println!("{index}: {command}{}", overload.signature());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut commands = 0usize;
    for path in &args.inputs {
        let db = if path.is_dir() {
            SchemaDatabase::from_dir(path)
        } else {
            SchemaDatabase::from_bundle(path)
        }
        .map_err(|err| format!("'{}': {err}", path.display()))?;
        commands += db.len();
    }

    println!(
        "Validated {} source(s) declaring {commands} command(s).",
        args.inputs.len()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads the command table named by `--schemas` and/or `--config`.
///
/// Explicit `--schemas` replace the config's source list; the config's
/// decode options apply either way.
fn open_database(args: &SchemaArgs) -> Result<(SchemaDatabase, DecodeOptions), String> {
    let config = match &args.config {
        Some(path) => Some(
            DecoderConfig::load(path)
                .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        ),
        None => None,
    };
    let options = config
        .as_ref()
        .map(|config| config.decode)
        .unwrap_or_default();

    let db = if !args.schemas.is_empty() {
        args.schemas
            .iter()
            .fold(
                SchemaDatabase::builder().max_nesting_depth(options.max_nesting_depth),
                |builder, path| builder.from_path(path),
            )
            .build()
    } else if let (Some(config), Some(path)) = (&config, &args.config) {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.open_database(base)
    } else {
        return Err("no schema sources given; pass --schemas or --config".to_string());
    }
    .map_err(|e| format!("Failed to load schemas: {e}"))?;

    debug!(commands = db.len(), "schema table ready");
    Ok((db, options))
}

/// Splits `words` into a command name and its tokens.
///
/// Multi-word names are matched longest-first, each candidate tried as given
/// and then ASCII-uppercased. When nothing matches, the first word is taken
/// as the command so selection can report it as unknown.
fn resolve_command<'w>(db: &SchemaDatabase, words: &'w [String]) -> (String, &'w [String]) {
    for len in (1..=words.len()).rev() {
        let name = words[..len].join(" ");
        if db.contains(&name) {
            return (name, &words[len..]);
        }
        let upper = name.to_ascii_uppercase();
        if db.contains(&upper) {
            return (upper, &words[len..]);
        }
    }
    match words.split_first() {
        Some((first, rest)) => (first.clone(), rest),
        None => (String::new(), words),
    }
}

fn failure_reason(selection: &Selection) -> String {
    let last = selection
        .attempts
        .last()
        .and_then(|attempt| attempt.error.as_ref());
    match (selection.attempts.len(), last) {
        (_, None) => format!("no overload of '{}' matched", selection.command),
        (1, Some(err)) => err.to_string(),
        (attempts, Some(err)) => format!(
            "none of {attempts} overloads of '{}' matched (last: {err})",
            selection.command
        ),
    }
}
