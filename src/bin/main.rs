//! Trellis CLI - Compile saved configurations to SQL
//!
//! Usage:
//!   trellis compile <bundle.json> [--mode pivot|preview] [--dialect <dialect>] [--guest]
//!   trellis context <bundle.json> [--registry <registry.json>]
//!   trellis metrics <bundle.json> [--registry <registry.json>]
//!
//! Examples:
//!   trellis compile demo/bundle.json --mode pivot
//!   trellis compile demo/bundle.json --dialect sqlite --limit 50
//!   trellis metrics demo/bundle.json --registry demo/registry.json

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use trellis::compile::{compile, enforce_row_cap, CompileMode, CompileOptions};
use trellis::config::Settings;
use trellis::model::{ConfigBundle, SchemaRegistry};
use trellis::semantic::context::{build_semantic_context, ContextInput};
use trellis::semantic::metrics::{metric_statuses, missing_field_suggestions};
use trellis::sql::Dialect;
use trellis::state::{reduce, Action, EngineState};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis - compile semantic models and pivot analyses to SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a saved configuration bundle to SQL
    Compile {
        /// Path to the bundle JSON file
        bundle: PathBuf,

        /// Compilation mode
        #[arg(short, long, default_value = "pivot")]
        mode: ModeArg,

        /// SQL dialect to generate
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Row limit override
        #[arg(short, long)]
        limit: Option<u64>,

        /// Apply the restricted-caller row cap after generation
        #[arg(long)]
        guest: bool,
    },

    /// Print the AI semantic-context document for a bundle
    Context {
        /// Path to the bundle JSON file
        bundle: PathBuf,

        /// Optional schema registry JSON for expansion hints
        #[arg(short, long)]
        registry: Option<PathBuf>,

        /// Character budget override
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Validate metric availability against the bundle's model
    Metrics {
        /// Path to the bundle JSON file
        bundle: PathBuf,

        /// Optional schema registry JSON for missing-field suggestions
        #[arg(short, long)]
        registry: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Pivot,
    Preview,
}

impl From<ModeArg> for CompileMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Pivot => CompileMode::Pivot,
            ModeArg::Preview => CompileMode::Preview,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Sqlite,
    Athena,
}

impl From<DialectArg> for Dialect {
    fn from(dialect: DialectArg) -> Self {
        match dialect {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Athena => Dialect::Athena,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load_or_default() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile {
            bundle,
            mode,
            dialect,
            limit,
            guest,
        } => run_compile(&bundle, mode, dialect, limit, guest, &settings),
        Commands::Context {
            bundle,
            registry,
            max_chars,
        } => run_context(&bundle, registry.as_deref(), max_chars, &settings),
        Commands::Metrics { bundle, registry } => run_metrics(&bundle, registry.as_deref()),
    }
}

fn load_state(path: &Path) -> Result<EngineState, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("cannot read {path:?}: {e}"))?;
    let bundle: ConfigBundle =
        serde_json::from_str(&content).map_err(|e| format!("cannot parse {path:?}: {e}"))?;
    Ok(reduce(EngineState::new(), Action::LoadBundle(bundle)))
}

fn load_registry(path: Option<&Path>) -> Result<Option<SchemaRegistry>, String> {
    let Some(path) = path else { return Ok(None) };
    let content = fs::read_to_string(path).map_err(|e| format!("cannot read {path:?}: {e}"))?;
    let registry =
        serde_json::from_str(&content).map_err(|e| format!("cannot parse {path:?}: {e}"))?;
    Ok(Some(registry))
}

fn run_compile(
    bundle: &Path,
    mode: ModeArg,
    dialect: Option<DialectArg>,
    limit: Option<u64>,
    guest: bool,
    settings: &Settings,
) -> ExitCode {
    let state = match load_state(bundle) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut options = CompileOptions::default()
        .with_mode(mode.into())
        .with_dialect(dialect.map(Into::into).unwrap_or(settings.sql.dialect));
    if let Some(limit) = limit {
        options = options.with_row_limit(limit);
    }

    match compile(&state.compile_input(), &options) {
        Ok(Some(compiled)) => {
            for warning in &compiled.warnings {
                eprintln!("warning: {warning}");
            }
            let sql = if guest {
                enforce_row_cap(&compiled.sql, settings.limits.guest_rows)
            } else {
                compiled.sql
            };
            println!("{sql}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("nothing to compile: the model has no tables selected");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("compile error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_context(
    bundle: &Path,
    registry: Option<&Path>,
    max_chars: Option<usize>,
    settings: &Settings,
) -> ExitCode {
    let (state, registry) = match (load_state(bundle), load_registry(registry)) {
        (Ok(state), Ok(registry)) => (state, registry),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let context = build_semantic_context(&ContextInput {
        model: state.active_model(),
        joins: &state.joins,
        field_metadata: Some(&state.field_metadata),
        metrics: Some(&state.metrics),
        registry: registry.as_ref(),
        sample_values: Some(&state.sample_values),
        max_chars: Some(max_chars.unwrap_or(settings.context.max_chars)),
    });
    println!("{context}");
    ExitCode::SUCCESS
}

fn run_metrics(bundle: &Path, registry: Option<&Path>) -> ExitCode {
    let (state, registry) = match (load_state(bundle), load_registry(registry)) {
        (Ok(state), Ok(registry)) => (state, registry),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if state.metrics.is_empty() {
        println!("no metrics defined");
        return ExitCode::SUCCESS;
    }

    for status in metric_statuses(&state.metrics, state.active_model()) {
        let metric = state
            .metrics
            .iter()
            .find(|m| m.id == status.metric_id)
            .map(|m| m.name.as_str())
            .unwrap_or(status.metric_id.as_str());

        if status.availability.is_valid {
            println!("{metric}: available");
        } else {
            println!(
                "{metric}: missing {}",
                status.availability.missing_fields.join(", ")
            );
            let suggestions =
                missing_field_suggestions(&status.availability.missing_fields, registry.as_ref());
            for (field, tables) in suggestions {
                println!("  {field} could come from: {}", tables.join(", "));
            }
        }
    }
    ExitCode::SUCCESS
}
