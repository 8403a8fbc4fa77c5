//! chartplan CLI - Compile chart query requests to SQL
//!
//! Usage:
//!   chartplan compile <request.json> [--scope <scope.json>] [--dialect <dialect>]
//!   chartplan plan <request.json>
//!   chartplan columns [--entity <ENTITY>]
//!
//! Examples:
//!   chartplan compile status_by_campaign.json --dialect postgres
//!   chartplan compile coverage.json --scope project_5.json
//!   chartplan columns --entity TEST_CASE

use chartplan::config::Settings;
use chartplan::domain::{ColumnCatalog, ColumnType, DomainSchema};
use chartplan::engine::{ChartEngine, CompiledQuery};
use chartplan::error::ExecutionFailure;
use chartplan::planner::QueryPlanBuilder;
use chartplan::query::{QueryDefinition, QueryRequest};
use chartplan::scope::Scope;
use chartplan::services::{AllowAll, QueryExecutor};
use chartplan::sql::Dialect;
use chartplan::tuples::Tuple;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chartplan")]
#[command(about = "chartplan - Plan and compile chart queries to multi-dialect SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a chart query request to SQL
    Compile {
        /// Path to the request JSON file
        file: PathBuf,

        /// Path to a scope JSON file (list of {"type", "id"} references)
        #[arg(short, long)]
        scope: Option<PathBuf>,

        /// SQL dialect to generate (defaults to the configured one)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Print the join plan of a chart query request
    Plan {
        /// Path to the request JSON file
        file: PathBuf,
    },

    /// List the chartable columns
    Columns {
        /// Only list columns of this entity (e.g. TEST_CASE)
        #[arg(short, long)]
        entity: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Mysql,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with the plan as comments
    Verbose,
}

/// The CLI never executes; compile only.
struct Offline;

impl QueryExecutor for Offline {
    fn execute(&self, _query: &CompiledQuery) -> Result<Vec<Tuple>, ExecutionFailure> {
        Err(ExecutionFailure::new("no datastore available offline"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings);

    match cli.command {
        Commands::Compile {
            file,
            scope,
            dialect,
            output,
        } => cmd_compile(&settings, file, scope, dialect, output),
        Commands::Plan { file } => cmd_plan(file),
        Commands::Columns { entity } => cmd_columns(entity),
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_definition(file: &Path) -> Result<QueryDefinition, String> {
    let source = fs::read_to_string(file)
        .map_err(|e| format!("Error reading file '{}': {}", file.display(), e))?;
    let request = QueryRequest::from_json(&source)
        .map_err(|e| format!("Invalid request '{}': {}", file.display(), e))?;
    request
        .resolve(ColumnCatalog::global())
        .map_err(|e| format!("Invalid request '{}': {}", file.display(), e))
}

fn read_scope(file: Option<PathBuf>) -> Result<Scope, String> {
    let Some(file) = file else {
        return Ok(Scope::new());
    };
    let source = fs::read_to_string(&file)
        .map_err(|e| format!("Error reading file '{}': {}", file.display(), e))?;
    Scope::from_json(&source).map_err(|e| format!("Invalid scope '{}': {}", file.display(), e))
}

fn cmd_compile(
    settings: &Settings,
    file: PathBuf,
    scope: Option<PathBuf>,
    dialect: Option<DialectArg>,
    output: OutputFormat,
) -> ExitCode {
    let inputs = read_definition(&file).and_then(|d| read_scope(scope).map(|s| (d, s)));
    let (definition, scope) = match inputs {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = match ChartEngine::new(&AllowAll, &Offline).configure(settings) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let engine = match dialect {
        Some(d) => engine.with_dialect(d.into()),
        None => engine,
    };

    match engine.compile(&definition, &scope) {
        Ok(compiled) => {
            match output {
                OutputFormat::Sql => {
                    println!("{}", compiled.sql);
                }
                OutputFormat::Verbose => {
                    println!("-- chartplan compiled SQL");
                    println!("-- Source: {}", file.display());
                    println!("-- Dialect: {}", compiled.dialect);
                    for line in compiled.plan.to_string().lines() {
                        println!("-- {}", line);
                    }
                    println!();
                    println!("{}", compiled.sql);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_plan(file: PathBuf) -> ExitCode {
    let definition = match read_definition(&file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match QueryPlanBuilder::new(DomainSchema::global()).build(&definition) {
        Ok(plan) => {
            print!("{}", plan);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Planning error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_columns(entity: Option<String>) -> ExitCode {
    let entity = entity.map(|e| e.to_uppercase());
    let mut listed = 0;

    for column in ColumnCatalog::global().iter() {
        let owner = column.entity.entity_type.as_str();
        if entity.as_deref().is_some_and(|e| e != owner) {
            continue;
        }
        let kind = match &column.column_type {
            ColumnType::Attribute => "attribute",
            ColumnType::Calculated(_) => "calculated",
            ColumnType::Cuf => "custom field",
        };
        println!("  - {} ({}, {}, {})", column.label, owner, column.data_type, kind);
        listed += 1;
    }

    if listed == 0 {
        println!("No columns found.");
    }
    ExitCode::SUCCESS
}
