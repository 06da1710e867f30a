//! Screentime CLI - Command-line dashboard for Screentime Insights
//!
//! Commands:
//! - report: Score a CSV dataset and render the dashboard
//! - validate: Check every row of a CSV dataset
//! - doctor: Diagnose configuration and environment
//! - schema: Describe the input CSV columns

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use screentime_insights::adapter::{CsvRecordAdapter, REQUIRED_COLUMNS};
use screentime_insights::encoder::ReportEncoder;
use screentime_insights::render::render_text;
use screentime_insights::{
    analyze_csv, CategoryFilter, ComputeError, DashboardReport, DashboardSession, LoadPolicy,
    SessionConfig, PRODUCER_NAME, VERSION,
};

/// Screentime - addiction scoring and insights for screen-time data
#[derive(Parser)]
#[command(name = "screentime")]
#[command(version = VERSION)]
#[command(about = "Score screen-time CSV data and render an insight dashboard", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a dataset and render the dashboard
    Report {
        /// Input CSV path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Category to include (repeatable); all observed categories when omitted
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Select no categories at all
        #[arg(long, conflicts_with = "categories")]
        no_categories: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Session configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Access gate username
        #[arg(short, long)]
        username: Option<String>,

        /// Access gate password
        #[arg(short, long)]
        password: Option<String>,

        /// Skip malformed rows instead of aborting
        #[arg(long)]
        skip_malformed: bool,

        /// Number of rows in the dataset preview
        #[arg(long)]
        preview_rows: Option<usize>,
    },

    /// Validate every row of a dataset
    Validate {
        /// Input CSV path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Session configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe the input CSV schema
    Schema {
        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Rendered text dashboard
    Text,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), ScreentimeCliError> {
    match cli.command {
        Commands::Report {
            input,
            output,
            categories,
            no_categories,
            format,
            config,
            username,
            password,
            skip_malformed,
            preview_rows,
        } => {
            let mut session_config = match config {
                Some(path) => SessionConfig::from_file(&path)?,
                None => SessionConfig::default(),
            };
            if skip_malformed {
                session_config.load_policy = LoadPolicy::Skip;
            }
            if let Some(rows) = preview_rows {
                session_config.preview_rows = rows;
            }

            let filter = if no_categories {
                CategoryFilter::selected(Vec::<String>::new())
            } else if categories.is_empty() {
                CategoryFilter::All
            } else {
                CategoryFilter::selected(categories)
            };

            cmd_report(
                &input,
                output.as_deref(),
                &filter,
                format,
                session_config,
                username.as_deref(),
                password.as_deref(),
            )
        }

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { json_schema } => cmd_schema(json_schema),
    }
}

fn cmd_report(
    input: &Path,
    output: Option<&Path>,
    filter: &CategoryFilter,
    format: OutputFormat,
    config: SessionConfig,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<(), ScreentimeCliError> {
    let mut session = DashboardSession::new(config);

    // Gate before touching the data
    session.authenticate(username, password)?;

    let report = if is_stdin(input) {
        let csv = read_input(input)?;
        let config = session.config();
        analyze_csv(&csv, filter, config.load_policy, config.preview_rows)?
    } else {
        session.report(input, filter)?
    };

    let rendered = format_report(&report, &format)?;

    match output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), ScreentimeCliError> {
    let data = read_input(input)?;
    let raw = CsvRecordAdapter::parse_raw(&data)?;
    let failures = CsvRecordAdapter::validate_rows(&raw);

    let report = ValidationReport {
        total_rows: raw.len(),
        valid_rows: raw.len() - failures.len(),
        invalid_rows: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                row: f.row,
                error: f.result.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Invalid rows: {}", report.invalid_rows);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Row {}: {}", err.row, err.error);
            }
        }
    }

    if report.invalid_rows > 0 {
        Err(ScreentimeCliError::ValidationFailed(report.invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), ScreentimeCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema".to_string(),
        status: CheckStatus::Ok,
        message: format!("Required columns: {}", REQUIRED_COLUMNS.join(", ")),
    });

    match config {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist; defaults will be used".to_string(),
        }),
        Some(path) => match SessionConfig::from_file(path) {
            Ok(cfg) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid (load_policy={:?}, preview_rows={}, gate {})",
                    cfg.load_policy,
                    cfg.preview_rows,
                    if cfg.access.enabled { "enabled" } else { "disabled" }
                ),
            }),
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Invalid config: {}", e),
            }),
        },
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "No config file given; using defaults".to_string(),
        }),
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (use --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Screentime Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ScreentimeCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(json_schema: bool) -> Result<(), ScreentimeCliError> {
    if json_schema {
        println!("{}", get_input_json_schema());
    } else {
        println!("Input Schema: screen-time CSV");
        println!();
        println!("A header row is required. Columns may appear in any order;");
        println!("extra columns are ignored.");
        println!();
        println!("  date           YYYY-MM-DD, YYYY/MM/DD or YYYY-MM-DD HH:MM:SS");
        println!("  app_name       non-empty text");
        println!("  category       non-empty text");
        println!("  usage_minutes  non-negative number");
        println!("  pickups        non-negative integer");
        println!("  notifications  non-negative integer");
        println!("  hour           integer 0-23");
        println!();
        println!("addiction_score = 0.5 * usage_minutes + 0.3 * pickups + 0.2 * notifications");
        println!("addiction_level = Low (< 100) | Moderate (< 200) | High");
    }

    Ok(())
}

// Helper functions

fn is_stdin(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(input: &Path) -> Result<String, ScreentimeCliError> {
    if is_stdin(input) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn format_report(report: &DashboardReport, format: &OutputFormat) -> Result<String, ScreentimeCliError> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(ReportEncoder::to_json(report)? + "\n"),
        OutputFormat::JsonPretty => Ok(ReportEncoder::to_json_pretty(report)? + "\n"),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "screentime.record",
        "description": "One row of a screen-time CSV dataset",
        "type": "object",
        "required": REQUIRED_COLUMNS,
        "properties": {
            "date": { "type": "string", "format": "date" },
            "app_name": { "type": "string", "minLength": 1 },
            "category": { "type": "string", "minLength": 1 },
            "usage_minutes": { "type": "number", "minimum": 0 },
            "pickups": { "type": "integer", "minimum": 0 },
            "notifications": { "type": "integer", "minimum": 0 },
            "hour": { "type": "integer", "minimum": 0, "maximum": 23 }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum ScreentimeCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for ScreentimeCliError {
    fn from(e: io::Error) -> Self {
        ScreentimeCliError::Io(e)
    }
}

impl From<ComputeError> for ScreentimeCliError {
    fn from(e: ComputeError) -> Self {
        ScreentimeCliError::Compute(e)
    }
}

impl From<serde_json::Error> for ScreentimeCliError {
    fn from(e: serde_json::Error) -> Self {
        ScreentimeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ScreentimeCliError> for CliError {
    fn from(e: ScreentimeCliError) -> Self {
        match e {
            ScreentimeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ScreentimeCliError::Compute(e) => compute_error(e),
            ScreentimeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ScreentimeCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix the listed rows or rerun report with --skip-malformed".to_string()),
            },
            ScreentimeCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

fn compute_error(e: ComputeError) -> CliError {
    let (code, hint) = match &e {
        ComputeError::MalformedRecord { .. } => (
            "MALFORMED_RECORD",
            Some("Run 'screentime validate' or pass --skip-malformed"),
        ),
        ComputeError::MissingColumn(_) => (
            "MISSING_COLUMN",
            Some("Run 'screentime schema' for the expected columns"),
        ),
        ComputeError::AccessDenied => (
            "ACCESS_DENIED",
            Some("Pass --username and --password"),
        ),
        ComputeError::ConfigError(_) | ComputeError::JsonError(_) => {
            ("CONFIG_ERROR", Some("Run 'screentime doctor --config <file>'"))
        }
        ComputeError::Csv(_) => ("CSV_ERROR", Some("Check CSV syntax")),
        ComputeError::Io(_) => ("IO_ERROR", Some("Check file paths and permissions")),
        ComputeError::NoData(_) => ("NO_DATA", None),
    };

    CliError {
        code: code.to_string(),
        message: e.to_string(),
        hint: hint.map(str::to_string),
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    row: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
