use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pillarscore::catalog::{CatalogSource, Pillar, YamlCatalog};
use pillarscore::config::{self, Config};
use pillarscore::egress::{summarize, window_entries, EgressLogger, OperationKind, TimeWindow};
use pillarscore::identity::Identity;
use pillarscore::output;
use pillarscore::prompt::Prompter;
use pillarscore::questionnaire::{self, Submission};
use pillarscore::results::{self, DiagnosticResult};
use pillarscore::store::{json_file, EgressLogStore, JsonFileStore, StoreError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_STORE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// Answer the questionnaire, score it and save the result
    Score {
        /// YAML answers file (company + answers); prompts when omitted
        #[arg(short, long)]
        answers: Option<PathBuf>,
        /// Catalog file (defaults to `catalog` from the config)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the saved result as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// List saved results, newest first
    Results {
        #[arg(long)]
        json: bool,
    },
    /// Show the report of a saved result
    Show {
        /// Index of the result (1-based, as shown by `results`)
        index: usize,
        #[arg(long)]
        json: bool,
    },
    /// Re-answer a saved result and rescore it
    Edit {
        /// Index of the result (1-based, as shown by `results`)
        index: usize,
        /// YAML answers file; prompts when omitted
        #[arg(short, long)]
        answers: Option<PathBuf>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Write the report of a saved result to a file
    Export {
        /// Index of the result (1-based, as shown by `results`)
        index: usize,
        /// Output file (defaults to <company>-<date>.<ext> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,
    },
    /// Summarize recorded data egress
    Egress {
        /// Window to summarize, e.g. "7d" or "12h" (defaults to egress.window from the config)
        #[arg(long)]
        since: Option<String>,
        /// Only list entries of this operation kind (READ, WRITE, FILE_EXPORT, ...)
        #[arg(long)]
        operation: Option<OperationKind>,
        /// List individual entries after the summary
        #[arg(long)]
        entries: bool,
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pillarscore")]
#[command(about = "Business maturity diagnostics with egress accounting", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pillarscore/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// User id to act as (overrides user_id from the config)
    #[arg(short, long, global = true, env = "PILLARSCORE_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Failure that maps to a non-zero exit code
#[derive(Debug)]
enum CliError {
    Config(anyhow::Error),
    Store(StoreError),
    Other(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => EXIT_CONFIG,
            CliError::Store(StoreError::Unauthenticated) => EXIT_AUTH,
            CliError::Store(_) | CliError::Other(_) => EXIT_STORE,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Config error: {:#}", e),
            CliError::Store(e) => write!(f, "{}", e),
            CliError::Other(e) => write!(f, "{:#}", e),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Other(e)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("PILLARSCORE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Init = cli.command {
        return init_config(&mut Prompter::stdio(), cli.config);
    }

    let config = config::load_config(cli.config).map_err(CliError::Config)?;
    let identity = Identity::resolve(cli.user.as_deref(), config.user_id.as_deref());
    if identity.is_none() {
        tracing::debug!("no user id configured");
    }

    let data_dir = config.data_dir.clone().unwrap_or_else(json_file::get_data_dir);
    let store = Arc::new(JsonFileStore::new(data_dir));
    let logger = EgressLogger::new(Arc::clone(&store));
    let outcome = dispatch(cli.command, &config, identity.as_ref(), store.as_ref(), &logger);

    // Detached egress writes must land before the process exits
    logger.flush().await;
    outcome
}

fn init_config<R: std::io::BufRead, W: std::io::Write>(
    prompter: &mut Prompter<R, W>,
    path: Option<PathBuf>,
) -> Result<(), CliError> {
    config::init::run_init_wizard(prompter, path).map_err(CliError::Config)?;
    Ok(())
}

fn dispatch(
    command: Commands,
    config: &Config,
    identity: Option<&Identity>,
    store: &JsonFileStore,
    logger: &EgressLogger<JsonFileStore>,
) -> Result<(), CliError> {
    let use_colors = output::should_use_colors();

    match command {
        Commands::Init => Ok(()),
        Commands::Score {
            answers,
            catalog,
            json,
        } => {
            let pillars = load_pillars(catalog.as_deref(), config)?;
            let submission = match answers {
                Some(path) => questionnaire::load_submission(&path).map_err(CliError::Config)?,
                None => {
                    let mut prompter = Prompter::stdio();
                    let company = questionnaire::ask_company(&mut prompter)?;
                    let answers = questionnaire::ask_answers(&mut prompter, &pillars)?;
                    Submission { company, answers }
                }
            };

            let result = results::submit_result(
                store,
                logger,
                identity,
                submission.company,
                submission.answers,
                &pillars,
            )?;
            print_result(&result, json, use_colors)
        }
        Commands::Results { json } => {
            let saved = results::fetch_results(store, logger, identity)?;
            if json {
                println!("{}", to_json(&saved)?);
            } else {
                println!("{}", output::format_results_list(&saved, chrono::Utc::now(), use_colors));
            }
            Ok(())
        }
        Commands::Show { index, json } => {
            let result = nth_result(store, logger, identity, index)?;
            print_result(&result, json, use_colors)
        }
        Commands::Edit {
            index,
            answers,
            catalog,
        } => {
            let existing = nth_result(store, logger, identity, index)?;
            let pillars = load_pillars(catalog.as_deref(), config)?;
            let answers = match answers {
                Some(path) => {
                    questionnaire::load_submission(&path)
                        .map_err(CliError::Config)?
                        .answers
                }
                None => questionnaire::ask_answers(&mut Prompter::stdio(), &pillars)?,
            };

            let edited = results::edit_result(
                store,
                logger,
                identity,
                &existing,
                answers,
                &pillars,
            )?;
            print_result(&edited, false, use_colors)
        }
        Commands::Export {
            index,
            output: path,
            format,
        } => {
            let result = nth_result(store, logger, identity, index)?;
            let started = Instant::now();
            let artifact = match format {
                ExportFormat::Text => output::format_report(&result, false) + "\n",
                ExportFormat::Json => to_json(&result)? + "\n",
            };
            let path = path.unwrap_or_else(|| default_export_path(&result, format));
            std::fs::write(&path, &artifact)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            logger.log_file_export(
                identity,
                artifact.len() as u64,
                &result.company.name,
                Some(started.elapsed()),
            );
            eprintln!("Report written to {}", path.display());
            Ok(())
        }
        Commands::Egress {
            since,
            operation,
            entries,
            json,
        } => show_egress(
            store,
            identity,
            config,
            since.as_deref(),
            operation,
            entries,
            json,
            use_colors,
        ),
    }
}

fn load_pillars(explicit: Option<&Path>, config: &Config) -> Result<Vec<Pillar>, CliError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.catalog.clone())
        .ok_or_else(|| {
            CliError::Config(anyhow::anyhow!(
                "No catalog configured. Pass --catalog or set `catalog` in the config file"
            ))
        })?;

    YamlCatalog::new(path).load_catalog().map_err(CliError::Config)
}

fn nth_result(
    store: &JsonFileStore,
    logger: &EgressLogger<JsonFileStore>,
    identity: Option<&Identity>,
    index: usize,
) -> Result<DiagnosticResult, CliError> {
    if identity.is_none() {
        return Err(StoreError::Unauthenticated.into());
    }

    let saved = results::fetch_results(store, logger, identity)?;
    index
        .checked_sub(1)
        .and_then(|i| saved.into_iter().nth(i))
        .ok_or_else(|| StoreError::NotFound(format!("no result #{}", index)).into())
}

fn print_result(result: &DiagnosticResult, json: bool, use_colors: bool) -> Result<(), CliError> {
    if json {
        println!("{}", to_json(result)?);
    } else {
        println!("{}", output::format_report(result, use_colors));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn show_egress(
    store: &JsonFileStore,
    identity: Option<&Identity>,
    config: &Config,
    since: Option<&str>,
    operation: Option<OperationKind>,
    list_entries: bool,
    json: bool,
    use_colors: bool,
) -> Result<(), CliError> {
    let identity = identity.ok_or(StoreError::Unauthenticated)?;

    let span = match since {
        Some(s) => config::parse_window(s)
            .map_err(|e| CliError::Config(anyhow::anyhow!("--since: invalid '{}' - {}", s, e)))?,
        None => config
            .egress
            .window_duration()
            .unwrap_or(Duration::from_secs(30 * 24 * 60 * 60)),
    };

    let window = TimeWindow::last(span, chrono::Utc::now());
    let logs = store.load_logs(identity, &window)?;
    let summary = summarize(&logs, &window);
    let selected = window_entries(&logs, &window, operation);

    if json {
        let listed = (list_entries || operation.is_some()).then_some(&selected);
        let payload = serde_json::json!({
            "summary": summary,
            "entries": listed,
        });
        println!("{}", to_json(&payload)?);
        return Ok(());
    }

    println!("{}", output::format_egress_summary(&summary, use_colors));
    if list_entries || operation.is_some() {
        println!();
        println!("{}", output::format_egress_entries(&selected, use_colors));
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Other(anyhow::Error::new(e).context("Failed to serialize output")))
}

fn default_export_path(result: &DiagnosticResult, format: ExportFormat) -> PathBuf {
    let slug: String = result
        .company
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "diagnostic" } else { slug };

    PathBuf::from(format!(
        "{}-{}.{}",
        slug,
        result.date.format("%Y-%m-%d"),
        format.extension()
    ))
}
