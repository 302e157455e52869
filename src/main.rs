use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use glossa::annotator::Annotator;
use glossa::completer::{self, Provider};
use glossa::config::{Config, ConfigKey, Overrides, StoredSettings, resolve};
use glossa::consts::{DEFAULT_INPUT, default_db_path};
use glossa::pipeline;
use glossa::spinner::Spinner;

#[derive(Parser)]
#[command(
    name = "glossa",
    version,
    about = "Annotate every word of a text with its lemma, part of speech and semantic group.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Text file to annotate
    #[arg(default_value = DEFAULT_INPUT)]
    file: PathBuf,

    /// Completion provider (openai or anthropic)
    #[arg(short, long)]
    provider: Option<Provider>,

    /// Model identifier (provider-specific)
    #[arg(short, long)]
    model: Option<String>,

    /// Seconds to wait for the model before giving up
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Largest accepted input, in characters
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_chars: Option<u64>,

    /// SQLite database holding saved defaults [default: ~/.glossa/glossa.db]
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    /// Settings given explicitly on the command line.
    fn overrides(&self) -> anyhow::Result<Overrides> {
        let max_chars = self
            .max_chars
            .map(usize::try_from)
            .transpose()
            .context("--max-chars does not fit in memory size")?;
        Ok(Overrides {
            provider: self.provider,
            model: self.model.clone(),
            timeout_secs: self.timeout,
            max_chars,
        })
    }
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or change saved defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show every saved value
    List,
    /// Show one saved value
    Get { key: ConfigKey },
    /// Save a value
    Set { key: ConfigKey, value: String },
    /// Forget a saved value
    Unset { key: ConfigKey },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_failure(e: &anyhow::Error) {
    tracing::error!(error = %format!("{e:#}"), "run failed");
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "glossa=debug" } else { "glossa=warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = match &cli.db {
        Some(path) => Ok(path.clone()),
        None => default_db_path(),
    };

    if let Some(Command::Config { action }) = &cli.command {
        return handle_config(&db_path?, action);
    }

    let stored = match db_path {
        Ok(path) if path.exists() => Config::open(&path)?
            .settings()
            .with_context(|| format!("bad saved settings in {}", path.display()))?,
        Ok(_) => StoredSettings::default(),
        Err(e) => {
            tracing::warn!("skipping saved settings: {e:#}");
            StoredSettings::default()
        }
    };

    let overrides = cli.overrides()?;
    let settings = resolve(overrides, stored, |name| std::env::var(name).ok())?;
    tracing::debug!(
        provider = %settings.service.provider,
        model = %settings.service.model,
        timeout_secs = settings.annotator.timeout.as_secs(),
        max_chars = settings.annotator.max_input_chars,
        "resolved settings"
    );

    let annotator = Annotator::new(completer::connect(settings.service), settings.annotator);

    let spinner = Spinner::start_if_terminal("annotating");
    let outcome = pipeline::run(&cli.file, &annotator).await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn handle_config(db_path: &Path, action: &ConfigAction) -> anyhow::Result<()> {
    let config = Config::open(db_path)?;
    match action {
        ConfigAction::List => {
            for (key, value) in config.list()? {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Get { key } => match config.get(*key)? {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("`{key}` is not set"),
        },
        ConfigAction::Set { key, value } => {
            config.set(*key, value)?;
            println!("✓ {key} = {}", value.trim());
        }
        ConfigAction::Unset { key } => {
            config.remove(*key)?;
            println!("✓ {key} unset");
        }
    }
    Ok(())
}
