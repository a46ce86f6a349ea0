use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmi_export::render;
use cmi_extract::{instruction, response_schema, ExtractionMode, GeminiBackend};
use env_logger::{Builder, Env};
use log::debug;
use std::path::{Path, PathBuf};

mod config;
mod convert;
mod state;

use convert::{ConvertOptions, OutputFormat};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CMI_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "cmi",
    version,
    long_version = LONG_VERSION,
    about = "Turn CMI card-settlement statements into accounting journal rows"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract journal rows from a PDF/PNG/JPEG statement and export them
    Convert {
        /// Statement file
        file: PathBuf,

        /// Declared media type (defaults to the one implied by the file extension)
        #[arg(long)]
        mime: Option<String>,

        /// rows: the model writes the journal; groups: the model reads figures and the rule is applied here
        #[arg(long)]
        mode: Option<ExtractionMode>,

        /// Fail when model-produced rows break the accounting rule
        #[arg(long)]
        strict: bool,

        /// Output file (default: configured fixed name in the current directory)
        #[arg(long, short)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
        format: OutputFormat,

        /// Also save the extracted rows as JSON
        #[arg(long)]
        rows_json: Option<PathBuf>,

        /// Show the table only
        #[arg(long)]
        no_export: bool,
    },

    /// Print rows saved with --rows-json as a table
    Render {
        rows_json: PathBuf,
    },

    /// Export rows saved with --rows-json
    Export {
        rows_json: PathBuf,

        #[arg(long, short)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
        format: OutputFormat,
    },

    /// Print the instruction and response schema sent to the model
    Prompt {
        #[arg(long, default_value_t = ExtractionMode::Groups)]
        mode: ExtractionMode,
    },

    /// Manage config.toml in ~/.cmi-journal (or $CMI_HOME)
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

/// Load `.env` (or `env_file`), then build the logger so a filter set there applies.
fn load_env(env_file: Option<&Path>, filter_var: &str) -> (Option<PathBuf>, Builder) {
    let loaded = match env_file {
        Some(p) => dotenvy::from_path(p).ok().map(|_| p.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    };
    let logger = Builder::from_env(Env::default().filter_or(filter_var, "info"));
    (loaded, logger)
}

#[tokio::main]
async fn main() -> Result<()> {
    let (loaded, mut logger) = load_env(None, "RUST_LOG");
    logger.init();
    if let Some(p) = loaded {
        debug!("loaded {}", p.display());
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            file,
            mime,
            mode,
            strict,
            out,
            format,
            rows_json,
            no_export,
        } => {
            let cfg = config::load_config()?;
            let opts = ConvertOptions {
                file,
                mime,
                mode,
                strict,
                out,
                format,
                rows_json,
                no_export,
            };
            let backend = GeminiBackend::new(config::gemini_config(&cfg)?)?;
            convert::run(opts, &cfg, backend).await?;
        }

        Command::Render { rows_json } => {
            let rows = state::read_rows_json(&rows_json)?;
            println!("{}", render(&rows));
            println!("{} rows", rows.len());
        }

        Command::Export { rows_json, out, format } => {
            let cfg = config::load_config()?;
            let rows = state::read_rows_json(&rows_json)?;
            let path = convert::export_rows(&rows, format, out, &cfg)?;
            println!("Exported {} rows to {}", rows.len(), path.display());
        }

        Command::Prompt { mode } => {
            println!("{}", instruction(mode));
            let schema = serde_json::to_string_pretty(&response_schema(mode)).context("serialize schema")?;
            println!("Response schema:\n{schema}");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
            ConfigCommand::Path => println!("{}", config::config_path()?.display()),
        },
    }

    Ok(())
}
