use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boonforge::ForgeError;
use boonforge::cli::ServiceOverrides;
use boonforge::cli::commands::catalog::CatalogQuery;
use boonforge::types::Slot;

#[derive(Parser)]
#[command(name = "boonforge")]
#[command(version, about = "AI-generated build guides for Hades II weapon aspects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh build guide
    Generate {
        #[arg(long, short, help = "Weapon name or id (e.g. \"Witch's Staff\", staff)")]
        weapon: String,
        #[arg(long, short, help = "Aspect name (e.g. \"Aspect of Circe\")")]
        aspect: String,
        #[arg(long, short, help = "Save the guide as JSON")]
        output: Option<PathBuf>,
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Regenerate a saved guide, keeping pinned items
    Refine {
        #[arg(long, short, help = "Guide JSON written by generate --output")]
        guide: PathBuf,
        #[arg(long, short, help = "Weapon name or id")]
        weapon: String,
        #[arg(long, short, help = "Aspect name (defaults to the guide's aspect)")]
        aspect: Option<String>,
        #[arg(long = "pin-boon", value_name = "SLOT", help = "Keep the boon in this slot (repeatable)")]
        pin_boons: Vec<Slot>,
        #[arg(long = "pin-hammer", value_name = "NAME", help = "Keep this hammer (repeatable)")]
        pin_hammers: Vec<String>,
        #[arg(long = "pin-duo", value_name = "NAME", help = "Keep this synergy (repeatable)")]
        pin_duos: Vec<String>,
        #[arg(long, short, help = "Save to this path instead of overwriting --guide")]
        output: Option<PathBuf>,
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Browse the reference catalog
    Catalog {
        #[command(subcommand)]
        table: CatalogTable,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct ServiceArgs {
    #[arg(long, help = "Provider: gemini, openai, ollama")]
    provider: Option<String>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
}

impl From<ServiceArgs> for ServiceOverrides {
    fn from(args: ServiceArgs) -> Self {
        Self {
            provider: args.provider,
            model: args.model,
        }
    }
}

#[derive(Subcommand)]
enum CatalogTable {
    /// List weapons
    Weapons,
    /// List aspects of a weapon
    Aspects {
        #[arg(long, short)]
        weapon: String,
        #[arg(long, help = "Include late-game aspects")]
        all: bool,
    },
    /// List boons of a god, or gods with boon counts
    Boons {
        #[arg(long)]
        god: Option<String>,
    },
    /// List hammer upgrades of a weapon
    Hammers {
        #[arg(long, short)]
        weapon: String,
    },
    /// List duo boons
    Duos,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mboonforge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Domain failures get their user-facing message; details are in the logs
            let message = match e.downcast_ref::<ForgeError>() {
                Some(err) => err.user_message(),
                None => e.to_string(),
            };
            eprintln!("\x1b[31mError:\x1b[0m {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "boonforge=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            weapon,
            aspect,
            output,
            service,
            format,
        } => {
            use boonforge::cli::commands::generate::{GenerateOptions, run};
            run(GenerateOptions {
                weapon,
                aspect,
                service: service.into(),
                output,
                format,
            })?;
        }
        Commands::Refine {
            guide,
            weapon,
            aspect,
            pin_boons,
            pin_hammers,
            pin_duos,
            output,
            service,
            format,
        } => {
            use boonforge::cli::commands::refine::{RefineOptions, run};
            run(RefineOptions {
                guide,
                weapon,
                aspect,
                pin_boons,
                pin_hammers,
                pin_duos,
                service: service.into(),
                output,
                format,
            })?;
        }
        Commands::Catalog { table, format } => {
            let query = match table {
                CatalogTable::Weapons => CatalogQuery::Weapons,
                CatalogTable::Aspects { weapon, all } => CatalogQuery::Aspects { weapon, all },
                CatalogTable::Boons { god } => CatalogQuery::Boons { god },
                CatalogTable::Hammers { weapon } => CatalogQuery::Hammers { weapon },
                CatalogTable::Duos => CatalogQuery::Duos,
            };
            boonforge::cli::commands::catalog::run(query, &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                boonforge::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                boonforge::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    boonforge::cli::commands::config::init_global(force)?;
                } else {
                    boonforge::cli::commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
