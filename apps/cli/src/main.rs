//! ferrum-qb: questionnaire builder command line
//!
//! Lifts FHIR Questionnaires (and legacy LForms forms) into the editing
//! model, lowers them back, publishes to a FHIR server and keeps an
//! auto-saved editing session on disk.

mod commands;
mod config;
mod logging;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::SessionAction;
use config::Config;
use ferrum_fhir_client::SearchParams;
use ferrum_questionnaire::UserProfile;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ferrum-qb")]
#[command(about = "Lossless FHIR Questionnaire lifting, lowering and publishing")]
#[command(version)]
#[command(
    long_about = "Lossless FHIR Questionnaire lifting, lowering and publishing.\n\
\n\
Examples:\n  \
ferrum-qb lift form.json            # Show the item outline\n  \
ferrum-qb roundtrip form.json       # Verify lift + lower is lossless\n  \
ferrum-qb push form.json            # Publish to the configured server\n  \
ferrum-qb session import form.json  # Start an auto-saved session"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./ferrum-qb.{toml,yaml,json})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Lift a Questionnaire and print its item outline
    Lift { file: PathBuf },

    /// Lift then lower a Questionnaire
    Lower {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that lifting and lowering preserves the document
    Roundtrip { file: PathBuf },

    /// Remove empty members from any JSON document
    Prune {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report dangling enableWhen references and missing linkIds
    Check { file: PathBuf },

    /// Create a new Questionnaire, optionally as a copy of an existing one
    New {
        /// Copy this Questionnaire (id, title and url are cleared)
        #[arg(long)]
        from: Option<PathBuf>,
        /// Give every item of the copy a fresh linkId
        #[arg(long, requires = "from")]
        regenerate_ids: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch the newest version of a Questionnaire from the server
    Pull {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Publish a Questionnaire to the server
    Push {
        file: PathBuf,
        /// Update the existing resource instead of creating one
        #[arg(long)]
        update: bool,
        /// Publisher display name
        #[arg(long)]
        publisher_name: Option<String>,
        /// Publisher e-mail
        #[arg(long)]
        publisher_email: Option<String>,
    },

    /// Validate a Questionnaire with the server's $validate
    Validate { file: PathBuf },

    /// Search the server's Questionnaires, newest first
    Search {
        term: Option<String>,
        /// Search parameter to match the term against
        #[arg(long)]
        field: Option<String>,
        #[arg(long, default_value_t = 20)]
        count: u32,
        /// Number of result pages to follow
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Expand a value set on the terminology server
    Expand {
        url: String,
        #[arg(long)]
        filter: Option<String>,
    },

    /// Work with the auto-saved editing session
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Replace the session document with a file
    Import {
        file: PathBuf,
        /// Discard unsaved session edits without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the session document outline
    Show,
    /// Record the current guiding step
    Step { name: String },
    /// Write the lowered session document
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Forget the auto-saved session
    Discard,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _log_guard =
        logging::init_logging(&config.logging, cli.verbose).context("Failed to initialize logging")?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), server = %config.server.base_url, "Starting");

    let ok = match cli.command {
        Commands::Lift { file } => commands::lift(&file).await?,
        Commands::Lower { file, output } => commands::lower(&file, output.as_deref()).await?,
        Commands::Roundtrip { file } => commands::roundtrip(&file).await?,
        Commands::Prune { file, output } => commands::prune(&file, output.as_deref()).await?,
        Commands::Check { file } => commands::check_file(&file).await?,
        Commands::New {
            from,
            regenerate_ids,
            output,
        } => commands::new(from.as_deref(), regenerate_ids, output.as_deref()).await?,
        Commands::Pull { id, output } => commands::pull(&config, &id, output.as_deref()).await?,
        Commands::Push {
            file,
            update,
            publisher_name,
            publisher_email,
        } => {
            let user = UserProfile {
                display_name: publisher_name,
                email: publisher_email,
            };
            commands::push(&config, &file, update, user).await?
        }
        Commands::Validate { file } => commands::validate(&config, &file).await?,
        Commands::Search {
            term,
            field,
            count,
            pages,
        } => {
            let params = SearchParams {
                term,
                field,
                count: Some(count),
            };
            commands::search(&config, params, pages).await?
        }
        Commands::Expand { url, filter } => {
            commands::expand(&config, &url, filter.as_deref()).await?
        }
        Commands::Session(command) => {
            let action = match command {
                SessionCommand::Import { file, yes } => SessionAction::Import { file, yes },
                SessionCommand::Show => SessionAction::Show,
                SessionCommand::Step { name } => SessionAction::Step { name },
                SessionCommand::Export { output } => SessionAction::Export { output },
                SessionCommand::Discard => SessionAction::Discard,
            };
            commands::session(&config, action).await?
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
