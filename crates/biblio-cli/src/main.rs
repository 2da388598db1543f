//! `biblio` binary
//!
//! Clap front-end over biblio-core: authentication, book and author
//! management, display preferences, and the ratatui interface (the
//! default when no subcommand is given).

use anyhow::Result;
use clap::{Parser, Subcommand};

use biblio_core::{Config, Session};

mod commands;
mod editor;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "biblio", version, propagate_version = true)]
#[command(about = "Terminal client for the Bibliotheque book service")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print ids only, for scripting
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the full-screen interface (default)
    Tui,
    /// Sign in and store the session token
    Login {
        /// Account email
        email: String,
    },
    /// Create an account, then sign in
    Register {
        /// Account email
        email: String,
    },
    /// Drop the session token and local state
    Logout,
    /// Work with books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Work with authors
    Author {
        #[command(subcommand)]
        command: AuthorCommands,
    },
    /// Show or change display preferences
    Prefs {
        #[command(subcommand)]
        command: Option<PrefsCommands>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Summarize the session, collections, and preferences
    Status,
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a book to the catalogue
    #[command(alias = "create")]
    Add {
        /// Title
        title: String,
        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,
        /// ISBN
        #[arg(long)]
        isbn: Option<String>,
        /// Year of publication
        #[arg(short = 'y', long)]
        year: Option<i32>,
        /// Author id, repeatable
        #[arg(short, long = "author")]
        author: Vec<i64>,
    },
    /// List the catalogue
    #[command(alias = "ls")]
    List {
        /// Keep only books whose title, author, or ISBN contains this
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show one book in full
    Show {
        /// Book id
        id: i64,
    },
    /// Open a book in $EDITOR
    Edit {
        /// Book id
        id: i64,
    },
    /// Remove a book
    #[command(alias = "rm")]
    Delete {
        /// Book id
        id: i64,
    },
}

#[derive(Subcommand)]
enum AuthorCommands {
    /// Add an author
    #[command(alias = "create")]
    Add {
        /// Author name
        name: String,
        /// Short biography
        #[arg(short, long)]
        biography: Option<String>,
    },
    /// List all authors
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show the current preferences
    Show,
    /// Change one preference
    Set {
        /// theme or font_scale
        key: String,
        /// New value
        value: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Change one configuration value
    Set {
        /// api_url, data_dir, or log_file
        key: String,
        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match cli.command {
        // The TUI owns its own session; config editing never needs one.
        None | Some(Commands::Tui) => tui::run(Config::load()?).await,
        Some(Commands::Config { command }) => commands::config::run(command, &output),
        Some(command) => {
            let config = Config::load()?;
            let mut session = Session::open(&config);
            dispatch(command, &mut session, &config, &output).await
        }
    }
}

async fn dispatch(
    command: Commands,
    session: &mut Session,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Login { email } => commands::auth::login(session, email, output).await,
        Commands::Register { email } => commands::auth::register(session, email, output).await,
        Commands::Logout => commands::auth::logout(session, output),
        Commands::Book { command } => commands::book::run(command, session, output).await,
        Commands::Author { command } => commands::author::run(command, session, output).await,
        Commands::Prefs { command } => commands::prefs::run(command, session, output).await,
        Commands::Status => commands::status::show(session, config, output).await,
        Commands::Tui | Commands::Config { .. } => unreachable!("handled in main"),
    }
}
