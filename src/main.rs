//! Contact Export - back up an address book to portable files.
//!
//! Reads contacts from a `SQLite` address book once access is granted and
//! writes them as CSV or vCard 3.0, handing the file to a share command
//! when one is configured.
//!
//!   contact-export permission request   # Grant access to contacts
//!   contact-export list                 # Read and show contacts
//!   contact-export export -f vcf        # Save all contacts as vCard

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{ExportSession, Exporter};
use cli::{Cli, Commands, ConfigAction, PermissionAction};
use domain::{
    AppConfig, AppError, ContactFields, ContactRecord, ExportFormat, ExportOutcome, LoadOutcome,
    PermissionState,
};
use infrastructure::{
    CommandShareSink, ConsentFileProvider, ConsentPrompt, DirectoryFileSink, SqliteContactStore,
};

type AppSession =
    ExportSession<ConsentFileProvider, SqliteContactStore, DirectoryFileSink, CommandShareSink>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<ExitCode> {
    let mut config = match cli.config {
        Some(ref path) => infrastructure::load_config_from_file(path)?,
        None => infrastructure::load_config()?,
    };
    if let Some(database) = cli.database.clone() {
        config.contacts.database = Some(database);
    }

    let prompt = if cli.yes {
        ConsentPrompt::Fixed(Some(true))
    } else {
        ConsentPrompt::Interactive
    };

    match cli.command {
        Commands::Permission { action } => cmd_permission(&config, prompt, action).await?,
        Commands::List { json } => cmd_list(&config, prompt, json).await?,
        Commands::Export { format, output_dir } => {
            if let Some(dir) = output_dir {
                config.export.output_dir = Some(dir);
            }
            let format = format.unwrap_or(config.export.default_format);
            return Ok(cmd_export(&config, prompt, format).await);
        }
        Commands::Config { action } => cmd_config(&config, cli.config.as_deref(), action)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Wires the concrete collaborators into one session.
fn build_session(config: &AppConfig, prompt: ConsentPrompt) -> AppSession {
    let provider = ConsentFileProvider::new(config.permission_file_path(), prompt);
    let store = SqliteContactStore::new(config.contacts_db_path());
    let files = DirectoryFileSink::new(config.exports_dir(), config.export.create_output_dir);
    let share = CommandShareSink::new(config.export.share_command.clone());

    ExportSession::new(provider, store, Exporter::new(files, share)).with_fields(ContactFields {
        company: config.contacts.include_company,
    })
}

/// Permission status, request and reset.
async fn cmd_permission(
    config: &AppConfig,
    prompt: ConsentPrompt,
    action: PermissionAction,
) -> domain::Result<()> {
    match action {
        PermissionAction::Status => {
            let mut session = build_session(config, prompt);
            let status = session.check_permission().await?;
            println!("Contact permission: {}", describe_status(status));
        }
        PermissionAction::Request => {
            let mut session = build_session(config, prompt);
            let status = session.request_permission().await?;
            print_permission_result(status);
        }
        PermissionAction::Reset => {
            let provider = ConsentFileProvider::new(config.permission_file_path(), prompt);
            if provider.reset().await? {
                println!(
                    "{} Permission decision cleared ({})",
                    "✓".green().bold(),
                    provider.path().display()
                );
            } else {
                println!("No permission decision stored");
            }
        }
    }

    Ok(())
}

/// Read contacts and print them.
async fn cmd_list(config: &AppConfig, prompt: ConsentPrompt, json: bool) -> domain::Result<()> {
    let mut session = build_session(config, prompt);

    match session.load_contacts().await {
        Ok(LoadOutcome::Loaded(count)) => {
            if json {
                let out = serde_json::to_string_pretty(session.contacts())
                    .map_err(AppError::json_parse)?;
                println!("{out}");
            } else {
                println!("{}", format_contacts_table(session.contacts()));
                println!();
                println!("{} Loaded {} contacts", "✓".green().bold(), count);
            }
        }
        Ok(LoadOutcome::NoContacts) => {
            println!("{} No contacts found on device", "ℹ".blue().bold());
        }
        Err(AppError::PermissionRequired) => {
            println!(
                "{} Please grant contact permission first (contact-export permission request)",
                "Permission Required:".yellow().bold()
            );
        }
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Run the full export pipeline and report its outcome.
async fn cmd_export(config: &AppConfig, prompt: ConsentPrompt, format: ExportFormat) -> ExitCode {
    let mut session = build_session(config, prompt);
    let outcome = session.export(format).await;
    tracing::debug!(status = ?session.exporter().status(), "Export job finished");
    let code = if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };

    match outcome {
        ExportOutcome::Exported {
            filename,
            location,
            contact_count,
            shared: true,
        } => {
            println!(
                "{} Contacts exported successfully!\n\nFile: {}\nContacts: {}",
                "✓".green().bold(),
                filename.cyan(),
                contact_count
            );
            tracing::debug!("Shared {}", location);
        }
        ExportOutcome::Exported {
            location,
            contact_count,
            shared: false,
            ..
        } => {
            println!(
                "{} Export Complete\n\nContacts saved to:\n{}\n\nContacts exported: {}",
                "✓".green().bold(),
                location.to_string().cyan(),
                contact_count
            );
        }
        ExportOutcome::NoContacts => {
            println!("{} No contacts found on device", "ℹ".blue().bold());
        }
        ExportOutcome::PermissionNotGranted(status) => print_permission_result(status),
        ExportOutcome::Busy => {
            println!("{} An export is already running", "ℹ".blue().bold());
        }
        ExportOutcome::Failed { message } => {
            eprintln!("{} {}", "Error:".red().bold(), message);
        }
    }

    code
}

/// Configuration file management.
fn cmd_config(
    config: &AppConfig,
    explicit_path: Option<&std::path::Path>,
    action: ConfigAction,
) -> domain::Result<()> {
    let config_path = explicit_path.map_or_else(infrastructure::config_file_path, |p| {
        p.to_path_buf()
    });

    match action {
        ConfigAction::Init => {
            if infrastructure::ensure_config_exists(&config_path)? {
                println!(
                    "{} Created {}",
                    "✓".green().bold(),
                    config_path.display()
                );
            } else {
                println!("Config already exists: {}", config_path.display());
            }
        }
        ConfigAction::Show => {
            println!("{}", "⚙ Contact Export Configuration".bold());
            println!();
            println!("  Config file:     {}", config_path.display());
            println!("  Address book:    {}", config.contacts_db_path().display());
            println!("  Export dir:      {}", config.exports_dir().display());
            println!("  Permission file: {}", config.permission_file_path().display());
            println!("  Default format:  {}", config.export.default_format);
            println!(
                "  Share command:   {}",
                config.export.share_command.as_deref().unwrap_or("-")
            );
            println!("  Include company: {}", config.contacts.include_company);
        }
    }

    Ok(())
}

fn describe_status(status: PermissionState) -> String {
    match status {
        PermissionState::Granted => format!("{} ✅", "granted".green()),
        PermissionState::Denied => format!("{} ❌", "denied".red()),
        PermissionState::Undetermined => format!("{} ❌", "undetermined".yellow()),
    }
}

fn print_permission_result(status: PermissionState) {
    match status {
        PermissionState::Granted => {
            println!("{} Contact permission granted!", "Success:".green().bold());
        }
        PermissionState::Denied => {
            println!(
                "{} Contact access was denied",
                "Permission Denied:".red().bold()
            );
        }
        PermissionState::Undetermined => {
            println!(
                "{} Permission status is undetermined",
                "Permission Undetermined:".yellow().bold()
            );
        }
    }
}

/// Formats a table listing of contacts.
fn format_contacts_table(contacts: &[ContactRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "First", "Last", "Phones", "Emails", "Company"]);

    for contact in contacts {
        table.add_row(vec![
            contact.display_name.clone(),
            contact.first_name.clone(),
            contact.last_name.clone(),
            contact.phone_numbers.join("\n"),
            contact.emails.join("\n"),
            contact.company.clone(),
        ]);
    }

    table.to_string()
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
