//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ExportFormat;

/// Contact Export - back up your address book as CSV or vCard.
#[derive(Parser, Debug)]
#[command(name = "contact-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ~/.contact-export/config.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Address-book database to read.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Grant contact access without prompting.
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or change contact access.
    Permission {
        #[command(subcommand)]
        action: PermissionAction,
    },

    /// Read contacts and print them.
    List {
        /// Print contacts as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export all contacts to a CSV or vCard file.
    Export {
        /// Output format: csv or vcf.
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Directory the export file is written to.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum PermissionAction {
    /// Show the current permission status.
    Status,
    /// Ask for contact access.
    Request,
    /// Forget the stored decision.
    Reset,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Write a default configuration file.
    Init,
    /// Show the effective configuration and paths.
    Show,
}
