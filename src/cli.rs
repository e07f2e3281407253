//! Command-line interface definition for Trazo
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, project and collaborator
//! management, and diagram content workflows.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

/// Trazo - project and diagram client
///
/// Manage projects, collaborators, and diagram content on a Trazo
/// server from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "trazo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the configured server base URL
    #[arg(long, env = "TRAZO_SERVER_URL")]
    pub server_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Trazo
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage the session and account
    Auth {
        /// Session subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Manage projects and their collaborators
    Projects {
        /// Project subcommand
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Manage diagrams and their content
    Diagrams {
        /// Diagram subcommand
        #[command(subcommand)]
        command: DiagramCommand,
    },

    /// Manage the configuration file
    Config {
        /// Configuration subcommand
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Session and account subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Log in and persist the session
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "TRAZO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and start a session
    Register {
        /// Desired username
        #[arg(short, long)]
        username: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "TRAZO_PASSWORD", hide_env_values = true)]
        password: String,

        /// Optional first name
        #[arg(long)]
        first_name: Option<String>,

        /// Optional last name
        #[arg(long)]
        last_name: Option<String>,
    },

    /// End the session and clear persisted state
    Logout,

    /// Show the currently authenticated user
    Whoami,

    /// Update profile fields; omitted fields are left unchanged
    Update {
        /// New email address
        #[arg(long)]
        email: Option<String>,

        /// New first name
        #[arg(long)]
        first_name: Option<String>,

        /// New last name
        #[arg(long)]
        last_name: Option<String>,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    /// List all visible projects
    List,

    /// Show one project in detail
    Show {
        /// Project id
        id: i64,
    },

    /// Create a project
    Create {
        /// Project name
        #[arg(short, long)]
        name: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,

        /// Optional start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<chrono::NaiveDate>,
    },

    /// Update project fields; omitted fields are left unchanged
    Update {
        /// Project id
        id: i64,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<chrono::NaiveDate>,
    },

    /// Delete a project
    Delete {
        /// Project id
        id: i64,
    },

    /// Manage a project's collaborators
    Collab {
        /// Collaborator subcommand
        #[command(subcommand)]
        command: CollabCommand,
    },
}

/// Collaborator subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CollabCommand {
    /// List a project's collaborators
    List {
        /// Project id
        #[arg(short, long)]
        project: i64,
    },

    /// Add a collaborator by username and/or user id
    Add {
        /// Project id
        #[arg(short, long)]
        project: i64,

        /// Collaborator username
        #[arg(short, long)]
        username: Option<String>,

        /// Collaborator user id, used as fallback when the server
        /// rejects the username shape
        #[arg(long)]
        user_id: Option<i64>,
    },

    /// Remove a collaborator by username and/or user id
    Remove {
        /// Project id
        #[arg(short, long)]
        project: i64,

        /// Collaborator username
        #[arg(short, long)]
        username: Option<String>,

        /// Collaborator user id, used as fallback when the
        /// username-keyed route is unavailable
        #[arg(long)]
        user_id: Option<i64>,
    },
}

/// Diagram subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DiagramCommand {
    /// List diagrams, optionally narrowed to one project
    List {
        /// Only diagrams belonging to this project
        #[arg(short, long)]
        project: Option<i64>,
    },

    /// Create an empty diagram in a project
    Create {
        /// Diagram name
        #[arg(short, long)]
        name: String,

        /// Owning project id
        #[arg(short, long)]
        project: i64,
    },

    /// Show one diagram in detail
    Show {
        /// Diagram id
        id: i64,
    },

    /// Rename a diagram
    Rename {
        /// Diagram id
        id: i64,

        /// New name
        #[arg(short, long)]
        name: String,
    },

    /// Delete a diagram
    Delete {
        /// Diagram id
        id: i64,
    },

    /// Download a diagram's content and version marker to a file
    Pull {
        /// Diagram id
        id: i64,

        /// Destination file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Upload content from a previously pulled file
    Push {
        /// Diagram id
        id: i64,

        /// Source file written by `diagrams pull`
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Write a default configuration file
    Init,

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
