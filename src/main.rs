//! Trazo - project and diagram client CLI
//!
//! Main entry point for the Trazo command-line application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trazo::cli::{
    AuthCommand, Cli, CollabCommand, Commands, ConfigCommand, DiagramCommand, ProjectCommand,
};
use trazo::commands;
use trazo::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can raise the default filter.
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config = Config::load(cli.config.as_deref(), &cli)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // Execute command
    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommand::Login { username, password } => {
                commands::auth::login(&config, &username, &password).await
            }
            AuthCommand::Register {
                username,
                email,
                password,
                first_name,
                last_name,
            } => {
                commands::auth::register(&config, &username, &email, &password, first_name, last_name)
                    .await
            }
            AuthCommand::Logout => commands::auth::logout(&config).await,
            AuthCommand::Whoami => commands::auth::whoami(&config).await,
            AuthCommand::Update {
                email,
                first_name,
                last_name,
            } => commands::auth::update(&config, email, first_name, last_name).await,
        },
        Commands::Projects { command } => match command {
            ProjectCommand::List => commands::projects::list(&config).await,
            ProjectCommand::Show { id } => commands::projects::show(&config, id).await,
            ProjectCommand::Create {
                name,
                description,
                start_date,
            } => commands::projects::create(&config, name, description, start_date).await,
            ProjectCommand::Update {
                id,
                name,
                description,
                start_date,
            } => commands::projects::update(&config, id, name, description, start_date).await,
            ProjectCommand::Delete { id } => commands::projects::delete(&config, id).await,
            ProjectCommand::Collab { command } => match command {
                CollabCommand::List { project } => {
                    commands::projects::collab_list(&config, project).await
                }
                CollabCommand::Add {
                    project,
                    username,
                    user_id,
                } => commands::projects::collab_add(&config, project, username, user_id).await,
                CollabCommand::Remove {
                    project,
                    username,
                    user_id,
                } => commands::projects::collab_remove(&config, project, username, user_id).await,
            },
        },
        Commands::Diagrams { command } => match command {
            DiagramCommand::List { project } => commands::diagrams::list(&config, project).await,
            DiagramCommand::Create { name, project } => {
                commands::diagrams::create(&config, name, project).await
            }
            DiagramCommand::Show { id } => commands::diagrams::show(&config, id).await,
            DiagramCommand::Rename { id, name } => {
                commands::diagrams::rename(&config, id, name).await
            }
            DiagramCommand::Delete { id } => commands::diagrams::delete(&config, id).await,
            DiagramCommand::Pull { id, out } => commands::diagrams::pull(&config, id, &out).await,
            DiagramCommand::Push { id, file } => commands::diagrams::push(&config, id, &file).await,
        },
        Commands::Config { command } => match command {
            ConfigCommand::Init => commands::config::init(&config),
            ConfigCommand::Show => commands::config::show(&config),
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "trazo=debug" } else { "trazo=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
