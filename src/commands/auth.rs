//! Session and account commands for Trazo
//!
//! These handlers drive the session lifecycle: logging in, registering,
//! ending a session, inspecting the current user, and updating profile
//! fields. State persists across invocations through the session file,
//! so `login` in one shell and `projects list` in the next share a
//! token.

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::config::{Config, OutputFormat};
use crate::models::{ProfileUpdate, Registration, User};

/// Log in and persist the session
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `username` - Account username
/// * `password` - Account password
///
/// # Returns
///
/// Returns Ok(()) on success, error if the credentials are rejected
pub async fn login(config: &Config, username: &str, password: &str) -> Result<()> {
    let client = ApiClient::new(config)?;
    let user = client.session().login(username, password).await?;
    println!("{} Logged in as {}", "ok:".green().bold(), user.username);
    Ok(())
}

/// Create an account and start a session
pub async fn register(
    config: &Config,
    username: &str,
    email: &str,
    password: &str,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    let client = ApiClient::new(config)?;
    let registration = Registration {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        first_name,
        last_name,
    };
    let user = client.session().register(&registration).await?;
    println!(
        "{} Registered and logged in as {}",
        "ok:".green().bold(),
        user.username
    );
    Ok(())
}

/// End the session and clear persisted state
///
/// The server is notified best-effort; local state is cleared even when
/// the notification fails, so a dead server cannot keep a session
/// pinned on this machine.
pub async fn logout(config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    client.session().init().await?;
    client.session().logout().await?;
    println!("{} Logged out", "ok:".green().bold());
    Ok(())
}

/// Show the currently authenticated user
pub async fn whoami(config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    match client.session().init().await? {
        Some(user) => output_user(&user, config.output.format),
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Update profile fields; omitted fields are left unchanged
pub async fn update(
    config: &Config,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    let update = ProfileUpdate {
        email,
        first_name,
        last_name,
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to update. Provide --email, --first-name, or --last-name.");
    }

    let client = super::authenticated_client(config).await?;
    let user = client.session().update_profile(&update).await?;
    println!("{} Profile updated", "ok:".green().bold());
    output_user(&user, config.output.format);
    Ok(())
}

/// Print a user in the configured output format
fn output_user(user: &User, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(user) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to render user as JSON: {}", e),
        },
        OutputFormat::Table => {
            println!("id:         {}", user.id);
            println!("username:   {}", user.username);
            if let Some(ref email) = user.email {
                println!("email:      {}", email);
            }
            if let Some(ref first_name) = user.first_name {
                println!("first name: {}", first_name);
            }
            if let Some(ref last_name) = user.last_name {
                println!("last name:  {}", last_name);
            }
        }
    }
}
