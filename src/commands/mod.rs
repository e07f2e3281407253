/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `auth`     - Session and account management
- `projects` - Project and collaborator management
- `diagrams` - Diagram management and content pull/push

These handlers are intentionally small and use the library components:
the API client, the session manager, and the configuration layer.
*/

use anyhow::Result;

use crate::api::ApiClient;
use crate::config::Config;

pub mod auth;
pub mod diagrams;
pub mod projects;

/// Build a client and rehydrate the persisted session, failing with a
/// login hint when no valid session exists.
///
/// Commands that talk to authenticated endpoints go through this so the
/// "not logged in" case reads the same everywhere.
pub(crate) async fn authenticated_client(config: &Config) -> Result<ApiClient> {
    let client = ApiClient::new(config)?;
    if client.session().init().await?.is_none() {
        anyhow::bail!("Not logged in. Run `trazo auth login` first.");
    }
    Ok(client)
}

// Configuration file commands
pub mod config {
    //! `trazo config` handlers: seed a configuration file, print the
    //! effective configuration.

    use anyhow::{Context, Result};

    use crate::config::Config;

    /// Write the effective configuration to the default file location.
    ///
    /// Overrides already applied (flags, environment) are captured in
    /// the written file, so `trazo --server-url ... config init` seeds
    /// a working setup in one step.
    pub fn init(config: &Config) -> Result<()> {
        let path = Config::default_path()?;
        config
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote configuration to {}", path.display());
        Ok(())
    }

    /// Print the effective configuration as YAML.
    pub fn show(config: &Config) -> Result<()> {
        let rendered =
            serde_yaml::to_string(config).context("failed to serialize configuration")?;
        print!("{}", rendered);
        Ok(())
    }
}
