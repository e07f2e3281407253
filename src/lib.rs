//! Trazo - project and diagram client library
//!
//! This library provides the client-side core for the Trazo project and
//! diagram service: session lifecycle management, typed resource calls
//! with fallback policies, and conflict-aware diagram content updates.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Token and user lifecycle, persistence, forced logout on
//!   authentication failure
//! - `api`: Typed resource calls for projects, diagrams, and
//!   collaborators, including the content updater
//! - `transport`: Credential-attaching HTTP boundary and error
//!   classification
//! - `models`: Wire types shared between the API and its callers
//! - `config`: Configuration management and validation
//! - `error`: Error taxonomy and result alias
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use trazo::api::ApiClient;
//! use trazo::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let client = ApiClient::new(&config)?;
//!
//!     if client.session().init().await?.is_some() {
//!         let projects = client.list_projects().await?;
//!         println!("{} projects", projects.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use api::{ApiClient, CollaboratorRef};
pub use config::Config;
pub use error::{ApiError, Result};
pub use models::{ContentSnapshot, Diagram, Project, User};
pub use session::{SessionManager, SessionState, SessionStore};
