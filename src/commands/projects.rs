//! Project and collaborator commands for Trazo
//!
//! This module provides commands for listing, inspecting, and mutating
//! projects, and for managing their collaborator sets through the
//! dual-shape add/remove policies.

use anyhow::Result;
use colored::Colorize;
use prettytable::{row, Table};

use crate::api::CollaboratorRef;
use crate::config::{Config, OutputFormat};
use crate::models::{NewProject, Project, ProjectUpdate, User};

/// List all visible projects
pub async fn list(config: &Config) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let projects = client.list_projects().await?;

    match config.output.format {
        OutputFormat::Json => output_json(&projects)?,
        OutputFormat::Table => output_projects_table(&projects),
    }
    Ok(())
}

/// Show one project in detail
pub async fn show(config: &Config, id: i64) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let project = client.get_project(id).await?;

    match config.output.format {
        OutputFormat::Json => output_json(&project)?,
        OutputFormat::Table => output_project_detail(&project),
    }
    Ok(())
}

/// Create a project
pub async fn create(
    config: &Config,
    name: String,
    description: Option<String>,
    start_date: Option<chrono::NaiveDate>,
) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let project = client
        .create_project(&NewProject {
            name,
            description,
            start_date,
        })
        .await?;
    println!(
        "{} Created project {} (id {})",
        "ok:".green().bold(),
        project.name,
        project.id
    );
    Ok(())
}

/// Update project fields; omitted fields are left unchanged
pub async fn update(
    config: &Config,
    id: i64,
    name: Option<String>,
    description: Option<String>,
    start_date: Option<chrono::NaiveDate>,
) -> Result<()> {
    if name.is_none() && description.is_none() && start_date.is_none() {
        anyhow::bail!("Nothing to update. Provide --name, --description, or --start-date.");
    }

    let client = super::authenticated_client(config).await?;
    let project = client
        .update_project(
            id,
            &ProjectUpdate {
                name,
                description,
                start_date,
            },
        )
        .await?;
    println!(
        "{} Updated project {} (id {})",
        "ok:".green().bold(),
        project.name,
        project.id
    );
    Ok(())
}

/// Delete a project
pub async fn delete(config: &Config, id: i64) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    client.delete_project(id).await?;
    println!("{} Deleted project {}", "ok:".green().bold(), id);
    Ok(())
}

/// List a project's collaborators
pub async fn collab_list(config: &Config, project_id: i64) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let collaborators = client.list_collaborators(project_id).await?;

    match config.output.format {
        OutputFormat::Json => output_json(&collaborators)?,
        OutputFormat::Table => output_collaborators_table(project_id, &collaborators),
    }
    Ok(())
}

/// Add a collaborator by username and/or user id
pub async fn collab_add(
    config: &Config,
    project_id: i64,
    username: Option<String>,
    user_id: Option<i64>,
) -> Result<()> {
    let collaborator = collaborator_ref(username, user_id)?;
    let client = super::authenticated_client(config).await?;
    client.add_collaborator(project_id, &collaborator).await?;
    println!(
        "{} Added collaborator to project {}",
        "ok:".green().bold(),
        project_id
    );
    Ok(())
}

/// Remove a collaborator by username and/or user id
pub async fn collab_remove(
    config: &Config,
    project_id: i64,
    username: Option<String>,
    user_id: Option<i64>,
) -> Result<()> {
    let collaborator = collaborator_ref(username, user_id)?;
    let client = super::authenticated_client(config).await?;
    client.remove_collaborator(project_id, &collaborator).await?;
    println!(
        "{} Removed collaborator from project {}",
        "ok:".green().bold(),
        project_id
    );
    Ok(())
}

/// Turn the optional CLI flags into a collaborator reference
fn collaborator_ref(username: Option<String>, user_id: Option<i64>) -> Result<CollaboratorRef> {
    match (username, user_id) {
        (Some(username), Some(user_id)) => Ok(CollaboratorRef::username_with_id(username, user_id)),
        (Some(username), None) => Ok(CollaboratorRef::username(username)),
        (None, Some(user_id)) => Ok(CollaboratorRef::user_id(user_id)),
        (None, None) => anyhow::bail!("Provide --username and/or --user-id."),
    }
}

/// Output any serializable value as pretty JSON
fn output_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output projects in table format
fn output_projects_table(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects.");
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "Name", "Owner", "Collaborators", "Start Date"]);

    for project in projects {
        let owner = project
            .owner
            .as_ref()
            .map(|o| o.username.clone())
            .unwrap_or_else(|| "-".to_string());
        let start_date = project
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(row![
            project.id,
            project.name,
            owner,
            project.collaborators.len(),
            start_date
        ]);
    }

    println!("\nProjects:\n");
    table.printstd();
    println!();
}

/// Output one project in detail
fn output_project_detail(project: &Project) {
    println!("id:          {}", project.id);
    println!("name:        {}", project.name);
    if let Some(ref description) = project.description {
        println!("description: {}", description);
    }
    if let Some(ref owner) = project.owner {
        println!("owner:       {} (id {})", owner.username, owner.id);
    }
    if let Some(start_date) = project.start_date {
        println!("start date:  {}", start_date);
    }
    if let Some(created_at) = project.created_at {
        println!("created at:  {}", created_at.to_rfc3339());
    }
    if !project.collaborators.is_empty() {
        let names: Vec<&str> = project
            .collaborators
            .iter()
            .map(|c| c.username.as_str())
            .collect();
        println!("collaborators: {}", names.join(", "));
    }
}

/// Output collaborators in table format
fn output_collaborators_table(project_id: i64, collaborators: &[User]) {
    if collaborators.is_empty() {
        println!("Project {} has no collaborators.", project_id);
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "Username", "Email"]);

    for collaborator in collaborators {
        table.add_row(row![
            collaborator.id,
            collaborator.username,
            collaborator.email.as_deref().unwrap_or("-")
        ]);
    }

    println!("\nCollaborators of project {}:\n", project_id);
    table.printstd();
    println!();
}
