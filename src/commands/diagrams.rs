//! Diagram commands for Trazo
//!
//! Besides plain CRUD, this module implements the content workflow:
//! `pull` saves a diagram's content together with its version marker to
//! a local file, `push` sends edited content back guarded by that
//! marker. A push against a diagram someone else changed in the
//! meantime fails with a version conflict and leaves the server
//! untouched; the fix is to pull again and re-apply the edit.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use prettytable::{row, Table};

use crate::config::{Config, OutputFormat};
use crate::error::ApiError;
use crate::models::{ContentSnapshot, Diagram};

/// List diagrams, optionally narrowed to one project
pub async fn list(config: &Config, project: Option<i64>) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let diagrams = match project {
        Some(project_id) => client.list_diagrams_for_project(project_id).await?,
        None => client.list_diagrams().await?,
    };

    match config.output.format {
        OutputFormat::Json => output_json(&diagrams)?,
        OutputFormat::Table => output_diagrams_table(&diagrams),
    }
    Ok(())
}

/// Create an empty diagram in a project
pub async fn create(config: &Config, name: String, project: i64) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let diagram = client.create_diagram(&name, project).await?;
    println!(
        "{} Created diagram {} (id {}) in project {}",
        "ok:".green().bold(),
        diagram.name,
        diagram.id,
        diagram.project
    );
    Ok(())
}

/// Show one diagram in detail
pub async fn show(config: &Config, id: i64) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let diagram = client.get_diagram(id).await?;

    match config.output.format {
        OutputFormat::Json => output_json(&diagram)?,
        OutputFormat::Table => output_diagram_detail(&diagram),
    }
    Ok(())
}

/// Rename a diagram
pub async fn rename(config: &Config, id: i64, name: String) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let diagram = client.rename_diagram(id, &name).await?;
    println!(
        "{} Renamed diagram {} to {}",
        "ok:".green().bold(),
        diagram.id,
        diagram.name
    );
    Ok(())
}

/// Delete a diagram
pub async fn delete(config: &Config, id: i64) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    client.delete_diagram(id).await?;
    println!("{} Deleted diagram {}", "ok:".green().bold(), id);
    Ok(())
}

/// Download a diagram's content and version marker to a file
pub async fn pull(config: &Config, id: i64, out: &Path) -> Result<()> {
    let client = super::authenticated_client(config).await?;
    let snapshot = client.read_content(id).await?;

    write_snapshot(out, &snapshot)?;
    println!(
        "{} Pulled diagram {} content to {} (version {})",
        "ok:".green().bold(),
        id,
        out.display(),
        snapshot.updated_at.to_rfc3339()
    );
    Ok(())
}

/// Upload content from a previously pulled file
///
/// The file's saved version marker rides along with the write. When the
/// server reports the diagram has changed since that pull, nothing is
/// overwritten and the command fails with instructions to pull again.
/// On success the local file is refreshed with the new canonical
/// version so a follow-up push works without a manual pull.
pub async fn push(config: &Config, id: i64, file: &Path) -> Result<()> {
    let snapshot = read_snapshot(file)?;
    let client = super::authenticated_client(config).await?;

    match client
        .write_content(id, &snapshot.content, snapshot.updated_at)
        .await
    {
        Ok(()) => {}
        Err(e @ ApiError::VersionConflict) => {
            eprintln!(
                "{} {}",
                "conflict:".red().bold(),
                "the diagram changed since this file was pulled"
            );
            eprintln!("Run `trazo diagrams pull {id} --out {}` and re-apply your edit.", file.display());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }

    println!("{} Pushed content to diagram {}", "ok:".green().bold(), id);

    // Refresh the local version marker so the next push starts from the
    // write that just landed.
    match client.read_content(id).await {
        Ok(fresh) => write_snapshot(file, &fresh)?,
        Err(e) => tracing::warn!("Pushed, but could not refresh the local snapshot: {}", e),
    }
    Ok(())
}

/// Read a pulled snapshot from disk
fn read_snapshot(path: &Path) -> Result<ContentSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| {
        format!(
            "{} is not a pulled diagram snapshot (expected content and updated_at)",
            path.display()
        )
    })
}

/// Write a snapshot to disk
fn write_snapshot(path: &Path, snapshot: &ContentSnapshot) -> Result<()> {
    let raw = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Output any serializable value as pretty JSON
fn output_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output diagrams in table format
fn output_diagrams_table(diagrams: &[Diagram]) {
    if diagrams.is_empty() {
        println!("No diagrams.");
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "Name", "Project", "Updated"]);

    for diagram in diagrams {
        let updated = diagram
            .updated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(row![diagram.id, diagram.name, diagram.project, updated]);
    }

    println!("\nDiagrams:\n");
    table.printstd();
    println!();
}

/// Output one diagram in detail
fn output_diagram_detail(diagram: &Diagram) {
    println!("id:      {}", diagram.id);
    println!("name:    {}", diagram.name);
    println!("project: {}", diagram.project);
    if let Some(created_by) = diagram.created_by {
        println!("author:  user {}", created_by);
    }
    if let Some(created_at) = diagram.created_at {
        println!("created: {}", created_at.to_rfc3339());
    }
    if let Some(updated_at) = diagram.updated_at {
        println!("updated: {}", updated_at.to_rfc3339());
    }
}
