//! Diagram resource calls and the conflict-aware content updater
//!
//! Diagram content is an opaque structured value versioned implicitly by
//! its `updated_at` timestamp. A read returns the content together with
//! that timestamp; a write must present the timestamp from the last
//! read. The server compares it against the current value and rejects
//! stale writes with a `409`, which surfaces here as
//! [`ApiError::VersionConflict`](crate::error::ApiError::VersionConflict)
//! and nothing else. Classification is the updater's whole job: nothing
//! is merged, nothing is retried, and no local state changes on a
//! failed write. After a successful write the caller re-reads to obtain
//! the new canonical timestamp.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{dedupe_by_id, ApiClient};
use crate::error::Result;
use crate::models::{ContentSnapshot, Diagram};

/// Diagram creation body. Content always starts empty; it is only ever
/// mutated through the content updater.
#[derive(Debug, Serialize)]
struct NewDiagram<'a> {
    name: &'a str,
    project: i64,
    content: serde_json::Value,
}

/// Rename body for the diagram detail endpoint.
#[derive(Debug, Serialize)]
struct RenameDiagram<'a> {
    name: &'a str,
}

/// Content write body: the new content plus the expected version marker.
#[derive(Debug, Serialize)]
struct ContentWrite<'a> {
    content: &'a serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl ApiClient {
    /// List every diagram visible to the current user, deduplicated by id.
    pub async fn list_diagrams(&self) -> Result<Vec<Diagram>> {
        let diagrams: Vec<Diagram> = self
            .session()
            .guard(self.transport().get_json("/diagrams/").await)
            .await?;
        Ok(dedupe_by_id(diagrams))
    }

    /// List the diagrams belonging to one project, deduplicated by id.
    pub async fn list_diagrams_for_project(&self, project_id: i64) -> Result<Vec<Diagram>> {
        let path = format!("/diagrams/?project={}", project_id);
        let diagrams: Vec<Diagram> = self
            .session()
            .guard(self.transport().get_json(&path).await)
            .await?;
        Ok(dedupe_by_id(diagrams))
    }

    /// Fetch a single diagram, content included.
    pub async fn get_diagram(&self, diagram_id: i64) -> Result<Diagram> {
        let path = format!("/diagrams/{}/", diagram_id);
        self.session()
            .guard(self.transport().get_json(&path).await)
            .await
    }

    /// Create a diagram with empty content in the given project.
    pub async fn create_diagram(&self, name: &str, project_id: i64) -> Result<Diagram> {
        let payload = NewDiagram {
            name,
            project: project_id,
            content: serde_json::json!({}),
        };
        self.session()
            .guard(self.transport().post_json("/diagrams/", &payload).await)
            .await
    }

    /// Rename a diagram. Content and project are untouched.
    pub async fn rename_diagram(&self, diagram_id: i64, name: &str) -> Result<Diagram> {
        let path = format!("/diagrams/{}/", diagram_id);
        self.session()
            .guard(
                self.transport()
                    .patch_json(&path, &RenameDiagram { name })
                    .await,
            )
            .await
    }

    /// Delete a diagram.
    pub async fn delete_diagram(&self, diagram_id: i64) -> Result<()> {
        let path = format!("/diagrams/{}/", diagram_id);
        self.session()
            .guard(self.transport().delete(&path).await)
            .await
    }

    /// Read a diagram's content together with its version marker.
    ///
    /// The returned `updated_at` is the concurrency token to present on
    /// the next [`ApiClient::write_content`] call for this diagram.
    pub async fn read_content(&self, diagram_id: i64) -> Result<ContentSnapshot> {
        let path = format!("/diagrams/{}/content/read/", diagram_id);
        self.session()
            .guard(self.transport().get_json(&path).await)
            .await
    }

    /// Write new content, guarded by the expected version marker.
    ///
    /// A `409` from the server means the diagram changed since
    /// `expected_updated_at` was read and surfaces as
    /// [`ApiError::VersionConflict`](crate::error::ApiError::VersionConflict);
    /// the caller must re-read before retrying. On success the server's
    /// canonical timestamp has moved, so the caller re-reads to get it.
    pub async fn write_content(
        &self,
        diagram_id: i64,
        content: &serde_json::Value,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let path = format!("/diagrams/{}/content/", diagram_id);
        let payload = ContentWrite {
            content,
            updated_at: expected_updated_at,
        };
        self.session()
            .guard(self.transport().put_no_content(&path, &payload).await)
            .await
    }
}
