//! Project resource calls and the collaborator policies
//!
//! Collaborator operations tolerate two server generations. Older
//! deployments key collaborator routes by username and accept a
//! `{username}` body; newer ones key by user id and accept `{user_id}`.
//! Rather than probing the server version, each operation is an ordered
//! list of strategies with an explicit stop condition:
//!
//! - **listing**: dedicated endpoint first, then the `collaborators`
//!   field embedded in the project resource on any failure
//! - **addition**: username shape first, id shape on any failure when an
//!   id is known
//! - **removal**: username-keyed path first, id-keyed path only when the
//!   first path provably deleted nothing (`404`/`405`), so a removal can
//!   never delete twice

use serde::Serialize;

use crate::api::{dedupe_by_id, ApiClient};
use crate::error::Result;
use crate::models::{NewProject, Project, ProjectUpdate, User};

/// How a caller identifies the collaborator an operation targets.
///
/// The ordered fallback strategies live behind this type: a username
/// with a known id may fall back to the id-shaped request, a bare
/// username cannot, and a bare id skips the username shape entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum CollaboratorRef {
    /// Refer to the collaborator by username, optionally carrying the
    /// server id so the id-shaped fallback is available.
    Username {
        username: String,
        user_id: Option<i64>,
    },
    /// Refer to the collaborator by server id only.
    UserId(i64),
}

impl CollaboratorRef {
    /// A username with no id; fallbacks are unavailable.
    pub fn username(username: impl Into<String>) -> Self {
        Self::Username {
            username: username.into(),
            user_id: None,
        }
    }

    /// A username with the id to fall back to.
    pub fn username_with_id(username: impl Into<String>, user_id: i64) -> Self {
        Self::Username {
            username: username.into(),
            user_id: Some(user_id),
        }
    }

    /// An id with no username; the id shape is used directly.
    pub fn user_id(user_id: i64) -> Self {
        Self::UserId(user_id)
    }
}

/// Username-shaped collaborator addition body.
#[derive(Debug, Serialize)]
struct AddByUsername<'a> {
    username: &'a str,
}

/// Id-shaped collaborator addition body.
#[derive(Debug, Serialize)]
struct AddByUserId {
    user_id: i64,
}

impl ApiClient {
    /// List all projects visible to the current user, deduplicated by id.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects: Vec<Project> = self
            .session()
            .guard(self.transport().get_json("/projects/").await)
            .await?;
        Ok(dedupe_by_id(projects))
    }

    /// Fetch a single project.
    pub async fn get_project(&self, project_id: i64) -> Result<Project> {
        let path = format!("/projects/{}/", project_id);
        self.session()
            .guard(self.transport().get_json(&path).await)
            .await
    }

    /// Create a project. The server assigns the owner from the session.
    pub async fn create_project(&self, project: &NewProject) -> Result<Project> {
        self.session()
            .guard(self.transport().post_json("/projects/", project).await)
            .await
    }

    /// Apply a partial update. The owner is never part of the payload.
    pub async fn update_project(&self, project_id: i64, update: &ProjectUpdate) -> Result<Project> {
        let path = format!("/projects/{}/", project_id);
        self.session()
            .guard(self.transport().patch_json(&path, update).await)
            .await
    }

    /// Delete a project.
    pub async fn delete_project(&self, project_id: i64) -> Result<()> {
        let path = format!("/projects/{}/", project_id);
        self.session()
            .guard(self.transport().delete(&path).await)
            .await
    }

    /// List a project's collaborators, deduplicated by id.
    ///
    /// Tries the dedicated listing endpoint first. On any failure the
    /// full project is fetched instead and its embedded `collaborators`
    /// field is read; servers that omit the field yield an empty list.
    /// When both paths fail, the error from the fallback surfaces and
    /// the primary failure is only logged.
    pub async fn list_collaborators(&self, project_id: i64) -> Result<Vec<User>> {
        let path = format!("/projects/{}/collaborators/", project_id);
        match self
            .session()
            .guard(self.transport().get_json::<Vec<User>>(&path).await)
            .await
        {
            Ok(collaborators) => Ok(dedupe_by_id(collaborators)),
            Err(e) => {
                tracing::warn!(
                    "Dedicated collaborator listing failed ({}), reading the project resource",
                    e
                );
                let project = self.get_project(project_id).await?;
                Ok(dedupe_by_id(project.collaborators))
            }
        }
    }

    /// Add a collaborator to a project.
    ///
    /// With a username the `{username}` body is sent first; if the
    /// server rejects it for any reason and an id is known, the
    /// `{user_id}` body is tried once, and its error is the one that
    /// propagates. With only an id the id shape is sent directly.
    pub async fn add_collaborator(
        &self,
        project_id: i64,
        collaborator: &CollaboratorRef,
    ) -> Result<()> {
        let path = format!("/projects/{}/collaborators/", project_id);
        match collaborator {
            CollaboratorRef::Username { username, user_id } => {
                let first = self
                    .session()
                    .guard(
                        self.transport()
                            .post_no_content(&path, &AddByUsername { username })
                            .await,
                    )
                    .await;
                match (first, user_id) {
                    (Ok(()), _) => Ok(()),
                    (Err(e), Some(id)) => {
                        tracing::warn!(
                            "Username-shaped collaborator add rejected ({}), retrying with user id",
                            e
                        );
                        self.session()
                            .guard(
                                self.transport()
                                    .post_no_content(&path, &AddByUserId { user_id: *id })
                                    .await,
                            )
                            .await
                    }
                    (Err(e), None) => Err(e),
                }
            }
            CollaboratorRef::UserId(id) => {
                self.session()
                    .guard(
                        self.transport()
                            .post_no_content(&path, &AddByUserId { user_id: *id })
                            .await,
                    )
                    .await
            }
        }
    }

    /// Remove a collaborator from a project.
    ///
    /// The username-keyed path is deleted first. Only when that path
    /// provably deleted nothing (`404` or `405`) and an id is known does
    /// the id-keyed path get tried, so at most one delete can succeed.
    /// Any other failure propagates immediately.
    pub async fn remove_collaborator(
        &self,
        project_id: i64,
        collaborator: &CollaboratorRef,
    ) -> Result<()> {
        match collaborator {
            CollaboratorRef::Username { username, user_id } => {
                let path = format!("/projects/{}/collaborators/{}/", project_id, username);
                let first = self
                    .session()
                    .guard(self.transport().delete(&path).await)
                    .await;
                match first {
                    Ok(()) => Ok(()),
                    Err(e) if e.is_route_rejection() => match user_id {
                        Some(id) => {
                            tracing::warn!(
                                "Username-keyed removal path unavailable ({}), retrying by id",
                                e
                            );
                            self.remove_collaborator_by_id(project_id, *id).await
                        }
                        None => Err(e),
                    },
                    Err(e) => Err(e),
                }
            }
            CollaboratorRef::UserId(id) => self.remove_collaborator_by_id(project_id, *id).await,
        }
    }

    /// Delete the id-keyed collaborator path.
    async fn remove_collaborator_by_id(&self, project_id: i64, user_id: i64) -> Result<()> {
        let path = format!("/projects/{}/collaborators/{}/", project_id, user_id);
        self.session()
            .guard(self.transport().delete(&path).await)
            .await
    }
}
