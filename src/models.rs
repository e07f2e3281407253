//! Wire types for the Trazo REST API
//!
//! This module defines the resource and payload shapes exchanged with the
//! server. Response types decode tolerantly: optional fields default so
//! that divergent server serializers (detail views, nested join views)
//! all parse. Request payload types omit `None` fields from JSON via
//! `#[serde(skip_serializing_if = "Option::is_none")]` so partial updates
//! leave absent fields untouched server-side.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identity by server-assigned id, used for list deduplication.
///
/// Resources compared by id, not by structural equality: when the server
/// returns the same id twice in one list, the entries are duplicates even
/// if their field values differ.
pub trait HasId {
    /// The server-assigned identifier for this resource
    fn id(&self) -> i64;
}

/// A user account, as returned by the server.
///
/// Value object compared by `id`. Everything past `username` is optional
/// because list serializers frequently omit profile fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Server-assigned identifier
    pub id: i64,
    /// Login name, unique server-side
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl HasId for User {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A project, with its owner and collaborator set.
///
/// `collaborators` defaults to empty because the server embeds the field
/// only in some views; callers that need the authoritative set go through
/// the dedicated collaborator listing with its fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner is set at creation and never carried in update payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(default)]
    pub collaborators: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Project {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A diagram belonging to a project.
///
/// `content` is an opaque structured value; this layer never inspects it.
/// `updated_at` doubles as the implicit content version: every content
/// write must present the value from the last read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    pub id: i64,
    pub name: String,
    /// Foreign key to the owning project
    pub project: i64,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Id of the user who created the diagram; the server sends a bare
    /// integer here, not an embedded user object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
}

impl HasId for Diagram {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A diagram content read: the opaque content plus the concurrency token
/// to present on the next write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub content: serde_json::Value,
    /// Server-side modification timestamp at read time. Passing a stale
    /// value to a write yields a version conflict.
    pub updated_at: DateTime<Utc>,
}

/// Username/password pair for login
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// New-account payload for registration
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Partial profile update; `None` fields are omitted from the payload
/// and left unchanged server-side
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    /// Whether the payload carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

/// Payload for creating a project
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Partial project update; owner is never part of this payload
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Server response to a successful login or registration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Opaque token to present as `Authorization: Token <token>`
    pub token: String,
    pub user: User,
}
