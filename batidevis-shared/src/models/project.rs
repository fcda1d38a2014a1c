/// Project model and database operations
///
/// This module provides the Project model. Every project is owned by exactly
/// one user; collaborators gain access through accepted project shares. Access
/// control for child entities (devis, lignes) is derived transitively from the
/// parent project's owner.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('Brouillon', 'En cours', 'Terminé', 'Archivé');
///
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     client VARCHAR(255),
///     typologie VARCHAR(100),
///     reference VARCHAR(100),
///     address TEXT,
///     status project_status NOT NULL DEFAULT 'Brouillon',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Status transitions are deliberately unconstrained: the owner (or an admin)
/// may set any status at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Project lifecycle status
///
/// The French labels are the persisted enum values; they are part of the
/// public API and of the stored data, so they are not translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status")]
pub enum ProjectStatus {
    /// Draft, not yet started
    #[sqlx(rename = "Brouillon")]
    #[serde(rename = "Brouillon")]
    Brouillon,

    /// Work in progress
    #[sqlx(rename = "En cours")]
    #[serde(rename = "En cours")]
    EnCours,

    /// Finished
    #[sqlx(rename = "Terminé")]
    #[serde(rename = "Terminé")]
    Termine,

    /// Archived, hidden from active listings
    #[sqlx(rename = "Archivé")]
    #[serde(rename = "Archivé")]
    Archive,
}

impl ProjectStatus {
    /// Converts status to its persisted label
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Brouillon => "Brouillon",
            ProjectStatus::EnCours => "En cours",
            ProjectStatus::Termine => "Terminé",
            ProjectStatus::Archive => "Archivé",
        }
    }

    /// Whether this status counts as "active" in user statistics
    pub fn is_active(&self) -> bool {
        matches!(self, ProjectStatus::EnCours | ProjectStatus::Brouillon)
    }

    /// Whether this status counts as "archived" in user statistics
    pub fn is_archived(&self) -> bool {
        matches!(self, ProjectStatus::Archive)
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: i64,

    /// Owning user ID
    pub user_id: i64,

    /// Project name
    pub name: String,

    /// Client name
    pub client: Option<String>,

    /// Project typology (e.g., "Rénovation", "Neuf")
    pub typologie: Option<String>,

    /// Internal reference
    pub reference: Option<String>,

    /// Site address
    pub address: Option<String>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Client name
    pub client: Option<String>,

    /// Project typology
    pub typologie: Option<String>,

    /// Internal reference
    pub reference: Option<String>,

    /// Site address
    pub address: Option<String>,
}

/// Input for updating an existing project
///
/// All fields optional; only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New client name
    pub client: Option<Option<String>>,

    /// New typology
    pub typologie: Option<Option<String>>,

    /// New internal reference
    pub reference: Option<Option<String>>,

    /// New site address
    pub address: Option<Option<String>>,

    /// New status (transitions are unconstrained)
    pub status: Option<ProjectStatus>,
}

const PROJECT_COLUMNS: &str = "id, user_id, name, client, typologie, reference, address, \
                               status, created_at, updated_at";

impl Project {
    /// Creates a new project owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (user_id, name, client, typologie, reference, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(data.name)
        .bind(data.client)
        .bind(data.typologie)
        .bind(data.reference)
        .bind(data.address)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects visible to a user: owned ones plus those shared with the
    /// user and accepted, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects
            WHERE user_id = $1
               OR EXISTS (
                   SELECT 1 FROM project_shares ps
                   WHERE ps.project_id = projects.id
                     AND ps.shared_with_user_id = $1
                     AND ps.status = 'accepted'
               )
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates an existing project
    ///
    /// Only non-None fields in `data` are written; `updated_at` is bumped.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.client.is_some() {
            bind_count += 1;
            query.push_str(&format!(", client = ${}", bind_count));
        }
        if data.typologie.is_some() {
            bind_count += 1;
            query.push_str(&format!(", typologie = ${}", bind_count));
        }
        if data.reference.is_some() {
            bind_count += 1;
            query.push_str(&format!(", reference = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(client) = data.client {
            q = q.bind(client);
        }
        if let Some(typologie) = data.typologie {
            q = q.bind(typologie);
        }
        if let Some(reference) = data.reference {
            q = q.bind(reference);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Counts a user's owned projects with an active status
    /// (`En cours` or `Brouillon`)
    pub async fn count_active_for_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM projects
            WHERE user_id = $1 AND status IN ('En cours', 'Brouillon')
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Counts a user's owned projects with status `Archivé`
    pub async fn count_archived_for_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM projects WHERE user_id = $1 AND status = 'Archivé'",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Counts distinct projects a user can see: owned plus accepted-shared
    pub async fn count_total_for_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM projects
            WHERE user_id = $1
               OR EXISTS (
                   SELECT 1 FROM project_shares ps
                   WHERE ps.project_id = projects.id
                     AND ps.shared_with_user_id = $1
                     AND ps.status = 'accepted'
               )
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Counts all projects (admin statistics)
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts distinct users who created a project in the trailing 30 days
    /// (admin statistics)
    pub async fn count_active_owners_30d(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT user_id) FROM projects
            WHERE created_at >= NOW() - INTERVAL '30 days'
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ProjectStatus::Brouillon.as_str(), "Brouillon");
        assert_eq!(ProjectStatus::EnCours.as_str(), "En cours");
        assert_eq!(ProjectStatus::Termine.as_str(), "Terminé");
        assert_eq!(ProjectStatus::Archive.as_str(), "Archivé");
    }

    #[test]
    fn test_status_buckets() {
        assert!(ProjectStatus::Brouillon.is_active());
        assert!(ProjectStatus::EnCours.is_active());
        assert!(!ProjectStatus::Termine.is_active());
        assert!(!ProjectStatus::Archive.is_active());

        assert!(ProjectStatus::Archive.is_archived());
        assert!(!ProjectStatus::Termine.is_archived());
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&ProjectStatus::EnCours).unwrap();
        assert_eq!(json, "\"En cours\"");

        let parsed: ProjectStatus = serde_json::from_str("\"Archivé\"").unwrap();
        assert_eq!(parsed, ProjectStatus::Archive);
    }
}
