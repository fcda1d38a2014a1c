/// Project share model and database operations
///
/// A project share is an invitation from a project owner to another user,
/// carrying a collaboration role. Its lifecycle is deliberately small:
///
/// ```text
/// pending ──accept──▶ accepted   (terminal, row retained)
/// pending ──reject──▶ deleted    (row removed, no trace retained)
/// ```
///
/// Rejection is a hard delete and acceptance keeps the row; this asymmetry is
/// part of the product contract, do not "fix" it by soft-deleting rejects.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE share_role AS ENUM ('editor', 'viewer');
/// CREATE TYPE share_status AS ENUM ('pending', 'accepted');
///
/// CREATE TABLE project_shares (
///     id BIGSERIAL PRIMARY KEY,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     shared_with_user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role share_role NOT NULL DEFAULT 'viewer',
///     status share_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, shared_with_user_id)
/// );
/// ```
///
/// # Concurrency
///
/// Accept and reject are single guarded statements (`WHERE id = .. AND
/// shared_with_user_id = .. AND status = 'pending'`), so a racing duplicate
/// request simply matches zero rows and reports "not found", which is benign
/// from the caller's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Collaboration role granted by a share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    /// Can modify the shared project
    Editor,

    /// Read-only access to the shared project
    Viewer,
}

impl ShareRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareRole::Editor => "editor",
            ShareRole::Viewer => "viewer",
        }
    }
}

/// Invitation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    /// Awaiting a decision from the invited user
    Pending,

    /// Accepted, collaboration in effect (terminal)
    Accepted,
}

/// Project share model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectShare {
    /// Unique share ID
    pub id: i64,

    /// Shared project ID
    pub project_id: i64,

    /// Inviting owner's user ID
    pub owner_id: i64,

    /// Invited user's ID
    pub shared_with_user_id: i64,

    /// Granted role
    pub role: ShareRole,

    /// Invitation status
    pub status: ShareStatus,

    /// When the invitation was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a share invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShare {
    /// Project to share
    pub project_id: i64,

    /// Inviting owner
    pub owner_id: i64,

    /// Invited user
    pub shared_with_user_id: i64,

    /// Role to grant
    pub role: ShareRole,
}

/// A pending invitation enriched with project and owner details, as shown in
/// the invitee's notification list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingShare {
    /// Share ID
    pub id: i64,

    /// Shared project ID
    pub project_id: i64,

    /// Granted role
    pub role: ShareRole,

    /// When the invitation was created
    pub created_at: DateTime<Utc>,

    /// Project name
    pub project_name: String,

    /// Project client
    pub project_client: Option<String>,

    /// Project typology
    pub project_typologie: Option<String>,

    /// Owner first name
    pub owner_first_name: Option<String>,

    /// Owner last name
    pub owner_last_name: Option<String>,

    /// Owner email
    pub owner_email: String,
}

const SHARE_COLUMNS: &str =
    "id, project_id, owner_id, shared_with_user_id, role, status, created_at";

impl ProjectShare {
    /// Creates a pending invitation
    ///
    /// # Errors
    ///
    /// Returns an error if an invitation for the same (project, user) pair
    /// already exists (unique constraint violation)
    pub async fn create(pool: &PgPool, data: CreateShare) -> Result<Self, sqlx::Error> {
        let share = sqlx::query_as::<_, ProjectShare>(&format!(
            r#"
            INSERT INTO project_shares (project_id, owner_id, shared_with_user_id, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {SHARE_COLUMNS}
            "#,
        ))
        .bind(data.project_id)
        .bind(data.owner_id)
        .bind(data.shared_with_user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(share)
    }

    /// Lists pending invitations addressed to a user, enriched with project
    /// and owner details, newest first
    ///
    /// Accepted shares and shares addressed to other users are never included.
    pub async fn list_pending_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<PendingShare>, sqlx::Error> {
        let shares = sqlx::query_as::<_, PendingShare>(
            r#"
            SELECT ps.id, ps.project_id, ps.role, ps.created_at,
                   p.name AS project_name,
                   p.client AS project_client,
                   p.typologie AS project_typologie,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.email AS owner_email
            FROM project_shares ps
            JOIN projects p ON p.id = ps.project_id
            JOIN users u ON u.id = ps.owner_id
            WHERE ps.shared_with_user_id = $1 AND ps.status = 'pending'
            ORDER BY ps.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(shares)
    }

    /// Accepts a pending invitation
    ///
    /// The row must match (share_id, invitee, pending); otherwise nothing is
    /// updated and `Ok(false)` is returned: the invitation does not exist,
    /// belongs to someone else, or was already processed.
    pub async fn accept(pool: &PgPool, share_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE project_shares
            SET status = 'accepted'
            WHERE id = $1 AND shared_with_user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(share_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rejects a pending invitation by deleting it
    ///
    /// Same precondition as [`accept`](Self::accept). Deletion is
    /// unconditional once matched; no rejection record is kept.
    pub async fn reject(pool: &PgPool, share_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM project_shares
            WHERE id = $1 AND shared_with_user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(share_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts accepted shares addressed to a user (their shared projects)
    pub async fn count_accepted_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM project_shares
            WHERE shared_with_user_id = $1 AND status = 'accepted'
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_role_as_str() {
        assert_eq!(ShareRole::Editor.as_str(), "editor");
        assert_eq!(ShareRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_share_status_serde() {
        assert_eq!(
            serde_json::to_string(&ShareStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ShareStatus::Accepted).unwrap(),
            "\"accepted\""
        );
    }
}
