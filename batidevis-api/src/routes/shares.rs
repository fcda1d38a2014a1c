/// Project share endpoints
///
/// # Endpoints
///
/// - `GET /v1/shares/pending` - Pending invitations addressed to the caller
/// - `POST /v1/shares` - Invite another user to a project
/// - `POST /v1/shares/:id/accept` - Accept a pending invitation
/// - `POST /v1/shares/:id/reject` - Reject (delete) a pending invitation
///
/// Accept and reject share the same precondition: the row must match
/// (id, caller, pending). Anything else (unknown id, someone else's
/// invitation, already processed) answers 404 with the same message, so
/// double submissions are benign.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ok, ApiResponse},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use batidevis_shared::{
    auth::{authorization::require_ownership, middleware::AuthContext},
    models::{
        project::Project,
        share::{CreateShare, PendingShare, ProjectShare, ShareRole},
        user::User,
    },
};
use serde::Deserialize;

const SHARE_GONE: &str = "Invitation introuvable ou déjà traitée";
const SHARE_ACCEPTED: &str = "Invitation acceptée";
const SHARE_REJECTED: &str = "Invitation refusée";

/// Success payload for accept/reject, a single `message` field
fn share_message(text: &str) -> serde_json::Value {
    serde_json::json!({ "message": text })
}

/// Share creation request
#[derive(Debug, Deserialize)]
pub struct CreateShareRequest {
    /// Project to share (must be owned by the caller)
    pub project_id: i64,

    /// Email of the user to invite
    pub email: String,

    /// Role to grant
    pub role: ShareRole,
}

/// Lists pending invitations addressed to the caller, enriched with project
/// and owner details, newest first
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Vec<PendingShare>>> {
    let shares = ProjectShare::list_pending_for_user(&state.db, auth.user_id).await?;
    Ok(ok(shares))
}

/// Invites another user to collaborate on one of the caller's projects
///
/// # Errors
///
/// - `404 Not Found`: Project or invitee doesn't exist
/// - `403 Forbidden`: Caller doesn't own the project
/// - `400 Bad Request`: Caller invites themselves
/// - `409 Conflict`: An invitation for this (project, user) pair already
///   exists
pub async fn create_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateShareRequest>,
) -> ApiResult<ApiResponse<ProjectShare>> {
    let project = Project::find_by_id(&state.db, req.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Projet non trouvé".to_string()))?;

    // Only the owner may share; admins manage their own projects like anyone
    require_ownership(&auth, project.user_id)?;

    let invitee = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Aucun utilisateur avec cet email".to_string()))?;

    if invitee.id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Impossible de partager un projet avec soi-même".to_string(),
        ));
    }

    let share = ProjectShare::create(
        &state.db,
        CreateShare {
            project_id: project.id,
            owner_id: auth.user_id,
            shared_with_user_id: invitee.id,
            role: req.role,
        },
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.constraint().is_some() => ApiError::Conflict(
            "Une invitation existe déjà pour cet utilisateur sur ce projet".to_string(),
        ),
        _ => ApiError::from(e),
    })?;

    Ok(ok(share))
}

/// Accepts a pending invitation addressed to the caller
///
/// The row is retained with status `accepted` (terminal).
pub async fn accept_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let accepted = ProjectShare::accept(&state.db, id, auth.user_id).await?;

    if !accepted {
        return Err(ApiError::NotFound(SHARE_GONE.to_string()));
    }

    Ok(ok(share_message(SHARE_ACCEPTED)))
}

/// Rejects a pending invitation addressed to the caller
///
/// The row is deleted outright; no rejection record is kept. A second reject
/// of the same invitation matches nothing and answers 404.
pub async fn reject_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let rejected = ProjectShare::reject(&state.db, id, auth.user_id).await?;

    if !rejected {
        return Err(ApiError::NotFound(SHARE_GONE.to_string()));
    }

    Ok(ok(share_message(SHARE_REJECTED)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_resolution_payload_is_a_message() {
        let accepted = share_message(SHARE_ACCEPTED);
        let rejected = share_message(SHARE_REJECTED);

        assert_eq!(accepted["message"], "Invitation acceptée");
        assert_eq!(rejected["message"], "Invitation refusée");
        assert_eq!(accepted.as_object().unwrap().len(), 1);
    }
}
