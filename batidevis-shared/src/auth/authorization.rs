/// Authorization helpers and permission checks
///
/// This module provides the access-control predicates used by API handlers.
///
/// # Permission Model
///
/// 1. **Ownership**: a project belongs to exactly one user (`projects.user_id`)
/// 2. **Admin override**: admin accounts may act on any project
/// 3. **Sharing**: an accepted project share grants read access to the
///    recipient (checked at query level, see `Project::list_for_user`)
///
/// # Example
///
/// ```no_run
/// use batidevis_shared::auth::authorization::require_project_access;
/// use batidevis_shared::auth::middleware::AuthContext;
/// use batidevis_shared::models::project::Project;
///
/// fn check(auth: &AuthContext, project: &Project) -> Result<(), Box<dyn std::error::Error>> {
///     require_project_access(auth, project)?;
///     Ok(())
/// }
/// ```

use super::middleware::AuthContext;
use crate::models::project::Project;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither the owner of the resource nor an admin
    #[error("Accès non autorisé à ce projet")]
    NotProjectOwner,

    /// Caller doesn't own the resource
    #[error("Accès non autorisé à cette ressource")]
    NotAuthorized,

    /// Caller doesn't have the admin role
    #[error("Réservé aux administrateurs")]
    AdminRequired,
}

/// Checks whether the caller may read a project's devis and export data.
///
/// Access is granted to the project owner or to any admin account. The check
/// runs against an already-loaded project row so the handler controls the
/// order of existence vs. authorization errors.
///
/// # Errors
///
/// Returns `AuthzError::NotProjectOwner` if the caller is neither the owner
/// nor an admin
pub fn require_project_access(auth: &AuthContext, project: &Project) -> Result<(), AuthzError> {
    if auth.is_admin() || project.user_id == auth.user_id {
        return Ok(());
    }

    Err(AuthzError::NotProjectOwner)
}

/// Checks if the caller owns a resource
///
/// Verifies that the resource's owner_id matches the authenticated user.
/// Admins do NOT bypass this check; it guards personal resources such as
/// article libraries and pending invitations.
pub fn require_ownership(auth: &AuthContext, resource_owner_id: i64) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Checks if the caller holds the admin role
///
/// Guards the global statistics endpoint and other admin-only surfaces.
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin() {
        return Err(AuthzError::AdminRequired);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectStatus;
    use crate::models::user::UserRole;
    use chrono::Utc;

    fn project_owned_by(user_id: i64) -> Project {
        Project {
            id: 10,
            user_id,
            name: "Villa Dupont".to_string(),
            client: Some("M. Dupont".to_string()),
            typologie: Some("Maison individuelle".to_string()),
            reference: None,
            address: None,
            status: ProjectStatus::EnCours,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_has_access() {
        let auth = AuthContext::from_jwt(5, UserRole::User);
        assert!(require_project_access(&auth, &project_owned_by(5)).is_ok());
    }

    #[test]
    fn test_non_owner_denied() {
        let auth = AuthContext::from_jwt(6, UserRole::User);
        assert!(matches!(
            require_project_access(&auth, &project_owned_by(5)),
            Err(AuthzError::NotProjectOwner)
        ));
    }

    #[test]
    fn test_admin_overrides_ownership() {
        let auth = AuthContext::from_jwt(99, UserRole::Admin);
        assert!(require_project_access(&auth, &project_owned_by(5)).is_ok());
    }

    #[test]
    fn test_require_ownership() {
        let auth = AuthContext::from_jwt(7, UserRole::User);
        assert!(require_ownership(&auth, 7).is_ok());
        assert!(require_ownership(&auth, 8).is_err());

        // Admin role does not bypass personal-resource ownership
        let admin = AuthContext::from_jwt(1, UserRole::Admin);
        assert!(require_ownership(&admin, 2).is_err());
    }

    #[test]
    fn test_require_admin() {
        let admin = AuthContext::from_jwt(1, UserRole::Admin);
        assert!(require_admin(&admin).is_ok());

        let user = AuthContext::from_jwt(2, UserRole::User);
        assert!(matches!(require_admin(&user), Err(AuthzError::AdminRequired)));
    }

    #[test]
    fn test_authz_error_display() {
        assert!(AuthzError::NotProjectOwner.to_string().contains("projet"));
        assert!(AuthzError::AdminRequired
            .to_string()
            .contains("administrateurs"));
    }
}
