/// Own-account endpoints
///
/// # Endpoints
///
/// - `GET /v1/profile` - Read own profile
/// - `PUT /v1/profile` - Update own profile
/// - `PUT /v1/profile/password` - Change password
///
/// Any other method on `/v1/profile` answers 405 with the failure envelope.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ok, ApiResponse},
};
use axum::{extract::State, Extension, Json};
use batidevis_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateUser, User, UserRole},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile payload, the public projection of a user row
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID
    pub id: i64,

    /// Email address
    pub email: String,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Company name
    pub company: Option<String>,

    /// Account role
    pub role: UserRole,

    /// Account creation time
    pub created_at: DateTime<Utc>,

    /// Last login time
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            company: user.company,
            role: user.role,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New email address
    #[validate(email(message = "Format d'email invalide"))]
    pub email: Option<String>,

    /// New first name
    pub first_name: Option<String>,

    /// New last name
    pub last_name: Option<String>,

    /// New company name
    pub company: Option<String>,
}

/// Password change request
///
/// Field names are camelCase on the wire (`currentPassword`, `newPassword`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password, re-verified before any change
    pub current_password: String,

    /// New password (strength-checked)
    pub new_password: String,
}

/// Folds field-level validation failures into a single 400
///
/// Profile endpoints report invalid input as a plain bad request, unlike
/// registration which details each failing field.
fn validation_bad_request(errors: validator::ValidationErrors) -> ApiError {
    let messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .collect();

    if messages.is_empty() {
        ApiError::BadRequest("Requête invalide".to_string())
    } else {
        ApiError::BadRequest(messages.join(" ; "))
    }
}

/// Returns the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Utilisateur non trouvé".to_string()))?;

    Ok(ok(user.into()))
}

/// Updates the caller's profile
///
/// # Errors
///
/// - `400 Bad Request`: Invalid email format
/// - `409 Conflict`: Email already used by another account
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<ProfileResponse>> {
    req.validate().map_err(validation_bad_request)?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            email: req.email,
            password_hash: None,
            first_name: req.first_name.map(Some),
            last_name: req.last_name.map(Some),
            company: req.company.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Utilisateur non trouvé".to_string()))?;

    Ok(ok(user.into()))
}

/// Changes the caller's password
///
/// The current password is re-verified first; the new one is strength-checked.
///
/// # Errors
///
/// - `401 Unauthorized`: Current password is wrong
/// - `400 Bad Request`: New password too weak
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Utilisateur non trouvé".to_string()))?;

    let valid = password::verify_password(&req.current_password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Mot de passe actuel incorrect".to_string(),
        ));
    }

    password::validate_password_strength(&req.new_password).map_err(ApiError::BadRequest)?;

    let password_hash = password::hash_password(&req.new_password)?;

    User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            password_hash: Some(password_hash),
            ..Default::default()
        },
    )
    .await?;

    Ok(ok(serde_json::json!({ "updated": true })))
}

/// Fallback for unsupported methods on `/v1/profile`
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Méthode non autorisée sur cette ressource".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_password_request_uses_camel_case_field_names() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword": "old-secret-12", "newPassword": "new-secret-34"}"#,
        )
        .unwrap();

        assert_eq!(req.current_password, "old-secret-12");
        assert_eq!(req.new_password, "new-secret-34");
    }

    #[test]
    fn test_change_password_request_rejects_snake_case_field_names() {
        let result: Result<ChangePasswordRequest, _> = serde_json::from_str(
            r#"{"current_password": "old-secret-12", "new_password": "new-secret-34"}"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_email_maps_to_bad_request() {
        let req = UpdateProfileRequest {
            email: Some("not-an-email".to_string()),
            first_name: None,
            last_name: None,
            company: None,
        };

        let err = req.validate().map_err(validation_bad_request).unwrap_err();

        match err {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "Format d'email invalide");
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_validation_errors_still_map_to_bad_request() {
        let err = validation_bad_request(validator::ValidationErrors::new());

        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
