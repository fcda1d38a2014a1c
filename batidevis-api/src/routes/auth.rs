/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Token refresh
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    response::{ok, ApiResponse},
};
use axum::{extract::State, Json};
use batidevis_shared::{
    auth::{jwt, password},
    models::{
        article::Library,
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Le mot de passe doit contenir au moins 8 caractères"))]
    pub password: String,

    /// First name
    #[validate(length(max = 100, message = "Prénom trop long"))]
    pub first_name: Option<String>,

    /// Last name
    #[validate(length(max = 100, message = "Nom trop long"))]
    pub last_name: Option<String>,

    /// Company name
    #[validate(length(max = 255, message = "Nom de société trop long"))]
    pub company: Option<String>,
}

/// Register / login response payload
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: i64,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response payload
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Maps validator failures to the 422 envelope
pub(crate) fn map_validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Register a new user
///
/// Creates a new user account together with their default article library.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed (email format, password
///   strength)
/// - `409 Conflict`: Email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    req.validate().map_err(map_validation_errors)?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            company: req.company,
        },
    )
    .await?;

    // Every account starts with a default article library
    Library::create(&state.db, user.id, "Bibliothèque par défaut").await?;

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(ok(TokenResponse {
        user_id: user.id,
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// Authenticates a user and returns JWT tokens. The same 401 message is used
/// for unknown email and wrong password so the endpoint doesn't leak which
/// accounts exist.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    req.validate().map_err(map_validation_errors)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Email ou mot de passe incorrect".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Email ou mot de passe incorrect".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(ok(TokenResponse {
        user_id: user.id,
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<ApiResponse<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(ok(RefreshResponse { access_token }))
}
