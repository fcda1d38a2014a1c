/// Authentication middleware for Axum
///
/// This module provides middleware for JWT authentication in Axum
/// applications. The middleware extracts the Bearer token from a request,
/// validates it, and adds an authentication context to request extensions.
///
/// # Request Extensions
///
/// After successful authentication, middleware adds:
/// - `AuthContext`: Contains the user id and role of the caller
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware, Extension};
/// use batidevis_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(create_jwt_middleware("your-jwt-secret")));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::UserRole;

/// Authentication context added to request extensions
///
/// This struct is added to the request after successful authentication.
/// Handlers can extract it using Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use batidevis_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Account role carried by the token
    pub role: UserRole,
}

impl AuthContext {
    /// Creates auth context from JWT claims
    pub fn from_jwt(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl AuthError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "Authentification requise".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({
            "success": false,
            "error": "UNAUTHORIZED",
            "message": message,
        }));
        (status, body).into_response()
    }
}

/// JWT authentication middleware
///
/// Validates JWT tokens from the `Authorization: Bearer <token>` header.
///
/// # Returns
///
/// Response with `AuthContext` extension added on success
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Token format is invalid
/// - Token validation fails
/// - Token has expired
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    // Add auth context to request extensions
    let auth_context = AuthContext::from_jwt(claims.sub, claims.role);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates a JWT authentication middleware closure
///
/// Helper function that captures the JWT secret and returns a middleware function.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use batidevis_shared::auth::middleware::create_jwt_middleware;
///
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```
pub fn create_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_jwt() {
        let context = AuthContext::from_jwt(42, UserRole::User);

        assert_eq!(context.user_id, 42);
        assert_eq!(context.role, UserRole::User);
        assert!(!context.is_admin());
    }

    #[test]
    fn test_auth_context_admin() {
        let context = AuthContext::from_jwt(1, UserRole::Admin);
        assert!(context.is_admin());
    }

    #[test]
    fn test_auth_error_into_response() {
        let err = AuthError::MissingCredentials;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = AuthError::InvalidFormat("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = AuthError::InvalidToken("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
