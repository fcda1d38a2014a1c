/// JWT token generation and validation module
///
/// This module provides JWT functionality for user authentication. Tokens are
/// signed using HS256 (HMAC-SHA256) and carry the user's identity and role.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 24 hours for access tokens, 30 days for refresh tokens
/// - **Validation**: Signature, expiration, and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use batidevis_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use batidevis_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, UserRole::User, TokenType::Access);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

const ISSUER: &str = "batidevis";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived, 24 hours)
    Access,

    /// Refresh token (long-lived, 30 days)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "batidevis")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `role`: Account role, so handlers can check admin status without a
///   database round-trip
/// - `token_type`: Access or refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: i64,

    /// Issuer - Always "batidevis"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Account role (custom claim)
    pub role: UserRole,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Creates new claims with the default expiration for the token type
    pub fn new(user_id: i64, role: UserRole, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, role, token_type, token_type.default_expiration())
    }

    /// Creates claims with a custom expiration
    pub fn with_expiration(
        user_id: i64,
        role: UserRole,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            role,
            token_type,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiration, `nbf`, and issuer.
///
/// # Errors
///
/// Returns an error if the signature is invalid, the token has expired, the
/// issuer doesn't match, or the token format is invalid
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks it's an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::ValidationError(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

/// Validates a token and checks it's a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::ValidationError(
            "Expected refresh token, got access token".to_string(),
        ));
    }

    Ok(claims)
}

/// Exchanges a valid refresh token for a new access token
///
/// The new access token carries the same subject and role as the refresh
/// token, with a fresh 24-hour expiration.
///
/// # Errors
///
/// Returns an error if the refresh token is invalid or expired
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let claims = validate_refresh_token(refresh_token, secret)?;

    let access_claims = Claims::new(claims.sub, claims.role, TokenType::Access);
    create_token(&access_claims, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(42, UserRole::User, TokenType::Access);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        let validated = validate_token(&token, SECRET).expect("Validation should succeed");
        assert_eq!(validated.sub, 42);
        assert_eq!(validated.role, UserRole::User);
        assert_eq!(validated.token_type, TokenType::Access);
        assert_eq!(validated.iss, "batidevis");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(42, UserRole::User, TokenType::Access);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        assert!(validate_token(&token, "another-secret-also-32-bytes-long!").is_err());
    }

    #[test]
    fn test_expired_token() {
        let claims =
            Claims::with_expiration(42, UserRole::User, TokenType::Access, Duration::seconds(-10));
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        match validate_token(&token, SECRET) {
            Err(JwtError::Expired) => {}
            other => panic!("Expected Expired error, got {:?}", other),
        }
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let claims = Claims::new(42, UserRole::User, TokenType::Access);
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        assert!(validate_refresh_token(&token, SECRET).is_err());
        assert!(validate_access_token(&token, SECRET).is_ok());
    }

    #[test]
    fn test_refresh_access_token() {
        let claims = Claims::new(7, UserRole::Admin, TokenType::Refresh);
        let refresh = create_token(&claims, SECRET).expect("Token creation should succeed");

        let access = refresh_access_token(&refresh, SECRET).expect("Refresh should succeed");
        let validated = validate_access_token(&access, SECRET).expect("Validation should succeed");

        assert_eq!(validated.sub, 7);
        assert_eq!(validated.role, UserRole::Admin);
    }

    #[test]
    fn test_is_expired() {
        let live = Claims::new(1, UserRole::User, TokenType::Access);
        assert!(!live.is_expired());

        let dead =
            Claims::with_expiration(1, UserRole::User, TokenType::Access, Duration::seconds(-1));
        assert!(dead.is_expired());
    }
}
