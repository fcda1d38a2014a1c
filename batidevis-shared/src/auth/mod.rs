/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Axum middleware building the request-scoped [`middleware::AuthContext`]
/// - [`authorization`]: Explicit (caller, resource) authorization predicates
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Constant-time Comparison**: Password verification uses constant-time operations
///
/// # Example
///
/// ```no_run
/// use batidevis_shared::auth::password::{hash_password, verify_password};
/// use batidevis_shared::auth::jwt::{create_token, Claims, TokenType};
/// use batidevis_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // JWT token generation
/// let claims = Claims::new(42, UserRole::User, TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
