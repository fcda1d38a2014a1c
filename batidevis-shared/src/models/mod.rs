/// Database models for BatiDevis
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `project`: Construction projects owned by users
/// - `devis`: Quotes and their ordered line items
/// - `share`: Project-sharing invitations between users
/// - `article`: Article libraries and reusable priced catalog items
/// - `stats`: Monthly usage counters and aggregate statistics
///
/// # Example
///
/// ```no_run
/// use batidevis_shared::models::user::{User, CreateUser};
/// use batidevis_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "artisan@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: Some("Jean".to_string()),
///     last_name: Some("Dupont".to_string()),
///     company: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod article;
pub mod devis;
pub mod project;
pub mod share;
pub mod stats;
pub mod user;
