/// Database utilities
///
/// - [`pool`]: PostgreSQL connection pool management
/// - [`migrations`]: Migration runner built on sqlx's migration system

pub mod migrations;
pub mod pool;
