/// Monthly statistics counters and aggregate queries
///
/// One `statistics` row exists per (user, month); the month column always
/// holds the first day of the month (`YYYY-MM-01`), which is the lookup key.
/// Counters are incremented by upsert; reads default missing rows to zero.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE statistics (
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     month DATE NOT NULL,
///     exports_realises INTEGER NOT NULL DEFAULT 0,
///     devis_crees INTEGER NOT NULL DEFAULT 0,
///     PRIMARY KEY (user_id, month)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use batidevis_shared::models::stats::Statistics;
/// use batidevis_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// Statistics::increment_exports(&pool, 42).await?;
///
/// let stats = Statistics::get_current_month(&pool, 42).await?;
/// println!("Exports this month: {}", stats.exports_realises);
/// # Ok(())
/// # }
/// ```

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Monthly counters for one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Statistics {
    /// User ID
    pub user_id: i64,

    /// Month key, always the first day of the month
    pub month: NaiveDate,

    /// CSV exports produced this month
    pub exports_realises: i32,

    /// Devis created this month
    pub devis_crees: i32,
}

impl Statistics {
    /// First day of the current month (UTC), the canonical month key
    pub fn current_month_key() -> NaiveDate {
        Self::month_key(Utc::now().date_naive())
    }

    /// Normalizes any date to its month key (first of the month)
    pub fn month_key(date: NaiveDate) -> NaiveDate {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .expect("first of month is always a valid date")
    }

    /// Gets the current month's counters for a user
    ///
    /// If no row exists for this month, zero counters are returned.
    pub async fn get_current_month(pool: &PgPool, user_id: i64) -> Result<Self, sqlx::Error> {
        let month = Self::current_month_key();

        let stats = sqlx::query_as::<_, Statistics>(
            r#"
            SELECT user_id, month, exports_realises, devis_crees
            FROM statistics
            WHERE user_id = $1 AND month = $2
            "#,
        )
        .bind(user_id)
        .bind(month)
        .fetch_optional(pool)
        .await?;

        Ok(stats.unwrap_or(Statistics {
            user_id,
            month,
            exports_realises: 0,
            devis_crees: 0,
        }))
    }

    /// Increments the export counter for the current month (upsert)
    pub async fn increment_exports(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO statistics (user_id, month, exports_realises)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, month)
            DO UPDATE SET exports_realises = statistics.exports_realises + 1
            "#,
        )
        .bind(user_id)
        .bind(Self::current_month_key())
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key_normalizes_to_first() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(
            Statistics::month_key(date),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_month_key_idempotent() {
        let first = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(Statistics::month_key(first), first);
    }

    #[test]
    fn test_current_month_key_is_first_of_month() {
        assert_eq!(Statistics::current_month_key().day(), 1);
    }
}
