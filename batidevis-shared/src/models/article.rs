/// Article library model and database operations
///
/// Articles are reusable priced catalog items classified by work lot and
/// unit. Every user gets a default library at registration; articles belong
/// to a library and access control follows the library's owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE libraries (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE articles (
///     id BIGSERIAL PRIMARY KEY,
///     library_id BIGINT NOT NULL REFERENCES libraries(id) ON DELETE CASCADE,
///     lot VARCHAR(255) NOT NULL,
///     designation TEXT NOT NULL,
///     unite VARCHAR(50),
///     prix_unitaire DOUBLE PRECISION NOT NULL DEFAULT 0,
///     favori BOOLEAN NOT NULL DEFAULT FALSE,
///     status VARCHAR(50) NOT NULL DEFAULT 'actif',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Article library, owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Library {
    /// Unique library ID
    pub id: i64,

    /// Owning user ID
    pub user_id: i64,

    /// Library name
    pub name: String,

    /// When the library was created
    pub created_at: DateTime<Utc>,
}

/// Reusable priced catalog item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    /// Unique article ID
    pub id: i64,

    /// Parent library ID
    pub library_id: i64,

    /// Work-lot classification
    pub lot: String,

    /// Article description
    pub designation: String,

    /// Unit (e.g., "m²", "u", "ml")
    pub unite: Option<String>,

    /// Unit price (HT)
    pub prix_unitaire: f64,

    /// Favorite flag
    pub favori: bool,

    /// Free-form status label
    pub status: String,

    /// When the article was created
    pub created_at: DateTime<Utc>,

    /// When the article was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticle {
    /// Work-lot classification
    pub lot: String,

    /// Article description
    pub designation: String,

    /// Unit
    pub unite: Option<String>,

    /// Unit price (HT)
    pub prix_unitaire: f64,
}

/// Input for updating an article
///
/// All fields optional; only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticle {
    /// New lot
    pub lot: Option<String>,

    /// New description
    pub designation: Option<String>,

    /// New unit
    pub unite: Option<Option<String>>,

    /// New unit price
    pub prix_unitaire: Option<f64>,

    /// New favorite flag
    pub favori: Option<bool>,

    /// New status label
    pub status: Option<String>,
}

const ARTICLE_COLUMNS: &str = "id, library_id, lot, designation, unite, prix_unitaire, \
                               favori, status, created_at, updated_at";

impl Library {
    /// Creates a library for a user
    pub async fn create(pool: &PgPool, user_id: i64, name: &str) -> Result<Self, sqlx::Error> {
        let library = sqlx::query_as::<_, Library>(
            r#"
            INSERT INTO libraries (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(library)
    }

    /// Finds a user's first library (their default one)
    pub async fn find_default_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let library = sqlx::query_as::<_, Library>(
            r#"
            SELECT id, user_id, name, created_at
            FROM libraries
            WHERE user_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(library)
    }
}

impl Article {
    /// Creates an article in a library
    pub async fn create(
        pool: &PgPool,
        library_id: i64,
        data: CreateArticle,
    ) -> Result<Self, sqlx::Error> {
        let article = sqlx::query_as::<_, Article>(&format!(
            r#"
            INSERT INTO articles (library_id, lot, designation, unite, prix_unitaire)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ARTICLE_COLUMNS}
            "#,
        ))
        .bind(library_id)
        .bind(data.lot)
        .bind(data.designation)
        .bind(data.unite)
        .bind(data.prix_unitaire)
        .fetch_one(pool)
        .await?;

        Ok(article)
    }

    /// Finds an article by ID together with its library owner, for access
    /// checks
    pub async fn find_with_owner(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<(Self, i64)>, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            article: Article,
            owner_id: i64,
        }

        let row = sqlx::query_as::<_, Row>(
            r#"
            SELECT a.id, a.library_id, a.lot, a.designation, a.unite, a.prix_unitaire,
                   a.favori, a.status, a.created_at, a.updated_at,
                   l.user_id AS owner_id
            FROM articles a
            JOIN libraries l ON l.id = a.library_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|r| (r.article, r.owner_id)))
    }

    /// Lists the articles of a library, favorites first then by lot
    pub async fn list_for_library(
        pool: &PgPool,
        library_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let articles = sqlx::query_as::<_, Article>(&format!(
            r#"
            SELECT {ARTICLE_COLUMNS} FROM articles
            WHERE library_id = $1
            ORDER BY favori DESC, lot ASC, designation ASC
            "#,
        ))
        .bind(library_id)
        .fetch_all(pool)
        .await?;

        Ok(articles)
    }

    /// Updates an article
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateArticle,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE articles SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.lot.is_some() {
            bind_count += 1;
            query.push_str(&format!(", lot = ${}", bind_count));
        }
        if data.designation.is_some() {
            bind_count += 1;
            query.push_str(&format!(", designation = ${}", bind_count));
        }
        if data.unite.is_some() {
            bind_count += 1;
            query.push_str(&format!(", unite = ${}", bind_count));
        }
        if data.prix_unitaire.is_some() {
            bind_count += 1;
            query.push_str(&format!(", prix_unitaire = ${}", bind_count));
        }
        if data.favori.is_some() {
            bind_count += 1;
            query.push_str(&format!(", favori = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Article>(&query).bind(id);

        if let Some(lot) = data.lot {
            q = q.bind(lot);
        }
        if let Some(designation) = data.designation {
            q = q.bind(designation);
        }
        if let Some(unite) = data.unite {
            q = q.bind(unite);
        }
        if let Some(prix_unitaire) = data.prix_unitaire {
            q = q.bind(prix_unitaire);
        }
        if let Some(favori) = data.favori {
            q = q.bind(favori);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let article = q.fetch_optional(pool).await?;

        Ok(article)
    }

    /// Deletes an article
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all articles (admin statistics)
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
