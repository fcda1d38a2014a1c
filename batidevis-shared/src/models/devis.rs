/// Devis (quote) model and database operations
///
/// A devis belongs to exactly one project and is composed of ordered line
/// items (`devis_lignes`). A project may accumulate several devis over time;
/// the read path addresses only the "current" one, defined as the most recent
/// by creation time with `id` as a deterministic tie-break.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE devis (
///     id BIGSERIAL PRIMARY KEY,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     numero VARCHAR(50) NOT NULL,
///     status VARCHAR(50) NOT NULL DEFAULT 'Brouillon',
///     notes TEXT,
///     total_ht DOUBLE PRECISION NOT NULL DEFAULT 0,
///     date_emission DATE,
///     date_validite DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE devis_lignes (
///     id BIGSERIAL PRIMARY KEY,
///     devis_id BIGINT NOT NULL REFERENCES devis(id) ON DELETE CASCADE,
///     ordre INTEGER NOT NULL DEFAULT 0,
///     lot VARCHAR(255) NOT NULL,
///     designation TEXT,
///     quantite DOUBLE PRECISION NOT NULL DEFAULT 0,
///     unite VARCHAR(50),
///     prix_unitaire DOUBLE PRECISION NOT NULL DEFAULT 0,
///     total DOUBLE PRECISION NOT NULL DEFAULT 0
/// );
/// ```
///
/// The stored `devis.total_ht` and the sum of ligne totals are maintained
/// independently and are never reconciled here; readers receive both and may
/// compare them (manual overrides of the stored total are possible).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Devis model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Devis {
    /// Unique devis ID
    pub id: i64,

    /// Parent project ID
    pub project_id: i64,

    /// Devis number (e.g., "DEV-2025-0042")
    pub numero: String,

    /// Free-form status label (e.g., "Brouillon", "Envoyé", "Accepté")
    pub status: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// Stored total (HT). May have been manually overridden; compare with
    /// the recomputed ligne sum if reconciliation matters to you.
    pub total_ht: f64,

    /// Emission date
    pub date_emission: Option<NaiveDate>,

    /// Validity date
    pub date_validite: Option<NaiveDate>,

    /// When the devis was created
    pub created_at: DateTime<Utc>,

    /// When the devis was last updated
    pub updated_at: DateTime<Utc>,
}

/// A single line item of a devis
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DevisLigne {
    /// Unique ligne ID
    pub id: i64,

    /// Parent devis ID
    pub devis_id: i64,

    /// Persisted ordering key (ascending). This is an explicit sequence
    /// number, not insertion order.
    pub ordre: i32,

    /// Work-lot label (e.g., "Gros œuvre")
    pub lot: String,

    /// Line description
    pub designation: Option<String>,

    /// Quantity
    pub quantite: f64,

    /// Unit (e.g., "m²", "u")
    pub unite: Option<String>,

    /// Unit price (HT)
    pub prix_unitaire: f64,

    /// Line total (HT)
    pub total: f64,
}

const DEVIS_COLUMNS: &str = "id, project_id, numero, status, notes, total_ht, \
                             date_emission, date_validite, created_at, updated_at";

const LIGNE_COLUMNS: &str =
    "id, devis_id, ordre, lot, designation, quantite, unite, prix_unitaire, total";

impl Devis {
    /// Finds the current devis for a project
    ///
    /// "Current" means latest by creation time; `id DESC` breaks ties between
    /// devis sharing a timestamp so the selection stays deterministic.
    pub async fn find_current_for_project(
        pool: &PgPool,
        project_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let devis = sqlx::query_as::<_, Devis>(&format!(
            r#"
            SELECT {DEVIS_COLUMNS} FROM devis
            WHERE project_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        ))
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(devis)
    }

    /// Fetches the line items of this devis, ordered by the persisted `ordre`
    /// key ascending
    pub async fn lignes(&self, pool: &PgPool) -> Result<Vec<DevisLigne>, sqlx::Error> {
        DevisLigne::list_for_devis(pool, self.id).await
    }
}

impl DevisLigne {
    /// Lists the line items of a devis ordered by `ordre` ascending
    pub async fn list_for_devis(pool: &PgPool, devis_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let lignes = sqlx::query_as::<_, DevisLigne>(&format!(
            r#"
            SELECT {LIGNE_COLUMNS} FROM devis_lignes
            WHERE devis_id = $1
            ORDER BY ordre ASC
            "#,
        ))
        .bind(devis_id)
        .fetch_all(pool)
        .await?;

        Ok(lignes)
    }

    /// Sums ligne totals
    ///
    /// This is the recomputed devis total. It is intentionally NOT written
    /// back to `devis.total_ht`; the stored value may diverge.
    pub fn sum_totals(lignes: &[Self]) -> f64 {
        lignes.iter().map(|l| l.total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ligne(ordre: i32, lot: &str, total: f64) -> DevisLigne {
        DevisLigne {
            id: ordre as i64,
            devis_id: 1,
            ordre,
            lot: lot.to_string(),
            designation: None,
            quantite: 1.0,
            unite: None,
            prix_unitaire: total,
            total,
        }
    }

    #[test]
    fn test_sum_totals() {
        let lignes = vec![
            ligne(1, "Gros œuvre", 1000.0),
            ligne(2, "Plomberie", 200.5),
        ];
        assert!((DevisLigne::sum_totals(&lignes) - 1200.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sum_totals_empty() {
        assert_eq!(DevisLigne::sum_totals(&[]), 0.0);
    }
}
