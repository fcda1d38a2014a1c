/// Devis endpoints: current-devis read and CSV export
///
/// # Endpoints
///
/// - `GET /v1/devis?project_id=` - Current devis of a project with its
///   ordered lignes
/// - `GET /v1/devis/export?project_id=` - Same devis rendered as a CSV
///   attachment, lignes aggregated by lot
///
/// Both endpoints apply the same guards, in this order:
///
/// 1. `project_id` missing or non-positive → 400, before any lookup
/// 2. project does not exist → 404 "Projet non trouvé"
/// 3. caller is neither owner nor admin → 403
/// 4. project has no devis → 404 "Aucun devis trouvé pour ce projet"

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ok, ApiResponse},
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Extension,
};
use batidevis_shared::{
    auth::{authorization::require_project_access, middleware::AuthContext},
    models::{
        devis::{Devis, DevisLigne},
        project::Project,
        stats::Statistics,
    },
};
use serde::{Deserialize, Serialize};

/// Query parameters shared by both devis endpoints
///
/// `project_id` is kept as a raw string so a non-numeric value reaches the
/// handler and gets the same enveloped 400 as a missing or non-positive one,
/// instead of the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct DevisQuery {
    /// Target project ID; must parse as a positive integer
    pub project_id: Option<String>,
}

/// Compact project projection embedded in the devis response
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    /// Project ID
    pub id: i64,

    /// Project name
    pub name: String,

    /// Client name
    pub client: Option<String>,

    /// Internal reference
    pub reference: Option<String>,

    /// Site address
    pub address: Option<String>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            client: project.client.clone(),
            reference: project.reference.clone(),
            address: project.address.clone(),
        }
    }
}

/// Devis read payload
///
/// `devis.total_ht` is the stored total, which may have been manually
/// overridden; the top-level `total_ht` is the sum of ligne totals recomputed
/// at read time. The two are exposed side by side and never reconciled.
#[derive(Debug, Serialize)]
pub struct DevisResponse {
    /// The devis row, including the stored `total_ht`
    pub devis: Devis,

    /// Parent project summary
    pub project: ProjectSummary,

    /// Line items ordered by their persisted `ordre` key ascending
    pub lignes: Vec<DevisLigne>,

    /// Sum of ligne totals, recomputed at read time
    pub total_ht: f64,
}

/// Resolves the (project, current devis) pair behind both endpoints,
/// enforcing the documented guard order
async fn resolve_current_devis(
    state: &AppState,
    auth: &AuthContext,
    query: &DevisQuery,
) -> Result<(Project, Devis), ApiError> {
    // Argument check comes before any database access
    let project_id = match query
        .project_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
    {
        Some(id) if id > 0 => id,
        _ => {
            return Err(ApiError::BadRequest(
                "Le paramètre project_id doit être un entier positif".to_string(),
            ))
        }
    };

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Projet non trouvé".to_string()))?;

    require_project_access(auth, &project)?;

    let devis = Devis::find_current_for_project(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Aucun devis trouvé pour ce projet".to_string()))?;

    Ok((project, devis))
}

/// Returns the current devis of a project with its ordered lignes
pub async fn get_devis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DevisQuery>,
) -> ApiResult<ApiResponse<DevisResponse>> {
    let (project, devis) = resolve_current_devis(&state, &auth, &query).await?;

    let lignes = devis.lignes(&state.db).await?;
    let total_ht = DevisLigne::sum_totals(&lignes);

    Ok(ok(DevisResponse {
        project: ProjectSummary::from(&project),
        devis,
        lignes,
        total_ht,
    }))
}

/// Exports the current devis of a project as a CSV attachment
///
/// The body starts with a UTF-8 BOM so spreadsheet applications detect the
/// encoding; fields are semicolon-separated (French locale convention).
/// Lignes are aggregated by lot label in first-seen order, and a final
/// `TOTAL` row carries the grand total.
///
/// Side effect: the caller's `exports_realises` counter for the current
/// month is incremented.
pub async fn export_devis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DevisQuery>,
) -> ApiResult<impl IntoResponse> {
    let (project, devis) = resolve_current_devis(&state, &auth, &query).await?;

    let lignes = devis.lignes(&state.db).await?;
    let body = build_csv(&lignes);
    let filename = export_filename(&project.name, &devis.numero);

    Statistics::increment_exports(&state.db, auth.user_id).await?;

    tracing::info!(
        project_id = project.id,
        devis_id = devis.id,
        user_id = auth.user_id,
        "devis exported as CSV"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .map_err(|e| ApiError::InternalError(format!("Invalid filename header: {}", e)))?,
    );

    Ok((StatusCode::OK, headers, body))
}

/// Formats an amount as French-locale euros: `€ 1 728,21`
///
/// Euro sign and a space, thousands separated by spaces, decimal comma,
/// always two decimals.
fn format_euro(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    if negative {
        format!("€ -{},{:02}", grouped, frac)
    } else {
        format!("€ {},{:02}", grouped, frac)
    }
}

/// Builds the CSV body: BOM, `Lot;Total` header, one aggregated row per lot
/// in first-seen order, final `TOTAL` row
fn build_csv(lignes: &[DevisLigne]) -> Vec<u8> {
    // Aggregate by lot label, preserving first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut sums: std::collections::HashMap<&str, f64> = std::collections::HashMap::new();

    for ligne in lignes {
        let lot = ligne.lot.as_str();
        if !sums.contains_key(lot) {
            order.push(lot);
        }
        *sums.entry(lot).or_insert(0.0) += ligne.total;
    }

    let mut csv = String::from("Lot;Total\n");
    for lot in &order {
        csv.push_str(&format!("{};{}\n", lot, format_euro(sums[lot])));
    }
    csv.push_str(&format!(
        "TOTAL;{}\n",
        format_euro(DevisLigne::sum_totals(lignes))
    ));

    // UTF-8 BOM prefix so Excel opens the file with the right encoding
    let mut body = vec![0xEF, 0xBB, 0xBF];
    body.extend_from_slice(csv.as_bytes());
    body
}

/// Replaces every character outside `[A-Za-z0-9_-]` with an underscore
fn sanitize_filename_part(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Assembles the attachment filename from project name and devis numero
fn export_filename(project_name: &str, numero: &str) -> String {
    format!(
        "{}_{}.csv",
        sanitize_filename_part(project_name),
        sanitize_filename_part(numero)
    )
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
    fn test_devis_response_shape() {
        let lignes = vec![ligne(1, "Plomberie", 200.0), ligne(2, "Plomberie", 100.0)];
        let devis = Devis {
            id: 1,
            project_id: 10,
            numero: "DEV-2025-0001".to_string(),
            status: "brouillon".to_string(),
            notes: None,
            total_ht: 250.0,
            date_emission: None,
            date_validite: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let response = DevisResponse {
            project: ProjectSummary {
                id: 10,
                name: "Villa Dupont".to_string(),
                client: None,
                reference: None,
                address: None,
            },
            total_ht: DevisLigne::sum_totals(&lignes),
            devis,
            lignes,
        };

        let value = serde_json::to_value(&response).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();

        // Stored total stays inside `devis`, the recomputed one is top-level
        assert_eq!(keys, vec!["devis", "lignes", "project", "total_ht"]);
        assert_eq!(value["total_ht"], serde_json::json!(300.0));
        assert_eq!(value["devis"]["total_ht"], serde_json::json!(250.0));
    }

    #[test]
    fn test_format_euro_thousands_grouping() {
        assert_eq!(format_euro(1200.50), "€ 1 200,50");
        assert_eq!(format_euro(1728.21), "€ 1 728,21");
        assert_eq!(format_euro(1234567.89), "€ 1 234 567,89");
    }

    #[test]
    fn test_format_euro_small_amounts() {
        assert_eq!(format_euro(0.0), "€ 0,00");
        assert_eq!(format_euro(7.5), "€ 7,50");
        assert_eq!(format_euro(999.99), "€ 999,99");
    }

    #[test]
    fn test_format_euro_rounds_to_two_decimals() {
        assert_eq!(format_euro(10.005), "€ 10,01");
        assert_eq!(format_euro(10.004), "€ 10,00");
    }

    #[test]
    fn test_format_euro_negative() {
        assert_eq!(format_euro(-1200.50), "€ -1 200,50");
    }

    #[test]
    fn test_build_csv_aggregates_by_lot_first_seen_order() {
        let lignes = vec![
            ligne(1, "Gros œuvre", 1000.0),
            ligne(2, "Plomberie", 200.0),
            ligne(3, "Gros œuvre", 500.0),
        ];

        let body = build_csv(&lignes);

        // BOM prefix
        assert_eq!(&body[..3], &[0xEF, 0xBB, 0xBF]);

        let text = std::str::from_utf8(&body[3..]).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Lot;Total");
        assert_eq!(lines[1], "Gros œuvre;€ 1 500,00");
        assert_eq!(lines[2], "Plomberie;€ 200,00");
        assert_eq!(lines[3], "TOTAL;€ 1 700,00");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_build_csv_empty_devis() {
        let body = build_csv(&[]);
        let text = std::str::from_utf8(&body[3..]).unwrap();

        assert_eq!(text, "Lot;Total\nTOTAL;€ 0,00\n");
    }

    #[test]
    fn test_sanitize_filename_part() {
        assert_eq!(sanitize_filename_part("Villa Dupont"), "Villa_Dupont");
        assert_eq!(
            sanitize_filename_part("Rénovation 2025 (tranche 1)"),
            "R_novation_2025__tranche_1_"
        );
        assert_eq!(sanitize_filename_part("simple-name_ok"), "simple-name_ok");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("Villa Dupont", "DEV-2025-0042"),
            "Villa_Dupont_DEV-2025-0042.csv"
        );
    }
}
