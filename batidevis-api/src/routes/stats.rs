/// Statistics endpoints
///
/// # Endpoints
///
/// - `GET /v1/stats` - Caller's dashboard counters
/// - `GET /v1/admin/stats` - Global counters (admin only)
///
/// Project buckets are derived from status at read time: `En cours` and
/// `Brouillon` count as active, `Archivé` as archived; `Terminé` lands in
/// neither bucket but still counts toward the total.

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ok, ApiResponse},
};
use axum::{extract::State, Extension};
use batidevis_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        article::Article, project::Project, share::ProjectShare, stats::Statistics, user::User,
    },
};
use serde::Serialize;

/// Per-user dashboard counters
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    /// Owned projects with status `En cours` or `Brouillon`
    pub projets_actifs: i64,

    /// Owned projects with status `Archivé`
    pub projets_archives: i64,

    /// Accepted shares addressed to the caller
    pub projets_partages: i64,

    /// Distinct visible projects: owned plus accepted-shared
    pub total_projects: i64,

    /// CSV exports produced this month
    pub exports_realises: i32,
}

/// Global counters for the admin dashboard
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    /// Total registered users
    pub total_users: i64,

    /// Total projects across all users
    pub total_projects: i64,

    /// Total articles across all libraries
    pub total_articles: i64,

    /// Distinct users who created a project in the trailing 30 days
    pub active_users_30d: i64,
}

/// Returns the caller's dashboard counters
pub async fn user_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<UserStatsResponse>> {
    let projets_actifs = Project::count_active_for_user(&state.db, auth.user_id).await?;
    let projets_archives = Project::count_archived_for_user(&state.db, auth.user_id).await?;
    let projets_partages = ProjectShare::count_accepted_for_user(&state.db, auth.user_id).await?;
    let total_projects = Project::count_total_for_user(&state.db, auth.user_id).await?;
    let monthly = Statistics::get_current_month(&state.db, auth.user_id).await?;

    Ok(ok(UserStatsResponse {
        projets_actifs,
        projets_archives,
        projets_partages,
        total_projects,
        exports_realises: monthly.exports_realises,
    }))
}

/// Returns global counters (admin only)
pub async fn admin_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<AdminStatsResponse>> {
    require_admin(&auth)?;

    let total_users = User::count(&state.db).await?;
    let total_projects = Project::count(&state.db).await?;
    let total_articles = Article::count(&state.db).await?;
    let active_users_30d = Project::count_active_owners_30d(&state.db).await?;

    Ok(ok(AdminStatsResponse {
        total_users,
        total_projects,
        total_articles,
        active_users_30d,
    }))
}
