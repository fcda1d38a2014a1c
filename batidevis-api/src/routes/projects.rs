/// Project endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - Own projects plus accepted-shared projects
/// - `POST /v1/projects` - Create project
/// - `GET /v1/projects/:id` - Read one project (owner or admin)
/// - `PUT /v1/projects/:id` - Update project (owner or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ok, ApiResponse},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use batidevis_shared::{
    auth::{authorization::require_project_access, middleware::AuthContext},
    models::project::{CreateProject, Project, UpdateProject},
};
use validator::Validate;

/// Project creation request
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Le nom du projet est requis"))]
    pub name: String,

    /// Client name
    pub client: Option<String>,

    /// Project typology
    pub typologie: Option<String>,

    /// Internal reference
    pub reference: Option<String>,

    /// Site address
    pub address: Option<String>,
}

/// Lists all projects visible to the caller: owned plus accepted-shared,
/// newest first
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Vec<Project>>> {
    let projects = Project::list_for_user(&state.db, auth.user_id).await?;
    Ok(ok(projects))
}

/// Creates a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<ApiResponse<Project>> {
    req.validate().map_err(super::auth::map_validation_errors)?;

    let project = Project::create(
        &state.db,
        auth.user_id,
        CreateProject {
            name: req.name,
            client: req.client,
            typologie: req.typologie,
            reference: req.reference,
            address: req.address,
        },
    )
    .await?;

    Ok(ok(project))
}

/// Reads one project
///
/// # Errors
///
/// - `404 Not Found`: No such project
/// - `403 Forbidden`: Caller is neither the owner nor admin
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Project>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Projet non trouvé".to_string()))?;

    require_project_access(&auth, &project)?;

    Ok(ok(project))
}

/// Updates one project
///
/// Status transitions are unconstrained; the owner (or an admin) may set any
/// status at any time.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateProject>,
) -> ApiResult<ApiResponse<Project>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Projet non trouvé".to_string()))?;

    require_project_access(&auth, &project)?;

    let updated = Project::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Projet non trouvé".to_string()))?;

    Ok(ok(updated))
}
