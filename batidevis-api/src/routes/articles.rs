/// Article library endpoints
///
/// # Endpoints
///
/// - `GET /v1/articles` - Caller's library items, favorites first
/// - `POST /v1/articles` - Create an article in the caller's library
/// - `PUT /v1/articles/:id` - Update an article (favorite flag included)
/// - `DELETE /v1/articles/:id` - Delete an article
///
/// Every account gets a default library at registration; these endpoints all
/// operate on it. Ownership is checked through the library, not the article.

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
    auth::{authorization::require_ownership, middleware::AuthContext},
    models::article::{Article, CreateArticle, Library, UpdateArticle},
};

/// Resolves the caller's default library
async fn caller_library(state: &AppState, auth: &AuthContext) -> Result<Library, ApiError> {
    Library::find_default_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Aucune bibliothèque pour ce compte".to_string()))
}

/// Lists the caller's articles, favorites first then by lot and designation
pub async fn list_articles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Vec<Article>>> {
    let library = caller_library(&state, &auth).await?;
    let articles = Article::list_for_library(&state.db, library.id).await?;
    Ok(ok(articles))
}

/// Creates an article in the caller's library
pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(data): Json<CreateArticle>,
) -> ApiResult<ApiResponse<Article>> {
    if data.lot.trim().is_empty() || data.designation.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Le lot et la désignation sont requis".to_string(),
        ));
    }

    let library = caller_library(&state, &auth).await?;
    let article = Article::create(&state.db, library.id, data).await?;
    Ok(ok(article))
}

/// Updates an article in the caller's library
///
/// The favorite flag is toggled through this endpoint like any other field.
///
/// # Errors
///
/// - `404 Not Found`: No such article
/// - `403 Forbidden`: Article belongs to another user's library
pub async fn update_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateArticle>,
) -> ApiResult<ApiResponse<Article>> {
    let (_, owner_id) = Article::find_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article non trouvé".to_string()))?;

    require_ownership(&auth, owner_id)?;

    let updated = Article::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article non trouvé".to_string()))?;

    Ok(ok(updated))
}

/// Deletes an article from the caller's library
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let (_, owner_id) = Article::find_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article non trouvé".to_string()))?;

    require_ownership(&auth, owner_id)?;

    let deleted = Article::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Article non trouvé".to_string()));
    }

    Ok(ok(serde_json::json!({ "deleted": true })))
}
