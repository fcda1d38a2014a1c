/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use batidevis_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = batidevis_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use batidevis_shared::auth::{jwt, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1 (versioned)
///     ├── /auth/                     # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /profile                   # GET, PUT (other methods → 405)
///     │   └── PUT /password
///     ├── /projects                  # GET, POST; /:id GET, PUT
///     ├── /devis                     # GET ?project_id=
///     │   └── GET /export            # CSV attachment
///     ├── /shares                    # POST; /pending GET
///     │   └── /:id/accept, /:id/reject  POST
///     ├── /articles                  # GET, POST; /:id PUT, DELETE
///     ├── /stats                     # GET (caller)
///     └── /admin/stats               # GET (admin only)
/// ```
///
/// Everything under `/v1` except `/v1/auth` sits behind the JWT layer, which
/// inserts an [`AuthContext`] into request extensions.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Authenticated API surface
    let profile_routes = Router::new()
        .route(
            "/",
            get(routes::profile::get_profile)
                .put(routes::profile::update_profile)
                .fallback(routes::profile::method_not_allowed),
        )
        .route("/password", put(routes::profile::change_password));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project).put(routes::projects::update_project),
        );

    let devis_routes = Router::new()
        .route("/", get(routes::devis::get_devis))
        .route("/export", get(routes::devis::export_devis));

    let share_routes = Router::new()
        .route("/", post(routes::shares::create_share))
        .route("/pending", get(routes::shares::list_pending))
        .route("/:id/accept", post(routes::shares::accept_share))
        .route("/:id/reject", post(routes::shares::reject_share));

    let article_routes = Router::new()
        .route(
            "/",
            get(routes::articles::list_articles).post(routes::articles::create_article),
        )
        .route(
            "/:id",
            put(routes::articles::update_article).delete(routes::articles::delete_article),
        );

    let protected_routes = Router::new()
        .nest("/profile", profile_routes)
        .nest("/projects", project_routes)
        .nest("/devis", devis_routes)
        .nest("/shares", share_routes)
        .nest("/articles", article_routes)
        .route("/stats", get(routes::stats::user_stats))
        .route("/admin/stats", get(routes::stats::admin_stats))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .fallback(unknown_route)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Enveloped 404 for paths outside the route table
async fn unknown_route() -> ApiError {
    ApiError::NotFound("Ressource non trouvée".to_string())
}

/// JWT authentication middleware layer
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authentification requise".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_jwt(claims.sub, claims.role);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
