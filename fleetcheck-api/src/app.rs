/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use fleetcheck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = fleetcheck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::middleware::rate_limit::{auth_rate_limit, general_rate_limit, RateLimiter};
use crate::middleware::security::SecurityHeadersLayer;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use fleetcheck_shared::auth::guard;
use fleetcheck_shared::notify::Notifier;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound notification channels
    pub notifier: Arc<Notifier>,

    /// In-memory rate limiter
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let notifier = Notifier::new(config.email.clone(), config.sms.clone());
        Self {
            db,
            config: Arc::new(config),
            notifier: Arc::new(notifier),
            limiter: Arc::new(RateLimiter::new()),
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
/// ├── /health                       # Liveness + DB ping (public)
/// └── /api/v1/                      # Versioned API
///     ├── /auth/                    # bootstrap, login, refresh, password reset (public);
///     │                             # register (authenticated, admin)
///     ├── /users/                   # profile + user administration
///     ├── /companies/               # tenant profile
///     ├── /vehicles/                # fleet management
///     ├── /templates/               # checklist templates + items
///     ├── /inspections/             # inspections, answers, stats, CSV export
///     ├── /issues/                  # issue reporting and resolution
///     └── /notifications/           # in-app notifications
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Rate limiting (general on /api/v1, strict on public auth routes)
/// 5. Access guard (everything except /health and the public auth routes)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes carry the strict limiter; register requires an
    // authenticated admin and sits behind the guard instead.
    let public_auth_routes = Router::new()
        .route("/bootstrap", post(routes::auth::bootstrap))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_rate_limit,
        ));

    let protected_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_guard,
        ));

    let auth_routes = public_auth_routes.merge(protected_auth_routes);

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/me/password", patch(routes::users::change_password))
        .route("/", get(routes::users::list_users))
        .route("/:id", patch(routes::users::update_user));

    let company_routes = Router::new()
        .route("/:id", get(routes::companies::get_company))
        .route("/:id", patch(routes::companies::update_company));

    let vehicle_routes = Router::new()
        .route("/", post(routes::vehicles::create_vehicle))
        .route("/", get(routes::vehicles::list_vehicles))
        .route("/:id", get(routes::vehicles::get_vehicle))
        .route("/:id", patch(routes::vehicles::update_vehicle))
        .route("/:id", delete(routes::vehicles::delete_vehicle));

    let template_routes = Router::new()
        .route("/", post(routes::templates::create_template))
        .route("/", get(routes::templates::list_templates))
        .route("/:id", get(routes::templates::get_template))
        .route("/:id", patch(routes::templates::update_template))
        .route("/:id", delete(routes::templates::delete_template))
        .route("/:id/items", post(routes::templates::add_item))
        .route("/:id/items/reorder", post(routes::templates::reorder_items))
        .route("/:id/items/:item_id", patch(routes::templates::update_item))
        .route("/:id/items/:item_id", delete(routes::templates::delete_item));

    let inspection_routes = Router::new()
        .route("/", post(routes::inspections::create_inspection))
        .route("/", get(routes::inspections::list_inspections))
        .route("/stats", get(routes::inspections::inspection_stats))
        .route("/export/csv", get(routes::inspections::export_csv))
        .route("/:id", get(routes::inspections::get_inspection))
        .route("/:id", patch(routes::inspections::update_inspection))
        .route("/:id/answers", post(routes::inspections::submit_answers));

    let issue_routes = Router::new()
        .route("/", post(routes::issues::create_issue))
        .route("/", get(routes::issues::list_issues))
        .route("/stats", get(routes::issues::issue_stats))
        .route("/:id", get(routes::issues::get_issue))
        .route("/:id", patch(routes::issues::update_issue))
        .route("/:id/resolve", patch(routes::issues::resolve_issue));

    let notification_routes = Router::new()
        .route("/", get(routes::notifications::list_notifications))
        .route("/unread-count", get(routes::notifications::unread_count))
        .route("/mark-all-read", patch(routes::notifications::mark_all_read))
        .route("/:id/read", patch(routes::notifications::mark_read));

    // Everything except auth sits behind the access guard
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/companies", company_routes)
        .nest("/vehicles", vehicle_routes)
        .nest("/templates", template_routes)
        .nest("/inspections", inspection_routes)
        .nest("/issues", issue_routes)
        .nest("/notifications", notification_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_guard,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            general_rate_limit,
        ));

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(false))
        .with_state(state)
}

/// Access guard middleware
///
/// Validates the bearer token, loads the user fresh from the database, and
/// injects `AuthUser` into request extensions. Every failure collapses to the
/// same generic 401 via the `AuthError` conversion.
async fn access_guard(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_user = guard::authenticate(&state.db, state.jwt_secret(), auth_header).await?;

    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
