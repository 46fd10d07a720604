/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use pagepilot_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = pagepilot_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::session_gate},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use pagepilot_shared::{
    generator::{ContentGenerator, GeneratorConfig},
    social::{graph::GraphClient, oauth::FacebookOAuth, PublishDispatcher},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
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

    /// Graph API client shared by OAuth and publishing
    pub graph: GraphClient,

    /// Facebook OAuth settings
    pub oauth: Arc<FacebookOAuth>,

    /// Platform publishers
    pub publisher: Arc<PublishDispatcher>,

    /// Content generator; `None` when no API key is configured
    pub generator: Option<Arc<ContentGenerator>>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be built.
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let graph = GraphClient::new(&config.facebook.graph_url, &config.facebook.api_version)?;

        let oauth = FacebookOAuth::new(
            &config.facebook.client_id,
            &config.facebook.client_secret,
            &config.facebook.redirect_uri,
            &config.facebook.api_version,
        );

        let generator = match &config.openai {
            Some(openai) => Some(Arc::new(ContentGenerator::new(
                GeneratorConfig::new(&openai.api_key)
                    .with_base_url(&openai.base_url)
                    .with_model(&openai.model),
            )?)),
            None => None,
        };

        Ok(Self {
            db,
            publisher: Arc::new(PublishDispatcher::new(graph.clone())),
            graph,
            oauth: Arc::new(oauth),
            generator,
            config: Arc::new(config),
        })
    }

    /// Gets the secret for session token operations
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /, /login, /register, /logout       # Pages (public)
/// ├── /dashboard, /dashboard/settings     # Pages (session, else redirect to /login)
/// ├── /health                             # Health check (public)
/// └── /api/
///     ├── /auth/                          # register, login, logout (public); me (session)
///     ├── /subscription                   # Current plan
///     ├── /social/                        # OAuth connect/callback, accounts
///     ├── /publish                        # Publish content to a platform
///     ├── /content/                       # CRUD + AI generation
///     └── /maintenance/                   # Account diagnostics and repair
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost last):
/// 1. Session gate (every request; see `middleware::session`)
/// 2. Logging (tower-http TraceLayer)
/// 3. Response compression (gzip, brotli)
/// 4. CORS (tower-http CorsLayer)
/// 5. Security headers
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    let page_routes = Router::new()
        .route("/", get(routes::pages::landing))
        .route("/login", get(routes::pages::login_page).post(routes::pages::login_submit))
        .route(
            "/register",
            get(routes::pages::register_page).post(routes::pages::register_submit),
        )
        .route("/logout", post(routes::pages::logout_submit))
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/dashboard/settings", get(routes::pages::settings))
        .route(
            "/dashboard/settings/disconnect/:platform",
            post(routes::pages::disconnect_submit),
        );

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me));

    let social_routes = Router::new()
        .route("/facebook/connect", get(routes::social::connect_facebook))
        .route("/instagram/connect", get(routes::social::connect_facebook))
        .route("/facebook/callback", get(routes::social::facebook_callback))
        .route("/accounts", get(routes::social::list_accounts))
        .route("/accounts/:platform", delete(routes::social::disconnect_account));

    let content_routes = Router::new()
        .route(
            "/",
            get(routes::content::list_content).post(routes::content::create_content),
        )
        .route("/generate", post(routes::content::generate_content))
        .route(
            "/:id",
            get(routes::content::get_content)
                .patch(routes::content::update_content)
                .delete(routes::content::delete_content),
        );

    let maintenance_routes = Router::new()
        .route(
            "/social-accounts",
            get(routes::maintenance::social_account_diagnostics),
        )
        .route("/fix-page-ids", post(routes::maintenance::fix_page_ids));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/subscription", get(routes::subscription::current_subscription))
        .nest("/social", social_routes)
        .route("/publish", post(routes::publish::publish))
        .nest("/content", content_routes)
        .nest("/maintenance", maintenance_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(page_routes)
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback(routes::pages::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_gate,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
