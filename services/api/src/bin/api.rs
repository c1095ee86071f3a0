//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        archive::{get_task1_question_handler, list_task1_questions_handler},
        auth::{logout_handler, simple_login_handler, verify_session_handler},
        middleware::require_auth,
        phrases::{
            delete_phrase_handler, list_phrases_handler, save_phrase_handler,
            set_phrase_mastered_handler,
        },
        practice::{create_practice_session_handler, score_practice_session_handler},
        state::AppState,
        ApiDoc,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use speaking_master_core::ports::StoreService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let store: Arc<dyn StoreService> = db_adapter;
    let app_state = Arc::new(AppState::new(store, config.clone()));

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/simple-login", post(simple_login_handler))
        .route("/api/auth/verify", get(verify_session_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route(
            "/api/task1-archive/questions",
            get(list_task1_questions_handler),
        )
        .route(
            "/api/task1-archive/questions/{question_id}",
            get(get_task1_question_handler),
        )
        .route(
            "/api/practice/sessions",
            post(create_practice_session_handler),
        )
        .route(
            "/api/practice/sessions/{session_id}/score",
            post(score_practice_session_handler),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/api/phrases",
            post(save_phrase_handler).get(list_phrases_handler),
        )
        .route("/api/phrases/{phrase_id}", delete(delete_phrase_handler))
        .route(
            "/api/phrases/{phrase_id}/mastered",
            patch(set_phrase_mastered_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
