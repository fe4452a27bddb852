//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        applications::{
            admin_note_handler, assign_expert_handler, delete_application_handler,
            get_application_handler, list_applications_handler, update_status_handler,
        },
        auth::{admin_login_handler, expert_login_handler, expert_signup_handler, logout_handler},
        documents::{create_document_handler, delete_document_handler, list_documents_handler},
        experts::{delete_expert_handler, get_expert_handler, list_experts_handler},
        middleware::require_auth,
        state::AppState,
        templates::{create_letter_handler, list_letters_handler},
        users::{delete_user_handler, list_users_handler},
        ApiDoc,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use tower_http::cors::CorsLayer;

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
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
    });

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
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/admin/login", post(admin_login_handler))
        .route("/auth/expert/login", post(expert_login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/experts/signup", post(expert_signup_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/applications/{kind}", get(list_applications_handler))
        .route(
            "/applications/{kind}/{id}",
            get(get_application_handler).delete(delete_application_handler),
        )
        .route("/applications/{kind}/{id}/status", put(update_status_handler))
        .route("/applications/{kind}/{id}/assign", put(assign_expert_handler))
        .route(
            "/applications/{kind}/{id}/admin-note",
            put(admin_note_handler),
        )
        .route("/experts", get(list_experts_handler))
        .route(
            "/experts/{id}",
            get(get_expert_handler).delete(delete_expert_handler),
        )
        .route("/users", get(list_users_handler))
        .route("/users/{id}", delete(delete_user_handler))
        .route(
            "/documents",
            get(list_documents_handler).post(create_document_handler),
        )
        .route("/documents/{id}", delete(delete_document_handler))
        .route(
            "/templates/{kind}",
            get(list_letters_handler).post(create_letter_handler),
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
