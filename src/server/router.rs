//! HTTP router for stockroom
//!
//! This module defines the axum router that handles all HTTP requests:
//! - Health check
//! - Registration and login (public)
//! - Item CRUD and standalone uploads (behind the identity gate)

use axum::{
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AccountService, TokenService};
use crate::database::Database;
use crate::storage::AttachmentIngestor;

use super::handlers;
use super::middleware::{identity_middleware, logging_middleware};

/// Shared application state
pub struct AppState<D: Database> {
    /// Registration and login
    pub accounts: Arc<AccountService<D>>,

    /// Session token issuance and verification
    pub tokens: Arc<TokenService>,

    /// Item repository
    pub database: Arc<D>,

    /// Attachment ingestion pipeline
    pub ingestor: Arc<AttachmentIngestor>,
}

impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            tokens: Arc::clone(&self.tokens),
            database: Arc::clone(&self.database),
            ingestor: Arc::clone(&self.ingestor),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the main application router
pub fn build_router<D: Database + 'static>(state: AppState<D>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(health_handler))
        .route("/users/register", post(handlers::register::<D>))
        .route("/users/login", post(handlers::login::<D>))
        // Item endpoints (identity gate applies)
        .route(
            "/items",
            post(handlers::create_item::<D>).get(handlers::list_items::<D>),
        )
        .route(
            "/items/:id",
            get(handlers::item_detail::<D>)
                .patch(handlers::update_item::<D>)
                .delete(handlers::delete_item::<D>),
        )
        // Standalone uploads (identity gate applies)
        .route("/uploads", post(handlers::upload_single::<D>))
        .route("/uploads/batch", post(handlers::upload_batch::<D>))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            identity_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
