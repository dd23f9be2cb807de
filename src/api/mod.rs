//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a REST API using Axum for the order book.
// It provides endpoints for order management, book state and trade read-back.
//
// | Component      | Description                                                |
// |----------------|-----------------------------------------------------------|
// | Api            | Main API structure coordinating routes and services        |
// | Routes         | Handler functions for API endpoints                        |
// | AppState       | Shared application state                                   |
// | DTOs           | Data transfer objects for API requests/responses           |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                                       | Key Methods       |
// |----------------|---------------------------------------------------|------------------|
// | AppState       | Shared application state                          | new               |
// | Api            | Main API structure                                | routes, serve     |
// | ApiError       | API error types                                   | from              |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Extension, Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::book::OrderBook;

pub use dto::*;
pub use error::{ApiError, ApiResult};

/// Shared application state accessible by all handlers.
///
/// The book is an exclusive resource: mutations take the write half of the lock,
/// reads share the read half, so reads never overlap a mutation.
pub struct AppState {
    /// The single order book served by this process
    pub book: RwLock<OrderBook>,
}

impl AppState {
    /// Creates the application state with an empty book for the given market
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            book: RwLock::new(OrderBook::with_market(market)),
        }
    }
}

/// Main API structure
pub struct Api {
    /// API address
    addr: SocketAddr,
    /// Shared application state
    state: Arc<AppState>,
}

impl Api {
    /// Creates a new API instance
    pub fn new(addr: SocketAddr, market: impl Into<String>) -> Self {
        let state = Arc::new(AppState::new(market));
        Self { addr, state }
    }

    /// Creates all routes for the API
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            // Health check
            .route("/health", get(routes::health))
            // Order management
            .route("/api/orders", post(routes::create_order))
            .route("/api/orders/:side", get(routes::list_orders))
            .route("/api/orders/:side/:order_id", get(routes::get_order))
            .route("/api/orders/:side/:order_id", patch(routes::modify_order))
            .route("/api/orders/:side/:order_id", delete(routes::cancel_order))
            // Market data
            .route("/api/summary", get(routes::get_summary))
            .route("/api/trades", get(routes::get_trades))
            // Attach application state
            .layer(Extension(self.state.clone()))
            // Add CORS layer
            .layer(cors)
    }

    /// Starts the API server and runs until shutdown
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.routes();

        info!("API listening on {}", self.addr);
        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
