//! # Librarian Backend
//!
//! Lending service for a small library: a book catalog, a member directory,
//! and the borrow/return transactions that move copies between them.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, DTO mapping, status codes)
//!     ↓
//! Domain Layer (catalog, directory, lending engine, penalty policy)
//!     ↓
//! Storage Layer (SQLite repositories and transactional unit of work)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize the application state from a connection, a policy and a clock
//! - Build the axum router, with an optional CORS layer
//! - Run the optional background penalty sweep

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::domain::{BookService, Clock, LendingPolicy, LendingService, MemberService};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub book_service: Arc<BookService<DbConnection>>,
    pub member_service: Arc<MemberService<DbConnection>>,
    pub lending_service: Arc<LendingService<DbConnection>>,
}

/// Wire every service to the same connection, policy and clock
pub fn initialize_backend(db: DbConnection, policy: LendingPolicy, clock: Arc<dyn Clock>) -> AppState {
    info!("Setting up domain model with {:?}", policy);
    let connection = Arc::new(db);

    let book_service = BookService::new(connection.clone(), clock.clone());
    let member_service = MemberService::new(connection.clone(), clock.clone());
    let lending_service = LendingService::new(connection, clock, policy);

    AppState {
        book_service: Arc::new(book_service),
        member_service: Arc::new(member_service),
        lending_service: Arc::new(lending_service),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: Option<HeaderValue>) -> Router {
    let api_routes = Router::new()
        .route("/books", get(io::list_books).post(io::create_book))
        .route("/books/:code", patch(io::update_book))
        .route("/books/:code/borrow", post(io::borrow_book))
        .route("/books/:code/return", post(io::return_book))
        .route("/members", get(io::list_members).post(io::create_member))
        .route("/members/:code", patch(io::update_member));

    let router = Router::new().nest("/api", api_routes).with_state(app_state);

    match cors_origin {
        Some(origin) => {
            info!("Allowing cross-origin requests from {:?}", origin);
            let cors = CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers(Any);
            router.layer(cors)
        }
        None => router,
    }
}

/// Periodically clear lapsed penalties. Listing members sweeps too, so this
/// only keeps stored state tidy between reads.
pub fn spawn_penalty_sweeper(member_service: Arc<MemberService<DbConnection>>, period: Duration) -> JoinHandle<()> {
    info!("Starting penalty sweeper every {:?}", period);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match member_service.lapse_expired_penalties().await {
                Ok(0) => debug!("Penalty sweep found nothing to clear"),
                Ok(cleared) => info!("Penalty sweep cleared {} members", cleared),
                Err(e) => warn!("Penalty sweep failed: {}", e),
            }
        }
    })
}
