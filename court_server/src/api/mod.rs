//! HTTP API for the court booking service.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower**: Middleware for CORS, authentication and request ids
//! - **JWT**: Bearer access tokens resolved to an `Actor` per request
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, password reset, own profile
//! - [`courts`]: Catalog browsing and admin court management, reports and reviews
//! - [`bookings`]: Booking, cancelling and rescheduling slots
//! - [`wallet`]: Balance, history, invoices and top-ups
//! - [`admin`]: User management, moderation and revenue figures
//! - [`middleware`]: Authentication middleware for protected endpoints
//! - [`errors`]: Error to status code mapping
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use court_booking::{auth::AuthManager, db::Database, wallet::TopUpLimits};
//! use court_server::api::{AppState, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new();
//! let auth = AuthManager::new(db.clone(), "pepper".into(), "secret".into());
//! let app = create_router(AppState::new(db, auth, TopUpLimits::default()));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod courts;
pub mod errors;
pub mod middleware;
pub mod request_id;
pub mod wallet;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
};
use court_booking::{
    analytics::AnalyticsManager,
    auth::AuthManager,
    booking::BookingManager,
    catalog::CatalogManager,
    db::{Database, DatabaseStats},
    feedback::FeedbackManager,
    wallet::{PaymentGateway, SimulatedGateway, TopUpLimits, WalletManager},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every manager sits behind an `Arc` and shares the
/// same store.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth_manager: Arc<AuthManager>,
    pub catalog_manager: Arc<CatalogManager>,
    pub booking_manager: Arc<BookingManager>,
    pub wallet_manager: Arc<WalletManager>,
    pub feedback_manager: Arc<FeedbackManager>,
    pub analytics_manager: Arc<AnalyticsManager>,
}

impl AppState {
    /// Wire every manager onto `db`, charging through the simulated gateway
    pub fn new(db: Database, auth_manager: AuthManager, limits: TopUpLimits) -> Self {
        Self::with_gateway(db, auth_manager, limits, Arc::new(SimulatedGateway))
    }

    pub fn with_gateway(
        db: Database,
        auth_manager: AuthManager,
        limits: TopUpLimits,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            auth_manager: Arc::new(auth_manager),
            catalog_manager: Arc::new(CatalogManager::new(db.clone())),
            booking_manager: Arc::new(BookingManager::new(db.clone(), gateway.clone())),
            wallet_manager: Arc::new(WalletManager::new(db.clone(), gateway, limits)),
            feedback_manager: Arc::new(FeedbackManager::new(db.clone())),
            analytics_manager: Arc::new(AnalyticsManager::new(db.clone())),
            db,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET    /health                                   - Health check (public)
/// POST   /api/v1/auth/register                     - Register (public)
/// POST   /api/v1/auth/login                        - Login (public)
/// POST   /api/v1/auth/password-reset               - Request reset (public)
/// POST   /api/v1/auth/password-reset/confirm       - Complete reset (public)
/// GET    /api/v1/courts                            - Search courts (public)
/// GET    /api/v1/courts/{id}                       - Court details (public)
/// GET    /api/v1/courts/{id}/slots                 - Free slots (public)
/// GET    /api/v1/courts/{id}/reviews               - Reviews and rating (public)
/// POST   /api/v1/courts                            - Add court (admin)
/// PUT    /api/v1/courts/{id}                       - Update court (admin)
/// DELETE /api/v1/courts/{id}                       - Delete court (admin)
/// PUT    /api/v1/courts/{id}/status                - Set court status (admin)
/// POST   /api/v1/courts/{id}/reports               - File condition report (auth)
/// POST   /api/v1/courts/{id}/reviews               - Review court (auth)
/// GET    /api/v1/me                                - Own profile (auth)
/// PUT    /api/v1/me                                - Update own profile (auth)
/// DELETE /api/v1/me                                - Close own account (auth)
/// GET    /api/v1/bookings                          - Own bookings (auth)
/// POST   /api/v1/bookings                          - Book and pay (auth)
/// DELETE /api/v1/bookings/{id}                     - Cancel and refund (auth)
/// PUT    /api/v1/bookings/{id}/slot                - Reschedule (auth)
/// GET    /api/v1/wallet                            - Balance (auth)
/// GET    /api/v1/wallet/transactions               - History (auth)
/// GET    /api/v1/wallet/invoices                   - Own invoices (auth)
/// GET    /api/v1/wallet/invoices/{id}              - Invoice (auth)
/// POST   /api/v1/wallet/top-up                     - Deposit (auth)
/// GET    /api/v1/admin/bookings                    - All bookings (admin)
/// GET    /api/v1/admin/users                       - All users (admin)
/// PUT    /api/v1/admin/users/{id}                  - Update user (admin)
/// DELETE /api/v1/admin/users/{id}                  - Deactivate user (admin)
/// GET    /api/v1/admin/reports                     - Condition reports (admin)
/// POST   /api/v1/admin/reports/{id}/accept         - Court under repair (admin)
/// POST   /api/v1/admin/reports/{id}/resolve        - Court available (admin)
/// GET    /api/v1/admin/analytics?days=30           - Dashboard (admin)
/// GET    /api/v1/admin/revenue                     - Revenue history (admin)
/// GET    /api/v1/admin/password-resets             - Reset requests (admin)
/// POST   /api/v1/admin/password-resets/{id}/approve - Approve reset (admin)
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/password-reset", post(auth::request_password_reset))
        .route(
            "/auth/password-reset/confirm",
            post(auth::confirm_password_reset),
        )
        .route("/courts", get(courts::list_courts))
        .route("/courts/{court_id}", get(courts::get_court))
        .route("/courts/{court_id}/slots", get(courts::available_slots))
        .route("/courts/{court_id}/reviews", get(courts::list_reviews));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route(
            "/me",
            get(auth::me).put(auth::update_me).delete(auth::delete_me),
        )
        .route("/courts", post(courts::add_court))
        .route(
            "/courts/{court_id}",
            put(courts::update_court).delete(courts::delete_court),
        )
        .route("/courts/{court_id}/status", put(courts::set_status))
        .route("/courts/{court_id}/reports", post(courts::submit_report))
        .route("/courts/{court_id}/reviews", post(courts::add_review))
        .route(
            "/bookings",
            get(bookings::my_bookings).post(bookings::book),
        )
        .route("/bookings/{booking_id}", delete(bookings::cancel))
        .route("/bookings/{booking_id}/slot", put(bookings::reschedule))
        .route("/wallet", get(wallet::get_wallet))
        .route("/wallet/transactions", get(wallet::transactions))
        .route("/wallet/invoices", get(wallet::invoices))
        .route("/wallet/invoices/{invoice_id}", get(wallet::get_invoice))
        .route("/wallet/top-up", post(wallet::top_up))
        .route("/admin/bookings", get(admin::all_bookings))
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{user_id}",
            put(admin::update_user).delete(admin::deactivate_user),
        )
        .route("/admin/reports", get(admin::list_reports))
        .route(
            "/admin/reports/{report_id}/accept",
            post(admin::accept_report),
        )
        .route(
            "/admin/reports/{report_id}/resolve",
            post(admin::resolve_report),
        )
        .route("/admin/analytics", get(admin::analytics))
        .route("/admin/revenue", get(admin::revenue))
        .route("/admin/password-resets", get(admin::list_password_resets))
        .route(
            "/admin/password-resets/{reset_id}/approve",
            post(admin::approve_password_reset),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    tables: DatabaseStats,
    timestamp: String,
}

/// Health check endpoint for monitoring and load balancers.
///
/// Reports the store's table sizes; answering at all means the store lock is
/// not wedged.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"1.0.0","tables":{"users":3,...},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let tables = state.db.health_check().await;
    crate::metrics::active_bookings(tables.active_bookings);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tables,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
