//! HTTP server and routes.

mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth_register))
        .route("/login", post(handlers::auth_login))
        .route("/whoami", get(handlers::auth_whoami))
        .route("/logout", post(handlers::auth_logout));

    let book_routes = Router::new()
        .route("/create", post(handlers::books_create))
        .route("/", get(handlers::books_list))
        .route("/{id}", get(handlers::books_get))
        .route("/{id}", put(handlers::books_update))
        .route("/{id}", delete(handlers::books_delete));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/books", book_routes)
        .route("/uploads/{file}", get(handlers::serve_upload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
