//! Application state shared across handlers.

use crate::auth::AuthService;
use crate::books::BookService;
use crate::config::Config;
use crate::db::Database;
use crate::uploads::ImageStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Database connection.
    pub db: Database,
    /// Authentication service.
    pub auth: Arc<AuthService>,
    /// Book service.
    pub books: Arc<BookService>,
    /// Image upload store.
    pub images: Arc<ImageStore>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: Config, db: Database, auth: AuthService) -> Self {
        let books = BookService::new(db.clone());
        let images = ImageStore::new(config.uploads.dir.clone());

        Self {
            config: Arc::new(config),
            db,
            auth: Arc::new(auth),
            books: Arc::new(books),
            images: Arc::new(images),
        }
    }
}
