//! Exchange proposals between users.
//!
//! Only the creation path exists: a proposal is always written as Pending.
//! Transitions (accept/reject/complete) are intentionally not implemented.

use crate::db::{Database, Exchange, ExchangeStatus, now_timestamp};
use crate::error::{AppError, Result};

/// Exchange domain service.
pub struct ExchangeService {
    db: Database,
}

impl ExchangeService {
    /// Create a new exchange service.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Propose an exchange of a book between two users.
    pub fn propose(&self, book_id: &str, sender_id: &str, receiver_id: &str) -> Result<Exchange> {
        if sender_id == receiver_id {
            return Err(AppError::Validation(
                "Sender and receiver must be different users".to_string(),
            ));
        }

        if self.db.get_book(book_id)?.is_none() {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }
        for user_id in [sender_id, receiver_id] {
            if self.db.get_user_by_id(user_id)?.is_none() {
                return Err(AppError::NotFound(format!(
                    "User with id {} not found",
                    user_id
                )));
            }
        }

        let exchange = Exchange {
            id: uuid::Uuid::new_v4().to_string(),
            book_id: book_id.to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            status: ExchangeStatus::Pending,
            created_at: now_timestamp(),
        };

        self.db.create_exchange(&exchange)?;
        Ok(exchange)
    }

    /// Get one exchange.
    pub fn find_one(&self, id: &str) -> Result<Exchange> {
        self.db
            .get_exchange(id)?
            .ok_or_else(|| AppError::NotFound(format!("Exchange with id {} not found", id)))
    }

    /// List exchanges referencing a book.
    pub fn list_for_book(&self, book_id: &str) -> Result<Vec<Exchange>> {
        self.db.list_exchanges_for_book(book_id)
    }
}
