//! Wallet and movement ledger for the notional exchange currency.
//!
//! The ledger is append-only; a wallet's balance is always derived from the
//! sum of its movements and never stored independently.

use crate::db::{Database, Movement, MovementType, Wallet, now_timestamp};
use crate::error::{AppError, Result};

/// Wallet domain service.
pub struct WalletService {
    db: Database,
}

impl WalletService {
    /// Create a new wallet service.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a wallet for a user. Each user owns at most one.
    pub fn create(&self, user_id: &str) -> Result<Wallet> {
        if self.db.get_user_by_id(user_id)?.is_none() {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        let wallet = Wallet {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now_timestamp(),
        };

        self.db.create_wallet(&wallet)?;
        Ok(wallet)
    }

    /// Get a user's wallet.
    pub fn find_by_user(&self, user_id: &str) -> Result<Wallet> {
        self.db
            .get_wallet_by_user(user_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {} has no wallet", user_id)))
    }

    /// Append an income movement.
    pub fn deposit(&self, wallet_id: &str, amount: f64, reason: &str) -> Result<Movement> {
        self.record(wallet_id, amount, MovementType::Income, reason)
    }

    /// Append an expense movement. Fails if it would overdraw the wallet.
    pub fn withdraw(&self, wallet_id: &str, amount: f64, reason: &str) -> Result<Movement> {
        if amount > self.balance(wallet_id)? {
            return Err(AppError::Validation(
                "Insufficient wallet balance".to_string(),
            ));
        }

        self.record(wallet_id, amount, MovementType::Expense, reason)
    }

    /// Wallet balance derived from the ledger sum.
    pub fn balance(&self, wallet_id: &str) -> Result<f64> {
        if self.db.get_wallet(wallet_id)?.is_none() {
            return Err(AppError::NotFound(format!(
                "Wallet with id {} not found",
                wallet_id
            )));
        }

        self.db.wallet_balance(wallet_id)
    }

    /// Movements for a wallet, oldest first.
    pub fn movements(&self, wallet_id: &str) -> Result<Vec<Movement>> {
        self.db.list_movements(wallet_id)
    }

    fn record(
        &self,
        wallet_id: &str,
        amount: f64,
        kind: MovementType,
        reason: &str,
    ) -> Result<Movement> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::Validation(
                "Movement amount must be positive".to_string(),
            ));
        }

        if self.db.get_wallet(wallet_id)?.is_none() {
            return Err(AppError::NotFound(format!(
                "Wallet with id {} not found",
                wallet_id
            )));
        }

        let movement = Movement {
            id: uuid::Uuid::new_v4().to_string(),
            wallet_id: wallet_id.to_string(),
            amount,
            kind,
            reason: reason.to_string(),
            created_at: now_timestamp(),
        };

        self.db.insert_movement(&movement)?;
        Ok(movement)
    }
}
