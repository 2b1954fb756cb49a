//! bookswap: backend for a peer-to-peer book exchange marketplace.
//!
//! Users register, list books they own, browse a paginated catalog and
//! initiate exchanges; a wallet/movement ledger tracks the notional currency
//! used to balance exchanges.
//!
//! # Features
//!
//! - Account registration and credential login
//! - Stateless bearer tokens (cookie or Authorization header)
//! - Book listings with owner-or-admin gated mutation
//! - Offset pagination with a consistent page/count snapshot
//! - Append-only wallet ledger with derived balances
//! - Exchange proposals
//! - Cover image uploads

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Authentication and user management.
pub mod auth;
/// Book listing lifecycle.
pub mod books;
/// Configuration and CLI.
pub mod config;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// Exchange proposals.
pub mod exchange;
/// HTTP server.
pub mod server;
/// Bearer token issuance.
pub mod token;
/// Image upload storage.
pub mod uploads;
/// Wallet and movement ledger.
pub mod wallet;

#[cfg(test)]
mod tests;

pub use config::{Cli, Command, Config};
pub use db::Database;
pub use error::{AppError, Result};
pub use server::AppState;
