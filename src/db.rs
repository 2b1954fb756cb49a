mod schema;

pub use schema::Database;

use crate::error::AppError;
use chrono::{DateTime, Utc};
use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// User role. The sole authorization dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular user.
    User,
    /// Administrator, may mutate any book.
    Admin,
}

impl Role {
    /// Wire representation, also used as the TEXT column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Whether this role grants admin privileges.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AppError::Validation(format!("Unknown role: {}", s))),
        }
    }
}

/// Physical condition of a listed book.
///
/// Unknown values must fail validation up front, never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookCondition {
    /// Never used.
    New,
    /// Normal wear.
    Good,
    /// Noticeable wear.
    Fair,
    /// Heavy wear.
    Poor,
    /// Like new.
    Excellent,
}

impl BookCondition {
    /// Wire representation, also used as the TEXT column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCondition::New => "NEW",
            BookCondition::Good => "GOOD",
            BookCondition::Fair => "FAIR",
            BookCondition::Poor => "POOR",
            BookCondition::Excellent => "EXCELLENT",
        }
    }
}

impl std::str::FromStr for BookCondition {
    type Err = AppError;

    // Case-sensitive exact match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(BookCondition::New),
            "GOOD" => Ok(BookCondition::Good),
            "FAIR" => Ok(BookCondition::Fair),
            "POOR" => Ok(BookCondition::Poor),
            "EXCELLENT" => Ok(BookCondition::Excellent),
            _ => Err(AppError::Validation(format!(
                "Invalid condition '{}', expected one of NEW, GOOD, FAIR, POOR, EXCELLENT",
                s
            ))),
        }
    }
}

/// Direction of a wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Credit to the wallet.
    Income,
    /// Debit from the wallet.
    Expense,
}

impl MovementType {
    /// Wire representation, also used as the TEXT column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Income => "INCOME",
            MovementType::Expense => "EXPENSE",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(MovementType::Income),
            "EXPENSE" => Ok(MovementType::Expense),
            _ => Err(AppError::Validation(format!(
                "Unknown movement type: {}",
                s
            ))),
        }
    }
}

/// Lifecycle of an exchange proposal. Only Pending is ever written by this
/// backend; the remaining states exist for forward compatibility of the
/// stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeStatus {
    /// Proposed, awaiting a response.
    Pending,
    /// Accepted by the receiver.
    Accepted,
    /// Rejected by the receiver.
    Rejected,
    /// Exchange carried out.
    Completed,
}

impl ExchangeStatus {
    /// Wire representation, also used as the TEXT column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "PENDING",
            ExchangeStatus::Accepted => "ACCEPTED",
            ExchangeStatus::Rejected => "REJECTED",
            ExchangeStatus::Completed => "COMPLETED",
        }
    }
}

impl std::str::FromStr for ExchangeStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ExchangeStatus::Pending),
            "ACCEPTED" => Ok(ExchangeStatus::Accepted),
            "REJECTED" => Ok(ExchangeStatus::Rejected),
            "COMPLETED" => Ok(ExchangeStatus::Completed),
            _ => Err(AppError::Validation(format!(
                "Unknown exchange status: {}",
                s
            ))),
        }
    }
}

macro_rules! impl_text_sql {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse::<$ty>()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

impl_text_sql!(Role);
impl_text_sql!(BookCondition);
impl_text_sql!(MovementType);
impl_text_sql!(ExchangeStatus);

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email, unique across accounts.
    pub email: String,
    /// Argon2 password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: i64,
    /// Last modification timestamp.
    pub updated_at: i64,
}

/// Book listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique book ID.
    pub id: String,
    /// Book title.
    pub title: String,
    /// Primary author.
    pub author: String,
    /// ISBN-10 or ISBN-13.
    pub isbn: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// URL of the cover image, if one was uploaded.
    pub image_url: Option<String>,
    /// Physical condition.
    pub condition: BookCondition,
    /// Asking price in the notional currency, two decimal places max.
    pub price: f64,
    /// Where the book is offered.
    pub location: String,
    /// Whether the book is still available for exchange.
    pub available: bool,
    /// Owning user. Immutable after creation.
    pub owner_id: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last modification timestamp.
    pub updated_at: i64,
}

/// Minimal owner projection attached to catalog reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSummary {
    /// Owner user ID.
    pub id: String,
    /// Owner display name.
    pub name: String,
}

/// Book joined with its owner projection.
#[derive(Debug, Clone, Serialize)]
pub struct BookWithOwner {
    /// The book record.
    #[serde(flatten)]
    pub book: Book,
    /// Owner projection.
    pub owner: OwnerSummary,
}

/// Wallet holding the notional currency. One per user; the balance is
/// derived from the movement ledger, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Unique wallet ID.
    pub id: String,
    /// Owning user ID (1:1).
    pub user_id: String,
    /// Creation timestamp.
    pub created_at: i64,
}

/// Append-only ledger entry adjusting a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    /// Unique movement ID.
    pub id: String,
    /// Wallet this movement belongs to.
    pub wallet_id: String,
    /// Amount moved, always positive; direction is carried by `kind`.
    pub amount: f64,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: MovementType,
    /// Human-readable reason for the movement.
    pub reason: String,
    /// Creation timestamp.
    pub created_at: i64,
}

/// Exchange proposal between two users over a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    /// Unique exchange ID.
    pub id: String,
    /// Book being exchanged.
    pub book_id: String,
    /// Proposing user.
    pub sender_id: String,
    /// Receiving user.
    pub receiver_id: String,
    /// Proposal status.
    pub status: ExchangeStatus,
    /// Creation timestamp.
    pub created_at: i64,
}

/// Timestamp helper.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Convert timestamp to DateTime.
pub fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}
