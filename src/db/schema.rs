use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Arc;

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'USER',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Books table
            CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                isbn TEXT,
                description TEXT,
                image_url TEXT,
                condition TEXT NOT NULL,
                price REAL NOT NULL,
                location TEXT NOT NULL,
                available INTEGER NOT NULL DEFAULT 1,
                owner_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Wallets table (one per user, balance derived from movements)
            CREATE TABLE IF NOT EXISTS wallets (
                id TEXT PRIMARY KEY,
                user_id TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Movements table (append-only ledger)
            CREATE TABLE IF NOT EXISTS movements (
                id TEXT PRIMARY KEY,
                wallet_id TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                reason TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (wallet_id) REFERENCES wallets(id) ON DELETE CASCADE
            );

            -- Exchanges table
            CREATE TABLE IF NOT EXISTS exchanges (
                id TEXT PRIMARY KEY,
                book_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                receiver_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                created_at INTEGER NOT NULL,
                FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
                FOREIGN KEY (sender_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (receiver_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_books_owner ON books(owner_id);
            CREATE INDEX IF NOT EXISTS idx_books_created ON books(created_at);
            CREATE INDEX IF NOT EXISTS idx_movements_wallet ON movements(wallet_id);
            CREATE INDEX IF NOT EXISTS idx_exchanges_book ON exchanges(book_id);
            "#,
        )
        .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== USER OPERATIONS ==========

    /// Create a new user.
    pub fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.role,
                user.created_at,
                user.updated_at,
            ],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Duplicate(format!("Email '{}' is already registered", user.email))
            } else {
                AppError::Internal(format!("Failed to create user: {}", e))
            }
        })?;
        Ok(())
    }

    /// Get user by email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, email, password_hash, role, created_at, updated_at
             FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    role: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// Get user by ID.
    pub fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, email, password_hash, role, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    role: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, email, password_hash, role, created_at, updated_at
                 FROM users ORDER BY email",
            )
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    role: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })
            .map_err(|e| AppError::Internal(format!("Failed to list users: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect users: {}", e)))?;

        Ok(users)
    }

    /// Delete user by email.
    pub fn delete_user(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])
            .map_err(|e| AppError::Internal(format!("Failed to delete user: {}", e)))?;
        Ok(rows > 0)
    }

    // ========== BOOK OPERATIONS ==========

    /// Create a new book.
    pub fn create_book(&self, book: &Book) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO books (id, title, author, isbn, description, image_url, condition,
                                price, location, available, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                book.id,
                book.title,
                book.author,
                book.isbn,
                book.description,
                book.image_url,
                book.condition,
                book.price,
                book.location,
                book.available,
                book.owner_id,
                book.created_at,
                book.updated_at,
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create book: {}", e)))?;
        Ok(())
    }

    /// Get book by ID (no owner projection).
    pub fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author, isbn, description, image_url, condition,
                    price, location, available, owner_id, created_at, updated_at
             FROM books WHERE id = ?1",
            params![id],
            |row| {
                Ok(Book {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    author: row.get(2)?,
                    isbn: row.get(3)?,
                    description: row.get(4)?,
                    image_url: row.get(5)?,
                    condition: row.get(6)?,
                    price: row.get(7)?,
                    location: row.get(8)?,
                    available: row.get(9)?,
                    owner_id: row.get(10)?,
                    created_at: row.get(11)?,
                    updated_at: row.get(12)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// Get book by ID, joined with the owner projection.
    pub fn get_book_with_owner(&self, id: &str) -> Result<Option<BookWithOwner>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT b.id, b.title, b.author, b.isbn, b.description, b.image_url, b.condition,
                    b.price, b.location, b.available, b.owner_id, b.created_at, b.updated_at,
                    u.id, u.name
             FROM books b
             JOIN users u ON u.id = b.owner_id
             WHERE b.id = ?1",
            params![id],
            |row| {
                Ok(BookWithOwner {
                    book: Book {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        author: row.get(2)?,
                        isbn: row.get(3)?,
                        description: row.get(4)?,
                        image_url: row.get(5)?,
                        condition: row.get(6)?,
                        price: row.get(7)?,
                        location: row.get(8)?,
                        available: row.get(9)?,
                        owner_id: row.get(10)?,
                        created_at: row.get(11)?,
                        updated_at: row.get(12)?,
                    },
                    owner: OwnerSummary {
                        id: row.get(13)?,
                        name: row.get(14)?,
                    },
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// Fetch one catalog page (newest first, with owner projection) together
    /// with the total book count.
    ///
    /// Both reads run under the same connection lock so the page and the
    /// count observe the same database state.
    pub fn list_books_page(&self, skip: u32, limit: u32) -> Result<(Vec<BookWithOwner>, i64)> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT b.id, b.title, b.author, b.isbn, b.description, b.image_url, b.condition,
                        b.price, b.location, b.available, b.owner_id, b.created_at, b.updated_at,
                        u.id, u.name
                 FROM books b
                 JOIN users u ON u.id = b.owner_id
                 ORDER BY b.created_at DESC, b.id DESC
                 LIMIT ?1 OFFSET ?2",
            )
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let books = stmt
            .query_map(params![limit, skip], |row| {
                Ok(BookWithOwner {
                    book: Book {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        author: row.get(2)?,
                        isbn: row.get(3)?,
                        description: row.get(4)?,
                        image_url: row.get(5)?,
                        condition: row.get(6)?,
                        price: row.get(7)?,
                        location: row.get(8)?,
                        available: row.get(9)?,
                        owner_id: row.get(10)?,
                        created_at: row.get(11)?,
                        updated_at: row.get(12)?,
                    },
                    owner: OwnerSummary {
                        id: row.get(13)?,
                        name: row.get(14)?,
                    },
                })
            })
            .map_err(|e| AppError::Internal(format!("Failed to list books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect books: {}", e)))?;

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .map_err(|e| AppError::Internal(format!("Failed to count books: {}", e)))?;

        Ok((books, total))
    }

    /// Update a book record. `owner_id` and `created_at` are intentionally
    /// absent from the SET list.
    pub fn update_book(&self, book: &Book) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE books SET title = ?1, author = ?2, isbn = ?3, description = ?4,
                              image_url = ?5, condition = ?6, price = ?7, location = ?8,
                              available = ?9, updated_at = ?10
             WHERE id = ?11",
            params![
                book.title,
                book.author,
                book.isbn,
                book.description,
                book.image_url,
                book.condition,
                book.price,
                book.location,
                book.available,
                book.updated_at,
                book.id,
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to update book: {}", e)))?;
        Ok(())
    }

    /// Delete book. Related exchanges cascade.
    pub fn delete_book(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])
            .map_err(|e| AppError::Internal(format!("Failed to delete book: {}", e)))?;
        Ok(rows > 0)
    }

    // ========== WALLET OPERATIONS ==========

    /// Create a wallet.
    pub fn create_wallet(&self, wallet: &Wallet) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO wallets (id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![wallet.id, wallet.user_id, wallet.created_at],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Duplicate(format!("User '{}' already has a wallet", wallet.user_id))
            } else {
                AppError::Internal(format!("Failed to create wallet: {}", e))
            }
        })?;
        Ok(())
    }

    /// Get wallet by ID.
    pub fn get_wallet(&self, id: &str) -> Result<Option<Wallet>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, user_id, created_at FROM wallets WHERE id = ?1",
            params![id],
            |row| {
                Ok(Wallet {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get wallet: {}", e)))
    }

    /// Get wallet by owning user.
    pub fn get_wallet_by_user(&self, user_id: &str) -> Result<Option<Wallet>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, user_id, created_at FROM wallets WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(Wallet {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get wallet: {}", e)))
    }

    // ========== MOVEMENT OPERATIONS ==========

    /// Append a movement to the ledger.
    pub fn insert_movement(&self, movement: &Movement) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO movements (id, wallet_id, amount, type, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                movement.id,
                movement.wallet_id,
                movement.amount,
                movement.kind,
                movement.reason,
                movement.created_at,
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to insert movement: {}", e)))?;
        Ok(())
    }

    /// List movements for a wallet, oldest first.
    pub fn list_movements(&self, wallet_id: &str) -> Result<Vec<Movement>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, wallet_id, amount, type, reason, created_at
                 FROM movements WHERE wallet_id = ?1
                 ORDER BY created_at, id",
            )
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let movements = stmt
            .query_map(params![wallet_id], |row| {
                Ok(Movement {
                    id: row.get(0)?,
                    wallet_id: row.get(1)?,
                    amount: row.get(2)?,
                    kind: row.get(3)?,
                    reason: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|e| AppError::Internal(format!("Failed to list movements: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect movements: {}", e)))?;

        Ok(movements)
    }

    /// Wallet balance, derived from the ledger sum.
    pub fn wallet_balance(&self, wallet_id: &str) -> Result<f64> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COALESCE(SUM(CASE type WHEN 'INCOME' THEN amount ELSE -amount END), 0)
             FROM movements WHERE wallet_id = ?1",
            params![wallet_id],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Internal(format!("Failed to compute balance: {}", e)))
    }

    // ========== EXCHANGE OPERATIONS ==========

    /// Create an exchange proposal.
    pub fn create_exchange(&self, exchange: &Exchange) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO exchanges (id, book_id, sender_id, receiver_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                exchange.id,
                exchange.book_id,
                exchange.sender_id,
                exchange.receiver_id,
                exchange.status,
                exchange.created_at,
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create exchange: {}", e)))?;
        Ok(())
    }

    /// Get exchange by ID.
    pub fn get_exchange(&self, id: &str) -> Result<Option<Exchange>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, book_id, sender_id, receiver_id, status, created_at
             FROM exchanges WHERE id = ?1",
            params![id],
            |row| {
                Ok(Exchange {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    receiver_id: row.get(3)?,
                    status: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get exchange: {}", e)))
    }

    /// List exchanges referencing a book, newest first.
    pub fn list_exchanges_for_book(&self, book_id: &str) -> Result<Vec<Exchange>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, book_id, sender_id, receiver_id, status, created_at
                 FROM exchanges WHERE book_id = ?1
                 ORDER BY created_at DESC, id",
            )
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let exchanges = stmt
            .query_map(params![book_id], |row| {
                Ok(Exchange {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    receiver_id: row.get(3)?,
                    status: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|e| AppError::Internal(format!("Failed to list exchanges: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect exchanges: {}", e)))?;

        Ok(exchanges)
    }
}
