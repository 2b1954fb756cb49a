//! Book listing lifecycle: creation, paginated retrieval, ownership-gated
//! mutation.

use crate::db::{Book, BookCondition, BookWithOwner, Database, Role, now_timestamp};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Default page number.
const DEFAULT_PAGE: u32 = 1;
/// Default page size.
const DEFAULT_LIMIT: u32 = 10;

/// Input for creating a book listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    /// Book title.
    pub title: String,
    /// Primary author.
    pub author: String,
    /// Optional ISBN-10 or ISBN-13.
    pub isbn: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Condition, validated against the closed enumeration.
    pub condition: String,
    /// Where the book is offered.
    pub location: String,
    /// Asking price.
    pub price: f64,
    /// Owning user.
    pub owner_id: String,
    /// Cover image URL produced by the upload store, if any.
    pub image_url: Option<String>,
}

/// Partial field patch for updating a book. Absent fields stay unchanged;
/// `id` and `ownerId` are not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    /// New title.
    pub title: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New ISBN.
    pub isbn: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New condition.
    pub condition: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New price.
    pub price: Option<f64>,
    /// New availability flag.
    pub available: Option<bool>,
}

/// Pagination summary returned alongside a catalog page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The requested page.
    pub current_page: u32,
    /// Total number of pages at this limit.
    pub total_pages: u32,
    /// Total number of books.
    pub total_books: i64,
    /// Page size.
    pub limit: u32,
    /// Whether a next page exists.
    pub has_next_page: bool,
    /// Whether a previous page exists.
    pub has_previous_page: bool,
}

/// One catalog page with its pagination summary.
#[derive(Debug, Serialize)]
pub struct BookPage {
    /// Books on this page, newest first, each with an owner projection.
    pub data: Vec<BookWithOwner>,
    /// Pagination summary computed from the same snapshot as `data`.
    pub pagination: Pagination,
}

/// Result of an update.
#[derive(Debug, Serialize)]
pub struct BookUpdated {
    /// Confirmation message.
    pub message: String,
    /// The updated book.
    pub book: Book,
}

/// Result of a delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDeleted {
    /// Confirmation message.
    pub message: String,
    /// ID of the removed book.
    pub deleted_book_id: String,
}

/// Book domain service.
pub struct BookService {
    db: Database,
}

impl BookService {
    /// Create a new book service.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a book listing. The book starts out available.
    pub fn create(&self, new_book: NewBook) -> Result<Book> {
        let condition: BookCondition = new_book.condition.parse()?;
        validate_price(new_book.price)?;

        if let Some(ref isbn) = new_book.isbn {
            validate_isbn(isbn)?;
        }

        if new_book.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }

        if self.db.get_user_by_id(&new_book.owner_id)?.is_none() {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                new_book.owner_id
            )));
        }

        let now = now_timestamp();
        let book = Book {
            id: uuid::Uuid::new_v4().to_string(),
            title: new_book.title,
            author: new_book.author,
            isbn: new_book.isbn,
            description: new_book.description,
            image_url: new_book.image_url,
            condition,
            price: new_book.price,
            location: new_book.location,
            available: true,
            owner_id: new_book.owner_id,
            created_at: now,
            updated_at: now,
        };

        self.db.create_book(&book)?;
        Ok(book)
    }

    /// Fetch one catalog page. Page contents and total count come from a
    /// single store snapshot, so the summary can never disagree with the
    /// data.
    pub fn find_all(&self, page: Option<u32>, limit: Option<u32>) -> Result<BookPage> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::Validation("page must be >= 1".to_string()));
        }
        if limit < 1 {
            return Err(AppError::Validation("limit must be >= 1".to_string()));
        }

        let skip = (page - 1).saturating_mul(limit);
        let (data, total_books) = self.db.list_books_page(skip, limit)?;

        let total_pages = (total_books + limit as i64 - 1) / limit as i64;
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);

        Ok(BookPage {
            data,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_books,
                limit,
                has_next_page: page < total_pages,
                has_previous_page: page > 1,
            },
        })
    }

    /// Get one book with its owner projection.
    pub fn find_one(&self, id: &str) -> Result<BookWithOwner> {
        self.db
            .get_book_with_owner(id)?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Apply a partial patch to a book. Only the owner or an admin may edit;
    /// a new image URL replaces the stored one, otherwise it is kept.
    pub fn update(
        &self,
        id: &str,
        patch: BookPatch,
        new_image_url: Option<String>,
        actor_id: &str,
        actor_role: Role,
    ) -> Result<BookUpdated> {
        let mut book = self.fetch_authorized(id, actor_id, actor_role, "edit")?;

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title must not be empty".to_string()));
            }
            book.title = title;
        }
        if let Some(author) = patch.author {
            book.author = author;
        }
        if let Some(isbn) = patch.isbn {
            validate_isbn(&isbn)?;
            book.isbn = Some(isbn);
        }
        if let Some(description) = patch.description {
            book.description = Some(description);
        }
        if let Some(condition) = patch.condition {
            book.condition = condition.parse()?;
        }
        if let Some(location) = patch.location {
            book.location = location;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            book.price = price;
        }
        if let Some(available) = patch.available {
            book.available = available;
        }
        if let Some(image_url) = new_image_url {
            book.image_url = Some(image_url);
        }

        book.updated_at = now_timestamp();
        self.db.update_book(&book)?;

        Ok(BookUpdated {
            message: "Book updated successfully".to_string(),
            book,
        })
    }

    /// Delete a book. Only the owner or an admin may delete; exchanges
    /// referencing the book cascade.
    pub fn delete(&self, id: &str, actor_id: &str, actor_role: Role) -> Result<BookDeleted> {
        let book = self.fetch_authorized(id, actor_id, actor_role, "delete")?;

        self.db.delete_book(&book.id)?;

        Ok(BookDeleted {
            message: "Book deleted successfully".to_string(),
            deleted_book_id: book.id,
        })
    }

    /// Shared ownership gate for mutation: existence is checked before
    /// authorization, so a missing book is NotFound even for strangers.
    fn fetch_authorized(
        &self,
        id: &str,
        actor_id: &str,
        actor_role: Role,
        action: &str,
    ) -> Result<Book> {
        let book = self
            .db
            .get_book(id)?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let is_owner = book.owner_id == actor_id;
        if !is_owner && !actor_role.is_admin() {
            return Err(AppError::Forbidden(format!(
                "You are not permitted to {} this book",
                action
            )));
        }

        Ok(book)
    }
}

/// Price must be positive with at most two decimal places.
fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::Validation("Price must be positive".to_string()));
    }

    let cents = price * 100.0;
    if (cents - cents.round()).abs() > 1e-9 {
        return Err(AppError::Validation(
            "Price must have at most two decimal places".to_string(),
        ));
    }

    Ok(())
}

/// Validate an ISBN-10 or ISBN-13 checksum. Hyphens and spaces are ignored.
fn validate_isbn(isbn: &str) -> Result<()> {
    let digits: Vec<char> = isbn
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect();

    let valid = match digits.len() {
        10 => is_valid_isbn10(&digits),
        13 => is_valid_isbn13(&digits),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "'{}' is not a valid ISBN-10 or ISBN-13",
            isbn
        )))
    }
}

fn is_valid_isbn10(digits: &[char]) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.iter().enumerate() {
        let value = match c {
            '0'..='9' => *c as u32 - '0' as u32,
            // 'X' is only legal as the check digit
            'X' if i == 9 => 10,
            _ => return false,
        };
        sum += value * (10 - i as u32);
    }
    sum % 11 == 0
}

fn is_valid_isbn13(digits: &[char]) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.iter().enumerate() {
        let value = match c {
            '0'..='9' => *c as u32 - '0' as u32,
            _ => return false,
        };
        sum += value * if i % 2 == 0 { 1 } else { 3 };
    }
    sum % 10 == 0
}
