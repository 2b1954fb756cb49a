use crate::auth::AuthService;
use crate::books::{BookPatch, BookService, NewBook};
use crate::config::Config;
use crate::db::{Book, BookCondition, Database, ExchangeStatus, Role, User, now_timestamp};
use crate::error::AppError;
use crate::exchange::ExchangeService;
use crate::token::TokenIssuer;
use crate::wallet::WalletService;

const TEST_SECRET: &str = "test_secret_key_long_enough_for_hs256";

fn test_db() -> Database {
    Database::open_memory().unwrap()
}

fn test_auth(db: &Database) -> AuthService {
    AuthService::new(db.clone(), TokenIssuer::new(TEST_SECRET, 7))
}

fn test_books(db: &Database) -> BookService {
    BookService::new(db.clone())
}

fn create_user(db: &Database, id: &str, name: &str, email: &str) {
    let user = User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: Role::User,
        created_at: now_timestamp(),
        updated_at: now_timestamp(),
    };
    db.create_user(&user).unwrap();
}

fn create_book(db: &Database, id: &str, owner_id: &str, title: &str, created_at: i64) {
    let book = Book {
        id: id.to_string(),
        title: title.to_string(),
        author: "Author".to_string(),
        isbn: None,
        description: None,
        image_url: None,
        condition: BookCondition::Good,
        price: 10.0,
        location: "Tarragona".to_string(),
        available: true,
        owner_id: owner_id.to_string(),
        created_at,
        updated_at: created_at,
    };
    db.create_book(&book).unwrap();
}

fn new_book(owner_id: &str) -> NewBook {
    NewBook {
        title: "Test Book".to_string(),
        author: "Test Author".to_string(),
        isbn: Some("9780451524935".to_string()),
        description: Some("Test description".to_string()),
        condition: "GOOD".to_string(),
        location: "Test Location".to_string(),
        price: 4.99,
        owner_id: owner_id.to_string(),
        image_url: Some("/uploads/test.jpg".to_string()),
    }
}

// ========== DATABASE ==========

#[test]
fn db_create_and_get_user() {
    let db = test_db();
    let user = User {
        id: "user-1".to_string(),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: "hash".to_string(),
        role: Role::Admin,
        created_at: now_timestamp(),
        updated_at: now_timestamp(),
    };

    db.create_user(&user).unwrap();

    let found = db.get_user_by_email("alice@example.com").unwrap().unwrap();
    assert_eq!(found.id, "user-1");
    assert_eq!(found.name, "Alice");
    assert_eq!(found.role, Role::Admin);

    let found_by_id = db.get_user_by_id("user-1").unwrap().unwrap();
    assert_eq!(found_by_id.email, "alice@example.com");
}

#[test]
fn db_duplicate_email_fails() {
    let db = test_db();
    create_user(&db, "user-1", "Alice", "alice@example.com");

    let user2 = User {
        id: "user-2".to_string(),
        name: "Other Alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: "hash2".to_string(),
        role: Role::User,
        created_at: now_timestamp(),
        updated_at: now_timestamp(),
    };

    assert!(matches!(
        db.create_user(&user2),
        Err(AppError::Duplicate(_))
    ));
}

#[test]
fn db_delete_user() {
    let db = test_db();
    create_user(&db, "user-1", "Bob", "bob@example.com");

    assert!(db.delete_user("bob@example.com").unwrap());
    assert!(db.get_user_by_email("bob@example.com").unwrap().is_none());
}

#[test]
fn db_page_and_count_come_from_one_snapshot() {
    let db = test_db();
    create_user(&db, "user-1", "Alice", "alice@example.com");

    let base = now_timestamp();
    for i in 0..3 {
        create_book(&db, &format!("book-{}", i), "user-1", "Book", base + i);
    }

    let (page, total) = db.list_books_page(0, 2).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total, 3);
}

// ========== AUTH ==========

#[test]
fn auth_register_and_login() {
    let db = test_db();
    let auth = test_auth(&db);

    let registered = auth
        .register("Angela", "angela@example.com", "password123")
        .unwrap();
    assert_eq!(registered.message, "Successfully registered user");
    assert_eq!(registered.user.email, "angela@example.com");
    assert_eq!(registered.user.role, Role::User);

    let user = auth
        .validate_user("angela@example.com", "password123")
        .unwrap();
    let token = auth.login(&user).unwrap();

    let identity = auth.verify_token(&token).unwrap();
    assert_eq!(identity.id, user.id);
    assert_eq!(identity.email, "angela@example.com");
    assert_eq!(identity.name, "Angela");
    assert_eq!(identity.role, Role::User);
}

#[test]
fn auth_duplicate_email_leaves_first_record_untouched() {
    let db = test_db();
    let auth = test_auth(&db);

    auth.register("Angela", "angela@example.com", "password123")
        .unwrap();

    let result = auth.register("Impostor", "angela@example.com", "otherpass123");
    assert!(matches!(result, Err(AppError::Duplicate(_))));

    let stored = db.get_user_by_email("angela@example.com").unwrap().unwrap();
    assert_eq!(stored.name, "Angela");
}

#[test]
fn auth_identical_error_for_unknown_email_and_wrong_password() {
    let db = test_db();
    let auth = test_auth(&db);

    auth.register("Angela", "angela@example.com", "password123")
        .unwrap();

    let unknown = auth
        .validate_user("ghost@example.com", "password123")
        .unwrap_err();
    let wrong = auth
        .validate_user("angela@example.com", "wrong-password")
        .unwrap_err();

    assert!(matches!(unknown, AppError::Unauthenticated(_)));
    assert!(matches!(wrong, AppError::Unauthenticated(_)));
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[test]
fn auth_register_validates_input() {
    let db = test_db();
    let auth = test_auth(&db);

    assert!(matches!(
        auth.register("Angela", "not-an-email", "password123"),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        auth.register("Angela", "angela@example.com", "short"),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        auth.register("", "angela@example.com", "password123"),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn auth_expired_token_rejected() {
    let issuer = TokenIssuer::new(TEST_SECRET, 7);

    let expired = crate::token::Claims {
        sub: "user-1".to_string(),
        email: "angela@example.com".to_string(),
        name: "Angela".to_string(),
        role: Role::User,
        iat: now_timestamp() - 9 * 24 * 60 * 60,
        exp: now_timestamp() - 2 * 24 * 60 * 60,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &expired,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    assert!(matches!(
        issuer.verify(&token),
        Err(AppError::Unauthenticated(_))
    ));
}

// ========== BOOKS ==========

#[test]
fn books_create_and_find_one_round_trip() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let created = books.create(new_book("user-1")).unwrap();
    assert!(created.available);
    assert_eq!(created.condition, BookCondition::Good);

    let found = books.find_one(&created.id).unwrap();
    assert_eq!(found.book.id, created.id);
    assert_eq!(found.book.title, "Test Book");
    assert_eq!(found.book.author, "Test Author");
    assert_eq!(found.book.isbn.as_deref(), Some("9780451524935"));
    assert_eq!(found.book.price, 4.99);
    assert_eq!(found.book.owner_id, "user-1");
    assert_eq!(found.owner.id, "user-1");
    assert_eq!(found.owner.name, "Angela");
}

#[test]
fn books_create_rejects_three_decimal_price() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let mut book = new_book("user-1");
    book.price = 4.999;

    assert!(matches!(
        books.create(book),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn books_create_rejects_non_positive_price() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    for price in [0.0, -4.99] {
        let mut book = new_book("user-1");
        book.price = price;
        assert!(matches!(
            books.create(book),
            Err(AppError::Validation(_))
        ));
    }
}

#[test]
fn books_create_rejects_unknown_condition() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    // Case-sensitive exact match: lowercase is not accepted either.
    for condition in ["MINT", "good", ""] {
        let mut book = new_book("user-1");
        book.condition = condition.to_string();
        assert!(matches!(
            books.create(book),
            Err(AppError::Validation(_))
        ));
    }
}

#[test]
fn books_create_rejects_invalid_isbn() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let mut book = new_book("user-1");
    book.isbn = Some("9780451524936".to_string());

    assert!(matches!(
        books.create(book),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn books_create_rejects_missing_owner() {
    let db = test_db();
    let books = test_books(&db);

    assert!(matches!(
        books.create(new_book("nobody")),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn books_find_one_not_found() {
    let db = test_db();
    let books = test_books(&db);

    assert!(matches!(
        books.find_one("missing"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn books_find_all_page_two_of_six() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let base = now_timestamp();
    for i in 0..6 {
        create_book(&db, &format!("book-{}", i), "user-1", "Book", base + i);
    }

    let page = books.find_all(Some(2), Some(5)).unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.pagination.current_page, 2);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.pagination.total_books, 6);
    assert_eq!(page.pagination.limit, 5);
    assert!(!page.pagination.has_next_page);
    assert!(page.pagination.has_previous_page);
}

#[test]
fn books_find_all_defaults() {
    let db = test_db();
    let books = test_books(&db);

    let page = books.find_all(None, None).unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(page.pagination.total_pages, 0);
    assert_eq!(page.pagination.total_books, 0);
    assert_eq!(page.pagination.limit, 10);
    assert!(!page.pagination.has_next_page);
    assert!(!page.pagination.has_previous_page);
}

#[test]
fn books_find_all_pagination_invariants() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let base = now_timestamp();
    for i in 0..7 {
        create_book(&db, &format!("book-{}", i), "user-1", "Book", base + i);
    }

    for (page, limit) in [(1, 1), (1, 2), (2, 3), (3, 3), (4, 2), (1, 10), (2, 10)] {
        let result = books.find_all(Some(page), Some(limit)).unwrap();
        let p = &result.pagination;

        assert_eq!(p.total_books, 7);
        assert_eq!(
            p.has_next_page,
            (page as i64 * limit as i64) < p.total_books
        );
        assert_eq!(p.has_previous_page, page > 1);
        assert_eq!(
            p.total_pages as i64,
            (p.total_books + limit as i64 - 1) / limit as i64
        );
    }
}

#[test]
fn books_find_all_rejects_zero_page_or_limit() {
    let db = test_db();
    let books = test_books(&db);

    assert!(matches!(
        books.find_all(Some(0), None),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        books.find_all(None, Some(0)),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn books_find_all_newest_first() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let base = now_timestamp();
    create_book(&db, "book-old", "user-1", "Old", base);
    create_book(&db, "book-new", "user-1", "New", base + 100);

    let page = books.find_all(None, None).unwrap();
    assert_eq!(page.data[0].book.id, "book-new");
    assert_eq!(page.data[1].book.id, "book-old");
}

#[test]
fn books_update_by_owner() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let patch = BookPatch {
        title: Some("Updated Book".to_string()),
        price: Some(12.50),
        available: Some(false),
        ..Default::default()
    };

    let updated = books
        .update(&created.id, patch, None, "user-1", Role::User)
        .unwrap();
    assert_eq!(updated.message, "Book updated successfully");
    assert_eq!(updated.book.title, "Updated Book");
    assert_eq!(updated.book.price, 12.50);
    assert!(!updated.book.available);
    // Untouched fields survive, ownership never changes
    assert_eq!(updated.book.author, "Test Author");
    assert_eq!(updated.book.owner_id, "user-1");
    assert_eq!(
        updated.book.image_url.as_deref(),
        Some("/uploads/test.jpg")
    );
}

#[test]
fn books_update_by_admin() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let patch = BookPatch {
        title: Some("Admin Edit".to_string()),
        ..Default::default()
    };

    let updated = books
        .update(&created.id, patch, None, "admin-1", Role::Admin)
        .unwrap();
    assert_eq!(updated.book.title, "Admin Edit");
}

#[test]
fn books_update_forbidden_for_stranger() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let result = books.update(
        &created.id,
        BookPatch::default(),
        None,
        "other-user",
        Role::User,
    );
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[test]
fn books_update_not_found_checked_before_authorization() {
    let db = test_db();
    let books = test_books(&db);

    // Even a stranger gets NotFound for a missing book, never Forbidden.
    let result = books.update(
        "missing",
        BookPatch::default(),
        None,
        "other-user",
        Role::User,
    );
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn books_update_replaces_image_only_when_provided() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let kept = books
        .update(&created.id, BookPatch::default(), None, "user-1", Role::User)
        .unwrap();
    assert_eq!(kept.book.image_url.as_deref(), Some("/uploads/test.jpg"));

    let replaced = books
        .update(
            &created.id,
            BookPatch::default(),
            Some("/uploads/new.png".to_string()),
            "user-1",
            Role::User,
        )
        .unwrap();
    assert_eq!(replaced.book.image_url.as_deref(), Some("/uploads/new.png"));
}

#[test]
fn books_update_revalidates_patched_fields() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let bad_price = BookPatch {
        price: Some(9.999),
        ..Default::default()
    };
    assert!(matches!(
        books.update(&created.id, bad_price, None, "user-1", Role::User),
        Err(AppError::Validation(_))
    ));

    let bad_condition = BookPatch {
        condition: Some("MINT".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        books.update(&created.id, bad_condition, None, "user-1", Role::User),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn books_delete_by_owner() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let deleted = books.delete(&created.id, "user-1", Role::User).unwrap();
    assert_eq!(deleted.message, "Book deleted successfully");
    assert_eq!(deleted.deleted_book_id, created.id);

    assert!(matches!(
        books.find_one(&created.id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn books_delete_by_admin() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    assert!(books.delete(&created.id, "admin-1", Role::Admin).is_ok());
}

#[test]
fn books_delete_forbidden_for_stranger() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    assert!(matches!(
        books.delete(&created.id, "other-user", Role::User),
        Err(AppError::Forbidden(_))
    ));

    // The listing is still there.
    assert!(books.find_one(&created.id).is_ok());
}

#[test]
fn books_delete_not_found_checked_before_authorization() {
    let db = test_db();
    let books = test_books(&db);

    assert!(matches!(
        books.delete("missing", "other-user", Role::User),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn books_delete_cascades_exchanges() {
    let db = test_db();
    let books = test_books(&db);
    let exchanges = ExchangeService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    create_user(&db, "user-2", "Carlos", "carlos@example.com");
    let created = books.create(new_book("user-1")).unwrap();

    let exchange = exchanges.propose(&created.id, "user-1", "user-2").unwrap();

    books.delete(&created.id, "user-1", Role::User).unwrap();

    assert!(matches!(
        exchanges.find_one(&exchange.id),
        Err(AppError::NotFound(_))
    ));
}

// ========== WALLET ==========

#[test]
fn wallet_one_per_user() {
    let db = test_db();
    let wallets = WalletService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");

    let wallet = wallets.create("user-1").unwrap();
    assert_eq!(wallet.user_id, "user-1");
    assert_eq!(wallets.find_by_user("user-1").unwrap().id, wallet.id);

    assert!(matches!(
        wallets.create("user-1"),
        Err(AppError::Duplicate(_))
    ));
}

#[test]
fn wallet_requires_existing_user() {
    let db = test_db();
    let wallets = WalletService::new(db.clone());

    assert!(matches!(
        wallets.create("nobody"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn wallet_balance_is_ledger_sum() {
    let db = test_db();
    let wallets = WalletService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let wallet = wallets.create("user-1").unwrap();

    assert_eq!(wallets.balance(&wallet.id).unwrap(), 0.0);

    wallets.deposit(&wallet.id, 50.0, "Initial balance").unwrap();
    wallets.deposit(&wallet.id, 15.5, "Book sold").unwrap();
    wallets.withdraw(&wallet.id, 20.0, "Book bought").unwrap();

    assert_eq!(wallets.balance(&wallet.id).unwrap(), 45.5);

    let movements = wallets.movements(&wallet.id).unwrap();
    assert_eq!(movements.len(), 3);
    assert_eq!(movements[0].reason, "Initial balance");
}

#[test]
fn wallet_withdraw_cannot_overdraw() {
    let db = test_db();
    let wallets = WalletService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let wallet = wallets.create("user-1").unwrap();

    wallets.deposit(&wallet.id, 10.0, "Initial balance").unwrap();

    assert!(matches!(
        wallets.withdraw(&wallet.id, 10.01, "Too much"),
        Err(AppError::Validation(_))
    ));
    assert_eq!(wallets.balance(&wallet.id).unwrap(), 10.0);
}

#[test]
fn wallet_movement_amount_must_be_positive() {
    let db = test_db();
    let wallets = WalletService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let wallet = wallets.create("user-1").unwrap();

    assert!(matches!(
        wallets.deposit(&wallet.id, 0.0, "Nothing"),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        wallets.deposit(&wallet.id, -5.0, "Negative"),
        Err(AppError::Validation(_))
    ));
}

// ========== EXCHANGE ==========

#[test]
fn exchange_propose_is_pending() {
    let db = test_db();
    let books = test_books(&db);
    let exchanges = ExchangeService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    create_user(&db, "user-2", "Carlos", "carlos@example.com");
    let book = books.create(new_book("user-2")).unwrap();

    let exchange = exchanges.propose(&book.id, "user-2", "user-1").unwrap();
    assert_eq!(exchange.status, ExchangeStatus::Pending);
    assert_eq!(exchange.book_id, book.id);
    assert_eq!(exchange.sender_id, "user-2");
    assert_eq!(exchange.receiver_id, "user-1");

    let listed = exchanges.list_for_book(&book.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, exchange.id);
}

#[test]
fn exchange_rejects_self_exchange() {
    let db = test_db();
    let books = test_books(&db);
    let exchanges = ExchangeService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    let book = books.create(new_book("user-1")).unwrap();

    assert!(matches!(
        exchanges.propose(&book.id, "user-1", "user-1"),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn exchange_requires_existing_book_and_users() {
    let db = test_db();
    let books = test_books(&db);
    let exchanges = ExchangeService::new(db.clone());
    create_user(&db, "user-1", "Angela", "angela@example.com");
    create_user(&db, "user-2", "Carlos", "carlos@example.com");
    let book = books.create(new_book("user-1")).unwrap();

    assert!(matches!(
        exchanges.propose("missing", "user-1", "user-2"),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        exchanges.propose(&book.id, "nobody", "user-2"),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        exchanges.propose(&book.id, "user-1", "nobody"),
        Err(AppError::NotFound(_))
    ));
}

// ========== SERIALIZATION ==========

#[test]
fn json_user_excludes_password_hash() {
    let db = test_db();
    let auth = test_auth(&db);

    let registered = auth
        .register("Angela", "angela@example.com", "password123")
        .unwrap();

    let value = serde_json::to_value(&registered).unwrap();
    assert_eq!(value["message"], "Successfully registered user");
    assert_eq!(value["user"]["email"], "angela@example.com");
    assert!(value["user"].get("passwordHash").is_none());
    assert!(value["user"].get("password_hash").is_none());
}

#[test]
fn json_book_page_shape() {
    let db = test_db();
    let books = test_books(&db);
    create_user(&db, "user-1", "Angela", "angela@example.com");
    books.create(new_book("user-1")).unwrap();

    let page = books.find_all(None, None).unwrap();
    let value = serde_json::to_value(&page).unwrap();

    let entry = &value["data"][0];
    assert_eq!(entry["condition"], "GOOD");
    assert_eq!(entry["ownerId"], "user-1");
    assert_eq!(entry["imageUrl"], "/uploads/test.jpg");
    assert_eq!(entry["owner"]["id"], "user-1");
    assert_eq!(entry["owner"]["name"], "Angela");

    let pagination = &value["pagination"];
    assert_eq!(pagination["currentPage"], 1);
    assert_eq!(pagination["totalPages"], 1);
    assert_eq!(pagination["totalBooks"], 1);
    assert_eq!(pagination["hasNextPage"], false);
    assert_eq!(pagination["hasPreviousPage"], false);
}

// ========== CONFIG ==========

#[test]
fn config_parse_toml() {
    let toml = r#"
[server]
bind = "127.0.0.1:9090"

[database]
path = "/tmp/test.db"

[auth]
jwt_secret = "abc123"
token_days = 14

[uploads]
dir = "/tmp/uploads"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.server.bind.port(), 9090);
    assert_eq!(config.database.path.to_str(), Some("/tmp/test.db"));
    assert_eq!(config.auth.jwt_secret, "abc123");
    assert_eq!(config.auth.token_days, 14);
    assert_eq!(config.uploads.dir.to_str(), Some("/tmp/uploads"));
}

#[test]
fn config_default_values() {
    let config = Config::default();
    assert_eq!(config.server.bind.port(), 8080);
    assert!(config.auth.jwt_secret.is_empty());
    assert_eq!(config.auth.token_days, 7);
}

#[test]
fn config_generate_default_carries_secret() {
    let content = Config::generate_default("my-secret");
    let config: Config = toml::from_str(&content).unwrap();
    assert_eq!(config.auth.jwt_secret, "my-secret");
    assert_eq!(config.auth.token_days, 7);
}

// ========== ROLES ==========

#[test]
fn role_parse_is_exact() {
    assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
    assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
    assert!("admin".parse::<Role>().is_err());
    assert!("SUPERUSER".parse::<Role>().is_err());

    assert!(Role::Admin.is_admin());
    assert!(!Role::User.is_admin());
}

#[test]
fn condition_parse_is_exact() {
    assert_eq!(
        "EXCELLENT".parse::<BookCondition>().unwrap(),
        BookCondition::Excellent
    );
    assert!("Excellent".parse::<BookCondition>().is_err());
    assert!("UNKNOWN".parse::<BookCondition>().is_err());
}
