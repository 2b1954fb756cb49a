//! HTTP request handlers.

use crate::auth::Registered;
use crate::books::{BookDeleted, BookPage, BookPatch, BookUpdated, NewBook};
use crate::db::{Book, BookWithOwner};
use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::token::Identity;
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::io::ReaderStream;

/// Name of the cookie carrying the bearer token.
const TOKEN_COOKIE: &str = "token";

// ============================================================================
// AUTH API
// ============================================================================

/// Register request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    message: String,
    token: String,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

/// Register a new user.
pub async fn auth_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Registered>)> {
    let registered = state.auth.register(&req.name, &req.email, &req.password)?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// Validate credentials, issue a token and set the login cookie.
pub async fn auth_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = state.auth.validate_user(&req.email, &req.password)?;
    let token = state.auth.login(&user)?;

    // Cookie max-age intentionally equals the token expiry.
    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(state.auth.token_days() as i64))
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
        }),
    ))
}

/// Return the verified identity claim of the caller.
pub async fn auth_whoami(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<Identity>> {
    let identity = authenticate(&state, &jar, &headers)?;
    Ok(Json(identity))
}

/// Clear the login cookie. Token issuance is stateless, so there is no
/// server-side session to invalidate.
pub async fn auth_logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"));

    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

// ============================================================================
// BOOKS API
// ============================================================================

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    /// Page number (from 1).
    pub page: Option<u32>,
    /// Results per page.
    pub limit: Option<u32>,
}

/// Create a book listing from a multipart form (fields + optional image).
pub async fn books_create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Book>)> {
    let (fields, image) = read_book_form(&mut multipart).await?;

    let image_url = match image {
        Some((file_name, data)) => Some(state.images.save(file_name.as_deref(), &data)?),
        None => None,
    };

    let new_book = NewBook {
        title: require_field(&fields, "title")?,
        author: require_field(&fields, "author")?,
        isbn: fields.get("isbn").cloned(),
        description: fields.get("description").cloned(),
        condition: require_field(&fields, "condition")?,
        location: require_field(&fields, "location")?,
        price: parse_price(&require_field(&fields, "price")?)?,
        owner_id: require_field(&fields, "ownerId")?,
        image_url,
    };

    let book = state.books.create(new_book)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Get one catalog page.
pub async fn books_list(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<BookPage>> {
    let page = state.books.find_all(query.page, query.limit)?;
    Ok(Json(page))
}

/// Get one book with its owner projection.
pub async fn books_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookWithOwner>> {
    let book = state.books.find_one(&id)?;
    Ok(Json(book))
}

/// Patch a book from a multipart form. Owner-or-admin only.
pub async fn books_update(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<BookUpdated>> {
    let identity = authenticate(&state, &jar, &headers)?;

    let (fields, image) = read_book_form(&mut multipart).await?;

    let new_image_url = match image {
        Some((file_name, data)) => Some(state.images.save(file_name.as_deref(), &data)?),
        None => None,
    };

    let patch = BookPatch {
        title: fields.get("title").cloned(),
        author: fields.get("author").cloned(),
        isbn: fields.get("isbn").cloned(),
        description: fields.get("description").cloned(),
        condition: fields.get("condition").cloned(),
        location: fields.get("location").cloned(),
        price: fields.get("price").map(|v| parse_price(v)).transpose()?,
        available: fields.get("available").map(|v| parse_bool(v)).transpose()?,
    };

    let updated = state
        .books
        .update(&id, patch, new_image_url, &identity.id, identity.role)?;

    Ok(Json(updated))
}

/// Delete a book. Owner-or-admin only.
pub async fn books_delete(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookDeleted>> {
    let identity = authenticate(&state, &jar, &headers)?;

    let deleted = state.books.delete(&id, &identity.id, identity.role)?;
    Ok(Json(deleted))
}

// ============================================================================
// UPLOADS
// ============================================================================

/// Serve a stored cover image.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response<Body>> {
    let path = state.images.resolve(&file)?;

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    let file = tokio::fs::File::open(&path).await?;
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))
}

// ============================================================================
// HELPERS
// ============================================================================

/// Read a multipart book form: text fields plus an optional `image` part.
async fn read_book_form(
    multipart: &mut Multipart,
) -> Result<(HashMap<String, String>, Option<(Option<String>, Bytes)>)> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {}", e)))?;

            // An empty file part means no image was attached.
            if !data.is_empty() {
                image = Some((file_name, data));
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field: {}", e)))?;
            fields.insert(name, value);
        }
    }

    Ok((fields, image))
}

/// Get a required text field from a multipart form.
fn require_field(fields: &HashMap<String, String>, name: &str) -> Result<String> {
    fields
        .get(name)
        .cloned()
        .ok_or_else(|| AppError::Validation(format!("Missing required field '{}'", name)))
}

/// Parse a price form field.
fn parse_price(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| AppError::Validation(format!("Price '{}' is not a number", value)))
}

/// Parse a boolean form field.
fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "'{}' is not a boolean",
            value
        ))),
    }
}

/// Extract the bearer token from the login cookie or Authorization header.
fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Authenticate the request and return the verified identity.
fn authenticate(state: &AppState, jar: &CookieJar, headers: &HeaderMap) -> Result<Identity> {
    let token = extract_token(jar, headers)
        .ok_or_else(|| AppError::Unauthenticated("Missing authentication token".to_string()))?;

    state.auth.verify_token(&token)
}
