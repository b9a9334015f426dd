//! API integration tests
//!
//! These tests run against a live server with a fresh database and an
//! admin account seeded as admin@example.com / admin-password.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin-password";

/// Log in and return the session token
async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/account/sessions", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_returns_token_and_account() {
    let client = Client::new();

    let response = client
        .post(format!("{}/account/sessions", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["account"]["email"], ADMIN_EMAIL);
    assert!(body["account"]["password_hash"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/account/sessions", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": "definitely-wrong",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_protected_route_requires_session() {
    let client = Client::new();

    let response = client
        .get(format!("{}/account", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Unauthorized.");
}

#[tokio::test]
#[ignore]
async fn test_garbage_token_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/account", BASE_URL))
        .bearer_auth("not-a-real-token-00000000000000")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_admin_route_forbidden_for_regular_user() {
    let client = Client::new();

    // Sign up a regular account, then try an admin-only route with it.
    let email = format!("user-{}@example.com", uuid_suffix());
    let response = client
        .post(format!("{}/account", BASE_URL))
        .json(&json!({
            "name": "Regular User",
            "email": email,
            "password": "a-decent-password",
        }))
        .send()
        .await
        .expect("Failed to send signup request");
    assert!(response.status().is_success());

    let token = login(&client, &email, "a-decent-password").await;

    let response = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Should Not Exist" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_logout_invalidates_token() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .delete(format!("{}/account/sessions", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send logout request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/account", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_genre_crud() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let name = format!("Genre {}", uuid_suffix());

    // Create
    let response = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 200);

    let genre: Value = response.json().await.expect("Failed to parse response");
    let id = genre["id"].as_str().expect("No id in response").to_string();

    // Duplicate name is rejected
    let response = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send duplicate request");
    assert_eq!(response.status(), 400);

    // Read without a session
    let response = client
        .get(format!("{}/genres/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send get request");
    assert_eq!(response.status(), 200);

    // Update
    let renamed = format!("{} Renamed", name);
    let response = client
        .put(format!("{}/genres/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "name": renamed }))
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(response.status(), 200);

    let genre: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(genre["name"], renamed);

    // Delete
    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/genres/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send get request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let suffix = uuid_suffix();

    let response = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": format!("Fantasy {}", suffix) }))
        .send()
        .await
        .expect("Failed to create genre");
    let genre: Value = response.json().await.expect("Failed to parse genre");
    let genre_id = genre["id"].as_str().expect("No genre id").to_string();

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": format!("Author {}", suffix) }))
        .send()
        .await
        .expect("Failed to create author");
    let author: Value = response.json().await.expect("Failed to parse author");
    let author_id = author["id"].as_str().expect("No author id").to_string();

    // An ISBN-10 in the path is converted to ISBN-13 in the stored row.
    let response = client
        .post(format!("{}/books/0306406152", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "A Test Book",
            "author_id": author_id,
            "genre_id": genre_id,
            "publish_year": 1999,
            "fiction": true,
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 200);

    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["isbn"], "9780306406157");
    assert!(book["cover_url"].is_null());

    // Deleting the author while the book exists is a conflict
    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), 409);

    // Filter by genre
    let response = client
        .get(format!("{}/books?genre={}", BASE_URL, genre_id))
        .send()
        .await
        .expect("Failed to list books");
    let books: Value = response.json().await.expect("Failed to parse book list");
    assert_eq!(books.as_array().map(|a| a.len()), Some(1));

    // Clean up bottom-up
    let response = client
        .delete(format!("{}/books/9780306406157", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete book");
    assert_eq!(response.status(), 204);

    client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete author");
    client
        .delete(format!("{}/genres/{}", BASE_URL, genre_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete genre");
}

#[tokio::test]
#[ignore]
async fn test_invalid_isbn_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/books/9780306406158", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Bad Checksum",
            "author_id": "00000000-0000-0000-0000-000000000000",
            "genre_id": "00000000-0000-0000-0000-000000000000",
            "publish_year": 2000,
            "fiction": false,
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_unknown_pagination_cursor() {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/genres?after=00000000-0000-0000-0000-000000000000",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

/// Short unique suffix so tests can re-run against the same database
fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .subsec_nanos();
    format!("{}-{:x}", std::process::id(), nanos)
}
