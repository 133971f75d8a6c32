//! API integration tests
//!
//! These tests run against a live server with a seeded admin account
//! (admin@biblios.local / admin123). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:4000/api/v1";

/// Helper to get an admin token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@biblios.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to register a fresh student and return (token, user_id)
async fn register_student(client: &Client) -> (String, i64) {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "firstname": "Test",
            "lastname": "Student",
            "email": format!("student{}@univ.example", unique),
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    let token = body["token"].as_str().expect("No token").to_string();
    let user_id = body["user"]["id"].as_i64().expect("No user id");
    (token, user_id)
}

/// Helper to create a book as admin, returning its id
async fn create_book(client: &Client, admin_token: &str, title: &str, quantity: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "genre": "Fiction",
            "description": "Integration test book",
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No book id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_register_and_login() {
    let client = Client::new();
    let (_, _) = register_student(&client).await;

    // Duplicate email is a conflict
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let email = format!("dup{}@univ.example", unique);

    for expected in [201, 409] {
        let response = client
            .post(format!("{}/auth/register", BASE_URL))
            .json(&json!({
                "firstname": "Dup",
                "lastname": "Licate",
                "email": email,
                "password": "secret123"
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), expected);
    }

    // Login with the duplicate account works
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@biblios.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
#[ignore]
async fn test_book_round_trip() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": "Les Misérables",
            "author": "Victor Hugo",
            "genre": "Classique",
            "description": "Roman historique",
            "quantity": 3,
            "image_url": "/uploads/miserables.jpg",
            "published_year": 1862
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse response");
    let id = created["id"].as_i64().unwrap();

    // Fetching it back returns identical field values
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let fetched: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(fetched["title"], "Les Misérables");
    assert_eq!(fetched["author"], "Victor Hugo");
    assert_eq!(fetched["genre"], "Classique");
    assert_eq!(fetched["description"], "Roman historique");
    assert_eq!(fetched["quantity"], 3);
    assert_eq!(fetched["available_copies"], 3);
    assert_eq!(fetched["available"], true);
    assert_eq!(fetched["image_url"], "/uploads/miserables.jpg");
    assert_eq!(fetched["published_year"], 1862);
}

#[tokio::test]
#[ignore]
async fn test_get_missing_book_is_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
#[ignore]
async fn test_search_filters_combine() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    create_book(&client, &admin_token, "Recherche Unique Alpha", 1).await;

    let response = client
        .get(format!(
            "{}/books?title=recherche unique&genre=Fiction&available=true",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(!books.is_empty());
    for book in &books {
        assert_eq!(book["genre"], "Fiction");
        assert!(book["available_copies"].as_i64().unwrap() > 0);
    }

    // An unmatched combination is an empty array, not an error
    let response = client
        .get(format!(
            "{}/books?title=recherche unique&genre=NoSuchGenre",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(books.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_borrow_last_copy_then_unavailable() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token, "Dernier Exemplaire", 1).await;

    let (token_a, _) = register_student(&client).await;
    let (token_b, _) = register_student(&client).await;

    // First borrower wins
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Second borrower loses with UNAVAILABLE
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "UNAVAILABLE");

    // The count never goes negative
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["available_copies"], 0);
    assert_eq!(book["available"], false);
}

#[tokio::test]
#[ignore]
async fn test_return_restores_availability() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token, "Aller Retour", 1).await;

    let (token, _) = register_student(&client).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/loans/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let loan: Value = response.json().await.expect("Failed to parse response");
    assert!(loan["return_date"].is_string());

    // Exactly one copy came back
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["available_copies"], 1);

    // The closed loan stays returned in the caller's history
    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let loans: Vec<Value> = response.json().await.expect("Failed to parse response");
    let returned = loans
        .iter()
        .find(|l| l["book_id"].as_i64() == Some(book_id))
        .expect("Loan missing from history");
    assert_eq!(returned["status"], "returned");

    // Returning again is a 404: no active loan remains
    let response = client
        .post(format!("{}/loans/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_reviews_flow() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token, "Livre Noté", 2).await;

    let (token, _) = register_student(&client).await;

    // Out-of-bounds rating is rejected
    let response = client
        .post(format!("{}/books/{}/reviews", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "rating": 6, "comment": "Trop bien" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Valid ratings land in the listing with the expected average
    for rating in [5, 3, 4] {
        let (other_token, _) = register_student(&client).await;
        let response = client
            .post(format!("{}/books/{}/reviews", BASE_URL, book_id))
            .header("Authorization", format!("Bearer {}", other_token))
            .json(&json!({ "rating": rating, "comment": "Avis de test" }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let response = client
        .get(format!("{}/books/{}/reviews", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let reviews = body["reviews"].as_array().expect("No reviews array");
    assert_eq!(reviews.len(), 3);
    assert_eq!(body["average_rating"], 4.0);
    assert!(reviews[0]["firstname"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_admin_endpoints_forbidden_for_students() {
    let client = Client::new();
    let (token, _) = register_student(&client).await;

    let response = client
        .get(format!("{}/admin/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Interdit",
            "author": "Personne",
            "genre": "Essai",
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_access() {
    let client = Client::new();

    // No credential at all
    let response = client
        .get(format!("{}/loans", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "UNAUTHENTICATED");

    // A garbage credential is rejected as invalid, not merely missing
    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "INVALID_CREDENTIAL");
}

#[tokio::test]
#[ignore]
async fn test_admin_user_directory() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let email = format!("directory{}@univ.example", unique);

    // Create
    let response = client
        .post(format!("{}/admin/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "firstname": "Marie",
            "lastname": "Curie",
            "email": email,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let user: Value = response.json().await.expect("Failed to parse response");
    let user_id = user["id"].as_i64().unwrap();
    assert_eq!(user["role"], "student");
    assert!(user["password_hash"].is_null());

    // Duplicate email is a conflict
    let response = client
        .post(format!("{}/admin/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "firstname": "Pierre",
            "lastname": "Curie",
            "email": email,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Update then delete
    let response = client
        .put(format!("{}/admin/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "lastname": "Skłodowska-Curie" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["lastname"], "Skłodowska-Curie");
    assert_eq!(updated["firstname"], "Marie");

    let response = client
        .delete(format!("{}/admin/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_stats_overview() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/admin/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_number());
    assert!(body["loans_active"].is_number());
    assert!(body["loans_overdue"].is_number());
}
