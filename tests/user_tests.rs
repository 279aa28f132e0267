mod common;

use places::models::{LoginRequest, SignupRequest};
use places::store::{DocumentStore, MemoryStore};
use places::PlacesError;

fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        name: "Max Schwarz".to_string(),
        email: email.to_string(),
        password: "supersecret".to_string(),
        image: Some("https://example.com/max.png".to_string()),
    }
}

#[tokio::test]
async fn test_signup_creates_user() {
    let store = MemoryStore::new();
    let service = common::user_service(&store);

    let user = service
        .signup(signup_request(" Max@Example.com "))
        .await
        .expect("Failed to sign up");

    assert_eq!(user.email, "max@example.com");
    assert!(user.places.is_empty());
    assert_ne!(user.password, "supersecret");

    let stored = store.find_user(&user.id).await.unwrap().unwrap();
    assert_eq!(stored, user);
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let store = MemoryStore::new();
    let service = common::user_service(&store);
    service
        .signup(signup_request("max@example.com"))
        .await
        .unwrap();

    let err = service
        .signup(signup_request("MAX@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, PlacesError::EmailTaken));
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_signup_validation() {
    let store = MemoryStore::new();
    let service = common::user_service(&store);

    let mut request = signup_request("not-an-email");
    let err = service.signup(request.clone()).await.unwrap_err();
    assert!(matches!(err, PlacesError::Validation(_)));

    request.email = "max@example.com".to_string();
    request.password = "12345".to_string();
    let err = service.signup(request).await.unwrap_err();
    assert!(matches!(err, PlacesError::Validation(_)));

    assert!(store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login() {
    let store = MemoryStore::new();
    let service = common::user_service(&store);
    let created = service
        .signup(signup_request("max@example.com"))
        .await
        .unwrap();

    let user = service
        .login(LoginRequest {
            email: "Max@example.com".to_string(),
            password: "supersecret".to_string(),
        })
        .await
        .expect("Failed to log in");
    assert_eq!(user.id, created.id);

    let err = service
        .login(LoginRequest {
            email: "max@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlacesError::InvalidCredentials));

    let err = service
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "supersecret".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlacesError::InvalidCredentials));
}

#[tokio::test]
async fn test_list_users_includes_place_references() {
    let store = common::store_with_user("u1").await;
    let places = common::paris_service(&store);
    let place = places
        .create_place(common::new_place("Eiffel", "Paris", "u1"))
        .await
        .unwrap();

    let users = common::user_service(&store).list_users().await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].places, vec![place.id]);
}
