use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use roster_store::{seed, AvatarStore, PasswordHasher, SeedOptions, UserDirectory};
use roster_types::{
    ErrorBody, GendersEnvelope, LoginResponse, MessageResponse, UserEnvelope, UserUpdated,
    UsersEnvelope,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

use crate::{api_router, BODY_LIMIT_BYTES};
use crate::middleware::auth::AppState;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "Admin1234";
const BOUNDARY: &str = "roster-test-boundary";

struct TestApp {
    router: Router,
    directory: UserDirectory,
    _avatars: tempfile::TempDir,
}

async fn test_app(dummyUsers: usize) -> TestApp {
    let avatars = tempfile::tempdir().unwrap();
    let directory = UserDirectory::new(
        PasswordHasher::minimal().unwrap(),
        AvatarStore::new(avatars.path()),
    );
    let options = SeedOptions {
        admin_email: ADMIN_EMAIL.into(),
        admin_password: ADMIN_PASSWORD.into(),
        dummy_users: dummyUsers,
        ..SeedOptions::default()
    };
    seed::seed(&directory, &options).await.unwrap();

    TestApp {
        router: api_router(AppState {
            directory: directory.clone(),
        }),
        directory,
        _avatars: avatars,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    avatar: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        let part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        );
        body.extend_from_slice(part.as_bytes());
    }
    if let Some((fileName, bytes)) = avatar {
        let head = format!(
            concat!(
                "--{}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"{}\"\r\n",
                "Content-Type: image/png\r\n\r\n"
            ),
            BOUNDARY, fileName
        );
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn login(app: &TestApp) -> String {
    let request = json_request(
        "POST",
        "/api/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    parse::<LoginResponse>(&body).token
}

fn user_fields<'a>(email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "Ada Lovelace"),
        ("gender", "2"),
        ("email", email),
        ("role_type", "3"),
        ("password", "Engines42"),
        ("password_confirmation", "Engines42"),
    ]
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = test_app(0).await;
    let request = json_request(
        "POST",
        "/api/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    );

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let login: LoginResponse = parse(&body);
    assert_eq!(login.message, "Login Successful");
    assert_eq!(login.user.email, ADMIN_EMAIL);
    assert!(!login.token.is_empty());
}

#[tokio::test]
async fn bad_credentials_are_401_with_message() {
    let app = test_app(0).await;
    let request = json_request(
        "POST",
        "/api/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": "Wrong1!xx" }),
    );

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorBody = parse(&body);
    assert_eq!(error.message.as_deref(), Some("Invalid credentials, please try again."));
}

#[tokio::test]
async fn malformed_login_is_422_with_field_errors() {
    let app = test_app(0).await;
    let request = json_request(
        "POST",
        "/api/login",
        None,
        json!({ "email": "nope", "password": "" }),
    );

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = parse::<ErrorBody>(&body).errors.unwrap();
    assert_eq!(errors.first("email"), Some("The email field must be a valid email address."));
    assert_eq!(errors.first("password"), Some("The password field is required."));
}

#[tokio::test]
async fn login_without_email_is_422_on_email() {
    let app = test_app(0).await;
    let request = json_request("POST", "/api/login", None, json!({ "password": ADMIN_PASSWORD }));

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorBody = parse(&body);
    assert_eq!(error.message.as_deref(), Some("The email field is required."));
    assert_eq!(
        error.errors.unwrap().first("email"),
        Some("The email field is required.")
    );
}

#[tokio::test]
async fn login_body_that_is_not_json_gets_a_json_message() {
    let app = test_app(0).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse::<ErrorBody>(&body).message.is_some());
}

#[tokio::test]
async fn protected_routes_require_a_live_token() {
    let app = test_app(0).await;

    let anonymous = Request::builder().uri("/api/fetchUsers").body(Body::empty()).unwrap();
    let (status, _) = send(&app, anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/fetchRoles", "forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = test_app(0).await;
    let token = login(&app).await;

    let logout = json_request("POST", "/api/logout", Some(&token), json!({}));
    let (status, body) = send(&app, logout).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<MessageResponse>(&body).message, "Logged out successfully.");

    let (status, _) = send(&app, get("/api/fetchGenders", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fetch_users_paginates_and_searches() {
    let app = test_app(11).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get("/api/fetchUsers?page=2&search=", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let page = parse::<UsersEnvelope>(&body).users;
    assert_eq!(page.current_page, 2);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.per_page, 10);
    assert_eq!(page.total, 11);
    assert_eq!(page.data.len(), 1);

    let (_, body) = send(&app, get("/api/fetchUsers?page=abc&search=AMARA", &token)).await;
    let found = parse::<UsersEnvelope>(&body).users;
    assert_eq!(found.current_page, 1);
    assert!(found.data.iter().all(|u| u.name.contains("Amara")));
    assert!(!found.data.is_empty());
}

#[tokio::test]
async fn lookups_are_listed() {
    let app = test_app(0).await;
    let token = login(&app).await;

    let (_, body) = send(&app, get("/api/fetchGenders", &token)).await;
    let genders = parse::<GendersEnvelope>(&body).genders;
    assert_eq!(
        genders.iter().map(|g| g.gender.as_str()).collect::<Vec<_>>(),
        vec!["Male", "Female", "Others"]
    );
}

#[tokio::test]
async fn store_without_email_is_422_on_email() {
    let app = test_app(0).await;
    let token = login(&app).await;
    let fields: Vec<_> = user_fields("").into_iter().filter(|(k, _)| *k != "email").collect();

    let request = multipart_request("/api/user/store", &token, &fields, None);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = parse::<ErrorBody>(&body).errors.unwrap();
    assert_eq!(errors.first("email"), Some("The email field is required."));
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn store_show_update_delete_round() {
    let app = test_app(0).await;
    let token = login(&app).await;

    let request = multipart_request(
        "/api/user/store",
        &token,
        &user_fields("ada@example.com"),
        Some(("ada.png", &b"\x89PNG fake"[..])),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<MessageResponse>(&body).message, "User created successfully.");

    let (_, body) = send(&app, get("/api/fetchUsers?search=ada", &token)).await;
    let created = parse::<UsersEnvelope>(&body).users.data.remove(0);
    let avatar = created.avatar.clone().unwrap();
    assert!(app.directory.avatars().dir().join(&avatar).exists());

    let (status, body) = send(&app, get(&format!("/api/user/show/{}", created.id), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<UserEnvelope>(&body).user, created);

    let update = vec![
        ("name", "Ada King"),
        ("gender", "2"),
        ("email", "ada@example.com"),
        ("role_type", "1"),
    ];
    let (status, body) = send(
        &app,
        multipart_request(&format!("/api/user/update/{}", created.id), &token, &update, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: UserUpdated = parse(&body);
    assert_eq!(updated.user.name, "Ada King");
    assert_eq!(updated.user.avatar.as_deref(), Some(avatar.as_str()));

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/user/delete/{}", created.id))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<MessageResponse>(&body).message, "User deleted successfully.");
    assert!(!app.directory.avatars().dir().join(&avatar).exists());
}

#[tokio::test]
async fn avatar_over_the_body_limit_is_422_on_avatar() {
    let app = test_app(0).await;
    let token = login(&app).await;
    let huge = vec![0u8; BODY_LIMIT_BYTES + 1];

    let request = multipart_request(
        "/api/user/store",
        &token,
        &user_fields("big@example.com"),
        Some(("big.png", &huge[..])),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = parse::<ErrorBody>(&body).errors.unwrap();
    assert_eq!(
        errors.first("avatar"),
        Some("The avatar field must not be greater than 5096 kilobytes.")
    );
    let (_, body) = send(&app, get("/api/fetchUsers?search=big", &token)).await;
    assert_eq!(parse::<UsersEnvelope>(&body).users.total, 0);
}

#[tokio::test]
async fn missing_user_is_404_everywhere() {
    let app = test_app(0).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get("/api/user/show/404", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorBody>(&body).message.as_deref(), Some("User not found."));

    let (status, _) = send(
        &app,
        multipart_request("/api/user/update/404", &token, &user_fields("x@example.com"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/user/delete/404")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preflight_allows_bearer_header() {
    let app = test_app(0).await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/fetchUsers")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
