//! Login, registration, logout and the routing rules around them.

mod common;

use campusconnect::api::models::NewUser;
use campusconnect::app::Route;
use campusconnect::session::SessionError;
use campusconnect::storage::Upload;
use campusconnect::ui::auth::AuthError;
use campusconnect::ui::ViewError;
use campusconnect::validation::Field;
use common::mock_backend::{MockBackend, MockResponse};

fn new_user() -> NewUser {
    NewUser {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        username: "ada_l".into(),
        email: "ada@uni.edu".into(),
        gender: "female".into(),
        password: "Engine1843".into(),
        college: "Analytical".into(),
        semester: "3".into(),
        batch: "2025".into(),
        profile_picture: None,
    }
}

fn picture() -> Upload {
    Upload {
        file_name: "me.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn logged_out_routes_go_to_login() {
    let mock = MockBackend::start().await;
    let (_dir, app) = common::make_app(&mock, None);

    assert_eq!(app.entry(), Route::Login);
    assert_eq!(app.resolve(Route::Feed), Route::Login);
    assert_eq!(app.resolve(Route::Chat(3)), Route::Login);
    assert_eq!(app.resolve(Route::Register), Route::Register);
    assert!(matches!(
        app.feed(),
        Err(ViewError::Session(SessionError::NotLoggedIn))
    ));
}

#[tokio::test]
async fn login_persists_session() {
    let mock = MockBackend::start().await;
    mock.on(
        "POST",
        "/login",
        MockResponse::json(&common::user_json(1, "ada", false).to_string()),
    )
    .await;
    let (dir, app) = common::make_app(&mock, None);

    let user = app.auth().login("ada", "Engine1843").await.unwrap();
    assert_eq!(user.user_id, 1);
    assert_eq!(app.entry(), Route::Feed);
    assert_eq!(app.resolve(Route::Login), Route::Feed);
    assert_eq!(app.resolve(Route::Admin), Route::Feed);

    // A fresh process sees the same user.
    let restored = common::session_in(&dir);
    assert_eq!(restored.current().map(|u| u.username), Some("ada".to_string()));
}

#[tokio::test]
async fn bad_credentials_message() {
    let mock = MockBackend::start().await;
    mock.on("POST", "/login", MockResponse::status(401)).await;
    let (_dir, app) = common::make_app(&mock, None);

    let err = app.auth().login("ada", "wrong").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid username or password. Please try again."
    );
    assert!(!app.session().is_logged_in());
}

#[tokio::test]
async fn empty_login_is_rejected_locally() {
    let mock = MockBackend::start().await;
    let (_dir, app) = common::make_app(&mock, None);

    let err = app.auth().login("", "").await.unwrap_err();
    let fields = err.field_errors().unwrap();
    assert!(fields.contains_key(&Field::Username));
    assert!(fields.contains_key(&Field::Password));
    assert!(mock.captured_requests().await.is_empty());
}

#[tokio::test]
async fn logout_clears_disk_and_memory() {
    let mock = MockBackend::start().await;
    let (dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));
    assert!(app.session().is_logged_in());

    app.logout().unwrap();
    assert!(!app.session().is_logged_in());
    assert_eq!(app.entry(), Route::Login);
    assert!(!common::session_in(&dir).is_logged_in());
}

#[tokio::test]
async fn admin_route_needs_admin() {
    let mock = MockBackend::start().await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));
    assert!(matches!(
        app.admin(),
        Err(ViewError::Session(SessionError::NotAdmin))
    ));

    let (_dir, app) = common::make_app(&mock, Some(common::admin(9, "root")));
    assert_eq!(app.resolve(Route::Admin), Route::Admin);
    assert!(app.admin().is_ok());
}

#[tokio::test]
async fn register_uploads_picture_first() {
    let mock = MockBackend::start().await;
    let stored = format!("{}/storage/profile-pictures/me", mock.base_url());
    mock.on_prefix(
        "POST",
        "/storage/profile-pictures/",
        MockResponse::json(&format!(r#"{{"url": "{}"}}"#, stored)),
    )
    .await;
    mock.on("POST", "/createuser", MockResponse::ok()).await;
    let (_dir, app) = common::make_app(&mock, None);

    app.auth().register(new_user(), Some(picture())).await.unwrap();

    let created = &mock.requests_to("POST", "/createuser").await[0];
    assert_eq!(created.json()["profile_picture"], stored.as_str());
    assert_eq!(created.json()["username"], "ada_l");
    assert!(!app.session().is_logged_in());
}

#[tokio::test]
async fn failed_upload_registers_without_picture() {
    let mock = MockBackend::start().await;
    mock.on_prefix("POST", "/storage/", MockResponse::status(503))
        .await;
    mock.on("POST", "/createuser", MockResponse::ok()).await;
    let (_dir, app) = common::make_app(&mock, None);

    app.auth().register(new_user(), Some(picture())).await.unwrap();

    let created = &mock.requests_to("POST", "/createuser").await[0];
    assert!(created.json()["profile_picture"].is_null());
}

#[tokio::test]
async fn failed_registration_removes_uploaded_picture() {
    let mock = MockBackend::start().await;
    let stored = format!("{}/storage/profile-pictures/me", mock.base_url());
    mock.on_prefix(
        "POST",
        "/storage/profile-pictures/",
        MockResponse::json(&format!(r#"{{"url": "{}"}}"#, stored)),
    )
    .await;
    mock.on("DELETE", "/storage/profile-pictures/me", MockResponse::ok())
        .await;
    mock.on("POST", "/createuser", MockResponse::error(400, "Email already registered"))
        .await;
    let (_dir, app) = common::make_app(&mock, None);

    let err = app
        .auth()
        .register(new_user(), Some(picture()))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected { .. }));
    assert_eq!(err.to_string(), "Email already registered");
    assert_eq!(
        mock.requests_to("DELETE", "/storage/profile-pictures/me").await.len(),
        1
    );
}

#[tokio::test]
async fn non_image_picture_is_refused_before_upload() {
    let mock = MockBackend::start().await;
    let (_dir, app) = common::make_app(&mock, None);

    let upload = Upload {
        content_type: "application/pdf".into(),
        ..picture()
    };
    let err = app.auth().register(new_user(), Some(upload)).await.unwrap_err();
    assert_eq!(
        err.field_errors().and_then(|f| f.get(&Field::ProfilePicture)).copied(),
        Some("Please upload a valid image file")
    );
    assert!(mock.captured_requests().await.is_empty());
}

#[tokio::test]
async fn profile_edit_refreshes_session() {
    let mock = MockBackend::start().await;
    mock.on("PUT", "/updateuser", MockResponse::ok()).await;
    let (dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let mut edited = app.session().current().unwrap();
    edited.first_name = "Augusta".into();
    edited.username = "renamed".into();
    edited.admin = true;

    let saved = app.auth().update_profile(edited, None).await.unwrap();
    assert_eq!(saved.first_name, "Augusta");
    assert_eq!(saved.username, "ada");
    assert!(!saved.admin);

    let body = mock.requests_to("PUT", "/updateuser").await[0].json();
    assert_eq!(body["first_name"], "Augusta");
    assert_eq!(body["username"], "ada");
    assert_eq!(
        common::session_in(&dir).current().map(|u| u.first_name),
        Some("Augusta".to_string())
    );
}

#[tokio::test]
async fn failed_profile_edit_keeps_session() {
    let mock = MockBackend::start().await;
    mock.on("PUT", "/updateuser", MockResponse::status(500)).await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let mut edited = app.session().current().unwrap();
    edited.first_name = "Augusta".into();

    let err = app.auth().update_profile(edited, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to update profile. Please try again.");
    assert_eq!(
        app.session().current().map(|u| u.first_name),
        Some("ADA".to_string())
    );
}
