//! Feed listing and the upload-then-write post flow.

mod common;

use campusconnect::storage::Upload;
use campusconnect::ui::feed::PostError;
use campusconnect::ui::ViewError;
use common::mock_backend::{MockBackend, MockResponse};

fn feed_json() -> String {
    serde_json::json!([
        {"post_id": 5, "content": "mine", "user": common::user_json(1, "ada", false)},
        {"post_id": 6, "content": "bob's", "user": common::user_json(2, "bob", false)},
    ])
    .to_string()
}

async fn stub_feed(mock: &MockBackend) {
    mock.on("GET", "/feed", MockResponse::json(&feed_json())).await;
    mock.on(
        "GET",
        "/api/follow/following/1",
        MockResponse::json(r#"[{"userId": 2, "username": "bob"}]"#),
    )
    .await;
}

fn clip() -> Upload {
    Upload {
        file_name: "clip.mp4".into(),
        content_type: "video/mp4".into(),
        bytes: b"frames".to_vec(),
    }
}

#[tokio::test]
async fn load_marks_followed_authors() {
    let mock = MockBackend::start().await;
    stub_feed(&mock).await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let feed = app.feed().unwrap();
    feed.load().await;
    let state = feed.state();
    assert!(!state.loading);
    assert_eq!(state.posts.len(), 2);
    let marked: Vec<_> = state
        .posts
        .iter()
        .filter(|p| state.is_following_author(p))
        .map(|p| p.post_id)
        .collect();
    assert_eq!(marked, vec![6]);
}

#[tokio::test]
async fn video_post_goes_to_video_folder() {
    let mock = MockBackend::start().await;
    stub_feed(&mock).await;
    let url = format!("{}/storage/post-videos/clip", mock.base_url());
    mock.on_prefix(
        "POST",
        "/storage/post-videos/",
        MockResponse::json(&format!(r#"{{"url": "{}"}}"#, url)),
    )
    .await;
    mock.on("POST", "/createpost", MockResponse::ok()).await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let feed = app.feed().unwrap();
    feed.create_post("watch this", Some(clip())).await.unwrap();

    let upload = mock
        .captured_requests()
        .await
        .into_iter()
        .find(|r| r.path.starts_with("/storage/post-videos/"))
        .unwrap();
    assert_eq!(upload.header("content-type"), Some("video/mp4"));
    assert_eq!(upload.body, b"frames");

    let created = mock.requests_to("POST", "/createpost").await[0].json();
    assert_eq!(created["video"], url.as_str());
    assert!(created["image"].is_null());
    assert_eq!(created["user"]["user_id"], 1);

    // Success reloads the feed.
    assert_eq!(feed.state().posts.len(), 2);
    assert!(!feed.state().submitting);
}

#[tokio::test]
async fn failed_write_deletes_the_upload() {
    let mock = MockBackend::start().await;
    stub_feed(&mock).await;
    let url = format!("{}/storage/post-videos/clip", mock.base_url());
    mock.on_prefix(
        "POST",
        "/storage/post-videos/",
        MockResponse::json(&format!(r#"{{"url": "{}"}}"#, url)),
    )
    .await;
    mock.on("DELETE", "/storage/post-videos/clip", MockResponse::ok())
        .await;
    mock.on("POST", "/createpost", MockResponse::status(500)).await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let feed = app.feed().unwrap();
    let err = feed.create_post("watch this", Some(clip())).await.unwrap_err();
    match err {
        PostError::Create { message, orphaned, .. } => {
            assert_eq!(message, "Failed to create post. Please try again.");
            assert_eq!(orphaned, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        mock.requests_to("DELETE", "/storage/post-videos/clip").await.len(),
        1
    );
    assert!(!feed.state().submitting);
}

#[tokio::test]
async fn failed_upload_skips_the_write() {
    let mock = MockBackend::start().await;
    mock.on_prefix("POST", "/storage/", MockResponse::status(500)).await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let err = app
        .feed()
        .unwrap()
        .create_post("", Some(clip()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to upload video. Please try again.");
    assert!(mock.requests_to("POST", "/createpost").await.is_empty());
}

#[tokio::test]
async fn empty_post_is_refused() {
    let mock = MockBackend::start().await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let err = app.feed().unwrap().create_post("   ", None).await.unwrap_err();
    assert!(matches!(err, PostError::Empty));
    assert!(mock.captured_requests().await.is_empty());
}

#[tokio::test]
async fn only_owner_edits_and_deletes() {
    let mock = MockBackend::start().await;
    stub_feed(&mock).await;
    mock.on("PUT", "/updatepost", MockResponse::ok()).await;
    mock.on("DELETE", "/deletepost/5", MockResponse::ok()).await;
    let (_dir, app) = common::make_app(&mock, Some(common::user(1, "ada")));

    let feed = app.feed().unwrap();
    feed.load().await;

    assert!(matches!(
        feed.update_post(6, "hijack").await,
        Err(ViewError::Refused(_))
    ));
    assert!(matches!(feed.delete_post(6).await, Err(ViewError::Refused(_))));

    feed.update_post(5, "edited").await.unwrap();
    let update = mock.requests_to("PUT", "/updatepost").await[0].json();
    assert_eq!(update["post_id"], 5);
    assert_eq!(update["content"], "edited");

    feed.delete_post(5).await.unwrap();
    assert_eq!(mock.requests_to("DELETE", "/deletepost/5").await.len(), 1);
    assert!(mock.requests_to("DELETE", "/deletepost/6").await.is_empty());
}
