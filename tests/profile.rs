mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{TestApp, location, multipart};
use std::sync::atomic::Ordering;

async fn upload(app: &TestApp, cookie: &str, field: &str, data: &[u8]) -> axum::http::Response<Body> {
    let (content_type, body) = multipart(field, "me.png", "image/png", data);
    let request = Request::post("/upload_profile")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn upload_stores_image_and_persists_url() {
    let app = TestApp::new().await;
    let cookie = app.register_and_login("Ann", "ann@x.com", "pw1").await;
    let response = upload(&app, &cookie, "profile", b"\x89PNG fake").await;
    assert_eq!(location(&response), "/dashboard");

    let user = blog::db::users::find_user_by_email(&app.state.pool, "ann@x.com")
        .await
        .unwrap()
        .unwrap();
    let key = format!("user_{}.png", user.id);
    let url = format!("https://bucket.test/{key}");
    assert_eq!(user.profile_image.as_deref(), Some(url.as_str()));

    {
        let objects = app.storage.objects.lock().unwrap();
        let (bytes, content_type) = &objects[&key];
        assert_eq!(&bytes[..], b"\x89PNG fake");
        assert_eq!(content_type, "image/png");
    }

    let dashboard = app.dashboard(&cookie).await;
    assert_eq!(dashboard["user"]["profile_image"], url.as_str());
    assert_eq!(dashboard["navbar"]["image"], url.as_str());
}

#[tokio::test]
async fn second_upload_overwrites_the_first() {
    let app = TestApp::new().await;
    let cookie = app.register_and_login("Ann", "ann@x.com", "pw1").await;

    upload(&app, &cookie, "profile", b"first").await;
    upload(&app, &cookie, "profile", b"second").await;

    let objects = app.storage.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    let (bytes, _) = objects.values().next().unwrap();
    assert_eq!(&bytes[..], b"second");
}

#[tokio::test]
async fn storage_failure_fails_the_request_and_keeps_old_profile() {
    let app = TestApp::new().await;
    let cookie = app.register_and_login("Ann", "ann@x.com", "pw1").await;
    app.storage.fail.store(true, Ordering::SeqCst);

    let response = upload(&app, &cookie, "profile", b"png").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let dashboard = app.dashboard(&cookie).await;
    assert!(dashboard["user"]["profile_image"].is_null());
    assert_eq!(dashboard["navbar"]["image"], "/static/default.png");
}

#[tokio::test]
async fn upload_without_profile_field_is_a_bad_request() {
    let app = TestApp::new().await;
    let cookie = app.register_and_login("Ann", "ann@x.com", "pw1").await;

    let response = upload(&app, &cookie, "avatar", b"png").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upload(&app, &cookie, "profile", b"").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.storage.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_form_requires_session_and_renders() {
    let app = TestApp::new().await;
    let cookie = app.register_and_login("Ann", "ann@x.com", "pw1").await;

    let view = common::json(app.get("/upload_profile", Some(&cookie)).await).await;

    assert_eq!(view["form"], "upload_profile");
    assert_eq!(view["navbar"]["name"], "Ann");
}
