//! End-to-end tests for the HTTP API: accounts, book lifecycle, cover
//! normalization/reclamation and the rating aggregate.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use grimoire::{build_router, ServerConfig, ServerState};

const BOUNDARY: &str = "grimoire-test-boundary";

fn test_state(dir: &TempDir) -> Arc<ServerState> {
    let mut config = ServerConfig::default();
    config.jwt_secret = Some("integration-test-secret".to_string());
    config.image_dir = dir.path().join("images").to_string_lossy().into_owned();
    config.db_path = dir.path().join("catalog.redb").to_string_lossy().into_owned();
    config.public_base_url = Some("http://localhost:4000".to_string());
    config.rate_limit_per_minute = 10_000;
    Arc::new(ServerState::new(config).expect("failed to create test state"))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read failed")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Hand-rolled multipart form: optional `book` JSON part plus optional
/// `image` file part.
fn multipart_request(
    uri: &str,
    method: &str,
    token: &str,
    book_json: Option<&str>,
    image: Option<(&str, &str, Vec<u8>)>,
) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(json) = book_json {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"book\"\r\n\r\n{json}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, mime, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

fn encoded_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 253) as u8])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, format)
        .expect("failed to encode test image");
    out.into_inner()
}

async fn signup_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            serde_json::json!({ "email": email, "password": "hunter2!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": email, "password": "hunter2!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token missing").to_string()
}

async fn create_book(app: &Router, token: &str, title: &str, image_bytes: Vec<u8>, mime: &str) -> serde_json::Value {
    let book = serde_json::json!({
        "title": title,
        "author": "Test Author",
        "genre": "Testing",
        "year": 2020,
    });
    let filename = match mime {
        "image/png" => "Cover Photo.png",
        "image/webp" => "Cover Photo.webp",
        _ => "Cover Photo.jpg",
    };
    let (status, body) = send(
        app,
        multipart_request(
            "/api/books",
            "POST",
            token,
            Some(&book.to_string()),
            Some((filename, mime, image_bytes)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

fn image_files(image_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(image_dir)
        .expect("image dir missing")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn signup_normalizes_email_and_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            serde_json::json!({ "email": " Foo@Bar.com ", "password": "hunter2!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Login with the canonical spelling succeeds.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": "foo@bar.com", "password": "hunter2!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(body["userId"].is_string());

    // Same identity under different casing is a conflict.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            serde_json::json!({ "email": "FOO@bar.com", "password": "other-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn login_failure_is_generic() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    signup_and_login(&app, "user@example.com").await;

    let unknown = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": "ghost@example.com", "password": "hunter2!" }),
        ),
    )
    .await;
    let wrong_pw = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": "user@example.com", "password": "nope" }),
        ),
    )
    .await;

    assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw.0, StatusCode::UNAUTHORIZED);
    // Neither response hints at which check failed.
    assert_eq!(unknown.1["error"]["message"], wrong_pw.1["error"]["message"]);
}

#[tokio::test]
async fn signup_requires_email_and_password() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            serde_json::json!({ "email": "no-password@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));

    let no_token = Request::builder()
        .method("POST")
        .uri("/api/books")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, no_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bad_token = Request::builder()
        .method("POST")
        .uri("/api/books")
        .header(AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, bad_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn book_lifecycle_with_ratings() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    let image_dir = state.config.image_dir.clone();
    let app = build_router(state);

    let token1 = signup_and_login(&app, "reader1@example.com").await;
    let token2 = signup_and_login(&app, "reader2@example.com").await;

    // Create with an oversized JPEG cover.
    let book = create_book(
        &app,
        &token1,
        "Le Grand Meaulnes",
        encoded_image(3000, 2000, image::ImageFormat::Jpeg),
        "image/jpeg",
    )
    .await;
    let book_id = book["id"].as_str().unwrap().to_string();
    assert_eq!(book["averageRating"], 0.0);
    assert_eq!(book["ratings"].as_array().unwrap().len(), 0);

    // Exactly one stored file: the normalized webp, within bounds, the
    // original temp gone.
    let files = image_files(Path::new(&image_dir));
    assert_eq!(files.len(), 1, "stored files: {files:?}");
    assert!(files[0].starts_with("cover-photo-"));
    assert!(files[0].ends_with(".webp"));
    let (w, h) = image::ImageReader::open(Path::new(&image_dir).join(&files[0]))
        .unwrap()
        .into_dimensions()
        .unwrap();
    assert!(w <= 1200 && h <= 1200, "stored cover is {w}x{h}");

    // The record references the stored file.
    let image_url = book["imageUrl"].as_str().unwrap();
    assert!(image_url.ends_with(&format!("/images/{}", files[0])));

    // First rating.
    let (status, rated) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/books/{book_id}/rating"),
            Some(&token1),
            serde_json::json!({ "rating": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rated["averageRating"], 4.0);

    // Second user's rating moves the average.
    let (status, rated) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/books/{book_id}/rating"),
            Some(&token2),
            serde_json::json!({ "rating": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rated["averageRating"], 3.0);

    // Resubmission conflicts and changes nothing.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/books/{book_id}/rating"),
            Some(&token1),
            serde_json::json!({ "rating": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_RATED");

    let (status, fetched) = send(
        &app,
        Request::builder()
            .uri(&format!("/api/books/{book_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["averageRating"], 3.0);
    assert_eq!(fetched["ratings"].as_array().unwrap().len(), 2);

    // Out-of-range grades are rejected: 0 and 6.
    for bad in [0, 6] {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/books/{book_id}/rating"),
                Some(&token2),
                serde_json::json!({ "rating": bad }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "grade {bad} accepted");
    }

    // Best-rated includes the book.
    let (status, best) = send(
        &app,
        Request::builder()
            .uri("/api/books/bestrating")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = best
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&book_id.as_str()));
}

#[tokio::test]
async fn rating_unknown_book_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let token = signup_and_login(&app, "rater@example.com").await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/books/does-not-exist/rating",
            Some(&token),
            serde_json::json!({ "rating": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn best_rated_excludes_unrated_books() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let token = signup_and_login(&app, "owner@example.com").await;

    let rated = create_book(
        &app,
        &token,
        "Rated",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    create_book(
        &app,
        &token,
        "Unrated",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;

    let rated_id = rated["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/books/{rated_id}/rating"),
            Some(&token),
            serde_json::json!({ "rating": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, best) = send(
        &app,
        Request::builder()
            .uri("/api/books/bestrating")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let titles: Vec<&str> = best
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Rated"]);
}

#[tokio::test]
async fn replacing_the_cover_reclaims_the_old_file() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    let image_dir = state.config.image_dir.clone();
    let app = build_router(state);
    let token = signup_and_login(&app, "owner@example.com").await;

    let book = create_book(
        &app,
        &token,
        "Original Title",
        encoded_image(400, 300, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    let book_id = book["id"].as_str().unwrap();
    let old_file = image_files(Path::new(&image_dir))[0].clone();

    let update = serde_json::json!({ "title": "Updated Title" });
    let (status, updated) = send(
        &app,
        multipart_request(
            &format!("/api/books/{book_id}"),
            "PUT",
            &token,
            Some(&update.to_string()),
            Some((
                "New Cover.png",
                "image/png",
                encoded_image(500, 400, image::ImageFormat::Png),
            )),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {updated}");
    assert_eq!(updated["title"], "Updated Title");

    let files = image_files(Path::new(&image_dir));
    assert_eq!(files.len(), 1, "old cover not reclaimed: {files:?}");
    assert_ne!(files[0], old_file);
    assert!(updated["imageUrl"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/images/{}", files[0])));
}

#[tokio::test]
async fn json_update_changes_text_only() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let token = signup_and_login(&app, "owner@example.com").await;

    let book = create_book(
        &app,
        &token,
        "Before",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    let book_id = book["id"].as_str().unwrap();
    let original_url = book["imageUrl"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/books/{book_id}"),
            Some(&token),
            serde_json::json!({ "title": "After", "year": 1999 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "After");
    assert_eq!(updated["year"], 1999);
    assert_eq!(updated["imageUrl"], original_url);
    // Author untouched by the partial update.
    assert_eq!(updated["author"], "Test Author");
}

#[tokio::test]
async fn protected_fields_cannot_be_written_through_updates() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let token = signup_and_login(&app, "owner@example.com").await;

    let book = create_book(
        &app,
        &token,
        "Guarded",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    let book_id = book["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/books/{book_id}"),
            Some(&token),
            serde_json::json!({ "averageRating": 5.0, "ownerId": "attacker", "imageUrl": "http://evil/x.webp" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["averageRating"], 0.0);
    assert_eq!(updated["ownerId"], book["ownerId"]);
    assert_eq!(updated["imageUrl"], book["imageUrl"]);
}

#[tokio::test]
async fn non_owner_mutations_are_forbidden() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let owner = signup_and_login(&app, "owner@example.com").await;
    let intruder = signup_and_login(&app, "intruder@example.com").await;

    let book = create_book(
        &app,
        &owner,
        "Mine",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    let book_id = book["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/books/{book_id}"),
            Some(&intruder),
            serde_json::json!({ "title": "Stolen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/api/books/{book_id}"),
            Some(&intruder),
            serde_json::json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rating someone else's book is allowed.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/books/{book_id}/rating"),
            Some(&intruder),
            serde_json::json!({ "rating": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_removes_record_and_cover() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    let image_dir = state.config.image_dir.clone();
    let app = build_router(state);
    let token = signup_and_login(&app, "owner@example.com").await;

    let book = create_book(
        &app,
        &token,
        "Ephemeral",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    let book_id = book["id"].as_str().unwrap();
    assert_eq!(image_files(Path::new(&image_dir)).len(), 1);

    let (status, _) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/api/books/{book_id}"),
            Some(&token),
            serde_json::json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Request::builder()
            .uri(&format!("/api/books/{book_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(image_files(Path::new(&image_dir)).is_empty());
}

#[tokio::test]
async fn invalid_create_payload_does_not_leak_files() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    let image_dir = state.config.image_dir.clone();
    let app = build_router(state);
    let token = signup_and_login(&app, "owner@example.com").await;

    // Valid image, missing required text fields.
    let (status, _) = send(
        &app,
        multipart_request(
            "/api/books",
            "POST",
            &token,
            Some(r#"{"title": "Only Title"}"#),
            Some((
                "orphan.png",
                "image/png",
                encoded_image(200, 200, image::ImageFormat::Png),
            )),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        image_files(Path::new(&image_dir)).is_empty(),
        "upload leaked on validation failure"
    );

    // Missing image entirely.
    let (status, _) = send(
        &app,
        multipart_request(
            "/api/books",
            "POST",
            &token,
            Some(r#"{"title": "T", "author": "A", "genre": "G", "year": 2000}"#),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_image_bytes_are_a_client_error() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    let image_dir = state.config.image_dir.clone();
    let app = build_router(state);
    let token = signup_and_login(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/books",
            "POST",
            &token,
            Some(r#"{"title": "T", "author": "A", "genre": "G", "year": 2000}"#),
            Some(("broken.jpg", "image/jpeg", b"not an image at all".to_vec())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_IMAGE");
    assert!(image_files(Path::new(&image_dir)).is_empty());
}

#[tokio::test]
async fn unsupported_upload_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let token = signup_and_login(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/books",
            "POST",
            &token,
            Some(r#"{"title": "T", "author": "A", "genre": "G", "year": 2000}"#),
            Some(("cover.gif", "image/gif", vec![0u8; 64])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_UPLOAD");
}

#[tokio::test]
async fn webp_upload_is_stored_as_is() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    let image_dir = state.config.image_dir.clone();
    let app = build_router(state);
    let token = signup_and_login(&app, "owner@example.com").await;

    let webp_bytes = {
        let img = image::RgbaImage::from_pixel(64, 64, image::Rgba([1, 2, 3, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::WebP)
            .expect("webp encode");
        out.into_inner()
    };

    let book = create_book(&app, &token, "Webp Book", webp_bytes.clone(), "image/webp").await;
    assert!(book["imageUrl"].as_str().unwrap().ends_with(".webp"));

    // Stored byte-for-byte: no re-encode of already-webp input.
    let files = image_files(Path::new(&image_dir));
    assert_eq!(files.len(), 1);
    let stored = std::fs::read(Path::new(&image_dir).join(&files[0])).unwrap();
    assert_eq!(stored, webp_bytes);
}

#[tokio::test]
async fn served_images_are_fetchable() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));
    let token = signup_and_login(&app, "owner@example.com").await;

    let book = create_book(
        &app,
        &token,
        "Served",
        encoded_image(200, 200, image::ImageFormat::Png),
        "image/png",
    )
    .await;
    let image_url = book["imageUrl"].as_str().unwrap();
    let path_start = image_url.find("/images/").unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&image_url[path_start..])
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir));

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/unknown")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
