//! Standalone upload integration tests
//!
//! Covers the single and batch upload endpoints and the ingestion naming
//! scheme observable through them.

mod common;

use common::*;

fn single_file_form(file_name: &str, data: &[u8]) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "item_image",
        reqwest::multipart::Part::bytes(data.to_vec()).file_name(file_name.to_string()),
    )
}

fn batch_form(count: usize) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for i in 0..count {
        form = form.part(
            "item_images",
            reqwest::multipart::Part::bytes(format!("file {}", i).into_bytes())
                .file_name(format!("photo{}.jpg", i)),
        );
    }
    form
}

/// Test 1: a single upload lands on disk under a derived name
#[tokio::test]
async fn test_upload_single() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let response = client
        .post(app.url("/uploads"))
        .header("auth-token", &token)
        .multipart(single_file_form("photo.jpg", b"jpeg bytes"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let file_name = body["file_name"].as_str().unwrap();
    assert!(file_name.starts_with("item_image-"));
    assert!(file_name.ends_with(".jpg"));

    let stored = app.upload_dir.path().join(file_name);
    assert_eq!(std::fs::read(stored).unwrap(), b"jpeg bytes");
}

/// Test 2: uploads require a session
#[tokio::test]
async fn test_upload_requires_session() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.url("/uploads"))
        .multipart(single_file_form("photo.jpg", b"jpeg bytes"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

/// Test 3: an empty payload is rejected with a validation error
#[tokio::test]
async fn test_upload_empty_payload() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let response = client
        .post(app.url("/uploads"))
        .header("auth-token", &token)
        .multipart(single_file_form("photo.jpg", b""))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

/// Test 4: a request without any file field is rejected
#[tokio::test]
async fn test_upload_missing_file() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let form = reqwest::multipart::Form::new().text("unrelated", "value");
    let response = client
        .post(app.url("/uploads"))
        .header("auth-token", &token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

/// Test 5: batch upload stores each file and reports the count
#[tokio::test]
async fn test_upload_batch() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let response = client
        .post(app.url("/uploads/batch"))
        .header("auth-token", &token)
        .multipart(batch_form(3))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 3);

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    for file in files {
        let stored = app.upload_dir.path().join(file.as_str().unwrap());
        assert!(stored.exists());
    }
}

/// Test 6: more than five files are rejected
#[tokio::test]
async fn test_upload_batch_too_many() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let response = client
        .post(app.url("/uploads/batch"))
        .header("auth-token", &token)
        .multipart(batch_form(6))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

/// Test 7: a batch with no files is rejected
#[tokio::test]
async fn test_upload_batch_empty() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let form = reqwest::multipart::Form::new().text("unrelated", "value");
    let response = client
        .post(app.url("/uploads/batch"))
        .header("auth-token", &token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

/// Test 8: concurrent uploads get distinct names
#[tokio::test]
async fn test_concurrent_uploads_unique_names() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &app, "alice1").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = app.url("/uploads");
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let response = client
                .post(url)
                .header("auth-token", token)
                .multipart(single_file_form("photo.jpg", b"jpeg bytes"))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 200);
            let body: serde_json::Value = response.json().await.unwrap();
            body["file_name"].as_str().unwrap().to_string()
        }));
    }

    let mut names = std::collections::HashSet::new();
    for handle in handles {
        let name = handle.await.unwrap();
        assert!(names.insert(name), "duplicate attachment name");
    }
}
