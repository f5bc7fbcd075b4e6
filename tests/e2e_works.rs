//! E2E tests for works: multipart create/update, listing, reorder

mod common;

use common::{TestServer, image_part};
use reqwest::multipart::Form;
use serde_json::{Value, json};

async fn create_work(server: &TestServer, token: &str, form: Form) -> String {
    let response = server
        .client
        .post(server.url("/api/works"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
    body["id"].as_str().unwrap().to_string()
}

async fn get_work(server: &TestServer, id: &str) -> Value {
    server
        .client
        .get(server.url(&format!("/api/works/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_work_with_images_and_serve_them() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let form = Form::new()
        .text("name", "Harbor")
        .text("category", "Photo")
        .part("image", image_part("cover.png", "image/png", b"cover-bytes"))
        .part("images", image_part("a.jpg", "image/jpeg", b"a"))
        .part("images", image_part("b.jpg", "image/jpeg", b"b"));
    let id = create_work(&server, &token, form).await;

    let work = get_work(&server, &id).await;
    assert_eq!(work["name"], "Harbor");
    assert_eq!(work["description"], "");
    assert_eq!(work["sort_order"], 0);
    let cover = work["image"].as_str().unwrap();
    assert!(cover.starts_with("/uploads/") && cover.ends_with(".png"));
    assert_eq!(work["images"].as_array().unwrap().len(), 2);

    // Local uploads are served back by the same process
    let served = server.client.get(server.url(cover)).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"cover-bytes");
}

#[tokio::test]
async fn test_update_reconciles_image_list() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let form = Form::new()
        .text("name", "Harbor")
        .part("images", image_part("a.jpg", "image/jpeg", b"a"))
        .part("images", image_part("b.jpg", "image/jpeg", b"b"));
    let id = create_work(&server, &token, form).await;
    let before = get_work(&server, &id).await;
    let second = before["images"][1].as_str().unwrap().to_string();

    let form = Form::new()
        .text("images_paths", json!([second]).to_string())
        .part("images[]", image_part("c.webp", "image/webp", b"c"));
    let response = server
        .client
        .put(server.url(&format!("/api/works/{id}")))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let after = get_work(&server, &id).await;
    let images = after["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], second.as_str());
    assert!(images[1].as_str().unwrap().ends_with(".webp"));
    assert_eq!(after["name"], "Harbor");
}

#[tokio::test]
async fn test_create_work_validation() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let cases = [
        Form::new().text("description", "no name"),
        Form::new().text("name", "   "),
        Form::new().text("name", "x").text("sort_order", "first"),
        Form::new().text("name", "x").text("owner", "someone"),
        Form::new()
            .text("name", "x")
            .part("image", image_part("notes.txt", "text/plain", b"hi")),
    ];

    for form in cases {
        let response = server
            .client
            .post(server.url("/api/works"))
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    let works: Vec<Value> = server
        .client
        .get(server.url("/api/works"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(works.is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let big = vec![0u8; 5 * 1024 * 1024 + 1];
    let form = Form::new()
        .text("name", "Huge")
        .part("image", image_part("huge.jpg", "image/jpeg", &big));

    let response = server
        .client
        .post(server.url("/api/works"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_category_filter_and_sort() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let photo = create_work(
        &server,
        &token,
        Form::new().text("name", "photo").text("category", "Photo"),
    )
    .await;
    let design = create_work(
        &server,
        &token,
        Form::new().text("name", "design").text("category", "Design"),
    )
    .await;

    let list = |query: &'static str| {
        let request = server.client.get(server.url(&format!("/api/works{query}")));
        async move {
            let works: Vec<Value> = request.send().await.unwrap().json().await.unwrap();
            works
                .into_iter()
                .map(|w| w["name"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(list("?category=Photo").await, vec!["photo"]);
    assert_eq!(list("?category=All").await.len(), 2);

    let response = server
        .client
        .put(server.url("/api/works/sort"))
        .bearer_auth(&token)
        .json(&json!({"items": [
            {"id": photo, "sort_order": 5},
            {"id": "missing", "sort_order": 1},
            {"id": design, "sort_order": 1},
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(list("").await, vec!["design", "photo"]);

    let bad = server
        .client
        .put(server.url("/api/works/sort"))
        .bearer_auth(&token)
        .json(&json!({"items": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), 400);
}

#[tokio::test]
async fn test_delete_is_unconditional_and_keeps_files() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let id = create_work(
        &server,
        &token,
        Form::new()
            .text("name", "Harbor")
            .part("image", image_part("cover.gif", "image/gif", b"gif")),
    )
    .await;

    for _ in 0..2 {
        let response = server
            .client
            .delete(server.url(&format!("/api/works/{id}")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let missing = server
        .client
        .get(server.url(&format!("/api/works/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let files = std::fs::read_dir(&server.uploads_dir).unwrap().count();
    assert_eq!(files, 1);
}
