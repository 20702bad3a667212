use serde_json::json;

use crate::common::{TestApp, routes};

/// Bytes that sniff as a PNG.
fn png_bytes() -> Vec<u8> {
    let mut b = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    b.extend_from_slice(b"png-test-image-data");
    b
}

/// Bytes that sniff as a GIF.
fn gif_bytes() -> Vec<u8> {
    b"GIF89a-gif-test-image-data".to_vec()
}

/// Bytes that sniff as a JPEG.
fn jpeg_bytes() -> Vec<u8> {
    let mut b = vec![0xFF, 0xD8, 0xFF, 0xE0];
    b.extend_from_slice(b"jpeg-test-image-data");
    b
}

fn form_with_photo(
    title: &str,
    body: &str,
    field: &'static str,
    bytes: Vec<u8>,
    filename: &str,
) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
    reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("body", body.to_string())
        .part(field, part)
}

mod post_creation {
    use super::*;

    #[tokio::test]
    async fn create_without_photos_returns_null_urls() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::POSTS, &json!({"title": "Hello", "body": "World"}))
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["title"], "Hello");
        assert_eq!(res.body["body"], "World");
        assert!(res.body["id"].is_number());
        assert!(res.body["photo1_url"].is_null());
        assert!(res.body["photo2_url"].is_null());
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let app = TestApp::spawn().await;

        let first = app
            .post_json(routes::POSTS, &json!({"title": "One", "body": "B"}))
            .await;
        let second = app
            .post_json(routes::POSTS, &json!({"title": "Two", "body": "B"}))
            .await;

        assert_eq!(first.status, 201);
        assert_eq!(second.status, 201);
        assert_ne!(first.body["id"], second.body["id"]);
    }

    #[tokio::test]
    async fn missing_title_is_rejected_and_nothing_persisted() {
        let app = TestApp::spawn().await;

        let res = app.post_json(routes::POSTS, &json!({"body": "World"})).await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["title"][0].is_string());

        let list = app.get(routes::POSTS).await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_body_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_json(routes::POSTS, &json!({"title": "Hello"})).await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["body"][0].is_string());
    }

    #[tokio::test]
    async fn overlong_title_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::POSTS,
                &json!({"title": "x".repeat(256), "body": "World"}),
            )
            .await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["title"][0].is_string());
    }

    #[tokio::test]
    async fn non_image_photo_is_rejected() {
        let app = TestApp::spawn().await;

        let form = form_with_photo("Hello", "World", "photo1", b"not an image".to_vec(), "a.txt");
        let res = app.post_form(routes::POSTS, form).await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["photo1"][0].is_string());

        let list = app.get(routes::POSTS).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let app = TestApp::spawn().await;

        let mut bytes = gif_bytes();
        bytes.resize(2048 * 1024 + 1, 0);
        let form = form_with_photo("Hello", "World", "photo2", bytes, "big.gif");
        let res = app.post_form(routes::POSTS, form).await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["photo2"][0].is_string());
    }

    #[tokio::test]
    async fn create_with_photo_returns_fetchable_url() {
        let app = TestApp::spawn().await;

        let form = form_with_photo("Hello", "World", "photo1", png_bytes(), "pic.png");
        let res = app.post_form(routes::POSTS, form).await;

        assert_eq!(res.status, 201);
        let url = res.body["photo1_url"].as_str().expect("photo1_url set");
        assert!(res.body["photo2_url"].is_null());

        let file = app.get(url).await;
        assert_eq!(file.status, 200);
        assert_eq!(file.bytes, png_bytes());
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn create_with_both_photos() {
        let app = TestApp::spawn().await;

        let photo1 = reqwest::multipart::Part::bytes(jpeg_bytes()).file_name("a.jpg");
        let photo2 = reqwest::multipart::Part::bytes(gif_bytes()).file_name("b.gif");
        let form = reqwest::multipart::Form::new()
            .text("title", "Two photos")
            .text("body", "Body")
            .part("photo1", photo1)
            .part("photo2", photo2);

        let res = app.post_form(routes::POSTS, form).await;

        assert_eq!(res.status, 201);
        assert!(res.body["photo1_url"].as_str().unwrap().ends_with(".jpg"));
        assert!(res.body["photo2_url"].as_str().unwrap().ends_with(".gif"));
    }
}

mod post_retrieval {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "T", "body": "B"}))
            .await;
        let id = created.body["id"].as_i64().unwrap() as i32;

        let res = app.get(&routes::post(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["title"], "T");
        assert_eq!(res.body["body"], "B");
    }

    #[tokio::test]
    async fn list_returns_all_posts() {
        let app = TestApp::spawn().await;

        for i in 0..3 {
            app.post_json(
                routes::POSTS,
                &json!({"title": format!("Post {i}"), "body": "B"}),
            )
            .await;
        }

        let res = app.get(routes::POSTS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_id_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::post(9999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({"error": "Post not found"}));
    }

    #[tokio::test]
    async fn malformed_id_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get("/posts/not-a-number").await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({"error": "Post not found"}));
    }
}

mod post_update {
    use super::*;

    #[tokio::test]
    async fn partial_update_keeps_omitted_fields() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "T", "body": "Original"}))
            .await;
        let id = created.body["id"].as_i64().unwrap() as i32;

        let res = app
            .patch_json(&routes::post(id), &json!({"title": "T2"}))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "T2");
        assert_eq!(res.body["body"], "Original");

        let fetched = app.get(&routes::post(id)).await;
        assert_eq!(fetched.body["title"], "T2");
        assert_eq!(fetched.body["body"], "Original");
    }

    #[tokio::test]
    async fn put_updates_like_patch() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "T", "body": "B"}))
            .await;
        let id = created.body["id"].as_i64().unwrap() as i32;

        let res = app
            .put_json(&routes::post(id), &json!({"body": "B2"}))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "T");
        assert_eq!(res.body["body"], "B2");
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let app = TestApp::spawn().await;

        let res = app
            .patch_json(&routes::post(9999), &json!({"title": "T"}))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({"error": "Post not found"}));
    }

    #[tokio::test]
    async fn update_with_overlong_title_is_422() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "T", "body": "B"}))
            .await;
        let id = created.body["id"].as_i64().unwrap() as i32;

        let res = app
            .patch_json(&routes::post(id), &json!({"title": "x".repeat(256)}))
            .await;

        assert_eq!(res.status, 422);
        assert!(res.body["errors"]["title"][0].is_string());

        // Stored value unchanged.
        let fetched = app.get(&routes::post(id)).await;
        assert_eq!(fetched.body["title"], "T");
    }

    #[tokio::test]
    async fn photo_replacement_removes_old_blob() {
        let app = TestApp::spawn().await;

        let form = form_with_photo("T", "B", "photo1", png_bytes(), "old.png");
        let created = app.post_form(routes::POSTS, form).await;
        assert_eq!(created.status, 201);
        let id = created.body["id"].as_i64().unwrap() as i32;
        let old_url = created.body["photo1_url"].as_str().unwrap().to_string();

        assert_eq!(app.get(&old_url).await.status, 200);

        let replacement = reqwest::multipart::Form::new().part(
            "photo1",
            reqwest::multipart::Part::bytes(gif_bytes()).file_name("new.gif"),
        );
        let updated = app.patch_form(&routes::post(id), replacement).await;

        assert_eq!(updated.status, 200);
        let new_url = updated.body["photo1_url"].as_str().unwrap().to_string();
        assert_ne!(new_url, old_url);

        assert_eq!(app.get(&old_url).await.status, 404);
        let file = app.get(&new_url).await;
        assert_eq!(file.status, 200);
        assert_eq!(file.bytes, gif_bytes());
    }

    #[tokio::test]
    async fn photo_update_leaves_other_photo_alone() {
        let app = TestApp::spawn().await;

        let photo1 = reqwest::multipart::Part::bytes(png_bytes()).file_name("a.png");
        let photo2 = reqwest::multipart::Part::bytes(gif_bytes()).file_name("b.gif");
        let form = reqwest::multipart::Form::new()
            .text("title", "T")
            .text("body", "B")
            .part("photo1", photo1)
            .part("photo2", photo2);
        let created = app.post_form(routes::POSTS, form).await;
        let id = created.body["id"].as_i64().unwrap() as i32;
        let photo2_url = created.body["photo2_url"].as_str().unwrap().to_string();

        let replacement = reqwest::multipart::Form::new().part(
            "photo1",
            reqwest::multipart::Part::bytes(jpeg_bytes()).file_name("c.jpg"),
        );
        let updated = app.patch_form(&routes::post(id), replacement).await;

        assert_eq!(updated.status, 200);
        assert_eq!(updated.body["photo2_url"], photo2_url.as_str());
        assert_eq!(app.get(&photo2_url).await.status, 200);
    }
}

mod post_deletion {
    use super::*;

    #[tokio::test]
    async fn destroy_returns_confirmation_and_removes_record() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "T", "body": "B"}))
            .await;
        let id = created.body["id"].as_i64().unwrap() as i32;

        let res = app.delete(&routes::post(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({"message": "Post deleted"}));

        let fetched = app.get(&routes::post(id)).await;
        assert_eq!(fetched.status, 404);
    }

    #[tokio::test]
    async fn destroy_is_not_idempotent() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "T", "body": "B"}))
            .await;
        let id = created.body["id"].as_i64().unwrap() as i32;

        assert_eq!(app.delete(&routes::post(id)).await.status, 200);

        let second = app.delete(&routes::post(id)).await;
        assert_eq!(second.status, 404);
        assert_eq!(second.body, json!({"error": "Post not found"}));
    }

    #[tokio::test]
    async fn destroy_removes_photo_blobs() {
        let app = TestApp::spawn().await;

        let form = form_with_photo("T", "B", "photo1", png_bytes(), "pic.png");
        let created = app.post_form(routes::POSTS, form).await;
        let id = created.body["id"].as_i64().unwrap() as i32;
        let url = created.body["photo1_url"].as_str().unwrap().to_string();

        app.delete(&routes::post(id)).await;

        assert_eq!(app.get(&url).await.status, 404);
    }

    #[tokio::test]
    async fn destroy_unknown_id_is_404() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::post(1)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({"error": "Post not found"}));
    }
}

mod scenario {
    use super::*;

    /// The full lifecycle against a fresh store: ids start at 1.
    #[tokio::test]
    async fn create_get_delete_lifecycle() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::POSTS, &json!({"title": "Hello", "body": "World"}))
            .await;
        assert_eq!(created.status, 201);
        assert_eq!(
            created.body,
            json!({
                "id": 1,
                "title": "Hello",
                "body": "World",
                "photo1_url": null,
                "photo2_url": null
            })
        );

        let fetched = app.get(&routes::post(1)).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body, created.body);

        let deleted = app.delete(&routes::post(1)).await;
        assert_eq!(deleted.status, 200);
        assert_eq!(deleted.body, json!({"message": "Post deleted"}));

        let gone = app.get(&routes::post(1)).await;
        assert_eq!(gone.status, 404);
        assert_eq!(gone.body, json!({"error": "Post not found"}));
    }
}
