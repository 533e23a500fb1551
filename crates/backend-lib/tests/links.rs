mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{spawn_app, PREFIX};
use serde_json::{json, Value};

fn link_ids(profile: &Value) -> Vec<String> {
    profile["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_add_link_returns_profile() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;

    let res = app.add_link(&token, "GitHub", "https://github.com/ada").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Link Added");

    let links = res.body["user"]["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["title"], "GitHub");
    assert_eq!(links[0]["icon"], "default-icon");
    assert_eq!(links[0]["order"], 0);
    assert_eq!(links[0]["isActive"], true);
}

#[tokio::test]
async fn test_seventh_link_is_rejected() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;

    for i in 0..6 {
        let res = app
            .add_link(&token, "Site", &format!("https://site{i}.example.com"))
            .await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = app.add_link(&token, "Site", "https://site7.example.com").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "You can only add up to 6 links");
}

#[tokio::test]
async fn test_duplicate_url_is_per_user() {
    let app = spawn_app();
    let ada = app.signed_in("ada").await;
    let grace = app.signed_in("grace").await;

    assert_eq!(app.add_link(&ada, "Blog", "https://blog.example.com").await.status, StatusCode::OK);
    let dup = app.add_link(&ada, "Blog", "https://blog.example.com").await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.body["message"], "Link already exists for this platform and URL");

    assert_eq!(app.add_link(&grace, "Blog", "https://blog.example.com").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_link_input_validation() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;

    let bad = app.add_link(&token, "Site", "not-a-url").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["message"], "Invalid URL format");

    let blank = app.add_link(&token, "  ", "https://x.example.com").await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["message"], "Platform and URL cannot be empty");

    let unauthenticated = app
        .request(
            Method::POST,
            "/user/links",
            None,
            Some(json!({ "platform": "Site", "url": "https://x.example.com" })),
        )
        .await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_is_owner_scoped() {
    let app = spawn_app();
    let ada = app.signed_in("ada").await;
    let grace = app.signed_in("grace").await;

    let added = app.add_link(&ada, "Blog", "https://blog.example.com").await;
    let link_id = link_ids(&added.body["user"]).remove(0);
    let path = format!("/user/{link_id}");

    let foreign = app.request(Method::DELETE, &path, Some(&grace), None).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body["message"], "Link not found or unauthorized");

    let malformed = app.request(Method::DELETE, "/user/xyz", Some(&ada), None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["message"], "Invalid link ID");

    let own = app.request(Method::DELETE, &path, Some(&ada), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["message"], "Link deleted successfully");
    assert_eq!(own.body["user"]["links"], json!([]));
}

#[tokio::test]
async fn test_update_link() {
    let app = spawn_app();
    let ada = app.signed_in("ada").await;
    let grace = app.signed_in("grace").await;

    let added = app.add_link(&ada, "Blog", "https://blog.example.com").await;
    let link_id = link_ids(&added.body["user"]).remove(0);
    let path = format!("/links/{link_id}");

    let foreign = app
        .request(Method::PUT, &path, Some(&grace), Some(json!({ "title": "Mine" })))
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let anonymous = app
        .request(Method::PUT, &path, None, Some(json!({ "title": "Mine" })))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let res = app
        .request(
            Method::PUT,
            &path,
            Some(&ada),
            Some(json!({ "title": "Writing", "backgroundImage": "https://img.example.com/bg.png" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Link updated successfully");
    assert_eq!(res.body["data"]["title"], "Writing");
    assert_eq!(res.body["data"]["url"], "https://blog.example.com");
    assert_eq!(res.body["data"]["backgroundImage"], "https://img.example.com/bg.png");
}

#[tokio::test]
async fn test_public_listing_in_order() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;
    for i in 0..3 {
        app.add_link(&token, &format!("Site {i}"), &format!("https://s{i}.example.com"))
            .await;
    }

    let res = app.request(Method::GET, "/links/ada", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Links fetched successfully");
    assert_eq!(res.body["data"]["userDetails"]["username"], "ada");
    assert!(res.body["data"]["userDetails"].get("email").is_none());

    let orders: Vec<u64> = res.body["data"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["order"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1, 2]);

    let own = app.request(Method::GET, "/links", Some(&token), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["data"], res.body["data"]);

    let unknown = app.request(Method::GET, "/links/nobody", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "User not found");
}

#[tokio::test]
async fn test_reorder_links() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;
    app.add_link(&token, "A", "https://a.example.com").await;
    let res = app.add_link(&token, "B", "https://b.example.com").await;
    let mut ids = link_ids(&res.body["user"]);
    ids.reverse();

    let partial = app
        .request(
            Method::PUT,
            "/user/links/order",
            Some(&token),
            Some(json!({ "linkIds": [ids[0]] })),
        )
        .await;
    assert_eq!(partial.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            Method::PUT,
            "/user/links/order",
            Some(&token),
            Some(json!({ "linkIds": ids })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(link_ids(&res.body["user"]), ids);
}

#[tokio::test]
async fn test_visit_counter() {
    let app = spawn_app();
    app.signed_in("ada").await;

    let unknown = app.request(Method::PATCH, "/user/nobody/visit", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    for _ in 0..3 {
        app.request(Method::PATCH, "/user/ada/visit", None, None).await;
    }
    let res = app.request(Method::PATCH, "/user/ada/visit", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Visit recorded");
    assert_eq!(res.body["visitCount"], 4);
}

fn multipart(token: &str, path: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let boundary = "linkbranch-test-boundary";
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::PUT)
        .uri(format!("{PREFIX}{path}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_profile_update_and_avatar() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;

    let empty = app
        .send(multipart(&token, "/user/user-up", &[("bio", None, b"   ")]))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["message"], "No valid fields provided for update");

    let updated = app
        .send(multipart(
            &token,
            "/user/user-up",
            &[
                ("fullname", None, b"Ada Lovelace"),
                ("bio", None, b"First programmer"),
                ("profilePic", Some("me.png"), b"\x89PNG\r\n"),
            ],
        ))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["message"], "User updated successfully");
    assert_eq!(updated.body["user"]["fullname"], "Ada Lovelace");
    assert_eq!(updated.body["user"]["bio"], "First programmer");
    assert!(updated.body["user"].get("links").is_none());

    let pic = updated.body["user"]["profilePic"].as_str().unwrap();
    let file = pic.rsplit('/').next().unwrap();
    assert!(app.dir.path().join("uploads").join(file).exists());

    let rejected = app
        .send(multipart(&token, "/user/user-up", &[("profilePic", Some("me.gif"), b"GIF89a")]))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["message"], "Couldn't upload image");
}

#[tokio::test]
async fn test_upload_image_requires_file() {
    let app = spawn_app();
    let token = app.signed_in("ada").await;

    let mut missing = multipart(&token, "/user/upload-image", &[("bio", None, b"hi")]);
    *missing.method_mut() = Method::POST;
    let res = app.send(missing).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "No file found");

    let mut upload = multipart(
        &token,
        "/user/upload-image",
        &[("profilePic", Some("me.jpg"), b"\xff\xd8\xff")],
    );
    *upload.method_mut() = Method::POST;
    let res = app.send(upload).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Image uploaded successfully");
    assert!(res.body["image"].as_str().unwrap().ends_with(".jpg"));
}
