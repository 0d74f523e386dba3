use httpmock::prelude::*;
use instant_preview_client::{
    Client, EmailSource, Error, ImageUrlOptions, ImageVisibility, Orientation, PreviewApi,
    PreviewConfiguration, PreviewOptions,
};
use serde_json::json;

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.base_url())
        .oauth_token("tok")
        .build()
        .unwrap()
}

#[tokio::test]
async fn create_email_returns_handle_and_metadata() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .header("authorization", "Bearer tok")
                .json_body(json!({"html_text": "<p>Hi</p>", "subject": "Greetings"}));
            then.status(201).json_body(json!({
                "email_guid": "abc123",
                "subject": "Greetings",
                "end_user_id": null,
            }));
        })
        .await;

    let email = EmailSource::from_html("<p>Hi</p>").with_subject("Greetings");
    let handle = client_for(&server).create_email(&email).await.unwrap();

    mock.assert_async().await;
    assert_eq!(handle.email_guid, "abc123");
    assert_eq!(handle.metadata.get("subject"), Some(&json!("Greetings")));
}

#[tokio::test]
async fn create_email_without_content_is_rejected_by_service() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(400).json_body(
                json!({"description": "one of raw_source, html_text or plain_text is required"}),
            );
        })
        .await;

    let err = client_for(&server)
        .create_email(&EmailSource::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        Error::Request("one of raw_source, html_text or plain_text is required".into())
    );
}

#[tokio::test]
async fn create_email_with_unexpected_shape_is_network_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(201).json_body(json!({"guid": "abc123"}));
        })
        .await;

    let err = client_for(&server)
        .create_email(&EmailSource::from_plain_text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)), "{err:?}");
}

#[tokio::test]
async fn lists_clients_and_configurations() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/clients");
            then.status(200)
                .json_body(json!(["gmailw", "outlook2016", "iphone6"]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/clients/configurations");
            then.status(200).json_body(json!({
                "gmailw": {"orientation_options": ["vertical"], "images_options": ["allowed", "blocked"]},
                "iphone6": {"orientation_options": ["horizontal", "vertical"], "images_options": ["allowed"]},
            }));
        })
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.clients().await.unwrap(),
        vec!["gmailw", "outlook2016", "iphone6"]
    );

    let configurations = client.client_configurations().await.unwrap();
    assert_eq!(configurations.len(), 2);
    assert_eq!(
        configurations["iphone6"]["orientation_options"],
        json!(["horizontal", "vertical"])
    );
}

#[tokio::test]
async fn get_preview_maps_capture_sizes() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/emails/abc123/previews/iphone6")
                .query_param("images", "blocked")
                .query_param("orientation", "horizontal");
            then.status(200).json_body(json!({
                "full_url": "https://cdn.test/abc123/full.png",
                "thumb_url": "https://cdn.test/abc123/thumb.png",
                "thumb450_url": "https://cdn.test/abc123/thumb450.png",
            }));
        })
        .await;

    let options = PreviewOptions::default()
        .images(ImageVisibility::Blocked)
        .orientation(Orientation::Horizontal);
    let urls = client_for(&server)
        .get_preview("abc123", "iphone6", &options)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(urls.len(), 3);
    assert_eq!(urls["thumb450"], "https://cdn.test/abc123/thumb450.png");
}

#[tokio::test]
async fn get_preview_surfaces_capture_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/emails/abc123/previews/gmailw");
            then.status(504)
                .json_body(json!({"description": "capture timed out"}));
        })
        .await;

    let err = client_for(&server)
        .get_preview("abc123", "gmailw", &PreviewOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, Error::Timeout("capture timed out".into()));
}

#[tokio::test]
async fn prefetch_posts_configurations() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails/abc123/previews/prefetch")
                .json_body(json!({"configurations": [
                    {"client": "gmailw"},
                    {"client": "iphone6", "orientation": "vertical", "images": "allowed"},
                ]}));
            then.status(202).json_body(json!({"configurations": [
                {"client": "gmailw"},
                {"client": "iphone6", "orientation": "vertical", "images": "allowed"},
            ]}));
        })
        .await;

    let configurations = [
        PreviewConfiguration::new("gmailw"),
        PreviewConfiguration::new("iphone6").with_options(
            PreviewOptions::default()
                .orientation(Orientation::Vertical)
                .images(ImageVisibility::Allowed),
        ),
    ];
    let payload = client_for(&server)
        .prefetch_previews("abc123", &configurations)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(payload["configurations"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn prefetch_validation_errors_raise_immediately() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/emails/abc123/previews/prefetch");
            then.status(400)
                .json_body(json!({"description": "unknown client: notaclient"}));
        })
        .await;

    let err = client_for(&server)
        .prefetch_previews("abc123", &[PreviewConfiguration::new("notaclient")])
        .await
        .unwrap_err();
    assert_eq!(err, Error::Request("unknown client: notaclient".into()));
}

#[test]
fn preview_image_url_shards_host_and_encodes_fallback() {
    let client = Client::new().unwrap();
    let url = client
        .preview_image_url(
            "abc123",
            "outlook2016",
            &ImageUrlOptions::default()
                .capture_size("thumb")
                .fallback_url("https://x.test/img.png?a=1"),
        )
        .unwrap();

    assert!(
        url.starts_with("https://outlook2016.instant-api.litmus.com/"),
        "{url}"
    );
    assert!(url.contains("/emails/abc123/previews/outlook2016/thumb"), "{url}");
    assert!(
        url.ends_with("?fallback_url=https%3A%2F%2Fx.test%2Fimg.png%3Fa%3D1"),
        "{url}"
    );
}

#[test]
fn preview_image_url_without_options_has_no_query() {
    let client = Client::new().unwrap();
    let url = client
        .preview_image_url("abc123", "gmailw", &ImageUrlOptions::default())
        .unwrap();
    assert_eq!(
        url,
        "https://gmailw.instant-api.litmus.com/v1/emails/abc123/previews/gmailw/full"
    );
    assert!(!url.contains('?'));
}

#[test]
fn preview_image_url_carries_capture_options() {
    let client = Client::builder()
        .base_url("https://previews.example.com:8443/api/")
        .build()
        .unwrap();
    let url = client
        .preview_image_url(
            "abc123",
            "iphone6",
            &ImageUrlOptions::default()
                .preview(
                    PreviewOptions::default()
                        .images(ImageVisibility::Blocked)
                        .orientation(Orientation::Horizontal),
                )
                .fallback_text("Preview unavailable"),
        )
        .unwrap();
    assert_eq!(
        url,
        "https://iphone6.previews.example.com:8443/api/emails/abc123/previews/iphone6/full\
         ?images=blocked&orientation=horizontal&fallback_text=Preview+unavailable"
    );
}

#[test]
fn preview_image_url_rejects_unshardable_host() {
    let client = Client::builder()
        .base_url("http://[::1]:9000")
        .build()
        .unwrap();
    let err = client
        .preview_image_url("abc123", "gmailw", &ImageUrlOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err:?}");
}

#[tokio::test]
async fn handle_with_reserved_characters_stays_one_segment() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/emails/abc%2F123%3Fx/previews/gmailw");
            then.status(200)
                .json_body(json!({"full_url": "https://cdn.test/full.png"}));
        })
        .await;

    let urls = client_for(&server)
        .get_preview("abc/123?x", "gmailw", &PreviewOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(urls["full"], "https://cdn.test/full.png");

    let url = Client::new()
        .unwrap()
        .preview_image_url("abc/123?x", "gmailw", &ImageUrlOptions::default())
        .unwrap();
    assert_eq!(
        url,
        "https://gmailw.instant-api.litmus.com/v1/emails/abc%2F123%3Fx/previews/gmailw/full"
    );
}
