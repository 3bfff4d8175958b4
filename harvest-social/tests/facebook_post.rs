use harvest_common::{ContentExtractor, HarvestError};
use harvest_config::ActorServiceSettings;
use harvest_social::SocialPostExtractor;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RUN_PATH: &str = "/acts/apify~facebook-posts-scraper/run-sync-get-dataset-items";

fn settings(server: &MockServer, token: Option<&str>) -> ActorServiceSettings {
    ActorServiceSettings {
        api_token: token.map(str::to_string),
        endpoint: Some(server.uri()),
        timeout_secs: 30,
        ..ActorServiceSettings::default()
    }
}

#[tokio::test]
async fn renders_first_dataset_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(query_param("token", "apify-token"))
        .and(body_partial_json(json!({
            "startUrls": [{ "url": "https://www.facebook.com/somepage/posts/42" }],
            "resultsLimit": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "text": "Khai trương chi nhánh mới",
            "postDate": "2024-06-01T10:00:00+07:00",
            "pageName": "Cửa hàng ABC",
            "thumbnail": "https://scontent.example/1.jpg",
            "image": "https://scontent.example/2.jpg"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = SocialPostExtractor::new(settings(&server, Some("apify-token")));
    let out = extractor
        .extract("https://www.facebook.com/somepage/posts/42")
        .await
        .unwrap();

    assert!(out.starts_with("Khai trương chi nhánh mới"));
    assert!(out.contains("Ngày đăng: 01/06/2024 10:00"));
    assert!(out.contains("Tác giả: Cửa hàng ABC"));
    assert!(out.contains("Link bài viết: https://www.facebook.com/somepage/posts/42"));
    assert!(out.ends_with("Link ảnh:\n1. https://scontent.example/1.jpg\n2. https://scontent.example/2.jpg"));
}

#[tokio::test]
async fn missing_token_is_configuration_error() {
    let server = MockServer::start().await;
    let extractor = SocialPostExtractor::new(settings(&server, Some("${APIFY_TOKEN}")));
    let err = extractor.extract("https://facebook.com/p/1").await.unwrap_err();
    assert!(matches!(err, HarvestError::Configuration(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn empty_dataset_is_retrieval_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let extractor = SocialPostExtractor::new(settings(&server, Some("t")));
    let err = extractor.extract("https://facebook.com/p/1").await.unwrap_err();
    assert!(matches!(err, HarvestError::Retrieval(_)));
}

#[tokio::test]
async fn upstream_failure_is_retrieval_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let extractor = SocialPostExtractor::new(settings(&server, Some("t")));
    let err = extractor.extract("https://facebook.com/p/1").await.unwrap_err();
    assert!(matches!(err, HarvestError::Retrieval(_)));
}
