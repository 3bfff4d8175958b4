use harvest_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn posts_json_with_query_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/acts/demo/run"))
        .and(query_param("token", "secret"))
        .and(body_json(json!({ "url": "https://example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "ok": true }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&format!("{}/v2", server.uri())).unwrap();
    let out: Vec<Value> = client
        .post_json(
            "acts/demo/run",
            &json!({ "url": "https://example.com" }),
            RequestOpts {
                auth: Some(Auth::Query {
                    name: "token",
                    value: "secret".into(),
                }),
                ..Default::default()
            },
        )
        .await
        .expect("request succeeds");

    assert_eq!(out, vec![json!({ "ok": true })]);
}

#[tokio::test]
async fn bearer_auth_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("authorization", "Bearer sk-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pong": 1 })))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let out: Value = client
        .get_json(
            "ping",
            RequestOpts {
                auth: Some(Auth::Bearer(" sk-123 ")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(out["pong"], 1);
}

#[tokio::test]
async fn api_errors_carry_status_and_message_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/boom"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({ "error": { "message": "upstream down" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<Value>("boom", RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Api { status, message } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn retry_budget_is_honoured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap().with_retries(1);
    let err = client
        .get_json::<Value>("flaky", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Api { .. }));
}

#[tokio::test]
async fn unauthorized_is_detectable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<Value>("anything", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn network_error_does_not_carry_query_token() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let client = HttpClient::new(&format!("http://127.0.0.1:{port}/v2")).unwrap();
    let err = client
        .post_json::<_, Value>(
            "acts/a~b/run-sync-get-dataset-items",
            &json!({}),
            RequestOpts {
                auth: Some(Auth::Query {
                    name: "token",
                    value: "SUPERSECRET".into(),
                }),
                query: Some(vec![("timeout", "180".into())]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Network(_)));
    let message = err.to_string();
    assert!(!message.contains("SUPERSECRET"), "{message}");
    assert!(message.contains("/v2/acts/a~b/run-sync-get-dataset-items"), "{message}");
}
