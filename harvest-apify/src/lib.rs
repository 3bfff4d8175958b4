//! Minimal client for hosted scraping actors (Apify API v2).
//!
//! Both delegated extractors run an actor synchronously and read back the
//! items it pushed to its default dataset. The token travels as the `token`
//! query parameter, which the shared HTTP client redacts from its logs.
use harvest_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

pub const APIFY_API_BASE: &str = "https://api.apify.com/v2";

/// Slack added on top of the actor's own run timeout for the HTTP round trip.
const TRANSPORT_SLACK: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct ApifyClient {
    http: HttpClient,
    token: String,
    run_timeout: Duration,
}

impl ApifyClient {
    pub fn new(token: impl Into<String>) -> Result<Self, HttpError> {
        Self::with_base(APIFY_API_BASE, token)
    }

    /// Point the client at another API root (tests, proxies).
    pub fn with_base(base: &str, token: impl Into<String>) -> Result<Self, HttpError> {
        let run_timeout = Duration::from_secs(180);
        let http = HttpClient::new(base)?.with_timeout(run_timeout + TRANSPORT_SLACK);
        Ok(Self {
            http,
            token: token.into(),
            run_timeout,
        })
    }

    /// Cap how long the actor may run before the platform aborts it.
    pub fn with_run_timeout(mut self, dur: Duration) -> Self {
        self.run_timeout = dur;
        self.http = self.http.with_timeout(dur + TRANSPORT_SLACK);
        self
    }

    /// Run `actor` with `input` and return its dataset items.
    ///
    /// `actor` is the `owner~name` identifier. An empty vector is a valid
    /// answer here; callers decide whether that is a retrieval failure.
    pub async fn run_sync_dataset_items<I, T>(
        &self,
        actor: &str,
        input: &I,
    ) -> Result<Vec<T>, HttpError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let path = format!("acts/{actor}/run-sync-get-dataset-items");
        tracing::info!(target: "apify", %actor, "apify.run.start");

        let result: Result<Vec<T>, HttpError> = self
            .http
            .post_json(
                &path,
                input,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "token",
                        value: self.token.as_str().into(),
                    }),
                    query: Some(vec![(
                        "timeout",
                        self.run_timeout.as_secs().to_string().into(),
                    )]),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await;

        match &result {
            Ok(items) => tracing::info!(
                target: "apify",
                %actor,
                items = items.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "apify.run.success"
            ),
            Err(e) => tracing::warn!(
                target: "apify",
                %actor,
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "apify.run.error"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn runs_actor_and_returns_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/acts/owner~actor/run-sync-get-dataset-items"))
            .and(query_param("token", "tok"))
            .and(query_param("timeout", "60"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "text": "a" }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApifyClient::with_base(&server.uri(), "tok")
            .unwrap()
            .with_run_timeout(Duration::from_secs(60));
        let items: Vec<Value> = client
            .run_sync_dataset_items("owner~actor", &json!({ "startUrls": [] }))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "a");
    }

    #[tokio::test]
    async fn platform_errors_surface() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                json!({ "error": { "type": "record-not-found", "message": "Actor was not found" } }),
            ))
            .mount(&server)
            .await;

        let client = ApifyClient::with_base(&server.uri(), "tok").unwrap();
        let err = client
            .run_sync_dataset_items::<_, Value>("missing~actor", &json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Actor was not found"));
    }
}
