//! Request execution and response classification
//!
//! Every call goes through [`RequestExecutor`]: it joins the endpoint onto the
//! base URL, attaches the API key, sends through the [`Transport`] under the
//! configured timeout and turns whatever happened into an [`Envelope`].

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::envelope::{Envelope, RawContent};
use crate::observer::{RequestEvent, RequestKind, RequestObserver, RequestOutcome, TracingObserver};
use crate::transport::{
    FilePart, HttpMethod, RequestBody, Transport, TransportError, TransportRequest,
    TransportResponse, flatten_fields, join_url, merge_headers,
};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Executes authenticated requests against the S3 Connector API
#[derive(Clone)]
pub struct RequestExecutor {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn RequestObserver>,
}

impl RequestExecutor {
    /// Create an executor that reports requests through `tracing`
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the request observer
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Send a JSON request
    ///
    /// GET parameters travel in the query string, POST and DELETE parameters
    /// in a JSON body.
    pub async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Map<String, Value>,
    ) -> Envelope {
        self.execute_with_headers(method, endpoint, params, &[]).await
    }

    /// Send a JSON request with extra headers; `headers` replace defaults
    pub async fn execute_with_headers(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Map<String, Value>,
        headers: &[(String, String)],
    ) -> Envelope {
        if endpoint.trim_matches('/').is_empty() {
            return Envelope::transport_failure("Endpoint path must not be empty");
        }

        let (query, body) = match method {
            HttpMethod::Get => (flatten_fields(&params), RequestBody::Empty),
            HttpMethod::Post | HttpMethod::Delete => {
                (Vec::new(), RequestBody::Json(Value::Object(params)))
            }
        };

        let request = TransportRequest {
            method,
            url: join_url(self.config.base_url(), endpoint),
            query,
            headers: merge_headers(
                &[
                    (API_KEY_HEADER, self.config.api_key()),
                    ("Accept", "application/json"),
                    ("Content-Type", "application/json"),
                ],
                headers,
            ),
            body,
            timeout: self.config.timeout(),
        };

        self.dispatch(RequestKind::Json, request)
            .await
            .map_or_else(Envelope::from, |resp| Envelope::from_response(&resp))
    }

    /// Send a multipart request
    ///
    /// Nested values in `fields` are flattened to `key[sub]` form fields.
    pub async fn execute_with_files(
        &self,
        method: HttpMethod,
        endpoint: &str,
        fields: Map<String, Value>,
        files: Vec<FilePart>,
    ) -> Envelope {
        if endpoint.trim_matches('/').is_empty() {
            return Envelope::transport_failure("Endpoint path must not be empty");
        }

        let request = TransportRequest {
            method,
            url: join_url(self.config.base_url(), endpoint),
            query: Vec::new(),
            headers: merge_headers(
                &[
                    (API_KEY_HEADER, self.config.api_key()),
                    ("Accept", "application/json"),
                ],
                &[],
            ),
            body: RequestBody::Multipart {
                fields: flatten_fields(&fields),
                files,
            },
            timeout: self.config.timeout(),
        };

        self.dispatch(RequestKind::Multipart, request)
            .await
            .map_or_else(Envelope::from, |resp| Envelope::from_response(&resp))
    }

    /// Fetch an object's bytes from `s3/download` without JSON decoding
    pub async fn fetch_raw_content(&self, key: &str) -> RawContent {
        let mut params = Map::new();
        params.insert("key".to_string(), Value::String(key.to_string()));

        let request = TransportRequest {
            method: HttpMethod::Post,
            url: join_url(self.config.base_url(), "s3/download"),
            query: Vec::new(),
            headers: merge_headers(
                &[
                    (API_KEY_HEADER, self.config.api_key()),
                    ("Accept", "*/*"),
                    ("Content-Type", "application/json"),
                ],
                &[],
            ),
            body: RequestBody::Json(Value::Object(params)),
            timeout: self.config.timeout(),
        };

        self.dispatch(RequestKind::RawContent, request)
            .await
            .map_or_else(RawContent::from, RawContent::from_response)
    }

    /// Send under a hard timeout and report the call to the observer
    async fn dispatch(
        &self,
        kind: RequestKind,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let method = request.method;
        let url = request.url.clone();
        let timeout = request.timeout;

        let result = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(format!(
                "Request timed out after {} seconds",
                timeout.as_secs()
            ))),
        };

        if self.config.logging_enabled() {
            let error_text;
            let outcome = match &result {
                Ok(resp) => RequestOutcome::Status(resp.status),
                Err(e) => {
                    error_text = e.to_string();
                    RequestOutcome::Error(&error_text)
                }
            };
            self.observer.on_request(&RequestEvent {
                kind,
                method,
                url: &url,
                outcome,
            });
        }

        result
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    const BASE_URL: &str = "http://localhost:8000/api/";
    const KEY: &str = "sk_test_1234567890";

    fn config() -> ClientConfig {
        ClientConfig::new(BASE_URL, KEY).unwrap()
    }

    fn executor(transport: MockTransport) -> RequestExecutor {
        RequestExecutor::new(config(), Arc::new(transport))
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_post_builds_authenticated_json_request() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url == "http://localhost:8000/api/s3/copy"
                    && req.query.is_empty()
                    && req.header("x-api-key") == Some(KEY)
                    && req.header("accept") == Some("application/json")
                    && req.header("content-type") == Some("application/json")
                    && req.body == RequestBody::Json(json!({"source_key": "a", "destination_key": "b"}))
                    && req.timeout == Duration::from_secs(30)
            })
            .times(1)
            .returning(|_| {
                Ok(TransportResponse::json_body(
                    200,
                    &json!({"data": {"key": "b"}, "message": "Copied"}),
                ))
            });

        let env = executor(transport)
            .execute(
                HttpMethod::Post,
                "/s3/copy",
                params(json!({"source_key": "a", "destination_key": "b"})),
            )
            .await;

        assert_eq!(
            env,
            Envelope::Success {
                data: Some(json!({"key": "b"})),
                message: Some("Copied".to_string()),
                status_code: 200,
                raw_response: Some(json!({"data": {"key": "b"}, "message": "Copied"})),
            }
        );
    }

    #[tokio::test]
    async fn test_get_sends_params_as_query() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.body == RequestBody::Empty
                    && req.query == vec![("prefix".to_string(), "docs/".to_string())]
            })
            .returning(|_| Ok(TransportResponse::json_body(200, &json!({"data": []}))));

        let env = executor(transport)
            .execute(HttpMethod::Get, "s3/list", params(json!({"prefix": "docs/"})))
            .await;
        assert!(env.is_success());
    }

    #[tokio::test]
    async fn test_caller_headers_override_defaults() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.header("accept") == Some("text/plain")
                    && req.header("x-request-id") == Some("42")
                    && req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("accept")).count() == 1
            })
            .returning(|_| Ok(TransportResponse::new(204, "")));

        let env = executor(transport)
            .execute_with_headers(
                HttpMethod::Get,
                "s3/health",
                Map::new(),
                &[
                    ("accept".to_string(), "text/plain".to_string()),
                    ("X-Request-Id".to_string(), "42".to_string()),
                ],
            )
            .await;
        assert!(env.is_success());
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(TransportResponse::json_body(404, &json!({"message": "not found"}))));

        let env = executor(transport)
            .execute(HttpMethod::Get, "s3/metadata", params(json!({"key": "x"})))
            .await;
        assert_eq!(
            env,
            Envelope::Failure {
                error: "not found".to_string(),
                status_code: 404,
                raw_response: Some(json!({"message": "not found"})),
            }
        );
    }

    #[tokio::test]
    async fn test_transport_error_becomes_zero_status() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(TransportError::Connect("connection refused".to_string())));

        let env = executor(transport)
            .execute(HttpMethod::Delete, "s3/delete", params(json!({"key": "x"})))
            .await;
        assert_eq!(env, Envelope::transport_failure("connection refused"));
    }

    struct SlowTransport;

    #[async_trait::async_trait]
    impl Transport for SlowTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(TransportResponse::new(200, ""))
        }
    }

    #[tokio::test]
    async fn test_executor_enforces_timeout() {
        let config = config().with_timeout_secs(1).unwrap();
        let executor = RequestExecutor::new(config, Arc::new(SlowTransport));

        let started = std::time::Instant::now();
        let env = executor.execute(HttpMethod::Get, "s3/health", Map::new()).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(env.is_transport_failure());
        assert!(env.error().unwrap().contains("timed out"));
        assert!(env.raw_response().is_none());
    }

    #[tokio::test]
    async fn test_empty_endpoint_never_reaches_transport() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let exec = executor(transport);
        assert!(exec.execute(HttpMethod::Get, "", Map::new()).await.is_transport_failure());
        assert!(
            exec.execute_with_files(HttpMethod::Post, "/", Map::new(), vec![])
                .await
                .is_transport_failure()
        );
    }

    #[tokio::test]
    async fn test_multipart_omits_content_type() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let RequestBody::Multipart { fields, files } = &req.body else {
                    return false;
                };
                req.header("content-type").is_none()
                    && req.header("x-api-key") == Some(KEY)
                    && req.header("accept") == Some("application/json")
                    && fields.contains(&("path".to_string(), "docs/".to_string()))
                    && fields.contains(&("metadata[owner]".to_string(), "ops".to_string()))
                    && files == &vec![FilePart::new("file", "a.txt", "hello")]
            })
            .returning(|_| {
                Ok(TransportResponse::json_body(
                    201,
                    &json!({"data": {"key": "docs/a.txt"}, "message": "File uploaded"}),
                ))
            });

        let env = executor(transport)
            .execute_with_files(
                HttpMethod::Post,
                "s3/upload",
                params(json!({"path": "docs/", "metadata": {"owner": "ops"}})),
                vec![FilePart::new("file", "a.txt", "hello")],
            )
            .await;
        assert_eq!(env.status_code(), 201);
        assert_eq!(env.message(), Some("File uploaded"));
    }

    #[tokio::test]
    async fn test_fetch_raw_content_accepts_anything() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url == "http://localhost:8000/api/s3/download"
                    && req.header("accept") == Some("*/*")
                    && req.body == RequestBody::Json(json!({"key": "img.png"}))
            })
            .returning(|_| {
                Ok(TransportResponse::new(200, "PNGDATA")
                    .with_header("Content-Type", "image/png")
                    .with_header("Content-Length", "7"))
            });

        let raw = executor(transport).fetch_raw_content("img.png").await;
        assert_eq!(
            raw,
            RawContent::Fetched {
                bytes: bytes::Bytes::from_static(b"PNGDATA"),
                content_type: Some("image/png".to_string()),
                content_length: Some(7),
            }
        );
    }

    #[tokio::test]
    async fn test_observer_sees_one_event_per_call() {
        let events: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = events.clone();

        let mut transport = MockTransport::new();
        let mut calls = 0;
        transport.expect_send().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(TransportResponse::new(500, ""))
            } else {
                Err(TransportError::Connect("dns failure".to_string()))
            }
        });

        let exec = executor(transport).with_observer(Arc::new(move |event: &RequestEvent<'_>| {
            let outcome = match event.outcome {
                RequestOutcome::Status(s) => s.to_string(),
                RequestOutcome::Error(e) => e.to_string(),
            };
            sink.lock()
                .unwrap()
                .push(format!("{} {} {}", event.method, event.url, outcome));
        }));

        let first = exec.execute(HttpMethod::Get, "s3/health", Map::new()).await;
        let second = exec.execute(HttpMethod::Get, "s3/health", Map::new()).await;

        assert_eq!(first.error(), Some("Request failed"));
        assert_eq!(second.error(), Some("dns failure"));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "GET http://localhost:8000/api/s3/health 500".to_string(),
                "GET http://localhost:8000/api/s3/health dns failure".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_logging_disabled_skips_observer() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(TransportResponse::new(200, "")));

        let mut exec = executor(transport).with_observer(Arc::new(|_: &RequestEvent<'_>| {
            panic!("observer must not run when logging is disabled")
        }));
        exec.config_mut().set_logging(false);

        assert!(exec.execute(HttpMethod::Get, "s3/health", Map::new()).await.is_success());
    }
}
