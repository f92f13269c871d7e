//! reqwest transport
//!
//! Implements the [`Transport`] trait from s3c-core on top of `reqwest`.
//! Non-2xx responses are returned as data; only failures to obtain a
//! response become [`TransportError`]s.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use s3c_core::{
    FilePart, HttpMethod, RequestBody, Transport, TransportError, TransportRequest,
    TransportResponse,
};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("s3c/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, sharing its pool and TLS settings
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: TransportRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let method = match request.method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Delete => http::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let body = serde_json::to_vec(&value).map_err(|e| {
                    TransportError::Request(format!("Failed to encode JSON body: {e}"))
                })?;
                builder.body(body)
            }
            RequestBody::Multipart { fields, files } => builder.multipart(build_form(fields, files)?),
        };

        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let builder = self.build(request)?;

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(status, bytes = body.len(), "Received response");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn build_form(
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for file in files {
        let mime = mime_guess::from_path(&file.file_name).first_or_octet_stream();
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| TransportError::Request(format!("Invalid file part: {e}")))?;
        form = form.part(file.field_name, part);
    }
    Ok(form)
}

/// Classify a reqwest error, keeping the full cause chain as the description
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    let description = describe(&error);
    if error.is_timeout() {
        TransportError::Timeout(description)
    } else if error.is_connect() {
        TransportError::Connect(description)
    } else {
        TransportError::Request(description)
    }
}

fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
