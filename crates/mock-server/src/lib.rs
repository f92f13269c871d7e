//! In-memory S3 Connector API
//!
//! Serves the `s3/*` endpoints under `/api` from a map of stored objects so
//! the client can be exercised over real HTTP in tests.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bytes::Bytes;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::RwLock};

/// An object held by the mock server
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
    pub visibility: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Default)]
struct Store {
    objects: BTreeMap<String, StoredObject>,
    temp_files: usize,
}

#[derive(Clone)]
struct AppState {
    api_key: Arc<str>,
    store: Arc<RwLock<Store>>,
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        store: Arc::default(),
    };
    let api = Router::new()
        .route("/s3/upload", post(upload))
        .route("/s3/download", post(download))
        .route("/s3/delete", delete(remove))
        .route("/s3/list", get(list))
        .route("/s3/metadata", get(metadata))
        .route("/s3/exists", get(exists))
        .route("/s3/copy", post(copy))
        .route("/s3/presigned-url", get(presigned_url))
        .route("/s3/health", get(health))
        .route("/s3/config-check", get(config_check))
        .route("/s3/bucket-info", get(bucket_info))
        .route("/s3/cleanup-temp", post(cleanup_temp))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

/// Serve on an ephemeral local port in the background, returning its address
pub async fn spawn(api_key: &str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    let app = app(api_key);
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());
    if provided != Some(&*state.api_key) {
        return failure(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    next.run(request).await
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn success(status: StatusCode, message: &str, data: Value) -> Response {
    (
        status,
        Json(json!({"success": true, "message": message, "data": data})),
    )
        .into_response()
}

fn describe(key: &str, object: &StoredObject) -> Value {
    json!({
        "key": key,
        "size": object.bytes.len(),
        "content_type": object.content_type,
        "visibility": object.visibility,
        "metadata": object.metadata,
    })
}

fn string_field(body: &Value, name: &str) -> Option<String> {
    body.get(name).and_then(Value::as_str).map(str::to_string)
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut path = String::new();
    let mut visibility = "private".to_string();
    let mut metadata = BTreeMap::new();
    let mut file: Option<(String, Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return failure(StatusCode::BAD_REQUEST, &e.to_string()),
        };
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload.bin").to_string();
            match field.bytes().await {
                Ok(bytes) => file = Some((file_name, bytes)),
                Err(e) => return failure(StatusCode::BAD_REQUEST, &e.to_string()),
            }
            continue;
        }
        let value = match field.text().await {
            Ok(value) => value,
            Err(e) => return failure(StatusCode::BAD_REQUEST, &e.to_string()),
        };
        match name.as_str() {
            "path" => path = value,
            "visibility" => visibility = value,
            other => {
                if let Some(meta_key) = other
                    .strip_prefix("metadata[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    metadata.insert(meta_key.to_string(), value);
                }
            }
        }
    }

    let Some((file_name, bytes)) = file else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "The file field is required.");
    };

    let key = if path.is_empty() || path.ends_with('/') {
        format!("{path}{file_name}")
    } else {
        path
    };
    let object = StoredObject {
        content_type: mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string(),
        bytes,
        visibility,
        metadata,
    };
    let data = describe(&key, &object);
    let mut store = state.store.write().await;
    store.objects.insert(key, object);
    store.temp_files += 1;
    success(StatusCode::CREATED, "File uploaded successfully", data)
}

async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(key) = string_field(&body, "key") else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "The key field is required.");
    };
    let store = state.store.read().await;
    let Some(object) = store.objects.get(&key) else {
        return failure(StatusCode::NOT_FOUND, "File not found");
    };

    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if wants_json {
        return success(StatusCode::OK, "File ready for download", describe(&key, object));
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, object.content_type.as_str())
        .header(header::CONTENT_LENGTH, object.bytes.len())
        .body(Body::from(object.bytes.clone()))
        .unwrap_or_else(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
}

async fn remove(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let Some(key) = string_field(&body, "key") else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "The key field is required.");
    };
    match state.store.write().await.objects.remove(&key) {
        Some(_) => success(StatusCode::OK, "File deleted successfully", json!({"key": key})),
        None => failure(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let prefix = params.get("prefix").cloned().unwrap_or_default();
    let max_keys = match params.get("max_keys").map(|v| v.parse::<usize>()) {
        None => 1000,
        Some(Ok(n)) => n,
        Some(Err(_)) => return failure(StatusCode::UNPROCESSABLE_ENTITY, "Invalid max_keys"),
    };
    let store = state.store.read().await;
    let files: Vec<Value> = store
        .objects
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .take(max_keys)
        .map(|(key, object)| json!({"key": key, "size": object.bytes.len()}))
        .collect();
    let count = files.len();
    success(
        StatusCode::OK,
        "Files listed successfully",
        json!({"files": files, "count": count, "prefix": prefix}),
    )
}

async fn metadata(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(key) = params.get("key") else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "The key field is required.");
    };
    match state.store.read().await.objects.get(key) {
        Some(object) => success(StatusCode::OK, "Metadata retrieved", describe(key, object)),
        None => failure(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn exists(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(key) = params.get("key") else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "The key field is required.");
    };
    let exists = state.store.read().await.objects.contains_key(key);
    success(
        StatusCode::OK,
        "Existence checked",
        json!({"key": key, "exists": exists}),
    )
}

async fn copy(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let (Some(source), Some(destination)) = (
        string_field(&body, "source_key"),
        string_field(&body, "destination_key"),
    ) else {
        return failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The source_key and destination_key fields are required.",
        );
    };
    let mut store = state.store.write().await;
    let Some(mut object) = store.objects.get(&source).cloned() else {
        return failure(StatusCode::NOT_FOUND, "Source file not found");
    };
    if let Some(extra) = body.get("metadata").and_then(Value::as_object) {
        for (k, v) in extra {
            if let Some(v) = v.as_str() {
                object.metadata.insert(k.clone(), v.to_string());
            }
        }
    }
    let data = describe(&destination, &object);
    store.objects.insert(destination, object);
    success(StatusCode::OK, "File copied successfully", data)
}

async fn presigned_url(Query(params): Query<HashMap<String, String>>) -> Response {
    let Some(key) = params.get("key") else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "The key field is required.");
    };
    let expires_in = params
        .get("expires_in")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(3600);
    let operation = params
        .get("operation")
        .cloned()
        .unwrap_or_else(|| "getObject".to_string());
    success(
        StatusCode::OK,
        "Presigned URL generated",
        json!({
            "url": format!("https://bucket.mock/{key}?X-Amz-Expires={expires_in}"),
            "expires_in": expires_in,
            "operation": operation,
        }),
    )
}

async fn health() -> Response {
    success(
        StatusCode::OK,
        "Service is healthy",
        json!({"status": "healthy", "bucket_status": "accessible"}),
    )
}

async fn config_check() -> Response {
    success(
        StatusCode::OK,
        "Configuration is valid",
        json!({"bucket": "mock-bucket", "region": "us-east-1", "credentials": "configured"}),
    )
}

async fn bucket_info(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    let total_size: usize = store.objects.values().map(|o| o.bytes.len()).sum();
    success(
        StatusCode::OK,
        "Bucket information retrieved",
        json!({
            "bucket": "mock-bucket",
            "object_count": store.objects.len(),
            "total_size": total_size,
        }),
    )
}

async fn cleanup_temp(State(state): State<AppState>) -> Response {
    let mut store = state.store.write().await;
    let cleaned = std::mem::take(&mut store.temp_files);
    tracing::debug!(cleaned, "Cleaned temporary files");
    success(
        StatusCode::OK,
        "Temporary files cleaned up",
        json!({"cleaned": cleaned}),
    )
}
