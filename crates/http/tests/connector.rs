//! End-to-end tests against the in-memory mock server.
//!
//! Starts the mock server on a random port and drives every connector
//! operation over real HTTP through `ReqwestTransport`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use s3c_core::{
    ClientConfig, DownloadOutcome, Envelope, ListOptions, LocalFileStore, PresignOperation,
    PresignOptions, RawContent, RequestEvent, RequestOutcome, S3Connector, UploadOptions,
    UploadSource, Visibility,
};
use serde_json::json;
use tempfile::TempDir;

const API_KEY: &str = "sk_test_1234567890";

fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}/api/")
}

fn connector(addr: SocketAddr, api_key: &str) -> S3Connector {
    let config = ClientConfig::new(base_url(addr), api_key)
        .unwrap()
        .with_timeout_secs(5)
        .unwrap();
    s3c_http::connect(config).unwrap()
}

#[tokio::test]
async fn storage_lifecycle() {
    let addr = s3c_mock_server::spawn(API_KEY).await;
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("invoice.txt"), b"invoice body").unwrap();

    let client = connector(addr, API_KEY)
        .with_file_store(Arc::new(LocalFileStore::new(temp_dir.path())));

    // Step 1: upload a local file with metadata.
    let env = client
        .upload(
            UploadSource::local("invoice.txt"),
            "documents/invoices/",
            UploadOptions::new()
                .visibility(Visibility::PublicRead)
                .metadata("invoice_number", "INV-001"),
        )
        .await;
    assert_eq!(env.status_code(), 201, "{env:?}");
    let data = env.data().unwrap();
    assert_eq!(data["key"], "documents/invoices/invoice.txt");
    assert_eq!(data["visibility"], "public-read");
    assert_eq!(data["metadata"]["invoice_number"], "INV-001");
    assert_eq!(data["content_type"], "text/plain");

    // Step 2: upload an in-memory buffer.
    let env = client
        .upload(
            UploadSource::bytes("logo.png", vec![0x89, b'P', b'N', b'G']),
            "images/",
            UploadOptions::new(),
        )
        .await;
    assert!(env.is_success(), "{env:?}");
    assert_eq!(env.data().unwrap()["visibility"], "private");

    // Step 3: existence and metadata.
    let env = client.exists("images/logo.png").await;
    assert_eq!(env.data().unwrap()["exists"], true);
    let env = client.exists("images/missing.png").await;
    assert_eq!(env.data().unwrap()["exists"], false);

    let env = client.metadata("images/logo.png").await;
    assert_eq!(env.data().unwrap()["size"], 4);

    // Step 4: list with and without a prefix.
    let env = client.list(ListOptions::default()).await;
    assert_eq!(env.data().unwrap()["count"], 2);
    let env = client
        .list(ListOptions::default().prefix("documents/").max_keys(10))
        .await;
    assert_eq!(
        env.data().unwrap()["files"],
        json!([{"key": "documents/invoices/invoice.txt", "size": 12}])
    );

    // Step 5: copy with extra metadata.
    let metadata = BTreeMap::from([("copied".to_string(), "true".to_string())]);
    let env = client
        .copy("images/logo.png", "archive/logo.png", &metadata)
        .await;
    assert!(env.is_success(), "{env:?}");
    assert_eq!(env.data().unwrap()["metadata"]["copied"], "true");

    // Step 6: download to a local file.
    let outcome = client
        .download("documents/invoices/invoice.txt", Some("downloads/invoice.txt"))
        .await;
    assert!(matches!(outcome, DownloadOutcome::Saved { bytes_written: 12, .. }), "{outcome:?}");
    assert_eq!(
        std::fs::read(temp_dir.path().join("downloads/invoice.txt")).unwrap(),
        b"invoice body"
    );

    // Step 7: raw content keeps headers and bytes.
    match client.download_content("images/logo.png").await {
        RawContent::Fetched {
            bytes,
            content_type,
            content_length,
        } => {
            assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);
            assert_eq!(content_type.as_deref(), Some("image/png"));
            assert_eq!(content_length, Some(4));
        }
        other => panic!("unexpected {other:?}"),
    }

    // Step 8: presigned URL.
    let env = client
        .presigned_url(
            "images/logo.png",
            PresignOptions {
                expires_in: Some(600),
                operation: PresignOperation::PutObject,
            },
        )
        .await;
    let data = env.data().unwrap();
    assert_eq!(data["expires_in"], 600);
    assert_eq!(data["operation"], "putObject");

    // Step 9: delete, then delete again.
    assert!(client.delete("images/logo.png").await.is_success());
    let env = client.delete("images/logo.png").await;
    assert_eq!(
        env,
        Envelope::Failure {
            error: "File not found".to_string(),
            status_code: 404,
            raw_response: Some(json!({"success": false, "message": "File not found"})),
        }
    );

    // Step 10: download of a missing key never writes.
    let outcome = client.download("images/logo.png", Some("gone.png")).await;
    assert!(matches!(outcome, DownloadOutcome::Metadata(ref env) if env.status_code() == 404));
    assert!(!temp_dir.path().join("gone.png").exists());
}

#[tokio::test]
async fn system_operations() {
    let addr = s3c_mock_server::spawn(API_KEY).await;
    let client = connector(addr, API_KEY);

    let env = client.health().await;
    assert_eq!(env.message(), Some("Service is healthy"));
    assert!(client.config_check().await.is_success());
    assert_eq!(client.bucket_info().await.data().unwrap()["object_count"], 0);

    client
        .upload(UploadSource::bytes("a.txt", "a"), "", UploadOptions::new())
        .await;
    let env = client.cleanup_temp().await;
    assert_eq!(env.data().unwrap()["cleaned"], 1);

    let report = client.test_connection().await;
    assert!(report.success);
    assert_eq!(report.health_status.as_deref(), Some("accessible"));
    assert_eq!(report.api_key_preview, "sk_test_12...");
}

#[tokio::test]
async fn wrong_api_key_is_a_remote_rejection() {
    let addr = s3c_mock_server::spawn(API_KEY).await;
    let client = connector(addr, "sk_wrong_key_000");

    let env = client.health().await;
    assert_eq!(env.status_code(), 401);
    assert_eq!(env.error(), Some("Invalid API key"));

    let report = client.test_connection().await;
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("Invalid API key"));
    assert!(!serde_json::to_string(&report).unwrap().contains("sk_wrong_key_000"));
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() {
    // Reserve a port, then close it so nothing is listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let events: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = events.clone();
    let client = connector(addr, API_KEY).with_observer(Arc::new(move |event: &RequestEvent<'_>| {
        if let RequestOutcome::Error(error) = event.outcome {
            sink.lock().unwrap().push(error.to_string());
        }
    }));

    let env = client.metadata("a.txt").await;
    assert!(env.is_transport_failure(), "{env:?}");
    assert!(env.raw_response().is_none());
    assert!(!env.error().unwrap().is_empty());
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unresponsive_server_times_out() {
    // Accepts connections (kernel backlog) but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ClientConfig::new(base_url(addr), API_KEY)
        .unwrap()
        .with_timeout_secs(1)
        .unwrap();
    let client = s3c_http::connect(config).unwrap();

    let started = Instant::now();
    let env = client.health().await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(env.is_transport_failure(), "{env:?}");

    drop(listener);
}
