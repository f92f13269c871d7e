use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let api_key =
        std::env::var("S3_CONNECTOR_API_KEY").unwrap_or_else(|_| "sk_test_1234567890".to_string());
    let addr = std::env::var("MOCK_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    println!("mock S3 Connector API listening on http://{addr}/api");
    s3c_mock_server::run(listener, &api_key).await
}
