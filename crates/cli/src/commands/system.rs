//! System commands - health, config-check, bucket-info, cleanup-temp
//!
//! Each maps onto one service endpoint and prints the returned data as
//! properties.

use s3c_core::{Envelope, S3Connector};
use serde_json::Value;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

pub async fn health(global: &GlobalArgs) -> ExitCode {
    run(global, |connector| async move { connector.health().await }).await
}

pub async fn config_check(global: &GlobalArgs) -> ExitCode {
    run(global, |connector| async move { connector.config_check().await }).await
}

pub async fn bucket_info(global: &GlobalArgs) -> ExitCode {
    run(global, |connector| async move { connector.bucket_info().await }).await
}

pub async fn cleanup_temp(global: &GlobalArgs) -> ExitCode {
    run(global, |connector| async move { connector.cleanup_temp().await }).await
}

async fn run<F, Fut>(global: &GlobalArgs, call: F) -> ExitCode
where
    F: FnOnce(S3Connector) -> Fut,
    Fut: Future<Output = Envelope>,
{
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let envelope = call(connector).await;
    report(&formatter, &envelope, |formatter, data| {
        if let Some(message) = envelope.message() {
            formatter.success(message);
        }
        if !matches!(data, Value::Null) {
            formatter.properties(data);
        }
    })
}
