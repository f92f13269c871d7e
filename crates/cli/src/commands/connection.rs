//! test and info commands - Connectivity check and client description

use serde::Serialize;

use super::{GlobalArgs, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Execute the test command
pub async fn test(global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let report = connector.test_connection().await;

    if formatter.is_json() {
        formatter.json(&report);
    } else if report.success {
        formatter.success(&report.message);
        formatter.property("base_url", &formatter.style_url(&report.base_url));
        formatter.property("api_key", &report.api_key_preview);
        if let Some(status) = &report.health_status {
            formatter.property("bucket_status", status);
        }
    } else {
        let reason = report.error.as_deref().unwrap_or("unknown error");
        formatter.error(&format!("{}: {reason}", report.message));
    }

    if report.success {
        ExitCode::Success
    } else {
        ExitCode::NetworkError
    }
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    #[serde(flatten)]
    service: s3c_core::ServiceInfo,
    api_key_valid: bool,
}

/// Execute the info command
///
/// Describes the resolved configuration without contacting the service.
pub fn info(global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let output = InfoOutput {
        service: connector.service_info(),
        api_key_valid: connector.validate_api_key(),
    };

    if formatter.is_json() {
        formatter.json(&output);
        return ExitCode::Success;
    }

    let service = &output.service;
    formatter.println(&format!("{} v{}", service.service_name, service.version));
    formatter.property("base_url", &formatter.style_url(&service.base_url));
    formatter.property("api_key", &service.api_key_prefix);
    formatter.property("timeout", &format!("{}s", service.timeout));
    formatter.property("logging", &service.logging_enabled.to_string());
    formatter.property("operations", &service.supported_operations.join(", "));
    ExitCode::Success
}
