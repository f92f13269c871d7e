//! exists command - Check whether an object exists
//!
//! Exits with the not-found code when the object is missing, so the command
//! can be used directly in shell conditionals.

use clap::Args;
use s3c_core::Envelope;
use serde_json::Value;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Check whether an object exists
#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Object key
    pub key: String,
}

/// Execute the exists command
pub async fn execute(args: ExistsArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let envelope = connector.exists(&args.key).await;
    let found = object_exists(&envelope);

    let code = report(&formatter, &envelope, |formatter, _| {
        let key = formatter.style_name(&args.key);
        if found {
            formatter.println(&format!("'{key}' exists"));
        } else {
            formatter.println(&format!("'{key}' does not exist"));
        }
    });

    match code {
        ExitCode::Success if !found => ExitCode::NotFound,
        other => other,
    }
}

fn object_exists(envelope: &Envelope) -> bool {
    envelope
        .data()
        .and_then(|d| d.get("exists"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn success(data: Value) -> Envelope {
        Envelope::Success {
            data: Some(data),
            message: None,
            status_code: 200,
            raw_response: None,
        }
    }

    #[test]
    fn test_object_exists() {
        assert!(object_exists(&success(json!({"key": "a.txt", "exists": true}))));
        assert!(!object_exists(&success(json!({"key": "a.txt", "exists": false}))));
        assert!(!object_exists(&success(json!({"key": "a.txt"}))));
        assert!(!object_exists(&Envelope::transport_failure("refused")));
    }
}
