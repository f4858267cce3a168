use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, multipart::Form};
use serde_json::Value;

use super::LoadError;

pub(super) fn upload_csv(
    endpoint: &str,
    csv_path: &Path,
    timeout: Duration,
) -> Result<Value, LoadError> {
    let transport = |source| LoadError::Transport {
        endpoint: endpoint.to_owned(),
        source,
    };

    let form = Form::new()
        .file("file", csv_path)
        .map_err(|source| LoadError::Io {
            path: csv_path.to_path_buf(),
            source,
        })?;

    let client = Client::builder().timeout(timeout).build().map_err(transport)?;
    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .map_err(transport)?;

    let status = response.status();
    let body = response.text().map_err(transport)?;
    classify_response(status.as_u16(), &body)
}

// The service reports its own validation failures as `{"error": ...}` with
// a 200 status, so the `error` field wins over the status code.
pub(super) fn classify_response(status: u16, body: &str) -> Result<Value, LoadError> {
    let success = (200..300).contains(&status);
    let parsed = serde_json::from_str::<Value>(body);

    if !success {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| format!("Analysis failed (HTTP {status})"));
        return Err(LoadError::Service { status, message });
    }

    let value = parsed?;
    if let Some(message) = error_message(&value) {
        return Err(LoadError::Service { status, message });
    }
    Ok(value)
}

fn error_message(value: &Value) -> Option<String> {
    value.get("error").and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_in_ok_body_is_a_failure() {
        let error = classify_response(200, r#"{"error": "Invalid CSV file"}"#).unwrap_err();
        assert!(matches!(error, LoadError::Service { status: 200, ref message } if message == "Invalid CSV file"));
    }

    #[test]
    fn non_success_status_uses_error_field() {
        let error = classify_response(422, r#"{"error": "Missing required columns"}"#).unwrap_err();
        assert_eq!(error.to_string(), "Missing required columns");
    }

    #[test]
    fn non_success_without_json_has_fallback_message() {
        let error = classify_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(error.to_string(), "Analysis failed (HTTP 502)");
    }

    #[test]
    fn garbage_success_body_is_malformed() {
        let error = classify_response(200, "not json").unwrap_err();
        assert!(matches!(error, LoadError::Malformed(_)));
    }

    #[test]
    fn success_body_passes_through() {
        let value = classify_response(200, r#"{"nodes": []}"#).unwrap();
        assert!(value.get("nodes").is_some());
    }
}
