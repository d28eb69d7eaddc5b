//! HTTP response assertions.

use axum_test::TestResponse;
use serde_json::Value;

/// Asserts the `{code, error}` body of an encoded error response and returns
/// the message.
pub fn assert_error_body(response: &TestResponse, expected_code: u16) -> String {
    let body: Value = response.json();
    assert_eq!(
        body["code"], expected_code,
        "Expected error code {}, got body {}",
        expected_code, body
    );
    body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("Expected error message in {}", body))
        .to_string()
}

/// Asserts that the response has no body.
pub fn assert_empty_body(response: &TestResponse) {
    let bytes = response.as_bytes();
    assert!(bytes.is_empty(), "Expected empty body, got {:?}", bytes);
}

/// Asserts the `Content-Type` header.
pub fn assert_content_type(response: &TestResponse, expected: &str) {
    let actual = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(actual, expected, "Expected Content-Type {}, got {}", expected, actual);
}

/// Asserts a `{"type": ..., "spec": ...}` envelope and returns the spec.
pub fn assert_envelope(body: &Value, resource_type: &str) -> Value {
    assert_eq!(
        body["type"], resource_type,
        "Expected envelope of type {}, got {}",
        resource_type, body
    );
    body.get("spec")
        .cloned()
        .unwrap_or_else(|| panic!("Expected spec in {}", body))
}
