//! Content negotiation tests.
//!
//! - JSON and YAML request and response bodies
//! - `Content-Type` takes precedence over `Accept`
//! - unsupported media types answer 400 in plain text
//! - error bodies use the negotiated encoding

mod common;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{Value, json};

use common::assertions::{assert_content_type, assert_envelope, assert_error_body};
use common::fixtures::five_widgets;
use common::harness::WidgetHarness;

const CONTENT_TYPE: HeaderName = HeaderName::from_static("content-type");
const ACCEPT: HeaderName = HeaderName::from_static("accept");

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).expect("valid yaml")
}

mod yaml_bodies {
    use super::*;

    #[tokio::test]
    async fn test_create_with_yaml_body() {
        let harness = WidgetHarness::new();

        let response = harness
            .server
            .post("/widgets")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("text/yaml"))
            .bytes(Bytes::from_static(b"type: widget\nspec:\n  name: yam\n  size: 4\n"))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_content_type(&response, "text/yaml");

        let body = yaml(&response.text());
        let spec = assert_envelope(&body, "widget");
        assert_eq!(spec["name"], "yam");
        assert_eq!(spec["size"], 4);
        assert!(spec["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn test_get_with_yaml_accept() {
        let harness = WidgetHarness::new();
        harness.store.seed(five_widgets());

        let response = harness
            .server
            .get("/widgets/w-4")
            .add_header(ACCEPT, HeaderValue::from_static("application/x-yaml"))
            .await;

        response.assert_status_ok();
        assert_content_type(&response, "text/yaml");
        let body = yaml(&response.text());
        assert_eq!(
            body,
            json!({"type": "widget", "spec": {"id": "w-4", "name": "delta", "size": 40}})
        );
    }

    #[tokio::test]
    async fn test_list_in_yaml() {
        let harness = WidgetHarness::new();
        harness.store.seed(five_widgets());

        let response = harness
            .server
            .get("/widgets")
            .add_query_param("take", 1)
            .add_header(ACCEPT, HeaderValue::from_static("application/yaml"))
            .await;

        response.assert_status_ok();
        let body = yaml(&response.text());
        assert_eq!(body["count"], 5);
        assert_eq!(body["items"][0]["spec"]["name"], "alpha");
    }

    #[tokio::test]
    async fn test_yaml_error_body() {
        let harness = WidgetHarness::new();

        let response = harness
            .server
            .post("/widgets")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("text/yaml"))
            .bytes(Bytes::from_static(b"- not\n- a\n- mapping\n"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_content_type(&response, "text/yaml");
        let body = yaml(&response.text());
        assert_eq!(body["code"], 400);
        assert!(body["error"].as_str().unwrap().starts_with("cannot parse body"));
    }
}

mod precedence {
    use super::*;

    #[tokio::test]
    async fn test_no_headers_default_to_json() {
        let harness = WidgetHarness::new();
        harness.store.seed(five_widgets());

        let response = harness.server.get("/widgets/w-1").await;

        response.assert_status_ok();
        assert_content_type(&response, "application/json");
    }

    #[tokio::test]
    async fn test_content_type_wins_over_accept() {
        let harness = WidgetHarness::new();

        let response = harness
            .server
            .post("/widgets")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .add_header(ACCEPT, HeaderValue::from_static("text/yaml"))
            .bytes(Bytes::from_static(br#"{"type":"widget","spec":{"name":"j"}}"#))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_content_type(&response, "application/json");
    }

    #[tokio::test]
    async fn test_accept_wildcard_gets_json() {
        let harness = WidgetHarness::new();
        harness.store.seed(five_widgets());

        let response = harness
            .server
            .get("/widgets/w-1")
            .add_header(ACCEPT, HeaderValue::from_static("*/*"))
            .await;

        response.assert_status_ok();
        assert_content_type(&response, "application/json");
    }

    #[tokio::test]
    async fn test_content_type_parameters_are_ignored() {
        let harness = WidgetHarness::new();

        let response = harness
            .server
            .post("/widgets")
            .add_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            )
            .bytes(Bytes::from_static(br#"{"spec":{"name":"charset"}}"#))
            .await;

        response.assert_status(StatusCode::CREATED);
    }
}

mod unsupported {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_content_type_is_plain_text_400() {
        let harness = WidgetHarness::new();

        let response = harness
            .server
            .post("/widgets")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .bytes(Bytes::from_static(b"<widget/>"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let text = response.text();
        assert!(text.starts_with("cannot process request:"), "got {}", text);
        assert!(text.contains("application/xml"));
        assert!(serde_json::from_str::<Value>(&text).is_err());
        assert!(!harness.store.called(resource_manager::Operation::Create));
    }

    #[tokio::test]
    async fn test_unsupported_accept_is_400() {
        let harness = WidgetHarness::new();
        harness.store.seed(five_widgets());

        let response = harness
            .server
            .get("/widgets/w-1")
            .add_header(ACCEPT, HeaderValue::from_static("image/png"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().starts_with("cannot process request:"));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_encoded_400() {
        let harness = WidgetHarness::new();

        let response = harness
            .server
            .post("/widgets")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .bytes(Bytes::from_static(b"{not json"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_content_type(&response, "application/json");
        let message = assert_error_body(&response, 400);
        assert!(message.starts_with("cannot parse body"), "got {}", message);
    }
}
