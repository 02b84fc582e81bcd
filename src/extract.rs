//! Request extractors that reject malformed input with the crate's JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body.
///
/// Behaves like [axum::Json] but a body that is not valid JSON, or that does not match `T`,
/// is rejected with [Error::InvalidRequest].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// A path parameter.
///
/// Behaves like [axum::extract::Path] but a segment that does not parse as `T` is rejected with
/// [Error::InvalidRequest].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

#[cfg(test)]
mod extract_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::{JsonBody, PathParam};

    #[derive(Deserialize)]
    struct Form {
        value: i64,
    }

    async fn handler(PathParam(id): PathParam<i64>, JsonBody(form): JsonBody<Form>) -> String {
        format!("{id}:{}", form.value)
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/things/{id}", post(handler)))
    }

    #[tokio::test]
    async fn well_formed_request_is_extracted() {
        let response = server()
            .post("/things/3")
            .json(&json!({ "value": 7 }))
            .await;

        response.assert_status_ok();
        response.assert_text("3:7");
    }

    #[tokio::test]
    async fn malformed_json_is_a_json_bad_request() {
        let response = server()
            .post("/things/3")
            .text("{\"value\": ")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn mismatched_json_is_a_json_bad_request() {
        let response = server()
            .post("/things/3")
            .json(&json!({ "value": "lots" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn unparsable_path_is_a_json_bad_request() {
        let response = server()
            .post("/things/abc")
            .json(&json!({ "value": 7 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }
}
