use axum::{body::Body, response::Response};
use serde::de::DeserializeOwned;

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not the expected JSON")
}
