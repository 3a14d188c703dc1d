/*
 * Responsibility
 * - GET /     (plaintext)
 * - GET /json (JSON)
 */
use serde_json::json;

use crate::api::handlers::{TEST_HEADER_NAME, TEST_HEADER_VALUE};
use crate::http::WebResponse;

pub async fn hello() -> WebResponse {
    WebResponse::text("Hello World!").header(TEST_HEADER_NAME, TEST_HEADER_VALUE)
}

pub async fn hello_json() -> WebResponse {
    WebResponse::json(json!({"foo": "bar"})).header(TEST_HEADER_NAME, TEST_HEADER_VALUE)
}
