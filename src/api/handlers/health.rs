/*
 * Responsibility
 * - GET /health (DB 疎通確認)
 * - DB が落ちていても 200 で返す: 状態は body の文字列で伝える
 */
use axum::extract::State;

use crate::api::handlers::{TEST_HEADER_NAME, TEST_HEADER_VALUE};
use crate::http::WebResponse;
use crate::repos::Datasource;
use crate::services::health as health_service;
use crate::state::AppState;

pub async fn health<D: Datasource>(State(state): State<AppState<D>>) -> WebResponse {
    let status = health_service::check(&state.datasource, state.health_check_timeout).await;

    WebResponse::text(format!("DATABASE STATUS: {status}"))
        .header(TEST_HEADER_NAME, TEST_HEADER_VALUE)
}
