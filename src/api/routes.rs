/*
 * Responsibility
 * - URL 構造を定義 (/, /json, /health)
 * - datasource の型は AppState<D> で受け、handler に渡す
 */
use axum::{Router, routing::get};

use crate::api::handlers::{
    health::health,
    hello::{hello, hello_json},
};
use crate::repos::Datasource;
use crate::state::AppState;

pub fn routes<D: Datasource>() -> Router<AppState<D>> {
    Router::new()
        .route("/", get(hello))
        .route("/json", get(hello_json))
        .route("/health", get(health::<D>))
}
