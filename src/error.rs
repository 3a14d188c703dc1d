/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (500 / "500: <cause>" の plaintext body)
 * - QueryError / serde_json::Error / その他の失敗を統一的に変換
 * - error は必ず tracing で error レベルに残す (握りつぶさない)
 */
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repos::error::QueryError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid response header: {0}")]
    InvalidHeader(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn cause(&self) -> String {
        match self {
            // anyhow keeps the context chain; show all of it.
            AppError::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "server error");
        server_error(self.cause())
    }
}

/// The single shape every unhandled failure is rendered in.
pub fn server_error(cause: impl fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{}: {cause}", StatusCode::INTERNAL_SERVER_ERROR.as_u16()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn internal_error_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("writing report");
        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "500: writing report: disk full");
    }

    #[tokio::test]
    async fn query_error_is_rendered_with_its_cause() {
        let response = AppError::from(QueryError::Db(sqlx::Error::PoolClosed)).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(body.starts_with("500: database error: "), "{body}");
    }
}
