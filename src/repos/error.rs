/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - retry はしない: そのまま呼び出し元へ伝播させる
 */
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

pub type QueryResult<T> = Result<T, QueryError>;
