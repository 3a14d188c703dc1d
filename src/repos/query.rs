/*
 * Responsibility
 * - 任意の SQL を実行し、結果行を ProjectedRow として返す
 * - session の取得/返却はこの関数の中で完結させる (どの経路でも drop で返却)
 * - timeout で取得 + 実行をまとめて打ち切る
 * - パラメータ binding はしない (固定の health check 用途)
 */
use std::time::Duration;

use crate::repos::datasource::{Datasource, Session};
use crate::repos::error::{QueryError, QueryResult};
use crate::repos::row::{ProjectedRow, project};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(500);

/// Run `sql` and project the first row, or `None` when there are no rows.
pub async fn query_single<D: Datasource>(
    ds: &D,
    sql: &str,
    timeout: Duration,
) -> QueryResult<Option<ProjectedRow>> {
    bounded(timeout, async {
        let mut session = ds.acquire().await?;
        let row = session.fetch_optional(sql).await?;
        row.as_ref().map(project).transpose()
    })
    .await
}

/// Run `sql` and project every row. The whole result is materialized.
pub async fn query_all<D: Datasource>(
    ds: &D,
    sql: &str,
    timeout: Duration,
) -> QueryResult<Vec<ProjectedRow>> {
    bounded(timeout, async {
        let mut session = ds.acquire().await?;
        let rows = session.fetch_all(sql).await?;
        rows.iter().map(project).collect()
    })
    .await
}

// On expiry the inner future is dropped, which drops any open session.
async fn bounded<T, F>(timeout: Duration, fut: F) -> QueryResult<T>
where
    F: Future<Output = QueryResult<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| QueryError::Timeout(timeout))?
}
