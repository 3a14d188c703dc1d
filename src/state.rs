/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - datasource は起動時に一度だけ作り、ここから handler に渡す (singleton にしない)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::time::Duration;

use crate::repos::Datasource;

#[derive(Clone, Debug)]
pub struct AppState<D> {
    pub datasource: D,
    pub health_check_timeout: Duration,
}

impl<D: Datasource> AppState<D> {
    pub fn new(datasource: D, health_check_timeout: Duration) -> Self {
        Self {
            datasource,
            health_check_timeout,
        }
    }
}
