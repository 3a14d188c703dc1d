//! Database liveness check.
//!
//! A failing check is a normal result, not an error: the health route must
//! be able to answer even when the database is down.

use std::fmt;
use std::time::Duration;

use crate::repos::{Datasource, query};

const CHECK_SQL: &str = "SELECT 1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Failed,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the check query. Only the presence of a non-empty row matters.
pub async fn check<D: Datasource>(ds: &D, timeout: Duration) -> HealthStatus {
    match query::query_single(ds, CHECK_SQL, timeout).await {
        Ok(Some(row)) if !row.is_empty() => HealthStatus::Ok,
        Ok(_) => {
            tracing::warn!(backend = ds.backend_name(), "health check returned an empty result");
            HealthStatus::Failed
        }
        Err(e) => {
            tracing::warn!(backend = ds.backend_name(), error = %e, "health check failed");
            HealthStatus::Failed
        }
    }
}
