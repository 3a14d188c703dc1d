//! In-memory datasource doubles for tests.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::repos::datasource::{Datasource, Session};
use crate::repos::error::{QueryError, QueryResult};
use crate::repos::row::RowHandle;

#[derive(Clone, Debug)]
pub struct FakeRow {
    columns: Vec<(String, Value)>,
    closed: bool,
}

impl FakeRow {
    pub fn new<I, K>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            closed: false,
        }
    }

    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Self::new([("id", Value::from(1))])
        }
    }
}

impl RowHandle for FakeRow {
    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn value(&self, column: &str) -> QueryResult<Value> {
        if self.closed {
            return Err(QueryError::Db(sqlx::Error::RowNotFound));
        }
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| QueryError::Db(sqlx::Error::ColumnNotFound(column.to_string())))
    }
}

/// How the fake behaves once a session is open.
#[derive(Clone, Debug)]
pub enum Behavior {
    Rows(Vec<FakeRow>),
    RejectConnections,
    FailStatement,
    HangOnAcquire,
    HangOnStatement,
}

/// Datasource double that counts acquired and released sessions.
#[derive(Clone, Debug)]
pub struct FakeDatasource {
    behavior: Behavior,
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl FakeDatasource {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            acquired: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn healthy() -> Self {
        Self::new(Behavior::Rows(vec![FakeRow::new([(
            "?column?",
            Value::from(1),
        )])]))
    }

    pub fn with_rows(rows: Vec<FakeRow>) -> Self {
        Self::new(Behavior::Rows(rows))
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub struct FakeSession {
    behavior: Behavior,
    released: Arc<AtomicUsize>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl FakeSession {
    async fn run(&self) -> QueryResult<Vec<FakeRow>> {
        match &self.behavior {
            Behavior::Rows(rows) => Ok(rows.clone()),
            Behavior::FailStatement => Err(QueryError::Db(sqlx::Error::Protocol(
                "syntax error".to_string(),
            ))),
            Behavior::HangOnStatement => std::future::pending().await,
            Behavior::RejectConnections | Behavior::HangOnAcquire => {
                unreachable!("session never handed out")
            }
        }
    }
}

#[async_trait]
impl Datasource for FakeDatasource {
    type Session = FakeSession;

    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn acquire(&self) -> QueryResult<FakeSession> {
        match self.behavior {
            Behavior::RejectConnections => return Err(QueryError::Db(sqlx::Error::PoolClosed)),
            Behavior::HangOnAcquire => std::future::pending::<()>().await,
            _ => {}
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            behavior: self.behavior.clone(),
            released: self.released.clone(),
        })
    }
}

#[async_trait]
impl Session for FakeSession {
    type Row = FakeRow;

    async fn fetch_all(&mut self, _sql: &str) -> QueryResult<Vec<FakeRow>> {
        self.run().await
    }

    async fn fetch_optional(&mut self, _sql: &str) -> QueryResult<Option<FakeRow>> {
        Ok(self.run().await?.into_iter().next())
    }
}
