pub mod datasource;
pub mod error;
pub mod query;
pub mod row;

#[cfg(test)]
pub mod testing;

pub use datasource::{Datasource, PgDatasource};
pub use error::QueryError;
