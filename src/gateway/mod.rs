pub mod catalog;
pub mod error;
pub mod models;
pub mod pool;
pub mod query;

pub use catalog::{PgCatalog, PgClickSink};
pub use error::GatewayError;
pub use pool::connect_pool;
pub use query::QueryBuilder;
