//! Fluent SELECT construction and schema reflection for SQLite.
//!
//! A [`SelectQuery`] accumulates clause fragments (columns, joins,
//! where-predicates, grouping, ordering, pagination) in call order and
//! materializes them into one deterministic statement executed against a
//! [`Session`]. Rows come back as textual maps keyed by column name; when
//! the caller selected no columns, the names are reflected from the table
//! schema.
//!
//! ```
//! use tablescan::{Order, SelectQuery};
//!
//! # fn main() -> tablescan::Result<()> {
//! let mut query = SelectQuery::factory("users", ":memory:")?;
//! query
//!     .session()
//!     .execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//! query
//!     .session()
//!     .execute("INSERT INTO users (name) VALUES ('ada'), ('grace')")?;
//!
//! let rows = query.order_by("name", Order::Asc).get(None)?;
//! assert_eq!(rows[0]["name"], "ada");
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod query;

pub use connection::{query_count, shutdown, Session};
pub use error::{Error, Result};
pub use query::{ColsInfo, Conjunction, Join, JoinKind, Order, Row, Rows, SelectQuery};
