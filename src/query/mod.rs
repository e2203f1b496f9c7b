//! The query builder.
//!
//! Start with [`SelectQuery::factory`] and chain methods to construct one
//! SELECT statement; [`SelectQuery::get`] renders and executes it.
//!
//! - [`clause`] — conjunction/order tags and predicate assembly.
//! - [`join`] — the [`Join`] clause fragment.
//! - [`select`] — the [`SelectQuery`] builder itself.

pub mod clause;
pub mod join;
pub mod select;

pub use clause::{Conjunction, Order};
pub use join::{Join, JoinKind};
pub use select::{ColsInfo, Row, Rows, SelectQuery};
