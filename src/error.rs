//! Error types for tablescan.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for session and query operations.
///
/// Store failures are propagated unchanged from the engine: nothing is
/// retried, wrapped further, or downgraded. Contract violations (empty
/// required names, malformed join operands, a zero limit) are panics, not
/// variants of this type.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(tablescan::connection),
        help("Check if the database file exists and is accessible")
    )]
    Connection(String),

    #[error("Database statement failed: {0}")]
    #[diagnostic(
        code(tablescan::store),
        help("Statement text is rendered as supplied; check table and column names")
    )]
    Store(#[from] rusqlite::Error),
}

/// Result type alias for tablescan operations.
pub type Result<T> = std::result::Result<T, Error>;
