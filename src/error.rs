//! Error taxonomy shared by the library and both drivers.
//!
//! Fatal classes (`Config`, `Parse`, and any error raised during pagination)
//! abort the run before or instead of the final report. A write failure for a
//! single product is recorded in the report and never aborts the run — that
//! classification happens at the driver's per-product boundary, not here.
//! "No plant match" is a terminal sync outcome, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is absent. Raised pre-flight, before any
    /// network call.
    #[error("missing required environment variables: {}", missing.join(", "))]
    Config { missing: Vec<String> },

    /// Non-2xx HTTP status, a GraphQL error payload, or a mutation user error
    /// from the admin API.
    #[error("admin API error: {message}")]
    Api { message: String },

    /// A bundled data asset or a report could not be parsed or serialized.
    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
