//! Common types shared across the anyfetch crates.
//!
//! This crate defines the error taxonomy, configuration types and loader,
//! and observability helpers used by the fetch core. It is intentionally
//! lightweight so every crate can depend on it without pulling in any
//! delegate client.
//!
//! # Overview
//!
//! - [`FetchError`] and [`Result`]: shared error handling
//! - [`config`]: [`FetchConfig`](config::FetchConfig) and its loader
//! - [`observability`]: centralised tracing/logging initialisation

use anyfetch_store::StoreError;

pub mod config;
pub mod observability;

/// Errors surfaced by the fetch facade and everything below it.
///
/// Nothing here is retried or reinterpreted: delegate failures pass
/// through untranslated, and shape problems are integration defects in
/// a binding rather than network conditions.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// No recognized, linked delegate crate could be instantiated.
    /// Fatal to the calling operation; the remedy is compiling in a
    /// supported client and retrying explicitly.
    #[error("no usable HTTP client crate is linked into this process")]
    NoClientAvailable,

    /// The chosen delegate raised while executing the request. Carries
    /// whatever the delegate reported, untranslated.
    #[error("delegate {delegate} failed: {source}")]
    Delegate {
        delegate: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A native result could not be coerced to text. This is a defect
    /// in the adapter binding (or invalid UTF-8 from the origin), not a
    /// runtime network condition.
    #[error("cannot coerce {delegate} result to text: {detail}")]
    UnsupportedResultShape { delegate: String, detail: String },

    /// The caller asked for a request kind other than text or binary.
    /// Rejected before any other state is touched.
    #[error("request kind must be \"text\" or \"binary\", got {0:?}")]
    UnknownRequestKind(String),

    /// The cache store collaborator failed; its I/O errors propagate
    /// untranslated.
    #[error("cache store: {0}")]
    Cache(#[from] StoreError),
}

/// Convenient alias for results that use [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;
