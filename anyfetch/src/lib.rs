//! Fetch a URL as text or bytes through whichever HTTP client crate the
//! host program already links.
//!
//! This crate implements no networking of its own. Each supported client
//! crate is wrapped by an [`Adapter`] exposing one normalized capability
//! (`fetch_raw`), a static [`Registry`] maps delegate identifiers to
//! their adapters, discovery intersects the registry with the bindings
//! compiled into the build, and a selector memoizes one adapter for the
//! life of the context. Redirects, TLS, pooling and every other HTTP
//! semantic are whatever the chosen delegate does.
//!
//! # Overview
//!
//! - [`get_text`] / [`get_binary`]: the two public fetch operations,
//!   over a process-wide default [`Context`]
//! - [`Context`]: explicit, injectable selection state for embedders
//!   and tests
//! - [`Registry`] + [`Descriptor`]: the per-delegate adapter table
//! - [`ModuleTable`]: injectable view of which delegate crates are
//!   linked
//! - `anyfetch_store::ContentStore`: optional cache collaborator keyed
//!   by `(dir, kind, url)`
//!
//! # Examples
//!
//! ```no_run
//! // Uses whichever delegate binding is compiled in.
//! let body = anyfetch::get_text("http://example.tld/", None)?;
//! assert!(!body.is_empty());
//! # Ok::<(), anyfetch::FetchError>(())
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

mod adapter;
pub mod bindings;
mod context;
mod discovery;
mod registry;
mod select;

pub use adapter::{delegate_err, Adapter, RawBody, Target};
pub use anyfetch_common::{config::FetchConfig, FetchError, Result};
pub use anyfetch_store::ContentStore;
pub use context::{coerce_binary, coerce_text, Context, RequestKind};
pub use discovery::{discover, FixedTable, LinkedCrates, ModuleTable};
pub use registry::{builtin, AdapterFactory, Descriptor, Registry, Variant};

static DEFAULT_CONTEXT: OnceLock<Mutex<Context>> = OnceLock::new();

fn default_context() -> MutexGuard<'static, Context> {
    let lock = DEFAULT_CONTEXT.get_or_init(|| Mutex::new(Context::new()));
    match lock.lock() {
        Ok(guard) => guard,
        // A panicked fetch leaves the context usable; selection state is
        // plain data.
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Fetch `url` as text using the process default context.
///
/// With `cache` set, the content store rooted there is consulted first
/// and fetched bodies are written through.
pub fn get_text(url: &str, cache: Option<&Path>) -> Result<String> {
    default_context().get_text(url, cache)
}

/// Fetch `url` as bytes using the process default context. No UTF-8
/// decoding is ever applied to the payload.
pub fn get_binary(url: &str, cache: Option<&Path>) -> Result<Vec<u8>> {
    default_context().get_binary(url, cache)
}

/// Alias for [`get_binary`].
pub fn get_bin(url: &str, cache: Option<&Path>) -> Result<Vec<u8>> {
    get_binary(url, cache)
}

/// String-keyed dispatch over the two fetch operations; a kind other
/// than `"text"` or `"binary"` fails with
/// [`FetchError::UnknownRequestKind`] before any state is touched.
pub fn fetch_kind(kind: &str, url: &str, cache: Option<&Path>) -> Result<RawBody> {
    default_context().fetch_kind(kind, url, cache)
}

/// Toggle payload-introspection tracing on the default context.
pub fn set_verbose(verbose: bool) {
    default_context().set_verbose(verbose);
}

/// Clear the default context's selection state (loaded set and active
/// adapter), forcing a fresh discovery/selection on the next fetch.
pub fn reset() {
    default_context().reset();
}
