//! The runtime context owning the process-wide selection state.
//!
//! A [`Context`] holds the three mutable slots the fetch cycle touches
//! (loaded set, active adapter, verbosity) plus the injectable pieces
//! (registry, module table, preference list, default cache directory).
//! The free functions in the crate root operate on one shared default
//! context; explicit contexts are the lock-free path and give tests
//! clean reset semantics.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyfetch_common::config::FetchConfig;
use anyfetch_common::observability::expand_home;
use anyfetch_common::{FetchError, Result};
use anyfetch_store::ContentStore;

use crate::adapter::{Adapter, RawBody};
use crate::discovery::{discover, LinkedCrates, ModuleTable};
use crate::registry::{self, Registry};
use crate::select::select;

/// What the caller wants back from a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Text,
    Binary,
}

impl RequestKind {
    /// Parse the string-keyed dispatch tag. Anything but `"text"` or
    /// `"binary"` is rejected before any other state is touched.
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "text" => Ok(Self::Text),
            "binary" => Ok(Self::Binary),
            other => Err(FetchError::UnknownRequestKind(other.to_string())),
        }
    }

    /// Tag used to address the cache store.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

/// Coerce a native result to text: text values return unchanged, byte
/// sequences decode as UTF-8, anything else is an integration defect in
/// the binding. Idempotent on text.
pub fn coerce_text(delegate: &str, raw: RawBody) -> Result<String> {
    match raw {
        RawBody::Text(s) => Ok(s),
        RawBody::Bytes(b) => String::from_utf8(b).map_err(|e| FetchError::UnsupportedResultShape {
            delegate: delegate.to_string(),
            detail: e.to_string(),
        }),
    }
}

/// Binary results pass through without any decoding; text-shaped payloads
/// become their UTF-8 bytes verbatim.
pub fn coerce_binary(raw: RawBody) -> Vec<u8> {
    match raw {
        RawBody::Text(s) => s.into_bytes(),
        RawBody::Bytes(b) => b,
    }
}

const VERBOSE_ENV: &str = "ANYFETCH_VERBOSE";

fn verbose_from_env() -> bool {
    matches!(
        std::env::var(VERBOSE_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

pub struct Context {
    registry: Arc<Registry>,
    table: Box<dyn ModuleTable + Send>,
    /// `None` means "unknown"; recomputed in full when needed.
    loaded: Option<BTreeSet<String>>,
    /// Memoized selection; never silently replaced once populated.
    active: Option<Box<dyn Adapter + Send>>,
    verbose: bool,
    prefer: Vec<String>,
    cache_dir: Option<PathBuf>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context over the built-in registry and the compiled-in module
    /// table. Verbosity defaults from `ANYFETCH_VERBOSE`.
    pub fn new() -> Self {
        Self {
            registry: registry::builtin(),
            table: Box::new(LinkedCrates),
            loaded: None,
            active: None,
            verbose: verbose_from_env(),
            prefer: Vec::new(),
            cache_dir: None,
        }
    }

    /// Apply a loaded [`FetchConfig`]: preference order, verbosity and
    /// the default cache directory (with `~` expanded). When the config
    /// leaves `cache_dir` unset, the platform cache directory from
    /// [`FetchConfig::default_cache_dir`] takes over.
    pub fn from_config(config: &FetchConfig) -> Self {
        let mut ctx = Self::new();
        ctx.prefer = config.prefer.clone();
        ctx.verbose = ctx.verbose || config.verbose;
        ctx.cache_dir = config
            .cache_dir
            .as_deref()
            .map(expand_home)
            .or_else(FetchConfig::default_cache_dir);
        ctx
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_table(mut self, table: impl ModuleTable + Send + 'static) -> Self {
        self.table = Box::new(table);
        self
    }

    pub fn with_prefer(mut self, prefer: Vec<String>) -> Self {
        self.prefer = prefer;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Directory consulted for caching when a call passes no explicit one.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Identifier of the memoized adapter, if one has been selected.
    pub fn active_delegate(&self) -> Option<&'static str> {
        self.active.as_deref().map(|a| a.delegate())
    }

    /// Discard the loaded set and the active adapter. The explicit way
    /// for callers (and tests) to force a fresh selection.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.active = None;
    }

    /// Fetch `url` as text. With a cache directory (argument or
    /// configured default), the store is consulted first and fetched
    /// bodies are written through.
    pub fn get_text(&mut self, url: &str, cache: Option<&Path>) -> Result<String> {
        let raw = self.fetch(RequestKind::Text, url, cache)?;
        let delegate = self.active_delegate().unwrap_or("cache");
        coerce_text(delegate, raw)
    }

    /// Fetch `url` as bytes. No UTF-8 decoding is ever applied.
    pub fn get_binary(&mut self, url: &str, cache: Option<&Path>) -> Result<Vec<u8>> {
        let raw = self.fetch(RequestKind::Binary, url, cache)?;
        Ok(coerce_binary(raw))
    }

    /// String-keyed dispatch over [`get_text`](Self::get_text) and
    /// [`get_binary`](Self::get_binary). An unknown kind fails before
    /// any adapter or cache state is touched.
    pub fn fetch_kind(&mut self, kind: &str, url: &str, cache: Option<&Path>) -> Result<RawBody> {
        match RequestKind::parse(kind)? {
            RequestKind::Text => self.get_text(url, cache).map(RawBody::Text),
            RequestKind::Binary => self.get_binary(url, cache).map(RawBody::Bytes),
        }
    }

    fn fetch(&mut self, kind: RequestKind, url: &str, cache: Option<&Path>) -> Result<RawBody> {
        let cache_dir = cache
            .map(Path::to_path_buf)
            .or_else(|| self.cache_dir.clone());

        let Some(dir) = cache_dir else {
            return self.fetch_live(kind, url);
        };

        let store = ContentStore::open(&dir)?;
        if let Some(body) = store.read(kind.tag(), url)? {
            tracing::debug!(url, kind = kind.tag(), len = body.len(), "fetch.cache.hit");
            return Ok(RawBody::Bytes(body));
        }

        let raw = self.fetch_live(kind, url)?;
        store.write(kind.tag(), url, raw.as_bytes())?;
        tracing::debug!(url, kind = kind.tag(), len = raw.len(), "fetch.cache.store");
        Ok(raw)
    }

    fn fetch_live(&mut self, kind: RequestKind, url: &str) -> Result<RawBody> {
        if self.active.is_none() {
            // Selection starts from a fresh view of the module table.
            self.loaded = None;
            let loaded = discover(self.table.as_ref(), &self.registry);
            let adapter = select(&self.registry, &loaded, &self.prefer)?;
            self.loaded = Some(loaded);
            self.active = Some(adapter);
        }

        let adapter = self
            .active
            .as_mut()
            .ok_or(FetchError::NoClientAvailable)?;
        let delegate = adapter.delegate();
        tracing::debug!(url, kind = kind.tag(), delegate, "fetch.request");

        let raw = adapter.fetch_raw(url)?;
        if self.verbose {
            let shape = match &raw {
                RawBody::Text(_) => "text",
                RawBody::Bytes(_) => "bytes",
            };
            tracing::debug!(
                target: "fetch.raw",
                url,
                delegate,
                shape,
                len = raw.len(),
                "payload"
            );
        }
        Ok(raw)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("known", &self.registry.len())
            .field("loaded", &self.loaded)
            .field("active", &self.active_delegate())
            .field("verbose", &self.verbose)
            .field("prefer", &self.prefer)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_kind_parsing() {
        assert_eq!(RequestKind::parse("text").unwrap(), RequestKind::Text);
        assert_eq!(RequestKind::parse("binary").unwrap(), RequestKind::Binary);
        let err = RequestKind::parse("xml").unwrap_err();
        assert!(matches!(err, FetchError::UnknownRequestKind(k) if k == "xml"));
    }

    #[test]
    fn coerce_text_is_idempotent() {
        let once = coerce_text("t", RawBody::Text("héllo".into())).unwrap();
        let twice = coerce_text("t", RawBody::Text(once.clone())).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn coerce_text_decodes_utf8_bytes() {
        let out = coerce_text("t", RawBody::Bytes("héllo".as_bytes().to_vec())).unwrap();
        assert_eq!(out, "héllo");
    }

    #[test]
    fn coerce_text_rejects_invalid_utf8() {
        let err = coerce_text("t", RawBody::Bytes(vec![0x89, 0x50, 0x4e, 0x47])).unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedResultShape { .. }));
    }

    #[test]
    fn from_config_falls_back_to_the_platform_cache_dir() {
        let ctx = Context::from_config(&FetchConfig::default());
        assert_eq!(
            ctx.cache_dir(),
            FetchConfig::default_cache_dir().as_deref()
        );

        let explicit = FetchConfig {
            cache_dir: Some(PathBuf::from("/tmp/explicit")),
            ..Default::default()
        };
        let ctx = Context::from_config(&explicit);
        assert_eq!(ctx.cache_dir(), Some(Path::new("/tmp/explicit")));
    }

    #[test]
    fn coerce_binary_never_decodes() {
        let png = vec![0x89, 0x50, 0x4e, 0x47];
        assert_eq!(coerce_binary(RawBody::Bytes(png.clone())), png);
        assert_eq!(coerce_binary(RawBody::Text("hi".into())), b"hi".to_vec());
    }
}
