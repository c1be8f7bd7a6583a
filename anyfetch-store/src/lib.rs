//! File-backed content store used as the fetch cache collaborator.
//!
//! Bodies are stored verbatim (no serialization transform) under
//! `<root>/<kind>/<filename>`, where `kind` is the request kind tag
//! (`"text"` or `"binary"`) and `filename` is derived from the URL.
//! The store knows nothing about HTTP; it is a plain key-value layer
//! addressed by `(root, kind, url)`.
//!
//! # Examples
//!
//! ```
//! use anyfetch_store::ContentStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = ContentStore::open(dir.path()).unwrap();
//! store.write("text", "http://example.tld/", b"Body goes here.").unwrap();
//! let body = store.read("text", "http://example.tld/").unwrap();
//! assert_eq!(body.as_deref(), Some(&b"Body goes here."[..]));
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters kept as-is in derived filenames; everything else is
/// percent-encoded so a URL maps to exactly one flat file name.
const FILENAME_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_');

/// Encoded names longer than this fall back to a content hash of the
/// URL, keeping paths below common filesystem name limits.
const MAX_FILENAME_LEN: usize = 180;

/// Errors reported by the content store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Filesystem access under the store root failed.
    #[error("store i/o at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A content store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open (creating if necessary) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Directory this store was opened at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the body stored for `(kind, url)`, if any.
    pub fn read(&self, kind: &str, url: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.entry_path(kind, url);
        match fs::read(&path) {
            Ok(body) => {
                tracing::debug!(kind, url, len = body.len(), "store.read.hit");
                Ok(Some(body))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(kind, url, "store.read.miss");
                Ok(None)
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Store `body` verbatim for `(kind, url)`.
    ///
    /// Writes go through a temp file in the same directory followed by a
    /// rename, so readers never observe a partially written entry.
    pub fn write(&self, kind: &str, url: &str, body: &[u8]) -> Result<(), StoreError> {
        let path = self.entry_path(kind, url);
        let parent = self
            .root
            .join(kind);
        fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&parent).map_err(|e| StoreError::io(&parent, e))?;
        tmp.write_all(body).map_err(|e| StoreError::io(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        tracing::debug!(kind, url, len = body.len(), "store.write");
        Ok(())
    }

    /// Path an entry for `(kind, url)` lives at.
    pub fn entry_path(&self, kind: &str, url: &str) -> PathBuf {
        self.root.join(kind).join(file_stem(url))
    }
}

/// Derive a flat filename from a URL: percent-encode everything outside
/// `[A-Za-z0-9._-]`, hashing instead when the encoded form is too long.
fn file_stem(url: &str) -> String {
    let encoded = utf8_percent_encode(url, FILENAME_KEEP).to_string();
    if encoded.len() <= MAX_FILENAME_LEN {
        encoded
    } else {
        blake3::hash(url.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_urls_stay_readable() {
        let stem = file_stem("http://example.tld/a/b?q=1");
        assert_eq!(stem, "http%3A%2F%2Fexample.tld%2Fa%2Fb%3Fq%3D1");
        assert!(!stem.contains('/'));
    }

    #[test]
    fn overlong_urls_hash() {
        let url = format!("http://example.tld/{}", "x".repeat(400));
        let stem = file_stem(&url);
        assert_eq!(stem.len(), 64);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stems_are_stable() {
        assert_eq!(file_stem("http://a/"), file_stem("http://a/"));
        assert_ne!(file_stem("http://a/"), file_stem("http://b/"));
    }
}
