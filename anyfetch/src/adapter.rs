//! The normalized contract every delegate binding implements.
//!
//! An [`Adapter`] drives exactly one underlying client crate and hands
//! back a [`RawBody`] with the payload already extracted from whatever
//! composite response object the delegate returns. Coercion to text or
//! binary is shared facade logic, never duplicated per binding.

use anyfetch_common::{FetchError, Result};
use url::Url;

/// The payload a delegate produced, extracted from its native response
/// shape. Most bindings yield `Bytes`; `Text` exists for delegates (and
/// fakes) that natively return strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawBody {
    /// Byte view of the payload, UTF-8 for the text shape.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawBody::Text(s) => s.as_bytes(),
            RawBody::Bytes(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// One live wrapper around one delegate client.
///
/// `fetch_raw` blocks the calling thread until the delegate returns or
/// fails; async delegates are awaited to completion internally and never
/// leak partial results. Implementations add no retries and no timeouts
/// of their own.
pub trait Adapter: Send {
    /// Identifier of the delegate crate this adapter drives.
    fn delegate(&self) -> &'static str;

    /// Perform a GET for `url` and extract the payload.
    fn fetch_raw(&mut self, url: &str) -> Result<RawBody>;
}

/// Wrap a delegate's native error, untranslated.
pub fn delegate_err<E>(delegate: &'static str, source: E) -> FetchError
where
    E: std::error::Error + Send + Sync + 'static,
{
    FetchError::Delegate {
        delegate,
        source: anyhow::Error::new(source),
    }
}

/// Parsed pieces of the most recently targeted URL, cached by the
/// per-target and host/port adapter variants. Recomputed whenever a call
/// targets a different URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Origin-form path including the query string, e.g. `/a/b?q=1`.
    pub path: String,
}

impl Target {
    /// Decompose `url`, failing as a delegate-shaped error for `delegate`
    /// since a URL the delegate cannot be pointed at is unusable input
    /// for that binding.
    pub fn of(delegate: &'static str, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| delegate_err(delegate, e))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::Delegate {
                delegate,
                source: anyhow::anyhow!("url has no host: {url}"),
            })?
            .to_string();
        let port = parsed.port_or_known_default().unwrap_or(80);
        let path = match parsed.query() {
            Some(q) => format!("{}?{}", parsed.path(), q),
            None => parsed.path().to_string(),
        };
        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
            port,
            path,
        })
    }

    /// Scheme + host (+ non-default port) base, the key per-target
    /// adapters cache their client under.
    pub fn base(&self) -> String {
        let default_port = match self.scheme.as_str() {
            "https" => 443,
            _ => 80,
        };
        if self.port == default_port {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_decomposes_url() {
        let t = Target::of("test", "http://example.tld:8080/a/b?q=1").unwrap();
        assert_eq!(t.scheme, "http");
        assert_eq!(t.host, "example.tld");
        assert_eq!(t.port, 8080);
        assert_eq!(t.path, "/a/b?q=1");
        assert_eq!(t.base(), "http://example.tld:8080");
    }

    #[test]
    fn target_base_omits_default_port() {
        let t = Target::of("test", "http://example.tld/x").unwrap();
        assert_eq!(t.port, 80);
        assert_eq!(t.base(), "http://example.tld");

        let t = Target::of("test", "https://example.tld/x").unwrap();
        assert_eq!(t.port, 443);
        assert_eq!(t.base(), "https://example.tld");
    }

    #[test]
    fn target_rejects_hostless_urls() {
        assert!(Target::of("test", "data:text/plain,hi").is_err());
    }

    #[test]
    fn raw_body_byte_view() {
        assert_eq!(RawBody::Text("hi".into()).as_bytes(), b"hi");
        assert_eq!(RawBody::Bytes(vec![0x89]).as_bytes(), &[0x89]);
        assert!(RawBody::Text(String::new()).is_empty());
    }
}
