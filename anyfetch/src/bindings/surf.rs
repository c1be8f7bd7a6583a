//! Binding for `surf`: single instance per target site. The client is
//! (re)built lazily whenever a call targets a different
//! scheme+host[+port] base, anchored with `Config::set_base_url`, and
//! the per-call request uses the URL path only.
//! Redirects: NOT followed (surf's redirect middleware is opt-in).
//!
//! surf's futures are driven by its backend's own I/O agent, so blocking
//! on them with the lightweight `futures` executor keeps the whole call
//! synchronous from the facade's point of view.

use anyfetch_common::{FetchError, Result};
use surf::{Client, Config};

use crate::adapter::{delegate_err, Adapter, RawBody, Target};

const DELEGATE: &str = "surf";

fn surf_err(e: surf::Error) -> FetchError {
    FetchError::Delegate {
        delegate: DELEGATE,
        source: anyhow::anyhow!(e),
    }
}

#[derive(Default)]
pub struct SurfAdapter {
    /// Client for the most recently targeted base, with the parsed URL
    /// pieces it was keyed by. Invalidated when the base changes.
    current: Option<(Target, Client)>,
    rebuilds: usize,
}

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    Ok(Box::new(SurfAdapter::default()))
}

impl SurfAdapter {
    /// How many times a client has been constructed; same-base calls
    /// must not bump this.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    fn client_for(&mut self, url: &str) -> Result<(Client, String)> {
        let target = Target::of(DELEGATE, url)?;
        match &mut self.current {
            Some((cached, client)) if cached.base() == target.base() => {
                // Same base, possibly a different path: refresh the
                // cached URL pieces and reuse the client handle.
                let path = target.path.clone();
                *cached = target;
                Ok((client.clone(), path))
            }
            _ => {
                let base =
                    surf::Url::parse(&format!("{}/", target.base())).map_err(|e| {
                        FetchError::Delegate {
                            delegate: DELEGATE,
                            source: anyhow::Error::new(e),
                        }
                    })?;
                // try_into's error is the backend client's own error
                // type, not surf::Error.
                let client: Client = Config::new()
                    .set_base_url(base)
                    .try_into()
                    .map_err(|e| delegate_err(DELEGATE, e))?;
                tracing::debug!(base = %target.base(), "fetch.surf.rebuild");
                self.rebuilds += 1;
                let path = target.path.clone();
                self.current = Some((target, client.clone()));
                Ok((client, path))
            }
        }
    }
}

impl Adapter for SurfAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let (client, path) = self.client_for(url)?;
        let request = client.get(path.trim_start_matches('/'));
        let body = futures::executor::block_on(async {
            let mut response = request.await?;
            response.body_bytes().await
        })
        .map_err(surf_err)?;
        Ok(RawBody::Bytes(body))
    }
}
