//! Binding for `hyper`: host/port-constructed shape. The connection is
//! handshaken from the (host, port) pair decomposed out of the URL, the
//! request is sent, and the response is collected as an explicit second
//! step. Plain HTTP/1.1 only, matching that construction style.
//! Redirects: NOT followed (a raw connection has no redirect logic).

use anyfetch_common::{FetchError, Result};
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;

use crate::adapter::{delegate_err, Adapter, RawBody, Target};

const DELEGATE: &str = "hyper";

pub struct HyperAdapter {
    runtime: Runtime,
    /// Parsed pieces of the most recently targeted URL; recomputed when
    /// a call targets a different URL.
    last: Option<(String, Target)>,
}

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| delegate_err(DELEGATE, e))?;
    Ok(Box::new(HyperAdapter {
        runtime,
        last: None,
    }))
}

impl HyperAdapter {
    fn target_for(&mut self, url: &str) -> Result<Target> {
        match &self.last {
            Some((cached_url, target)) if cached_url == url => Ok(target.clone()),
            _ => {
                let target = Target::of(DELEGATE, url)?;
                self.last = Some((url.to_string(), target.clone()));
                Ok(target)
            }
        }
    }
}

impl Adapter for HyperAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let target = self.target_for(url)?;
        if target.scheme != "http" {
            return Err(FetchError::Delegate {
                delegate: DELEGATE,
                source: anyhow::anyhow!(
                    "host/port connection speaks plain http only, got {}",
                    target.scheme
                ),
            });
        }

        let host_header = if target.port == 80 {
            target.host.clone()
        } else {
            format!("{}:{}", target.host, target.port)
        };

        let body = self.runtime.block_on(async {
            let stream = TcpStream::connect((target.host.as_str(), target.port))
                .await
                .map_err(|e| delegate_err(DELEGATE, e))?;
            let io = TokioIo::new(stream);
            let (mut sender, connection) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| delegate_err(DELEGATE, e))?;
            // The connection future drives the socket; it ends when the
            // connection closes.
            tokio::task::spawn(async move {
                let _ = connection.await;
            });

            let request = hyper::Request::builder()
                .method(hyper::Method::GET)
                .uri(target.path.as_str())
                .header(hyper::header::HOST, host_header.as_str())
                .body(Empty::<bytes::Bytes>::new())
                .map_err(|e| delegate_err(DELEGATE, e))?;

            let response = sender
                .send_request(request)
                .await
                .map_err(|e| delegate_err(DELEGATE, e))?;
            let collected = response
                .into_body()
                .collect()
                .await
                .map_err(|e| delegate_err(DELEGATE, e))?;
            Ok::<_, FetchError>(collected.to_bytes().to_vec())
        })?;

        Ok(RawBody::Bytes(body))
    }
}
