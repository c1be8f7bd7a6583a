//! Binding for `curl`: one `Easy` handle built at adapter creation and
//! reused for every URL, with a write callback collecting the body.
//! Redirects: NOT followed (libcurl leaves FOLLOWLOCATION off by
//! default, and so do we — delegate semantics pass through).

use anyfetch_common::Result;
use curl::easy::Easy;

use crate::adapter::{delegate_err, Adapter, RawBody};

const DELEGATE: &str = "curl";

pub struct CurlAdapter {
    easy: Easy,
}

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    Ok(Box::new(CurlAdapter { easy: Easy::new() }))
}

impl Adapter for CurlAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        self.easy.url(url).map_err(|e| delegate_err(DELEGATE, e))?;

        let mut body = Vec::new();
        {
            let mut transfer = self.easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(|e| delegate_err(DELEGATE, e))?;
            transfer.perform().map_err(|e| delegate_err(DELEGATE, e))?;
        }
        Ok(RawBody::Bytes(body))
    }
}
