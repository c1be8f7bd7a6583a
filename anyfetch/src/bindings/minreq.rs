//! Binding for `minreq`: function-call shape. The payload is extracted
//! from the returned response object.
//! Redirects: followed. HTTPS needs minreq's TLS feature, which this
//! binding does not enable.

use anyfetch_common::Result;

use crate::adapter::{delegate_err, Adapter, RawBody};

const DELEGATE: &str = "minreq";

pub struct MinreqAdapter;

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    Ok(Box::new(MinreqAdapter))
}

impl Adapter for MinreqAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let response = minreq::get(url)
            .send()
            .map_err(|e| delegate_err(DELEGATE, e))?;
        Ok(RawBody::Bytes(response.as_bytes().to_vec()))
    }
}
