//! Binding for `ureq`: stream-read shape. The request function returns a
//! handle whose reader we drain to completion.
//! Redirects: followed (ureq default, up to 5 hops). Note ureq reports
//! 4xx/5xx statuses as errors; that surfaces here as a delegate failure.

use std::io::Read;

use anyfetch_common::Result;

use crate::adapter::{delegate_err, Adapter, RawBody};

const DELEGATE: &str = "ureq";

pub struct UreqAdapter;

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    Ok(Box::new(UreqAdapter))
}

impl Adapter for UreqAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let response = ureq::get(url)
            .call()
            .map_err(|e| delegate_err(DELEGATE, e))?;
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| delegate_err(DELEGATE, e))?;
        Ok(RawBody::Bytes(body))
    }
}
