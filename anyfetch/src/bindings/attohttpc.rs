//! Binding for `attohttpc`: function-call shape, payload extracted from
//! the returned response.
//! Redirects: followed (attohttpc default).

use anyfetch_common::Result;

use crate::adapter::{delegate_err, Adapter, RawBody};

const DELEGATE: &str = "attohttpc";

pub struct AttohttpcAdapter;

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    Ok(Box::new(AttohttpcAdapter))
}

impl Adapter for AttohttpcAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let response = attohttpc::get(url)
            .send()
            .map_err(|e| delegate_err(DELEGATE, e))?;
        let body = response.bytes().map_err(|e| delegate_err(DELEGATE, e))?;
        Ok(RawBody::Bytes(body))
    }
}
