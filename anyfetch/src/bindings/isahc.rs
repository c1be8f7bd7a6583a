//! Binding for `isahc`: stream-read shape over the free request
//! function; the response body implements `Read` and is drained to
//! completion.
//! Redirects: NOT followed (isahc's redirect policy defaults to none).

use std::io::Read;

use anyfetch_common::Result;

use crate::adapter::{delegate_err, Adapter, RawBody};

const DELEGATE: &str = "isahc";

pub struct IsahcAdapter;

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    Ok(Box::new(IsahcAdapter))
}

impl Adapter for IsahcAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let mut response = isahc::get(url).map_err(|e| delegate_err(DELEGATE, e))?;
        let mut body = Vec::new();
        response
            .body_mut()
            .read_to_end(&mut body)
            .map_err(|e| delegate_err(DELEGATE, e))?;
        Ok(RawBody::Bytes(body))
    }
}
