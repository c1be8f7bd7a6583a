//! Binding for `reqwest`: one async `Client` built at adapter creation,
//! driven to completion on a private current-thread runtime per call.
//! Redirects: followed (reqwest default, up to 10 hops).

use anyfetch_common::Result;
use reqwest::Client;
use tokio::runtime::Runtime;

use crate::adapter::{delegate_err, Adapter, RawBody};

const DELEGATE: &str = "reqwest";

pub struct ReqwestAdapter {
    client: Client,
    runtime: Runtime,
}

pub fn factory() -> Result<Box<dyn Adapter + Send>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| delegate_err(DELEGATE, e))?;
    let client = Client::builder()
        .build()
        .map_err(|e| delegate_err(DELEGATE, e))?;
    Ok(Box::new(ReqwestAdapter { client, runtime }))
}

impl Adapter for ReqwestAdapter {
    fn delegate(&self) -> &'static str {
        DELEGATE
    }

    fn fetch_raw(&mut self, url: &str) -> Result<RawBody> {
        let client = &self.client;
        let bytes: std::result::Result<_, reqwest::Error> = self.runtime.block_on(async {
            let response = client.get(url).send().await?;
            response.bytes().await
        });
        let bytes = bytes.map_err(|e| delegate_err(DELEGATE, e))?;
        Ok(RawBody::Bytes(bytes.to_vec()))
    }
}

