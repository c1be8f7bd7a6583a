//! Concrete adapter bindings, one module per delegate crate.
//!
//! Every module exposes a `factory` matching
//! [`AdapterFactory`](crate::registry::AdapterFactory). Each binding is
//! responsible for extracting the payload from its delegate's native
//! response shape; redirect and TLS behavior is whatever the delegate
//! does, documented per module.

#[cfg(feature = "attohttpc")]
pub mod attohttpc;
#[cfg(feature = "curl")]
pub mod curl;
#[cfg(feature = "hyper")]
pub mod hyper;
#[cfg(feature = "isahc")]
pub mod isahc;
#[cfg(feature = "minreq")]
pub mod minreq;
#[cfg(feature = "reqwest")]
pub mod reqwest;
#[cfg(feature = "surf")]
pub mod surf;
#[cfg(feature = "ureq")]
pub mod ureq;
