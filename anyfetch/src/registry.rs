//! Static mapping from delegate identifiers to the adapter that drives them.
//!
//! The registry is append-only and last-wins: re-registering an identifier
//! replaces the stored descriptor but keeps its original position, so the
//! registration order stays the documented selection tie-break. After the
//! primary table, derivative crates are seeded against their base family's
//! descriptor unless already explicitly present (a derivative crate in the
//! dependency graph implies its base crate is linked).

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use crate::adapter::Adapter;
use anyfetch_common::Result;

/// All binding crates here need blocking sockets and threads, neither of
/// which exists on wasm targets.
const HOST_HAS_SOCKETS: bool = cfg!(not(target_family = "wasm"));

/// Construction/fetch shape of a binding. The closed set of ways the
/// supported client crates want to be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Call the crate's `get(url)`-style free function, extract the
    /// payload from the returned response object.
    FunctionCall,
    /// Call the request function, read the returned handle's byte
    /// stream to completion.
    StreamRead,
    /// One client object built at adapter creation, reused for every URL.
    SingleInstancePerProcess,
    /// Client rebuilt lazily whenever a call targets a different
    /// scheme+host[+port] base.
    SingleInstancePerTarget,
    /// Client built from a (host, port) pair; request and response are
    /// explicit separate steps.
    HostPortConstructed,
}

/// Builds a fresh adapter bound to the delegate, or fails with whatever
/// the delegate's constructor reported.
pub type AdapterFactory = fn() -> Result<Box<dyn Adapter + Send>>;

/// Associates a delegate identifier with the adapter that knows how to
/// drive it.
#[derive(Clone)]
pub struct Descriptor {
    /// Crate name used as the registry key and the unit of discovery.
    pub id: &'static str,
    pub variant: Variant,
    /// The concrete entry point the factory instantiates, for
    /// diagnostics (e.g. `reqwest::Client`).
    pub entry_point: &'static str,
    /// Whether the current compilation target can run this binding at
    /// all. Evaluated once at registry build time; unsupported bindings
    /// are invisible to discovery and selection.
    pub host_supported: bool,
    /// Absent when the binding's cargo feature was not compiled in.
    pub factory: Option<AdapterFactory>,
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("entry_point", &self.entry_point)
            .field("host_supported", &self.host_supported)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// O(1) descriptor lookup plus deterministic (registration-order)
/// iteration.
#[derive(Debug, Default)]
pub struct Registry {
    index: HashMap<&'static str, usize>,
    table: Vec<Descriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `descriptor`, replacing any previous entry for the same
    /// identifier while keeping its position.
    pub fn register(&mut self, descriptor: Descriptor) {
        match self.index.get(descriptor.id) {
            Some(&pos) => self.table[pos] = descriptor,
            None => {
                self.index.insert(descriptor.id, self.table.len());
                self.table.push(descriptor);
            }
        }
    }

    /// Seed `id` as a derivative of `base`, reusing the base family's
    /// descriptor. No-op when `id` is already present or `base` is not.
    pub fn register_derivative(&mut self, id: &'static str, base: &str) {
        if self.index.contains_key(id) {
            return;
        }
        if let Some(parent) = self.lookup(base).cloned() {
            self.register(Descriptor { id, ..parent });
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&Descriptor> {
        self.index.get(id).map(|&pos| &self.table[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.table.iter()
    }

    /// The Known-Library Set: every identifier this registry recognizes.
    pub fn known(&self) -> BTreeSet<String> {
        self.index.keys().map(|id| id.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// `Some(factory)` when the binding's feature is compiled in, `None`
/// otherwise. The descriptor stays in the table either way so the known
/// set is independent of the enabled features.
macro_rules! feature_factory {
    ($feature:literal, $factory:path) => {{
        #[cfg(feature = $feature)]
        let factory: Option<AdapterFactory> = Some($factory);
        #[cfg(not(feature = $feature))]
        let factory: Option<AdapterFactory> = None;
        factory
    }};
}

/// Derivative crates seeded after the primary table, each reusing its
/// base family's adapter.
const DERIVATIVES: &[(&str, &str)] = &[
    ("reqwest-middleware", "reqwest"),
    ("reqwest-retry", "reqwest"),
    ("hyper-util", "hyper"),
    ("hyper-tls", "hyper"),
];

fn build_builtin() -> Registry {
    let mut r = Registry::new();

    r.register(Descriptor {
        id: "reqwest",
        variant: Variant::SingleInstancePerProcess,
        entry_point: "reqwest::Client",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("reqwest", crate::bindings::reqwest::factory),
    });
    r.register(Descriptor {
        id: "ureq",
        variant: Variant::StreamRead,
        entry_point: "ureq::get",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("ureq", crate::bindings::ureq::factory),
    });
    r.register(Descriptor {
        id: "minreq",
        variant: Variant::FunctionCall,
        entry_point: "minreq::get",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("minreq", crate::bindings::minreq::factory),
    });
    r.register(Descriptor {
        id: "attohttpc",
        variant: Variant::FunctionCall,
        entry_point: "attohttpc::get",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("attohttpc", crate::bindings::attohttpc::factory),
    });
    r.register(Descriptor {
        id: "curl",
        variant: Variant::SingleInstancePerProcess,
        entry_point: "curl::easy::Easy",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("curl", crate::bindings::curl::factory),
    });
    r.register(Descriptor {
        id: "isahc",
        variant: Variant::StreamRead,
        entry_point: "isahc::get",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("isahc", crate::bindings::isahc::factory),
    });
    r.register(Descriptor {
        id: "surf",
        variant: Variant::SingleInstancePerTarget,
        entry_point: "surf::Client",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("surf", crate::bindings::surf::factory),
    });
    r.register(Descriptor {
        id: "hyper",
        variant: Variant::HostPortConstructed,
        entry_point: "hyper::client::conn::http1",
        host_supported: HOST_HAS_SOCKETS,
        factory: feature_factory!("hyper", crate::bindings::hyper::factory),
    });

    for &(id, base) in DERIVATIVES {
        r.register_derivative(id, base);
    }

    r
}

/// The process-wide built-in table, constructed once.
pub fn builtin() -> Arc<Registry> {
    static BUILTIN: OnceLock<Arc<Registry>> = OnceLock::new();
    BUILTIN.get_or_init(|| Arc::new(build_builtin())).clone()
}
