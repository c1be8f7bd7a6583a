//! Determining which delegate crates are present in this build.
//!
//! A compiled program has no runtime module table, so "loaded" means
//! "compiled in": the default [`ModuleTable`] reports exactly the set of
//! bindings whose cargo features are enabled. The trait keeps that source
//! external and injectable — tests and embedders supply their own table.

use std::collections::BTreeSet;

use crate::registry::Registry;

/// Read-only view of the delegate crates linked into the process.
pub trait ModuleTable {
    fn linked(&self) -> BTreeSet<String>;
}

/// The default table: bindings compiled into this library.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedCrates;

impl ModuleTable for LinkedCrates {
    fn linked(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        let mut record = |enabled: bool, id: &str| {
            if enabled {
                set.insert(id.to_string());
            }
        };
        record(cfg!(feature = "reqwest"), "reqwest");
        record(cfg!(feature = "ureq"), "ureq");
        record(cfg!(feature = "minreq"), "minreq");
        record(cfg!(feature = "attohttpc"), "attohttpc");
        record(cfg!(feature = "curl"), "curl");
        record(cfg!(feature = "isahc"), "isahc");
        record(cfg!(feature = "surf"), "surf");
        record(cfg!(feature = "hyper"), "hyper");
        set
    }
}

/// A fixed table for tests and embedders that manage the set themselves.
#[derive(Debug, Clone, Default)]
pub struct FixedTable(BTreeSet<String>);

impl FixedTable {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }
}

impl ModuleTable for FixedTable {
    fn linked(&self) -> BTreeSet<String> {
        self.0.clone()
    }
}

/// Compute the Loaded-Library Set: the table's linked crates intersected
/// with the registry's known set, minus bindings the current host cannot
/// run. Pure; recomputes in full on every call.
pub fn discover(table: &dyn ModuleTable, registry: &Registry) -> BTreeSet<String> {
    let linked = table.linked();
    let loaded: BTreeSet<String> = registry
        .iter()
        .filter(|d| d.host_supported && linked.contains(d.id))
        .map(|d| d.id.to_string())
        .collect();
    tracing::debug!(loaded = ?loaded, linked = linked.len(), "fetch.discover");
    loaded
}
