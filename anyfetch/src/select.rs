//! Picking one adapter out of the loaded delegates.
//!
//! Candidates are tried in a documented deterministic order: the
//! configured preference list first (in list order, when loaded), then
//! the registry's registration order. A descriptor with no factory (its
//! feature was not compiled in even though the module table reports the
//! crate) is the single recoverable skip; a factory that runs and fails
//! propagates its error.

use std::collections::BTreeSet;

use anyfetch_common::{FetchError, Result};

use crate::adapter::Adapter;
use crate::registry::Registry;

pub(crate) fn select(
    registry: &Registry,
    loaded: &BTreeSet<String>,
    prefer: &[String],
) -> Result<Box<dyn Adapter + Send>> {
    let preferred = prefer
        .iter()
        .map(String::as_str)
        .filter(|id| loaded.contains(*id));
    let registered = registry
        .iter()
        .map(|d| d.id)
        .filter(|id| loaded.contains(*id) && !prefer.iter().any(|p| p == id));

    for id in preferred.chain(registered) {
        let Some(descriptor) = registry.lookup(id) else {
            // Preference entries outside the known set are never selected.
            tracing::debug!(delegate = id, "fetch.select.unknown_preference");
            continue;
        };
        if !descriptor.host_supported {
            tracing::debug!(delegate = id, "fetch.select.host_unsupported");
            continue;
        }
        let Some(factory) = descriptor.factory else {
            tracing::warn!(
                delegate = id,
                entry_point = descriptor.entry_point,
                "fetch.select.skip: binding not compiled in"
            );
            continue;
        };
        let adapter = factory()?;
        tracing::info!(
            delegate = id,
            variant = ?descriptor.variant,
            entry_point = descriptor.entry_point,
            "fetch.select"
        );
        return Ok(adapter);
    }

    Err(FetchError::NoClientAvailable)
}
