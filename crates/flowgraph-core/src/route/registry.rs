//! Per-rate port registries.
//!
//! A [`PortRegistry`] maps each outlet identifier to its [`Bucket`] and each
//! inlet identifier to the inlets created under it. Registries only ever grow
//! during an engine run; [`PortRegistry::clear`] is the sole removal path and
//! is used when a run is reset or torn down.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::port::{Bucket, Inlet, Outlet, PortSignal};
use super::port_id::PortId;
use super::snapshot::{PortSnapshot, RegistrySnapshot};

/// Outlet buckets and inlet lists for one rate class.
pub struct PortRegistry<S: PortSignal> {
    outlets: BTreeMap<PortId, Bucket<S>>,
    inlets: BTreeMap<PortId, Vec<Arc<Inlet<S>>>>,
}

impl<S: PortSignal> PortRegistry<S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            outlets: BTreeMap::new(),
            inlets: BTreeMap::new(),
        }
    }

    /// Adds an outlet to the bucket for `id`.
    ///
    /// Returns `false` if this exact outlet instance was already registered.
    pub fn register_outlet(&mut self, id: &PortId, outlet: Arc<Outlet<S>>) -> bool {
        self.outlet_bucket(id).insert(outlet)
    }

    /// Records an inlet under `id` for introspection.
    ///
    /// Returns `false` if this exact inlet instance was already registered.
    pub fn register_inlet(&mut self, id: &PortId, inlet: Arc<Inlet<S>>) -> bool {
        let inlets = self.inlets.entry(id.clone()).or_default();
        if inlets.iter().any(|i| Arc::ptr_eq(i, &inlet)) {
            return false;
        }
        inlets.push(inlet);
        true
    }

    /// Returns the bucket for `id`, creating an empty one if absent.
    ///
    /// The returned handle stays valid and keeps observing registrations until
    /// the registry is cleared.
    pub fn outlet_bucket(&mut self, id: &PortId) -> Bucket<S> {
        self.outlets.entry(id.clone()).or_default().clone()
    }

    /// Returns the bucket for `id` without creating it.
    pub fn find_bucket(&self, id: &str) -> Option<&Bucket<S>> {
        self.outlets.get(id)
    }

    /// Number of outlets registered under `id`.
    pub fn outlet_count(&self, id: &str) -> usize {
        self.outlets.get(id).map_or(0, Bucket::len)
    }

    /// Number of inlets registered under `id`.
    pub fn inlet_count(&self, id: &str) -> usize {
        self.inlets.get(id).map_or(0, Vec::len)
    }

    /// Inlets registered under `id`, in registration order.
    pub fn inlets(&self, id: &str) -> &[Arc<Inlet<S>>] {
        self.inlets.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Identifiers that have a bucket, in sorted order.
    pub fn outlet_ids(&self) -> impl Iterator<Item = &PortId> {
        self.outlets.keys()
    }

    /// Identifiers that have at least one inlet, in sorted order.
    pub fn inlet_ids(&self) -> impl Iterator<Item = &PortId> {
        self.inlets.keys()
    }

    /// Drops every bucket and inlet record.
    ///
    /// Handles already held by inlets keep their old buckets; new lookups get
    /// fresh ones.
    pub fn clear(&mut self) {
        self.outlets.clear();
        self.inlets.clear();
    }

    /// Captures bucket sizes and inlet counts.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            rate: S::RATE,
            outlets: self
                .outlets
                .iter()
                .map(|(id, bucket)| PortSnapshot {
                    id: id.clone(),
                    instances: bucket.len(),
                    active: bucket.active_count(),
                })
                .collect(),
            inlets: self
                .inlets
                .iter()
                .map(|(id, inlets)| PortSnapshot {
                    id: id.clone(),
                    instances: inlets.len(),
                    active: inlets.iter().filter(|i| i.voice().is_active()).count(),
                })
                .collect(),
        }
    }
}

impl<S: PortSignal> Default for PortRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
