//! Introspection snapshots of a router.
//!
//! Snapshots are plain owned data, detached from the live registries, for
//! listings, logs and tests.

use crate::table::{TableHandle, TableKey};

use super::port::Rate;
use super::port_id::PortId;

/// Instances registered under one identifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PortSnapshot {
    /// Canonical identifier.
    pub id: PortId,
    /// Registered instances.
    pub instances: usize,
    /// Instances whose voice is active.
    pub active: usize,
}

/// Contents of one rate's registry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegistrySnapshot {
    /// Rate class of the registry.
    pub rate: Rate,
    /// Outlet buckets, sorted by identifier.
    pub outlets: Vec<PortSnapshot>,
    /// Inlet lists, sorted by identifier.
    pub inlets: Vec<PortSnapshot>,
}

/// Declared sources of one sink.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConnectionSnapshot {
    /// Sink (inlet) identifier.
    pub sink: PortId,
    /// Source (outlet) identifiers in declaration order.
    pub sources: Vec<PortId>,
}

/// One memoized table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableSnapshot {
    /// Request key.
    pub key: TableKey,
    /// Built table.
    pub handle: TableHandle,
}

/// Full state of a router at one instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouterSnapshot {
    /// Scalar registry.
    pub scalar: RegistrySnapshot,
    /// Block registry.
    pub block: RegistrySnapshot,
    /// Frame registry.
    pub frame: RegistrySnapshot,
    /// Connection directory.
    pub connections: Vec<ConnectionSnapshot>,
    /// Table cache.
    pub tables: Vec<TableSnapshot>,
}

impl RouterSnapshot {
    /// Total outlet instances across all rates.
    pub fn outlet_instances(&self) -> usize {
        [&self.scalar, &self.block, &self.frame]
            .iter()
            .flat_map(|r| r.outlets.iter())
            .map(|p| p.instances)
            .sum()
    }

    /// Total inlet instances across all rates.
    pub fn inlet_instances(&self) -> usize {
        [&self.scalar, &self.block, &self.frame]
            .iter()
            .flat_map(|r| r.inlets.iter())
            .map(|p| p.instances)
            .sum()
    }
}
