//! Connection directory: which outlet identifiers feed which inlet identifier.
//!
//! Declarations are made once per run, before any voice is instantiated, and
//! are read by every inlet as it initializes. The directory is append-only and
//! does not deduplicate: declaring the same pair twice makes the source count
//! twice in every inlet bound afterwards.

use std::collections::BTreeMap;

use super::port_id::PortId;
use super::snapshot::ConnectionSnapshot;

/// Sink identifier → ordered list of declared source identifiers.
#[derive(Debug, Clone, Default)]
pub struct ConnectionDirectory {
    connections: BTreeMap<PortId, Vec<PortId>>,
}

impl ConnectionDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `source` to the sources feeding `sink`.
    pub fn declare(&mut self, sink: PortId, source: PortId) {
        self.connections.entry(sink).or_default().push(source);
    }

    /// Declared sources for `sink`, in declaration order.
    pub fn resolve(&self, sink: &str) -> &[PortId] {
        self.connections
            .get(sink)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of sinks with at least one declaration.
    pub fn sink_count(&self) -> usize {
        self.connections.len()
    }

    /// Total number of declarations, duplicates included.
    pub fn connection_count(&self) -> usize {
        self.connections.values().map(Vec::len).sum()
    }

    /// Returns true if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Iterates `(sink, sources)` in sink order.
    pub fn iter(&self) -> impl Iterator<Item = (&PortId, &[PortId])> {
        self.connections
            .iter()
            .map(|(sink, sources)| (sink, sources.as_slice()))
    }

    /// Removes every declaration.
    pub fn clear(&mut self) {
        self.connections.clear();
    }

    pub(crate) fn snapshot(&self) -> Vec<ConnectionSnapshot> {
        self.iter()
            .map(|(sink, sources)| ConnectionSnapshot {
                sink: sink.clone(),
                sources: sources.to_vec(),
            })
            .collect()
    }
}
