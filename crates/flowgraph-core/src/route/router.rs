//! Router context: per-engine routing state and the operations voices call.
//!
//! [`Router`] owns the three rate registries, the connection directory and the
//! table cache for one engine run. Every structure sits behind its own mutex so
//! voices initializing on different threads serialize their mutations; no lock
//! is held across another, so there is no ordering to get wrong.
//!
//! [`EngineRouters`] maps engine identities to routers for hosts that run
//! several engines in one process and need to find a router by engine.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::arg::Arg;
use crate::error::RouteError;
use crate::frame::Frame;
use crate::table::{TableCache, TableGenerator, TableHandle, TableRequest};
use crate::voice::Voice;

use super::directory::ConnectionDirectory;
use super::port::{Block, Bucket, Inlet, Outlet, PortSignal};
use super::port_id::PortId;
use super::registry::PortRegistry;
use super::snapshot::{RouterSnapshot, TableSnapshot};

/// Routing state for one engine run.
///
/// # Usage
///
/// 1. Header phase: [`connect()`](Self::connect) every route, schedule
///    always-on voices, optionally pre-build tables.
/// 2. Voice initialization: [`outlet()`](Self::outlet) and
///    [`inlet()`](Self::inlet) for each port the voice declares.
/// 3. Every cycle: the voice writes its outlets and calls `aggregate` on its
///    inlets.
///
/// Connections declared after an inlet was created are not seen by that inlet.
pub struct Router {
    pub(crate) scalar: Mutex<PortRegistry<f64>>,
    pub(crate) block: Mutex<PortRegistry<Block>>,
    pub(crate) frame: Mutex<PortRegistry<Frame>>,
    connections: Mutex<ConnectionDirectory>,
    tables: Mutex<TableCache>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self {
            scalar: Mutex::new(PortRegistry::new()),
            block: Mutex::new(PortRegistry::new()),
            frame: Mutex::new(PortRegistry::new()),
            connections: Mutex::new(ConnectionDirectory::new()),
            tables: Mutex::new(TableCache::new()),
        }
    }

    /// Clears all registries, connections and cached tables.
    ///
    /// Called once at the start of a run so nothing from a previous run leaks
    /// into it. Inlets created before the reset keep their old buckets and
    /// never see outlets registered afterwards.
    pub fn reset(&self) {
        self.scalar.lock().clear();
        self.block.lock().clear();
        self.frame.lock().clear();
        self.connections.lock().clear();
        self.tables.lock().clear();
        #[cfg(feature = "tracing")]
        tracing::debug!("router_reset: registries, connections and tables cleared");
    }

    // --- Connections ---

    /// Declares that `source_owner:outlet` feeds `sink_owner:inlet`.
    ///
    /// Returns the `(source, sink)` identifiers. Declaring the same pair twice
    /// doubles that source's contribution.
    pub fn connect(
        &self,
        source_owner: &Arg,
        outlet: &Arg,
        sink_owner: &Arg,
        inlet: &Arg,
    ) -> (PortId, PortId) {
        let source = PortId::from_args(source_owner, outlet);
        let sink = PortId::from_args(sink_owner, inlet);
        self.declare(sink.clone(), source.clone());
        (source, sink)
    }

    /// Appends `source` to the declared sources of `sink`.
    pub fn declare(&self, sink: PortId, source: PortId) {
        #[cfg(feature = "tracing")]
        tracing::debug!("route_connect: {source} → {sink}");
        self.connections.lock().declare(sink, source);
    }

    /// Declared sources of `sink`, in declaration order.
    pub fn sources(&self, sink: &str) -> Vec<PortId> {
        self.connections.lock().resolve(sink).to_vec()
    }

    /// Total number of declarations, duplicates included.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().connection_count()
    }

    // --- Ports ---

    /// Creates and registers an outlet named `name` on `voice`.
    pub fn outlet<S: PortSignal>(&self, voice: &Arc<Voice>, name: &Arg) -> Arc<Outlet<S>> {
        let id = PortId::for_voice(voice, name);
        let outlet = Arc::new(Outlet::new(id, Arc::clone(voice)));
        self.register_outlet(&outlet);
        outlet
    }

    /// Registers an existing outlet under its identifier.
    ///
    /// Returns `false` if this exact instance was already registered.
    pub fn register_outlet<S: PortSignal>(&self, outlet: &Arc<Outlet<S>>) -> bool {
        let inserted = S::registry(self)
            .lock()
            .register_outlet(outlet.id(), Arc::clone(outlet));
        #[cfg(feature = "tracing")]
        if inserted {
            tracing::debug!(
                "outlet_register: {} {} for {}",
                S::RATE.name(),
                outlet.id(),
                outlet.voice().id()
            );
        }
        inserted
    }

    /// Creates an inlet named `name` on `voice`, binds it to the bucket of
    /// every declared source, and registers it.
    ///
    /// Buckets with no outlets yet are bound too; outlets registered into them
    /// later become visible to this inlet. A source declared more than once is
    /// bound once and counted once per declaration.
    pub fn inlet<S: PortSignal>(&self, voice: &Arc<Voice>, name: &Arg) -> Arc<Inlet<S>> {
        let id = PortId::for_voice(voice, name);
        let sources = self.sources(id.as_str());

        let mut inlet = Inlet::new(id.clone(), Arc::clone(voice));
        let mut registry = S::registry(self).lock();
        for source in &sources {
            inlet.bind(registry.outlet_bucket(source));
        }
        let inlet = Arc::new(inlet);
        registry.register_inlet(&id, Arc::clone(&inlet));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "inlet_bind: {} {id} for {} → {} buckets from {} declarations",
            S::RATE.name(),
            voice.id(),
            inlet.bound_count(),
            sources.len()
        );
        inlet
    }

    /// Returns the bucket for outlet `id`, creating it if absent.
    pub fn outlet_bucket<S: PortSignal>(&self, id: &PortId) -> Bucket<S> {
        S::registry(self).lock().outlet_bucket(id)
    }

    /// Number of outlets registered under `id` at rate `S`.
    pub fn outlet_count<S: PortSignal>(&self, id: &str) -> usize {
        S::registry(self).lock().outlet_count(id)
    }

    /// Number of inlets registered under `id` at rate `S`.
    pub fn inlet_count<S: PortSignal>(&self, id: &str) -> usize {
        S::registry(self).lock().inlet_count(id)
    }

    // --- Tables ---

    /// Returns the table for `request`, building it only the first time an
    /// equal request is seen in this run.
    pub fn table_once(
        &self,
        request: &TableRequest,
        generator: &mut dyn TableGenerator,
    ) -> Result<TableHandle, RouteError> {
        let key = request.key()?;
        self.tables.lock().get_or_build(key, generator)
    }

    /// Number of memoized tables.
    pub fn table_count(&self) -> usize {
        self.tables.lock().len()
    }

    // --- Introspection ---

    /// Captures the current state of every registry, the directory and the
    /// table cache.
    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            scalar: self.scalar.lock().snapshot(),
            block: self.block.lock().snapshot(),
            frame: self.frame.lock().snapshot(),
            connections: self.connections.lock().snapshot(),
            tables: self
                .tables
                .lock()
                .iter()
                .map(|(key, handle)| TableSnapshot {
                    key: key.clone(),
                    handle,
                })
                .collect(),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identity of an engine instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(pub u64);

/// Engine identity → router.
///
/// Each engine gets its own router on first use; engines never share state.
#[derive(Default)]
pub struct EngineRouters {
    routers: Mutex<HashMap<EngineId, Arc<Router>>>,
}

impl EngineRouters {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the router for `engine`, creating it on first use.
    pub fn router(&self, engine: EngineId) -> Arc<Router> {
        Arc::clone(self.routers.lock().entry(engine).or_default())
    }

    /// Returns the router for `engine` if one exists.
    pub fn get(&self, engine: EngineId) -> Option<Arc<Router>> {
        self.routers.lock().get(&engine).cloned()
    }

    /// Clears and forgets the router of `engine`.
    ///
    /// Returns `false` if the engine had no router.
    pub fn teardown(&self, engine: EngineId) -> bool {
        let Some(router) = self.routers.lock().remove(&engine) else {
            return false;
        };
        router.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!("router_teardown: engine {}", engine.0);
        true
    }

    /// Number of engines with a router.
    pub fn len(&self) -> usize {
        self.routers.lock().len()
    }

    /// Returns true if no engine has a router.
    pub fn is_empty(&self) -> bool {
        self.routers.lock().is_empty()
    }
}
