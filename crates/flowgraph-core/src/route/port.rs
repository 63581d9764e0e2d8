//! Outlets, inlets and the buckets that connect them.
//!
//! An [`Outlet`] is a per-voice publication slot: the owning voice writes its
//! signal into it every cycle. A [`Bucket`] is the live set of outlets that
//! share one identifier; the registry owns it, inlets hold clones of the same
//! `Arc`, so an outlet registered after an inlet was bound is still seen by
//! that inlet. An [`Inlet`] is the per-voice subscription point holding the
//! buckets it was bound to.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};

use crate::frame::Frame;
use crate::voice::Voice;

use super::aggregate::FrameMergeState;
use super::port_id::PortId;
use super::registry::PortRegistry;
use super::router::Router;

/// Audio-rate block of samples.
pub type Block = Vec<f64>;

/// Rate class of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Rate {
    /// One value per control cycle.
    Scalar,
    /// One block of samples per control cycle.
    Block,
    /// One spectral frame per analysis hop.
    Frame,
}

impl Rate {
    /// Short lowercase name, used in logs and listings.
    pub const fn name(self) -> &'static str {
        match self {
            Rate::Scalar => "scalar",
            Rate::Block => "block",
            Rate::Frame => "frame",
        }
    }
}

/// A signal type that can travel through outlets and inlets.
///
/// Implemented for `f64` (scalar), [`Block`] and [`Frame`]. Each rate class has
/// its own registry inside a [`Router`].
pub trait PortSignal: Default + Send + Sync + Sized + 'static {
    /// Rate class of this signal.
    const RATE: Rate;

    /// Per-inlet aggregation state.
    type InletState: Default + Send + Sync;

    /// Selects this rate's registry within a router.
    #[doc(hidden)]
    fn registry(router: &Router) -> &Mutex<PortRegistry<Self>>;
}

/// A named publication point on one voice.
pub struct Outlet<S> {
    id: PortId,
    voice: Arc<Voice>,
    signal: RwLock<S>,
}

impl<S: PortSignal> Outlet<S> {
    /// Creates an outlet holding the default (silent) signal.
    pub fn new(id: PortId, voice: Arc<Voice>) -> Self {
        Self {
            id,
            voice,
            signal: RwLock::new(S::default()),
        }
    }

    /// Replaces the published signal.
    pub fn write(&self, value: S) {
        *self.signal.write() = value;
    }

    /// Mutates the published signal in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.signal.write())
    }

    /// Locks the published signal for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, S> {
        self.signal.read()
    }
}

impl<S> Outlet<S> {
    /// Returns the outlet's canonical identifier.
    #[inline]
    pub fn id(&self) -> &PortId {
        &self.id
    }

    /// Returns the owning voice.
    #[inline]
    pub fn voice(&self) -> &Arc<Voice> {
        &self.voice
    }

    /// Returns true if the owning voice is currently active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.voice.is_active()
    }
}

impl Outlet<f64> {
    /// Publishes a scalar value.
    #[inline]
    pub fn set(&self, value: f64) {
        *self.signal.write() = value;
    }

    /// Returns the published scalar value.
    #[inline]
    pub fn value(&self) -> f64 {
        *self.signal.read()
    }
}

impl Outlet<Block> {
    /// Publishes a block of samples, resizing the slot to match.
    pub fn write_block(&self, samples: &[f64]) {
        let mut block = self.signal.write();
        block.clear();
        block.extend_from_slice(samples);
    }
}

impl<S> core::fmt::Debug for Outlet<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Outlet")
            .field("id", &self.id)
            .field("voice", &self.voice.id())
            .field("active", &self.voice.is_active())
            .finish()
    }
}

/// Live, ordered set of outlets registered under one identifier.
///
/// Clones share the same storage; identity is the storage pointer.
pub struct Bucket<S>(Arc<RwLock<Vec<Arc<Outlet<S>>>>>);

impl<S> Bucket<S> {
    /// Creates an empty bucket.
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(Vec::new())))
    }

    /// Number of outlets currently in the bucket.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Returns true if no outlet has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Returns true if both handles refer to the same bucket.
    #[inline]
    pub fn same_bucket(&self, other: &Bucket<S>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Locks the outlet list for reading.
    #[inline]
    pub fn outlets(&self) -> RwLockReadGuard<'_, Vec<Arc<Outlet<S>>>> {
        self.0.read()
    }

    /// Returns true if this exact outlet instance is in the bucket.
    pub fn contains(&self, outlet: &Arc<Outlet<S>>) -> bool {
        self.0.read().iter().any(|o| Arc::ptr_eq(o, outlet))
    }

    /// Number of outlets whose voice is currently active.
    pub fn active_count(&self) -> usize {
        self.0.read().iter().filter(|o| o.is_active()).count()
    }

    /// Appends an outlet unless this exact instance is already present.
    pub(crate) fn insert(&self, outlet: Arc<Outlet<S>>) -> bool {
        let mut outlets = self.0.write();
        if outlets.iter().any(|o| Arc::ptr_eq(o, &outlet)) {
            return false;
        }
        outlets.push(outlet);
        true
    }
}

impl<S> Clone for Bucket<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S> Default for Bucket<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> core::fmt::Debug for Bucket<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}

/// One bound source bucket and the number of declarations that named it.
pub struct Binding<S> {
    bucket: Bucket<S>,
    declarations: u32,
}

impl<S> Binding<S> {
    /// The bound bucket.
    #[inline]
    pub fn bucket(&self) -> &Bucket<S> {
        &self.bucket
    }

    /// How many declarations resolved to this bucket.
    ///
    /// Each active outlet in the bucket contributes this many times to a
    /// scalar or block sum.
    #[inline]
    pub fn declarations(&self) -> u32 {
        self.declarations
    }
}

impl<S> core::fmt::Debug for Binding<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Binding")
            .field("outlets", &self.bucket.len())
            .field("declarations", &self.declarations)
            .finish()
    }
}

/// A named subscription point on one voice.
///
/// Bound buckets are fixed when the inlet is created; their contents are not.
pub struct Inlet<S: PortSignal> {
    id: PortId,
    voice: Arc<Voice>,
    pub(crate) bindings: Vec<Binding<S>>,
    pub(crate) state: S::InletState,
}

impl<S: PortSignal> Inlet<S> {
    /// Creates an inlet bound to nothing.
    pub fn new(id: PortId, voice: Arc<Voice>) -> Self {
        Self {
            id,
            voice,
            bindings: Vec::new(),
            state: S::InletState::default(),
        }
    }

    /// Binds a source bucket.
    ///
    /// A bucket already bound is not added again; its declaration count goes
    /// up instead and `false` is returned.
    pub fn bind(&mut self, bucket: Bucket<S>) -> bool {
        if let Some(existing) = self
            .bindings
            .iter_mut()
            .find(|b| b.bucket.same_bucket(&bucket))
        {
            existing.declarations += 1;
            return false;
        }
        self.bindings.push(Binding {
            bucket,
            declarations: 1,
        });
        true
    }

    /// Returns the inlet's canonical identifier.
    #[inline]
    pub fn id(&self) -> &PortId {
        &self.id
    }

    /// Returns the owning voice.
    #[inline]
    pub fn voice(&self) -> &Arc<Voice> {
        &self.voice
    }

    /// Returns the bindings in binding order.
    #[inline]
    pub fn bindings(&self) -> &[Binding<S>] {
        &self.bindings
    }

    /// Number of distinct bound buckets.
    #[inline]
    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of outlets across all bound buckets whose voice is active.
    pub fn active_source_count(&self) -> usize {
        self.bindings.iter().map(|b| b.bucket.active_count()).sum()
    }
}

impl<S: PortSignal> core::fmt::Debug for Inlet<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Inlet")
            .field("id", &self.id)
            .field("voice", &self.voice.id())
            .field("bound", &self.bindings.len())
            .finish()
    }
}

impl PortSignal for f64 {
    const RATE: Rate = Rate::Scalar;
    type InletState = ();

    fn registry(router: &Router) -> &Mutex<PortRegistry<Self>> {
        &router.scalar
    }
}

impl PortSignal for Block {
    const RATE: Rate = Rate::Block;
    type InletState = ();

    fn registry(router: &Router) -> &Mutex<PortRegistry<Self>> {
        &router.block
    }
}

impl PortSignal for Frame {
    const RATE: Rate = Rate::Frame;
    type InletState = Mutex<FrameMergeState>;

    fn registry(router: &Router) -> &Mutex<PortRegistry<Self>> {
        &router.frame
    }
}
