//! Named routing between voice outlets and inlets.
//!
//! The module is split along the lifetime of a route:
//!
//! - [`PortId`] names a port as `owner:port`.
//! - [`ConnectionDirectory`] records, before any voice exists, which outlet
//!   identifiers feed which inlet identifier.
//! - [`PortRegistry`] holds, per rate class, the live [`Bucket`] of outlets
//!   registered under each identifier.
//! - [`Router::inlet`] resolves declarations into bucket bindings once, when
//!   the inlet's voice initializes.
//! - The `aggregate` methods on [`Inlet`] read those buckets every cycle.
//!
//! # Rates
//!
//! | Signal    | Rate            | Aggregation                          |
//! |-----------|-----------------|--------------------------------------|
//! | `f64`     | [`Rate::Scalar`] | sum of active outlets               |
//! | [`Block`] | [`Rate::Block`]  | element-wise sum into a zeroed sink |
//! | [`Frame`](crate::Frame) | [`Rate::Frame`] | per-bin dominance merge |
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use flowgraph_core::{Block, InstrumentTemplate, Router, Voice, VoiceId};
//!
//! let router = Router::new();
//! router.connect(&"A".into(), &"out".into(), &"C".into(), &"in".into());
//! router.connect(&"B".into(), &"out".into(), &"C".into(), &"in".into());
//!
//! let c = Arc::new(Voice::new(VoiceId(3), InstrumentTemplate::named(3, "C")));
//! let input = router.inlet::<Block>(&c, &"in".into());
//!
//! for (n, name) in [(1, "A"), (2, "B")] {
//!     let voice = Arc::new(Voice::new(VoiceId(n), InstrumentTemplate::named(n as u32, name)));
//!     router.outlet::<Block>(&voice, &"out".into()).write_block(&[1.0; 4]);
//! }
//!
//! assert_eq!(input.aggregate_to_vec(4), vec![2.0; 4]);
//! ```

mod aggregate;
mod directory;
mod port;
mod port_id;
mod registry;
mod router;
mod snapshot;

pub use aggregate::FrameMergeState;
pub use directory::ConnectionDirectory;
pub use port::{Binding, Block, Bucket, Inlet, Outlet, PortSignal, Rate};
pub use port_id::PortId;
pub use registry::PortRegistry;
pub use router::{EngineId, EngineRouters, Router};
pub use snapshot::{
    ConnectionSnapshot, PortSnapshot, RegistrySnapshot, RouterSnapshot, TableSnapshot,
};
