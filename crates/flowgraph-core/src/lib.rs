//! Flowgraph Core - named signal-flow routing between synthesis voices
//!
//! Instrument voices publish signals under named *outlets*; other voices
//! subscribe through named *inlets*. Connections are declared once, by name,
//! before any voice exists. When a voice initializes an inlet, the router binds
//! it to the live outlet buckets of every declared source, and on every cycle
//! the inlet sums (or, for spectral frames, merges) whatever active outlets
//! those buckets hold at that moment.
//!
//! # Core Abstractions
//!
//! ## Routing
//!
//! - [`Router`] - Per-engine routing context: registries, connections, table cache
//! - [`EngineRouters`] - Engine identity to router map with one-pass teardown
//! - [`PortId`] - Canonical `owner:port` identifier
//! - [`Outlet`] / [`Inlet`] - Per-voice publication and subscription points
//! - [`Bucket`] - Live set of outlets registered under one identifier
//!
//! ## Signals
//!
//! - `f64` - Scalar (control-rate) signal
//! - [`Block`] - Audio-rate block of samples
//! - [`Frame`] - Spectral analysis frame, merged by bin dominance
//!
//! ## Utilities
//!
//! - [`activate_always_on`] - Indefinite note-on for a named instrument
//! - [`TableRequest`] / [`TableKey`] - Memoized shared-table requests
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use flowgraph_core::{Arg, InstrumentTemplate, Router, Voice, VoiceId};
//!
//! let router = Router::new();
//! router.connect(&"Reverb".into(), &"out".into(), &"Master".into(), &"in".into());
//!
//! let reverb = Arc::new(Voice::new(VoiceId(1), InstrumentTemplate::named(10, "Reverb")));
//! let master = Arc::new(Voice::new(VoiceId(2), InstrumentTemplate::named(20, "Master")));
//!
//! let out = router.outlet::<f64>(&reverb, &Arg::from("out"));
//! let input = router.inlet::<f64>(&master, &Arg::from("in"));
//!
//! out.set(0.25);
//! assert_eq!(input.aggregate(), 0.25);
//!
//! reverb.set_active(false);
//! assert_eq!(input.aggregate(), 0.0);
//! ```
//!
//! # Design Principles
//!
//! - **Explicit context**: all state lives in a [`Router`] owned per engine run
//! - **Liveness by flag**: retired voices drop out of a mix through their active
//!   flag, never by unbinding
//! - **Infallible hot path**: scalar and block aggregation cannot fail

pub mod arg;
pub mod error;
pub mod event;
pub mod frame;
pub mod route;
pub mod table;
pub mod voice;

pub use arg::{Arg, Field};
pub use error::{HostError, RouteError};
pub use event::{EventKind, EventQueue, EventRecord, INDEFINITE_DURATION, activate_always_on};
pub use frame::{Frame, FrameFormat, FrameLayout, WindowType};
pub use route::{
    Binding, Block, Bucket, ConnectionDirectory, EngineId, EngineRouters, Inlet, Outlet, PortId,
    PortRegistry, PortSignal, Rate, Router, RouterSnapshot,
};
pub use table::{STRING_GENS, TableCache, TableGenerator, TableHandle, TableKey, TableRequest};
pub use voice::{InstrumentTemplate, Voice, VoiceId};
