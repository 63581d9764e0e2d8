//! Patch files for flowgraph.
//!
//! A patch is the header of one engine run written down as TOML: which outlets
//! feed which inlets, which instruments run for the whole performance, and
//! which shared tables to build up front.
//!
//! # Features
//!
//! - **Patch format**: Load and save patches from TOML files
//! - **Validation**: Catch names that can never route and tables the memoizer
//!   would reject
//! - **Apply**: Run the header phase against a [`Router`](flowgraph_core::Router)
//!
//! # Example
//!
//! ```rust
//! use flowgraph_config::{AlwaysOnConfig, ConnectionConfig, Patch};
//! use flowgraph_core::{InstrumentTemplate, Router, Voice, VoiceId};
//!
//! let patch = Patch::new("Mixer")
//!     .with_connection(ConnectionConfig::new("Reverb", "out", "Master", "in"))
//!     .with_always_on(AlwaysOnConfig::new("Master"));
//!
//! let router = Router::new();
//! let header = Voice::new(VoiceId(0), InstrumentTemplate::numbered(0));
//! let mut events = Vec::new();
//! patch.apply(&router, &header, &mut events).unwrap();
//!
//! assert_eq!(router.sources("Master:in").len(), 1);
//! assert_eq!(events.len(), 1);
//! ```

mod error;
mod patch;

/// Patch validation.
pub mod validation;

pub use error::ConfigError;
pub use patch::{AlwaysOnConfig, ArgConfig, ConnectionConfig, Patch, TableConfig};
pub use validation::{ValidationError, ValidationResult, duplicate_connections, validate_patch};
