//! Error types for routing operations.
//!
//! Every error here is voice-scoped: it aborts the setup of the voice that
//! triggered it and never the engine. Silent degenerate cases (unknown
//! identifiers, empty buckets, inactive sources) are not errors at all.

use thiserror::Error;

use crate::frame::FrameFormat;
use crate::route::PortId;

/// Failure reported by an external collaborator (event queue, table generator).
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while initializing routing state for a voice.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A frame inlet adopted a source format it cannot merge.
    #[error("inlet '{inlet}': frame format must be amp-phase or amp-freq, got {format:?}")]
    UnsupportedFrameFormat {
        /// Inlet that rejected the source.
        inlet: PortId,
        /// Format reported by the first active source.
        format: FrameFormat,
    },

    /// A string argument was supplied to a table generator that cannot take one.
    #[error("table generator {generator} does not accept a string argument")]
    StringArgNotAllowed {
        /// Requested generator number (sign preserved).
        generator: i64,
    },

    /// The table-generation collaborator failed.
    #[error("table generation failed: {source}")]
    TableGeneration {
        /// Underlying collaborator error.
        #[source]
        source: HostError,
    },

    /// The event-insertion collaborator refused an event.
    #[error("failed to schedule always-on event for '{instrument}': {source}")]
    EventInsertion {
        /// Instrument the event was meant to activate.
        instrument: String,
        /// Underlying collaborator error.
        #[source]
        source: HostError,
    },
}
