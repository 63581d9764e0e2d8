//! Synthesized score events and always-on activation.
//!
//! Processing instruments (mixers, effect buses) should run for the whole
//! performance without anyone writing a note for them. [`activate_always_on`]
//! builds the note-on that would otherwise have come from the score and hands
//! it to the engine's [`EventQueue`].

use crate::arg::{Arg, Field};
use crate::error::{HostError, RouteError};
use crate::voice::Voice;

/// Duration meaning "held until explicitly released".
pub const INDEFINITE_DURATION: f64 = -1.0;

/// Kind of a synthesized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventKind {
    /// Immediate note-on for an instrument.
    Note,
}

/// A fully populated event record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EventRecord {
    /// Event kind.
    pub kind: EventKind,
    /// Instrument to instantiate: a name, or a numeric identity.
    pub instrument: Field,
    /// Start time relative to insertion.
    pub start: f64,
    /// Duration, or [`INDEFINITE_DURATION`].
    pub duration: f64,
    /// Parameter fields following the fixed ones.
    pub params: Vec<f64>,
}

impl EventRecord {
    /// Returns true if the event holds until released.
    #[inline]
    pub fn is_indefinite(&self) -> bool {
        self.duration < 0.0
    }
}

/// Engine-side event insertion.
pub trait EventQueue {
    /// Schedules `event` to run `delay` seconds after the current cycle.
    fn insert_event(&mut self, event: EventRecord, delay: f64) -> Result<(), HostError>;
}

/// Collects events in submission order; the delay is discarded.
impl EventQueue for Vec<EventRecord> {
    fn insert_event(&mut self, event: EventRecord, _delay: f64) -> Result<(), HostError> {
        self.push(event);
        Ok(())
    }
}

/// Schedules an indefinite note-on for `instrument`, starting now.
///
/// A string `instrument` is sent by name. A numeric one is replaced by the
/// activating voice's own numeric identity. `extra` follows the fixed fields
/// unchanged and in order.
pub fn activate_always_on<Q>(
    instrument: &Arg,
    activating: &Voice,
    extra: &[f64],
    queue: &mut Q,
) -> Result<(), RouteError>
where
    Q: EventQueue + ?Sized,
{
    let target = match instrument {
        Arg::Str(name) => Field::Str(name.clone()),
        Arg::Number(_) => Field::Number(activating.p1()),
    };
    let event = EventRecord {
        kind: EventKind::Note,
        instrument: target,
        start: 0.0,
        duration: INDEFINITE_DURATION,
        params: extra.to_vec(),
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "always_on: {} with {} extra fields",
        event.instrument,
        event.params.len()
    );

    queue
        .insert_event(event, 0.0)
        .map_err(|source| RouteError::EventInsertion {
            instrument: instrument.to_name(),
            source,
        })
}
