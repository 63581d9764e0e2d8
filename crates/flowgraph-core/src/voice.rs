//! Voice records shared between the engine and the router.
//!
//! A [`Voice`] is one live instantiation of an [`InstrumentTemplate`]. The
//! engine creates it, flips its active flag as the voice starts and retires,
//! and keeps it alive for the whole engine run. Outlets and inlets hold an
//! `Arc<Voice>`; the router never frees voice storage during a run, so liveness
//! is decided by [`Voice::is_active`] alone.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Engine-assigned identity of a voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VoiceId(pub u64);

impl core::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VoiceId({})", self.0)
    }
}

/// The instrument definition a voice was instantiated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentTemplate {
    /// Instrument number.
    pub number: u32,
    /// Instrument name, if the definition was named.
    pub name: Option<String>,
}

impl InstrumentTemplate {
    /// Creates an unnamed template.
    pub fn numbered(number: u32) -> Self {
        Self { number, name: None }
    }

    /// Creates a named template.
    pub fn named(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: Some(name.into()),
        }
    }

    /// Name used as the owner part of port identifiers.
    ///
    /// Unnamed templates fall back to their instrument number.
    pub fn owner_name(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(self.number.to_string()),
        }
    }
}

/// One live voice of an instrument template.
#[derive(Debug)]
pub struct Voice {
    id: VoiceId,
    template: Arc<InstrumentTemplate>,
    /// Numeric identity of the voice (its first event field).
    p1: f64,
    active: AtomicBool,
}

impl Voice {
    /// Creates an active voice whose numeric identity is the template number.
    pub fn new(id: VoiceId, template: InstrumentTemplate) -> Self {
        Self::shared(id, Arc::new(template))
    }

    /// Creates an active voice of an already shared template.
    pub fn shared(id: VoiceId, template: Arc<InstrumentTemplate>) -> Self {
        let p1 = template.number as f64;
        Self {
            id,
            template,
            p1,
            active: AtomicBool::new(true),
        }
    }

    /// Overrides the numeric identity (fractional instrument numbers).
    pub fn with_p1(mut self, p1: f64) -> Self {
        self.p1 = p1;
        self
    }

    /// Returns the engine-assigned voice identity.
    #[inline]
    pub fn id(&self) -> VoiceId {
        self.id
    }

    /// Returns the template this voice was instantiated from.
    #[inline]
    pub fn template(&self) -> &InstrumentTemplate {
        &self.template
    }

    /// Returns the voice's numeric identity.
    #[inline]
    pub fn p1(&self) -> f64 {
        self.p1
    }

    /// Returns true while the voice is being processed.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the voice active or retired.
    #[inline]
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_template_uses_number() {
        assert_eq!(InstrumentTemplate::numbered(12).owner_name(), "12");
        assert_eq!(InstrumentTemplate::named(12, "Pad").owner_name(), "Pad");
    }

    #[test]
    fn voices_start_active() {
        let voice = Voice::new(VoiceId(1), InstrumentTemplate::numbered(3));
        assert!(voice.is_active());
        voice.set_active(false);
        assert!(!voice.is_active());
    }

    #[test]
    fn p1_defaults_to_template_number() {
        let voice = Voice::new(VoiceId(1), InstrumentTemplate::numbered(3));
        assert_eq!(voice.p1(), 3.0);
        let voice = voice.with_p1(3.25);
        assert_eq!(voice.p1(), 3.25);
    }
}
