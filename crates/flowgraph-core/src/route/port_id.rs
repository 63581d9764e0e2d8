//! Canonical port identifiers.
//!
//! Every outlet and inlet is addressed as `owner:port`, where `owner` is the
//! name of the instrument template the voice was instantiated from. All voices
//! of one template therefore share the same identifiers, which is what lets a
//! single connection declaration fan out to every instance.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::arg::Arg;
use crate::voice::Voice;

/// Canonical `owner:port` routing key.
///
/// Cheap to clone; equal owner and port always produce equal identifiers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(Arc<str>);

impl PortId {
    /// Builds an identifier from an owner name and a port name.
    pub fn new(owner: &str, port: &str) -> Self {
        let mut id = String::with_capacity(owner.len() + port.len() + 1);
        id.push_str(owner);
        id.push(':');
        id.push_str(port);
        Self(id.into())
    }

    /// Builds an identifier from two resolved opcode arguments.
    pub fn from_args(owner: &Arg, port: &Arg) -> Self {
        Self::new(&owner.to_name(), &port.to_name())
    }

    /// Builds the identifier of a port declared on `voice`.
    pub fn for_voice(voice: &Voice, port: &Arg) -> Self {
        Self::new(&voice.template().owner_name(), &port.to_name())
    }

    /// Returns the full `owner:port` string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owner part.
    pub fn owner(&self) -> &str {
        self.0.split_once(':').map_or(self.as_str(), |(owner, _)| owner)
    }

    /// Returns the port part.
    pub fn port(&self) -> &str {
        self.0.split_once(':').map_or("", |(_, port)| port)
    }
}

impl Borrow<str> for PortId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    /// Wraps an already canonical `owner:port` string.
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortId({:?})", &*self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PortId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
