//! Dynamically typed opcode arguments.
//!
//! Port names, instrument names and table arguments arrive from the opcode
//! framework as either a literal string or a number. [`Arg`] carries that
//! choice; [`Field`] is the same choice once it has been frozen into an event
//! or table key, where it needs a total ordering.

use core::cmp::Ordering;
use core::fmt;

/// A literal-or-numeric argument as supplied by the calling opcode.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Numeric argument.
    Number(f64),
    /// String argument.
    Str(String),
}

impl Arg {
    /// Returns true if this argument slot carries a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Arg::Str(_))
    }

    /// Returns the numeric value, or `None` for string arguments.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Number(n) => Some(*n),
            Arg::Str(_) => None,
        }
    }

    /// Resolves the argument into a name.
    ///
    /// Strings are used verbatim; numbers are truncated to an integer and
    /// rendered in decimal, so `3.0` and `3.7` both name `"3"`.
    pub fn to_name(&self) -> String {
        match self {
            Arg::Str(s) => s.clone(),
            Arg::Number(n) => format!("{}", *n as i64),
        }
    }

    /// Freezes the argument into a comparable [`Field`].
    pub fn to_field(&self) -> Field {
        match self {
            Arg::Number(n) => Field::Number(*n),
            Arg::Str(s) => Field::Str(s.clone()),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Number(n)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Number(n) => write!(f, "{n}"),
            Arg::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// One field of an event record or table key.
///
/// Fields are totally ordered: any string sorts before any number, strings
/// compare lexicographically, numbers compare by [`f64::total_cmp`] with both
/// zeros treated as one value. Equality follows the ordering, so `NaN == NaN`
/// and `0.0 == -0.0`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Field {
    /// Numeric field.
    Number(f64),
    /// String-tagged field.
    Str(String),
}

impl Field {
    /// Returns true if the field carries the string marker.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Field::Str(_))
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Field::Str(a), Field::Str(b)) => a.cmp(b),
            (Field::Str(_), Field::Number(_)) => Ordering::Less,
            (Field::Number(_), Field::Str(_)) => Ordering::Greater,
            (Field::Number(a), Field::Number(b)) => {
                unsigned_zero(*a).total_cmp(&unsigned_zero(*b))
            }
        }
    }
}

// total_cmp orders -0.0 below 0.0; a table argument of either is the same request.
#[inline]
fn unsigned_zero(n: f64) -> f64 {
    if n == 0.0 { 0.0 } else { n }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Field {}

impl From<f64> for Field {
    fn from(n: f64) -> Self {
        Field::Number(n)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Str(s.to_string())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(n) => write!(f, "{n}"),
            Field::Str(s) => write!(f, "\"{s}\""),
        }
    }
}
