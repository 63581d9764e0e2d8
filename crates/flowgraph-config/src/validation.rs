//! Patch validation.
//!
//! Checks a [`Patch`] for mistakes the router itself would accept silently:
//! empty or malformed names that can never match a voice, a zero block size,
//! and tables whose string argument the memoizer would reject at run time.
//!
//! Repeated connections are legal (each repetition adds the source once more)
//! and are reported separately by [`duplicate_connections`].
//!
//! # Example
//!
//! ```rust
//! use flowgraph_config::{ConnectionConfig, Patch, validate_patch};
//!
//! let patch = Patch::new("Mixer")
//!     .with_connection(ConnectionConfig::new("Reverb", "out", "Master", "in"));
//! validate_patch(&patch).expect("patch should be valid");
//! ```

use flowgraph_core::PortId;
use thiserror::Error;

use crate::patch::{ArgConfig, Patch};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The patch has no name.
    #[error("patch name is empty")]
    EmptyPatchName,

    /// Block size of zero.
    #[error("block size must be greater than zero")]
    ZeroBlockSize,

    /// A connection names an empty instrument or port.
    #[error("connection {index}: {field} is empty")]
    EmptyName {
        /// Position of the connection in the patch.
        index: usize,
        /// Which field is empty.
        field: &'static str,
    },

    /// An instrument name contains the identifier separator.
    #[error("connection {index}: {field} '{name}' must not contain ':'")]
    SeparatorInName {
        /// Position of the connection in the patch.
        index: usize,
        /// Which field holds the name.
        field: &'static str,
        /// The offending name.
        name: String,
    },

    /// An always-on entry names an empty instrument.
    #[error("always-on {index}: instrument is empty")]
    EmptyInstrument {
        /// Position of the entry in the patch.
        index: usize,
    },

    /// A table declares a string argument its generator does not accept.
    #[error("table {index}: generator {generator} does not accept a file argument")]
    FileNotAllowed {
        /// Position of the table in the patch.
        index: usize,
        /// Generator number.
        generator: i64,
    },

    /// A table has a negative size.
    #[error("table {index}: size {size} is negative")]
    NegativeTableSize {
        /// Position of the table in the patch.
        index: usize,
        /// The declared size.
        size: f64,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_name(
    errors: &mut Vec<ValidationError>,
    index: usize,
    field: &'static str,
    value: &ArgConfig,
    owner: bool,
) {
    let ArgConfig::Text(name) = value else {
        return;
    };
    if name.is_empty() {
        errors.push(ValidationError::EmptyName { index, field });
    } else if owner && name.contains(':') {
        errors.push(ValidationError::SeparatorInName {
            index,
            field,
            name: name.clone(),
        });
    }
}

/// Validate a whole patch.
///
/// Every problem is collected; a single problem is returned as itself, several
/// as [`ValidationError::Multiple`].
pub fn validate_patch(patch: &Patch) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if patch.name.trim().is_empty() {
        errors.push(ValidationError::EmptyPatchName);
    }
    if patch.block_size == 0 {
        errors.push(ValidationError::ZeroBlockSize);
    }

    for (index, connection) in patch.connections.iter().enumerate() {
        check_name(&mut errors, index, "source", &connection.source, true);
        check_name(&mut errors, index, "outlet", &connection.outlet, false);
        check_name(&mut errors, index, "sink", &connection.sink, true);
        check_name(&mut errors, index, "inlet", &connection.inlet, false);
    }

    for (index, always_on) in patch.always_on.iter().enumerate() {
        if matches!(&always_on.instrument, ArgConfig::Text(name) if name.is_empty()) {
            errors.push(ValidationError::EmptyInstrument { index });
        }
    }

    for (index, table) in patch.tables.iter().enumerate() {
        if table.size < 0.0 {
            errors.push(ValidationError::NegativeTableSize {
                index,
                size: table.size,
            });
        }
        if table.file.is_some() && !table.to_request().allows_string() {
            errors.push(ValidationError::FileNotAllowed {
                index,
                generator: table.generator as i64,
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Connections declared more than once, as `(sink, source, count)`.
///
/// Sorted by sink, then source.
pub fn duplicate_connections(patch: &Patch) -> Vec<(PortId, PortId, usize)> {
    let mut counts: std::collections::BTreeMap<(PortId, PortId), usize> =
        std::collections::BTreeMap::new();
    for (sink, source) in patch.routes() {
        *counts.entry((sink, source)).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|((sink, source), count)| (sink, source, count))
        .collect()
}
