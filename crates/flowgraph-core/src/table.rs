//! Shared function tables requested from inside instrument definitions.
//!
//! A voice that needs a lookup table describes it with a [`TableRequest`]. The
//! request is frozen into a [`TableKey`] (the full ordered argument vector)
//! and looked up in the run's [`TableCache`]. Equal keys always map to the same
//! [`TableHandle`]; any change to any argument, including the number of
//! arguments, produces a new table.

use std::collections::BTreeMap;

use crate::arg::{Arg, Field};
use crate::error::{HostError, RouteError};

/// Generator numbers that accept a string argument (sign ignored).
pub const STRING_GENS: [i64; 4] = [1, 23, 28, 43];

/// Engine-side number of a function table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableHandle(pub u32);

impl core::fmt::Display for TableHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "table {}", self.0)
    }
}

/// A table-generation request as issued by a voice.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRequest {
    /// Requested table number (`0` lets the engine choose).
    pub number: f64,
    /// Table size.
    pub size: f64,
    /// Generator number; negative suppresses rescaling.
    pub generator: f64,
    /// First generator argument: numeric, or a string for [`STRING_GENS`].
    pub arg: Arg,
    /// Remaining numeric generator arguments.
    pub extra: Vec<f64>,
}

impl TableRequest {
    /// Creates a request with no arguments beyond `arg`.
    pub fn new(number: f64, size: f64, generator: f64, arg: impl Into<Arg>) -> Self {
        Self {
            number,
            size,
            generator,
            arg: arg.into(),
            extra: Vec::new(),
        }
    }

    /// Appends numeric generator arguments.
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = f64>) -> Self {
        self.extra.extend(extra);
        self
    }

    /// Returns true if the string argument is allowed for this generator.
    pub fn allows_string(&self) -> bool {
        STRING_GENS.contains(&(self.generator as i64).abs())
    }

    /// Freezes the request into its canonical key.
    ///
    /// Fields are `[number, 0, size, generator, arg, extra...]`. The start-time
    /// slot is always zero and is kept so keys line up with table events.
    pub fn key(&self) -> Result<TableKey, RouteError> {
        if self.arg.is_string() && !self.allows_string() {
            return Err(RouteError::StringArgNotAllowed {
                generator: self.generator as i64,
            });
        }
        let mut fields = Vec::with_capacity(5 + self.extra.len());
        fields.push(Field::Number(self.number));
        fields.push(Field::Number(0.0));
        fields.push(Field::Number(self.size));
        fields.push(Field::Number(self.generator));
        fields.push(self.arg.to_field());
        fields.extend(self.extra.iter().copied().map(Field::Number));
        Ok(TableKey { fields })
    }
}

/// Canonical, totally ordered form of a [`TableRequest`].
///
/// Ordering compares field by field (see [`Field`]); when one key is a prefix
/// of the other the shorter key sorts first. Two keys are equal only if every
/// field and the field count match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableKey {
    fields: Vec<Field>,
}

impl TableKey {
    /// Builds a key directly from fields.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The ordered fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true for a key with no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The string argument, if the key carries one.
    pub fn string_arg(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            Field::Str(s) => Some(s.as_str()),
            Field::Number(_) => None,
        })
    }
}

/// Builds tables on behalf of the memoizer.
pub trait TableGenerator {
    /// Creates a new table for `key` and returns its handle.
    fn generate(&mut self, key: &TableKey) -> Result<TableHandle, HostError>;
}

impl<F> TableGenerator for F
where
    F: FnMut(&TableKey) -> Result<TableHandle, HostError>,
{
    fn generate(&mut self, key: &TableKey) -> Result<TableHandle, HostError> {
        self(key)
    }
}

/// Append-only map from request key to built table.
#[derive(Debug, Clone, Default)]
pub struct TableCache {
    entries: BTreeMap<TableKey, TableHandle>,
}

impl TableCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously built table.
    pub fn get(&self, key: &TableKey) -> Option<TableHandle> {
        self.entries.get(key).copied()
    }

    /// Returns the cached handle for `key`, generating and caching it on a miss.
    ///
    /// A generation failure leaves the cache unchanged.
    pub fn get_or_build(
        &mut self,
        key: TableKey,
        generator: &mut dyn TableGenerator,
    ) -> Result<TableHandle, RouteError> {
        if let Some(handle) = self.get(&key) {
            #[cfg(feature = "tracing")]
            tracing::info!("table_once: reusing existing {handle}");
            return Ok(handle);
        }
        let handle = generator
            .generate(&key)
            .map_err(|source| RouteError::TableGeneration { source })?;
        #[cfg(feature = "tracing")]
        tracing::info!("table_once: created new {handle}");
        self.entries.insert(key, handle);
        Ok(handle)
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates cached entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, TableHandle)> {
        self.entries.iter().map(|(k, h)| (k, *h))
    }

    /// Forgets every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_generator(calls: &mut u32) -> impl FnMut(&TableKey) -> Result<TableHandle, HostError> + '_ {
        move |_key| {
            *calls += 1;
            Ok(TableHandle(100 + *calls))
        }
    }

    #[test]
    fn key_layout() {
        let key = TableRequest::new(0.0, 1024.0, 10.0, 1.0)
            .with_extra([0.5])
            .key()
            .unwrap();
        assert_eq!(
            key.fields(),
            &[
                Field::Number(0.0),
                Field::Number(0.0),
                Field::Number(1024.0),
                Field::Number(10.0),
                Field::Number(1.0),
                Field::Number(0.5),
            ]
        );
    }

    #[test]
    fn string_arg_only_for_file_generators() {
        for generator in [1.0, -1.0, 23.0, 28.0, -43.0] {
            let key = TableRequest::new(0.0, 0.0, generator, "kick.wav").key().unwrap();
            assert_eq!(key.string_arg(), Some("kick.wav"));
        }
        let err = TableRequest::new(0.0, 1024.0, 10.0, "nope").key().unwrap_err();
        assert!(matches!(err, RouteError::StringArgNotAllowed { generator: 10 }));
    }

    #[test]
    fn shorter_prefix_sorts_first() {
        let short = TableRequest::new(0.0, 8.0, 7.0, 1.0).key().unwrap();
        let long = TableRequest::new(0.0, 8.0, 7.0, 1.0)
            .with_extra([0.0])
            .key()
            .unwrap();
        assert!(short < long);
        assert_ne!(short, long);
    }

    #[test]
    fn string_keys_compare_lexicographically() {
        let a = TableRequest::new(0.0, 0.0, 1.0, "a.wav").key().unwrap();
        let b = TableRequest::new(0.0, 0.0, 1.0, "b.wav").key().unwrap();
        let n = TableRequest::new(0.0, 0.0, 1.0, 5.0).key().unwrap();
        assert!(a < b);
        assert!(b < n);
    }

    #[test]
    fn cache_hits_skip_generation() {
        let mut calls = 0;
        let mut cache = TableCache::new();
        let key = TableRequest::new(0.0, 16.0, 10.0, 1.0).key().unwrap();
        {
            let mut generator = counting_generator(&mut calls);
            let first = cache.get_or_build(key.clone(), &mut generator).unwrap();
            let second = cache.get_or_build(key.clone(), &mut generator).unwrap();
            assert_eq!(first, second);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_generation_leaves_cache_untouched() {
        let mut cache = TableCache::new();
        let key = TableRequest::new(0.0, 16.0, 10.0, 1.0).key().unwrap();
        let mut failing = |_: &TableKey| -> Result<TableHandle, HostError> { Err("boom".into()) };
        let err = cache.get_or_build(key.clone(), &mut failing).unwrap_err();
        assert!(matches!(err, RouteError::TableGeneration { .. }));
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }
}
