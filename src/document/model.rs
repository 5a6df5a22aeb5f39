/*!
 * Typed document model for parsed TextGrid files.
 *
 * A `Document` owns its tiers and each `Tier` owns its intervals. Every
 * attribute value is kept as the raw string read from the file; numeric
 * interpretation is left to whoever consumes the exported tables.
 */

use serde::Serialize;
use std::collections::BTreeMap;

/// Insertion-ordered string attributes.
///
/// Setting a key that already exists overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute list
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any earlier value for the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by exact key. `Some("")` is an empty value, `None` is absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Attribute keys the exporter looks up
pub mod keys {
    pub const FILE_TYPE: &str = "File type";
    pub const OBJECT_CLASS: &str = "Object class";
    pub const XMIN: &str = "xmin";
    pub const XMAX: &str = "xmax";
    pub const SIZE: &str = "size";
    pub const NAME: &str = "name";
    pub const TEXT: &str = "text";
}

/// A single time-bounded, text-bearing unit within a tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub attributes: Attributes,
}

impl Interval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<&str> {
        self.attributes.get(keys::XMIN)
    }

    pub fn end(&self) -> Option<&str> {
        self.attributes.get(keys::XMAX)
    }

    pub fn text(&self) -> Option<&str> {
        self.attributes.get(keys::TEXT)
    }
}

/// A named, ordered collection of intervals (an `item` in the file)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub attributes: Attributes,

    /// Count announced by the `intervals: size = N` marker, if one was seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_interval_count: Option<usize>,

    /// Intervals keyed by their 1-based index from the file
    pub intervals: BTreeMap<usize, Interval>,
}

impl Tier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get(keys::NAME)
    }

    pub fn interval(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(&index)
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }
}

/// A line the lenient parser skipped, with the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

/// Parsed representation of one annotation file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Root attributes such as file type, object class and global time range
    pub attributes: Attributes,

    /// Tiers keyed by their 1-based index from the file
    pub tiers: BTreeMap<usize, Tier>,

    /// Lines dropped by a lenient parse; always empty after a strict parse
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self, index: usize) -> Option<&Tier> {
        self.tiers.get(&index)
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Total number of intervals across all tiers
    pub fn interval_count(&self) -> usize {
        self.tiers.values().map(Tier::interval_count).sum()
    }
}
