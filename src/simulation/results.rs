// src/simulation/results.rs
use std::collections::BTreeMap;
use std::fmt;

/// Outcome frequencies returned by a backend.
///
/// Keys are classical-register readouts written highest bit first with a
/// space between bits, e.g. `"1 0 1"` for `c2=1, c1=0, c0=1`. Absent keys
/// have an implicit count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    outcomes: BTreeMap<String, u64>,
}

impl Counts {
    /// Creates an empty set of counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `key`.
    pub fn record(&mut self, key: impl Into<String>) {
        *self.outcomes.entry(key.into()).or_insert(0) += 1;
    }

    /// Sets the count of `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, count: u64) {
        self.outcomes.insert(key.into(), count);
    }

    /// Count of `key`, zero when the backend never reported it.
    pub fn get(&self, key: &str) -> u64 {
        self.outcomes.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Reported outcome keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }

    /// `(key, count)` pairs in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.outcomes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns `true` if no outcome was reported.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (key, count) in iter {
            counts.insert(key, count);
        }
        counts
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, count)) in self.outcomes.iter().enumerate() {
            write!(f, "{}'{}': {}", if i > 0 { ", " } else { "" }, key, count)?;
        }
        write!(f, "}}")
    }
}
