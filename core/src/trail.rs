//! Diagnostic trail recorded during a decode attempt.

use serde::{Serialize, Serializer};

/// Ordered, human-readable record of every decision taken or rejected while
/// decoding one overload.
///
/// The trail is purely observational: nothing reads it back to make a
/// decision. Nested scopes (tuple windows, list items, union variants) are
/// rendered with two spaces of indentation per level. Serializes as a plain
/// list of strings.
///
/// # Examples
///
/// ```
/// use command_args_core::Trail;
///
/// let mut trail = Trail::new();
/// trail.note("trying variant 1/2");
/// trail.nested(|inner| inner.note("matched `unit` with \"EX\""));
/// assert_eq!(trail.entries(), ["trying variant 1/2", "  matched `unit` with \"EX\""]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trail {
    entries: Vec<String>,
    depth: usize,
}

impl Trail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trail whose first entry is `header`.
    pub fn with_header(header: impl Into<String>) -> Self {
        let mut trail = Self::new();
        trail.note(header);
        trail
    }

    /// Appends an entry at the current nesting depth.
    pub fn note(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if self.depth == 0 {
            self.entries.push(entry);
        } else {
            self.entries
                .push(format!("{}{entry}", "  ".repeat(self.depth)));
        }
    }

    /// Runs `f` with entries indented one level deeper.
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Trail) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Recorded entries, in order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Consumes the trail, returning its entries.
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if any entry contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(needle))
    }
}

impl Serialize for Trail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
