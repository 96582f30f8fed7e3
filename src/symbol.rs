//! Allocation of unique branch labels.
//!
//! Boolean comparisons are translated into a conditional jump over the "false" write, and every
//! such jump needs a label that no other part of the output uses. A [SymbolAllocator] hands out
//! labels of the form `name.N` where `N` comes from a counter shared by every caller of the
//! allocator.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Base name used when the caller does not supply one.
pub const DEFAULT_BASE: &str = "symbol";

/// A label produced by a [SymbolAllocator]. Renders as `base.index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    base: String,
    index: usize,
}

impl Label {
    /// The base name the label was requested with.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The counter value that was consumed by this label.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.base, self.index)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> String {
        label.to_string()
    }
}

/// Hands out labels that are unique for the lifetime of the allocator.
///
/// The counter is incremented on every allocation regardless of the base name, so two labels
/// never share an index. The counter is atomic and [allocate](SymbolAllocator::allocate) only
/// needs a shared reference, which lets a single allocator serve translations running on
/// several threads.
#[derive(Debug, Default)]
pub struct SymbolAllocator {
    counter: AtomicUsize,
}

impl SymbolAllocator {
    /// Creates an allocator whose first label has index 0.
    pub fn new() -> SymbolAllocator {
        SymbolAllocator::starting_at(0)
    }

    /// Creates an allocator whose first label has index `start`.
    pub fn starting_at(start: usize) -> SymbolAllocator {
        SymbolAllocator {
            counter: AtomicUsize::new(start),
        }
    }

    /// Returns `base.N` and advances the counter.
    ///
    /// # Parameters
    /// - `base`: The base name of the label. [DEFAULT_BASE] is used for `None`.
    pub fn allocate<'a, B>(&self, base: B) -> Label
    where
        B: Into<Option<&'a str>>,
    {
        let base = base.into().unwrap_or(DEFAULT_BASE);
        let index = self.counter.fetch_add(1, Ordering::SeqCst);

        Label {
            base: base.to_string(),
            index,
        }
    }

    /// The index the next allocated label will receive.
    pub fn peek(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}
