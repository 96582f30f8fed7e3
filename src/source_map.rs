//! Mapping between ROM addresses and VM source lines.

use std::collections::HashMap;
use std::iter::FromIterator;

use itertools::Itertools;

/// Mapping from the ROM address of a generated instruction to the 1-based number of the VM
/// source line it was generated from.
///
/// Addresses count only instructions that occupy ROM, so they match the addresses the
/// assembler gives the same instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    inner: HashMap<usize, usize>,
}

impl FromIterator<(usize, usize)> for SourceMap {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        SourceMap {
            inner: HashMap::from_iter(iter),
        }
    }
}

impl SourceMap {
    /// Returns the source line which produced the instruction at the given ROM address.
    pub fn get_source_line(&self, addr: usize) -> Option<usize> {
        self.inner.get(&addr).copied()
    }

    /// All ROM addresses generated from `line`, in ascending order.
    pub fn addresses_of(&self, line: usize) -> Vec<usize> {
        self.inner
            .iter()
            .filter(|(_, l)| **l == line)
            .map(|(addr, _)| *addr)
            .sorted()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[test]
fn test_source_map() {
    let map: SourceMap = vec![(0, 3), (1, 3), (2, 5)].into_iter().collect();

    assert_eq!(map.get_source_line(1), Some(3));
    assert_eq!(map.get_source_line(7), None);
    assert_eq!(map.addresses_of(3), vec![0, 1]);
    assert_eq!(map.len(), 3);
}
