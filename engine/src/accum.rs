//! Per-pass accumulation of which years each destination needs.

use std::collections::{BTreeMap, BTreeSet};

/// One destination and the distinct years filed into it during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestNeeds {
    pub destination: String,
    pub years: BTreeSet<String>,
}

/// Collects `(destination, year)` pairs seen in an inbox.
///
/// Iteration yields each destination once, sorted by name, with its years
/// deduplicated and sorted.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    needs: BTreeMap<String, BTreeSet<String>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, destination: &str, year: &str) {
        self.needs
            .entry(destination.to_string())
            .or_default()
            .insert(year.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.needs.is_empty()
    }

    /// Number of distinct destinations.
    pub fn len(&self) -> usize {
        self.needs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = DestNeeds> + '_ {
        self.needs.iter().map(|(destination, years)| DestNeeds {
            destination: destination.clone(),
            years: years.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_destination_and_year_once() {
        let mut acc = Accumulator::new();
        acc.add("foo", "2016");
        acc.add("bar", "2016");
        acc.add("foo", "2015");
        acc.add("foo", "2016");

        let needs: Vec<DestNeeds> = acc.iter().collect();
        assert_eq!(needs.len(), 2);

        assert_eq!(needs[0].destination, "bar");
        assert_eq!(needs[0].years.iter().collect::<Vec<_>>(), vec!["2016"]);

        assert_eq!(needs[1].destination, "foo");
        assert_eq!(needs[1].years.iter().collect::<Vec<_>>(), vec!["2015", "2016"]);
    }

    #[test]
    fn test_iter_borrows_without_consuming() {
        let mut acc = Accumulator::new();
        assert!(acc.is_empty());
        acc.add("pge", "2020");

        assert_eq!(acc.iter().count(), 1);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.iter().next().map(|n| n.destination), Some("pge".to_string()));
    }
}
