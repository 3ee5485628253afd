//! Deterministic ordering of containers
//!
//! Containers are compared trait by trait in declaration order, id first,
//! then nested containers. An unset trait sorts before a set one; two set
//! traits compare by their presentation text.

use crate::container::TraitContainer;
use crate::error::{Result, TraitError};
use std::cmp::Ordering;

/// How presentation text is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderPolicy {
    /// Byte-wise string comparison
    #[default]
    Ordinal,
    /// Digit runs compare by numeric value, so `Count=9` sorts before `Count=10`
    Numeric,
}

/// Total order over containers of one schema
#[derive(Debug, Clone, Copy, Default)]
pub struct TraitComparer {
    policy: OrderPolicy,
}

impl TraitComparer {
    /// Byte-wise text comparison
    pub const ORDINAL: Self = Self::new(OrderPolicy::Ordinal);

    /// Numeric-aware text comparison
    pub const NUMERIC: Self = Self::new(OrderPolicy::Numeric);

    /// Comparer with the given policy
    pub const fn new(policy: OrderPolicy) -> Self {
        Self { policy }
    }

    /// Policy in use
    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Compare two containers.
    ///
    /// Fails with `SchemaMismatch` when the schemas differ.
    pub fn compare(&self, a: &TraitContainer, b: &TraitContainer) -> Result<Ordering> {
        if std::ptr::eq(a, b) {
            return Ok(Ordering::Equal);
        }
        if !a.schema().is(b.schema()) {
            return Err(TraitError::SchemaMismatch {
                expected: a.schema().name(),
                found: b.schema().name(),
            });
        }
        Ok(self.compare_same(a, b))
    }

    /// Whether two containers compare equal
    pub fn equivalent(&self, a: &TraitContainer, b: &TraitContainer) -> Result<bool> {
        Ok(self.compare(a, b)? == Ordering::Equal)
    }

    fn compare_same(&self, a: &TraitContainer, b: &TraitContainer) -> Ordering {
        for slot in 0..a.schema().values().len() {
            let ordering = match (a.value(slot), b.value(slot)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => self.compare_text(&x.present(), &y.present()),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.children()
            .iter()
            .zip(b.children())
            .map(|(x, y)| self.compare_same(x, y))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Compare two presentation strings under this policy
    pub fn compare_text(&self, x: &str, y: &str) -> Ordering {
        match self.policy {
            OrderPolicy::Ordinal => x.cmp(y),
            OrderPolicy::Numeric => numeric_cmp(x, y).then_with(|| x.cmp(y)),
        }
    }

    /// Sort containers in place. All of them must share one schema.
    pub fn sort<T: AsRef<TraitContainer>>(&self, items: &mut [T]) -> Result<()> {
        ensure_one_schema(items)?;
        items.sort_by(|a, b| self.compare_same(a.as_ref(), b.as_ref()));
        Ok(())
    }

    /// Drop containers equivalent to an earlier one, keeping first occurrences
    pub fn dedup<T: AsRef<TraitContainer>>(&self, items: Vec<T>) -> Result<Vec<T>> {
        ensure_one_schema(&items)?;
        let mut kept: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            let duplicate = kept
                .iter()
                .any(|seen| self.compare_same(seen.as_ref(), item.as_ref()) == Ordering::Equal);
            if !duplicate {
                kept.push(item);
            }
        }
        Ok(kept)
    }
}

fn ensure_one_schema<T: AsRef<TraitContainer>>(items: &[T]) -> Result<()> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let schema = first.as_ref().schema();
    match items.iter().find(|item| !item.as_ref().schema().is(schema)) {
        Some(other) => Err(TraitError::SchemaMismatch {
            expected: schema.name(),
            found: other.as_ref().schema().name(),
        }),
        None => Ok(()),
    }
}

/// Natural string order: runs of ASCII digits compare by numeric value,
/// ignoring leading zeros; everything else compares character by character.
pub fn numeric_cmp(x: &str, y: &str) -> Ordering {
    let x: Vec<char> = x.chars().collect();
    let y: Vec<char> = y.chars().collect();
    let (mut i, mut j) = (0, 0);

    while i < x.len() && j < y.len() {
        if !x[i].is_ascii_digit() || !y[j].is_ascii_digit() {
            match x[i].cmp(&y[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    continue;
                }
                ordering => return ordering,
            }
        }

        let x_start = skip_zeros(&x, i);
        let y_start = skip_zeros(&y, j);
        let x_end = digits_end(&x, x_start);
        let y_end = digits_end(&y, y_start);

        let ordering = (x_end - x_start)
            .cmp(&(y_end - y_start))
            .then_with(|| x[x_start..x_end].cmp(&y[y_start..y_end]));
        if ordering != Ordering::Equal {
            return ordering;
        }
        i = x_end;
        j = y_end;
    }

    (x.len() - i).cmp(&(y.len() - j))
}

fn skip_zeros(chars: &[char], mut at: usize) -> usize {
    while at < chars.len() && chars[at] == '0' {
        at += 1;
    }
    at
}

fn digits_end(chars: &[char], mut at: usize) -> usize {
    while at < chars.len() && chars[at].is_ascii_digit() {
        at += 1;
    }
    at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::testing::{Inner, Probe};

    fn probe_with_count(count: u32) -> Probe {
        let mut probe = Probe::new();
        probe.set_count(count).unwrap();
        probe
    }

    #[test]
    fn test_numeric_cmp() {
        assert_eq!(numeric_cmp("Count=9", "Count=10"), Ordering::Less);
        assert_eq!(numeric_cmp("a2b", "a10b"), Ordering::Less);
        assert_eq!(numeric_cmp("007", "7"), Ordering::Equal);
        assert_eq!(numeric_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(numeric_cmp("ab", "abc"), Ordering::Less);
        assert_eq!(numeric_cmp("x10", "x9"), Ordering::Greater);
    }

    #[test]
    fn test_ordinal_vs_numeric_policy() {
        let nine = probe_with_count(9);
        let ten = probe_with_count(10);
        assert_eq!(
            TraitComparer::ORDINAL.compare(nine.as_ref(), ten.as_ref()).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            TraitComparer::NUMERIC.compare(nine.as_ref(), ten.as_ref()).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_numeric_policy_is_total() {
        assert_eq!(
            TraitComparer::NUMERIC.compare_text("07", "7"),
            Ordering::Less
        );
    }

    #[test]
    fn test_unset_sorts_first() {
        let plain = Probe::new();
        let set = probe_with_count(0);
        assert_eq!(
            TraitComparer::ORDINAL.compare(plain.as_ref(), set.as_ref()).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_id_participates() {
        let mut a = probe_with_count(1);
        a.set_id("A").unwrap();
        let mut b = probe_with_count(1);
        b.set_id("B").unwrap();
        assert!(!TraitComparer::ORDINAL.equivalent(a.as_ref(), b.as_ref()).unwrap());
    }

    #[test]
    fn test_nested_traits_break_ties() {
        let mut a = probe_with_count(1);
        let mut b = probe_with_count(1);
        Inner::LEVEL.set(&mut a, 1).unwrap();
        Inner::LEVEL.set(&mut b, 2).unwrap();
        assert_eq!(
            TraitComparer::ORDINAL.compare(a.as_ref(), b.as_ref()).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_schema_mismatch() {
        let probe = Probe::new();
        let inner = Inner::new();
        assert!(matches!(
            TraitComparer::ORDINAL.compare(probe.as_ref(), inner.as_ref()),
            Err(TraitError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_sort_and_dedup() {
        let comparer = TraitComparer::NUMERIC;
        let mut items = vec![
            probe_with_count(10),
            probe_with_count(2),
            Probe::new(),
            probe_with_count(2),
        ];
        comparer.sort(&mut items).unwrap();
        let counts: Vec<_> = items.iter().map(|p| Probe::COUNT.explicit(p)).collect();
        assert_eq!(counts, [None, Some(2), Some(2), Some(10)]);

        let unique = comparer.dedup(items).unwrap();
        assert_eq!(unique.len(), 3);
    }
}
