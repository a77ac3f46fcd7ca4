//! Phonological context patterns and resolved matches.

use std::fmt;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// A resolved environment match: the specific middle symbol, its position
/// in the unpadded transcription, and the concrete left/right symbol
/// subsequences that satisfied the filter there.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Environment {
    middle: SmolStr,
    position: usize,
    left: Vec<SmolStr>,
    right: Vec<SmolStr>,
}

impl Environment {
    pub fn new(
        middle: impl Into<SmolStr>,
        position: usize,
        left: Vec<SmolStr>,
        right: Vec<SmolStr>,
    ) -> Self {
        Self {
            middle: middle.into(),
            position,
            left,
            right,
        }
    }

    pub fn middle(&self) -> &str {
        &self.middle
    }

    /// Index of the middle symbol in the unpadded transcription.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn left(&self) -> &[SmolStr] {
        &self.left
    }

    pub fn right(&self) -> &[SmolStr] {
        &self.right
    }

    /// Total window width: left context + middle + right context.
    pub fn len(&self) -> usize {
        self.left.len() + 1 + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.left {
            f.write_str(s)?;
        }
        f.write_str("_")?;
        for s in &self.right {
            f.write_str(s)?;
        }
        Ok(())
    }
}

/// A context pattern: an ordered left-context window, a middle symbol set,
/// and an ordered right-context window.
///
/// Every context slot is normalized to a set at construction; slot order is
/// significant but membership within a slot is not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentFilter {
    middle: FxHashSet<SmolStr>,
    lhs: Vec<FxHashSet<SmolStr>>,
    rhs: Vec<FxHashSet<SmolStr>>,
}

impl EnvironmentFilter {
    pub fn new<M, L, R, S>(middle: M, lhs: L, rhs: R) -> Self
    where
        S: Into<SmolStr>,
        M: IntoIterator<Item = S>,
        L: IntoIterator,
        L::Item: IntoIterator<Item = S>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
    {
        Self {
            middle: middle.into_iter().map(Into::into).collect(),
            lhs: lhs
                .into_iter()
                .map(|slot| slot.into_iter().map(Into::into).collect())
                .collect(),
            rhs: rhs
                .into_iter()
                .map(|slot| slot.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// A filter with no context, matching a bare symbol set.
    pub fn target<S: Into<SmolStr>>(middle: impl IntoIterator<Item = S>) -> Self {
        Self::new(middle, Vec::<Vec<S>>::new(), Vec::<Vec<S>>::new())
    }

    pub fn middle(&self) -> &FxHashSet<SmolStr> {
        &self.middle
    }

    pub fn lhs(&self) -> &[FxHashSet<SmolStr>] {
        &self.lhs
    }

    pub fn rhs(&self) -> &[FxHashSet<SmolStr>] {
        &self.rhs
    }

    pub fn lhs_len(&self) -> usize {
        self.lhs.len()
    }

    pub fn rhs_len(&self) -> usize {
        self.rhs.len()
    }

    /// Window width this filter matches against.
    pub fn len(&self) -> usize {
        self.lhs.len() + 1 + self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether a sequence is long enough to contain a matching window.
    pub fn is_applicable(&self, sequence_len: usize) -> bool {
        sequence_len >= self.len()
    }

    /// Positional membership test: the window symbol at every offset must be
    /// a member of the corresponding context set.
    pub fn matches(&self, window: &[SmolStr]) -> bool {
        if window.len() != self.len() {
            return false;
        }
        self.slots()
            .zip(window)
            .all(|(slot, symbol)| slot.contains(symbol))
    }

    fn slots(&self) -> impl Iterator<Item = &FxHashSet<SmolStr>> {
        self.lhs
            .iter()
            .chain(std::iter::once(&self.middle))
            .chain(self.rhs.iter())
    }
}

impl fmt::Display for EnvironmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_side = |f: &mut fmt::Formatter<'_>, side: &[FxHashSet<SmolStr>]| {
            for slot in side {
                let mut symbols: Vec<&str> = slot.iter().map(|s| s.as_str()).collect();
                symbols.sort_unstable();
                write!(f, "{{{}}}", symbols.join(","))?;
            }
            Ok(())
        };
        write_side(f, &self.lhs)?;
        f.write_str("_")?;
        write_side(f, &self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_length() {
        let filter = EnvironmentFilter::new(["a"], [vec!["p"]], [vec!["t"], vec!["s"]]);
        assert_eq!(filter.len(), 4);
        assert_eq!(filter.lhs_len(), 1);
        assert_eq!(filter.rhs_len(), 2);
    }

    #[test]
    fn test_slots_are_deduplicated_sets() {
        let filter = EnvironmentFilter::target(["a", "a", "e"]);
        assert_eq!(filter.middle().len(), 2);
    }

    #[test]
    fn test_window_matching() {
        let filter = EnvironmentFilter::new(["a"], [vec!["p", "b"]], [vec!["t"]]);
        let window = |syms: &[&str]| syms.iter().map(|&s| SmolStr::from(s)).collect::<Vec<_>>();
        assert!(filter.matches(&window(&["p", "a", "t"])));
        assert!(filter.matches(&window(&["b", "a", "t"])));
        assert!(!filter.matches(&window(&["k", "a", "t"])));
        assert!(!filter.matches(&window(&["p", "a"])));
    }

    #[test]
    fn test_display() {
        let filter = EnvironmentFilter::new(["a"], [vec!["p", "b"]], [vec!["t"]]);
        assert_eq!(filter.to_string(), "{b,p}_{t}");
    }
}
