//! Maximal refinement chains of partitions of {1..n}.
//!
//! A maximal chain has n entries, from the trivial partition down to all
//! singletons, each entry dividing exactly one part of its predecessor in
//! two. Exactly one new batch of element pairs comes apart at every depth,
//! so `split_depth` is total over pairs; `pushed_down` slides one pair's
//! separation a level later while leaving every other entry's parts
//! untouched, which is the elementary move of the path search built on
//! top of this crate.

use std::{
    collections::BTreeSet, fmt, fmt::Write as _, num::ParseIntError,
    ops::Index, rc::Rc, str::FromStr,
};

use partition::{Canonical, Elem, Partition};
use thiserror::Error;

/// An ordered maximal chain of partitions.
///
/// Cloning is cheap: entries are shared handles, and `pushed_down`
/// returns a chain sharing every entry it did not rebuild.
#[derive(Clone, PartialEq, Eq)]
pub struct Chain {
    entries: Vec<Partition>,
}

impl Chain {
    /// Wraps a sequence of partitions forming a maximal chain.
    pub fn new(entries: Vec<Partition>) -> Self {
        assert!(!entries.is_empty(), "a chain has at least one entry");
        assert_eq!(
            entries.len(),
            entries[0].len(),
            "a maximal chain on n elements has n entries"
        );
        Self { entries }
    }

    /// The number of entries, which equals the number of elements n.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Partition> {
        self.entries.iter()
    }

    /// The smallest depth whose split separates `i` and `j`, or `None`
    /// if they never separate. `None` cannot occur on a well-formed
    /// maximal chain with valid `i != j`; callers treat it as an
    /// invariant violation.
    pub fn split_depth(&self, i: Elem, j: Elem) -> Option<usize> {
        self.entries.iter().position(|p| p.splits(i, j))
    }

    /// Analytic worst-case lower bound (n-2)(n-1)/2 on the length of a
    /// connecting path between chains of size n. Reporting only; nothing
    /// is enforced against it.
    pub fn min_dist_lb(n: usize) -> usize {
        n.saturating_sub(2) * n.saturating_sub(1) / 2
    }

    /// A chain in which the split separating `i` and `j` happens at depth
    /// `d + 1` instead of `d`, with every entry's parts outside index `d`
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if entry `d` does not currently separate `i` and `j`, or if
    /// the rebuilt entry at `d + 1` fails to reproduce the original
    /// partition there. The latter is a defect in the transformation and
    /// aborts rather than returning a wrong chain.
    pub fn pushed_down(&self, d: usize, i: Elem, j: Elem) -> Chain {
        assert!(
            self.entries[d].splits(i, j),
            "entry {d} does not separate {i} and {j}"
        );
        let (fst, snd) = swapped(&self.entries[d], &self.entries[d + 1], i, j);
        assert!(
            snd == self.entries[d + 1],
            "push-down changed the partition at depth {}",
            d + 1
        );
        let mut entries = self.entries.clone();
        entries[d] = fst;
        entries[d + 1] = snd;
        Chain { entries }
    }

    /// Renders with "." between elements regardless of n; the only
    /// format `FromStr` accepts back.
    pub fn canonical(&self) -> String {
        let mut s = String::new();
        for (d, p) in self.entries.iter().enumerate() {
            if d > 0 {
                s.push_str(" -> ");
            }
            let _ = write!(s, "{}", Canonical(p));
        }
        s
    }
}

impl Index<usize> for Chain {
    type Output = Partition;
    fn index(&self, d: usize) -> &Partition {
        &self.entries[d]
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (d, p) in self.entries.iter().enumerate() {
            if d > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// `fst` is the entry where i and j come apart. Rebuilds (fst, snd) so
// that the separation happens in snd instead, with snd's parts unchanged.
fn swapped(
    fst: &Partition,
    snd: &Partition,
    i: Elem,
    j: Elem,
) -> (Partition, Partition) {
    let s1 = fst.as_split().expect("depth 0 separates nothing");
    let s2 = snd.as_split().expect("depth 0 separates nothing");
    if s2.before == s1.left || s2.before == s1.right {
        // snd divides a part fst just created, so it holds exactly one of
        // i, j and one of snd's sides holds neither. Split that side off
        // from the pre-fst part first, then divide the remainder into
        // fst's untouched side versus the rest; i and j come apart in the
        // second step.
        let uninvolved = if !s2.left.contains(&i) && !s2.left.contains(&j) {
            s2.left
        } else {
            s2.right
        };
        let fst2 =
            Partition::split_off(s1.parent, s1.before, Rc::clone(uninvolved));
        let unsplit = if s1.left != s2.before { s1.left } else { s1.right };
        let remainder =
            Rc::clone(fst2.as_split().expect("just built from a split").right);
        let snd2 = Partition::split_off(&fst2, &remainder, Rc::clone(unsplit));
        (fst2, snd2)
    } else {
        // The two splits divide unrelated, pre-existing parts; they
        // commute, so simply reorder them.
        let fst2 = Partition::split(
            s1.parent,
            s2.before,
            Rc::clone(s2.left),
            Rc::clone(s2.right),
        );
        let snd2 = Partition::split(
            &fst2,
            s1.before,
            Rc::clone(s1.left),
            Rc::clone(s1.right),
        );
        (fst2, snd2)
    }
}

#[derive(Debug, Error)]
pub enum ParseChainError {
    #[error("invalid element: {0}")]
    Element(#[from] ParseIntError),
    #[error("first partition must be {{1, ..., n}} in a single part")]
    FirstNotTrivial,
    #[error("chain on {n} elements must have {n} partitions, found {found}")]
    WrongLength { n: usize, found: usize },
    #[error(
        "partition {index} does not refine its predecessor by one split"
    )]
    NotOneSplit { index: usize },
    #[error("chain does not round-trip; canonical form is {rendered:?}")]
    RoundTrip { rendered: String },
}

impl FromStr for Chain {
    type Err = ParseChainError;

    /// Parses the canonical rendering: partitions joined by " -> ",
    /// parts by "|", elements by ".". Intermediate splits are
    /// reconstructed by diffing consecutive partitions, and the parsed
    /// chain must re-render to the input exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .split(" -> ")
            .map(|p| {
                p.split('|')
                    .map(|part| {
                        part.split('.')
                            .map(str::parse::<Elem>)
                            .collect::<Result<BTreeSet<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let n: usize = raw[0].iter().map(BTreeSet::len).sum();
        if raw[0].len() != 1 || !raw[0][0].iter().copied().eq(1..=n as Elem) {
            return Err(ParseChainError::FirstNotTrivial);
        }
        if raw.len() != n {
            return Err(ParseChainError::WrongLength { n, found: raw.len() });
        }

        let mut entries = vec![Partition::trivial(n)];
        for idx in 1..n {
            let removed: Vec<_> = raw[idx - 1]
                .iter()
                .filter(|p| !raw[idx].contains(p))
                .collect();
            let added: Vec<_> = raw[idx]
                .iter()
                .filter(|p| !raw[idx - 1].contains(p))
                .collect();
            if removed.len() != 1 || added.len() != 2 {
                return Err(ParseChainError::NotOneSplit { index: idx });
            }
            let (before, left, right) = (removed[0], added[0], added[1]);
            let one_split = left.is_disjoint(right)
                && left.len() + right.len() == before.len()
                && left.iter().chain(right.iter()).all(|x| before.contains(x));
            if !one_split {
                return Err(ParseChainError::NotOneSplit { index: idx });
            }
            let parent = entries[idx - 1].clone();
            entries.push(Partition::split(
                &parent,
                &Rc::new(before.clone()),
                Rc::new(left.clone()),
                Rc::new(right.clone()),
            ));
        }

        let chain = Chain { entries };
        let rendered = chain.canonical();
        if rendered != s {
            return Err(ParseChainError::RoundTrip { rendered });
        }
        Ok(chain)
    }
}
