//! Partitions of {1..n} represented as split events over a shared parent.
//!
//! A partition is either the trivial one-part partition or a split of one
//! part of a parent partition into two nonempty sides. Storing the delta
//! instead of the full part list makes every entry of a refinement chain
//! O(1) to construct and lets transformed chains share their untouched
//! ancestry.

use std::{collections::BTreeSet, fmt, rc::Rc};

pub type Elem = u32;

/// A part of a partition. Parts are immutable and shared by reference
/// count between the partitions derived from them.
pub type Part = Rc<BTreeSet<Elem>>;

/// Builds a part from its elements.
pub fn part<I: IntoIterator<Item = Elem>>(elems: I) -> Part {
    Rc::new(elems.into_iter().collect())
}

enum Node {
    Trivial { all: Part },
    Split { parent: Partition, before: Part, left: Part, right: Part },
}

/// A partition of {1..n} into disjoint nonempty parts.
///
/// Cloning is cheap; the underlying node is shared. Equality is
/// structural, by set of parts, independent of how the partition was
/// derived.
#[derive(Clone)]
pub struct Partition {
    node: Rc<Node>,
}

/// Borrowed view of a split partition's fields.
pub struct Split<'a> {
    pub parent: &'a Partition,
    pub before: &'a Part,
    pub left: &'a Part,
    pub right: &'a Part,
}

impl Partition {
    /// The partition with the single part {1, ..., n}.
    pub fn trivial(n: usize) -> Self {
        let all = part(1..=n as Elem);
        Self { node: Rc::new(Node::Trivial { all }) }
    }

    /// Divides `before`, a part of `parent`, into `left` and `right`.
    ///
    /// # Panics
    ///
    /// Panics if either side is empty or the sides do not partition
    /// `before`; such a split is a programming error, not an input
    /// error.
    pub fn split(
        parent: &Partition,
        before: &Part,
        left: Part,
        right: Part,
    ) -> Self {
        assert!(
            !left.is_empty() && !right.is_empty(),
            "both sides of a split must be nonempty"
        );
        assert!(
            left.len() + right.len() == before.len()
                && left.is_disjoint(&right)
                && left.iter().chain(right.iter()).all(|x| before.contains(x)),
            "split sides must partition the part being divided"
        );
        Self {
            node: Rc::new(Node::Split {
                parent: parent.clone(),
                before: Rc::clone(before),
                left,
                right,
            }),
        }
    }

    /// Divides `before` into `left` and whatever remains.
    pub fn split_off(parent: &Partition, before: &Part, left: Part) -> Self {
        let right = part(before.difference(&left).copied());
        Self::split(parent, before, left, right)
    }

    /// The number of elements in the underlying set, not the number of
    /// parts.
    pub fn len(&self) -> usize {
        match &*self.node {
            Node::Trivial { all } => all.len(),
            Node::Split { parent, .. } => parent.len(),
        }
    }

    /// The parts of this partition, computed from the ancestry: the
    /// parent's parts with `before` replaced by `left` and `right`
    /// appended.
    pub fn parts(&self) -> Vec<Part> {
        match &*self.node {
            Node::Trivial { all } => vec![Rc::clone(all)],
            Node::Split { parent, before, left, right } => {
                let mut parts = parent.parts();
                let i = parts
                    .iter()
                    .position(|p| p == before)
                    .expect("split of a part absent from the parent");
                parts[i] = Rc::clone(left);
                parts.push(Rc::clone(right));
                parts
            }
        }
    }

    /// Whether this split event separates `i` and `j`.
    pub fn splits(&self, i: Elem, j: Elem) -> bool {
        match &*self.node {
            Node::Trivial { .. } => false,
            Node::Split { left, right, .. } => {
                (left.contains(&i) && right.contains(&j))
                    || (right.contains(&i) && left.contains(&j))
            }
        }
    }

    /// Whether `x` belongs to the part being divided.
    pub fn involves(&self, x: Elem) -> bool {
        match &*self.node {
            Node::Trivial { .. } => false,
            Node::Split { before, .. } => before.contains(&x),
        }
    }

    /// The split fields, or `None` for the trivial partition.
    pub fn as_split(&self) -> Option<Split<'_>> {
        match &*self.node {
            Node::Trivial { .. } => None,
            Node::Split { parent, before, left, right } => {
                Some(Split { parent, before, left, right })
            }
        }
    }

    fn sorted_parts(&self) -> Vec<Part> {
        let mut parts = self.parts();
        parts.sort_unstable();
        parts
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, sep: &str) -> fmt::Result {
        for (k, part) in self.sorted_parts().iter().enumerate() {
            if k > 0 {
                f.write_str("|")?;
            }
            for (l, x) in part.iter().enumerate() {
                if l > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{x}")?;
            }
        }
        Ok(())
    }
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
            || self.sorted_parts() == other.sorted_parts()
    }
}
impl Eq for Partition {}

impl fmt::Display for Partition {
    /// Parts sorted by their sorted element lists and joined with "|";
    /// elements joined with nothing for n < 10, with "." otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.len() < 10 { "" } else { "." };
        self.render(f, sep)
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Always-dotted rendering, regardless of n. The only format that round
/// trips through chain parsing.
pub struct Canonical<'a>(pub &'a Partition);

impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(f, ".")
    }
}

#[cfg(test)]
mod tests {
    use super::{part, Canonical, Partition};

    #[test]
    fn trivial() {
        let t = Partition::trivial(3);
        assert_eq!(t.len(), 3);
        assert_eq!(t.parts(), vec![part(1..=3)]);
        assert!(!t.splits(1, 2));
        assert!(!t.involves(2));
        assert!(t.as_split().is_none());
        assert_eq!(t.to_string(), "123");
        assert_eq!(Canonical(&t).to_string(), "1.2.3");
    }

    #[test]
    fn split_parts_and_queries() {
        let t = Partition::trivial(4);
        let all = part(1..=4);
        let p = Partition::split(&t, &all, part([1, 3]), part([2, 4]));
        assert_eq!(p.len(), 4);
        assert_eq!(p.parts(), vec![part([1, 3]), part([2, 4])]);

        assert!(p.splits(1, 2) && p.splits(3, 2) && p.splits(1, 4));
        assert!(!p.splits(1, 3) && !p.splits(2, 4));
        assert!(p.involves(1) && p.involves(4));

        let s = p.as_split().unwrap();
        assert_eq!(**s.before, *all);
        assert_eq!(s.parent, &t);

        let q = Partition::split_off(&p, &part([2, 4]), part([4]));
        assert_eq!(q.parts(), vec![part([1, 3]), part([4]), part([2])]);
        assert!(q.splits(2, 4));
        assert!(!q.involves(1));
    }

    #[test]
    fn structural_equality() {
        // {1}|{2}|{3} reached by splitting off 1 first, or 3 first.
        let t = Partition::trivial(3);
        let all = part(1..=3);
        let a = Partition::split_off(&t, &all, part([1]));
        let a = Partition::split_off(&a, &part([2, 3]), part([2]));
        let b = Partition::split_off(&t, &all, part([3]));
        let b = Partition::split_off(&b, &part([1, 2]), part([1]));
        assert_eq!(a, b);
        assert_ne!(a, t);
    }

    #[test]
    fn display_sorts_parts() {
        let t = Partition::trivial(4);
        let p = Partition::split_off(&t, &part(1..=4), part([2, 4]));
        assert_eq!(p.to_string(), "13|24");
        assert_eq!(Canonical(&p).to_string(), "1.3|2.4");
    }

    #[test]
    fn display_wide_uses_dots() {
        let t = Partition::trivial(11);
        assert_eq!(t.to_string(), "1.2.3.4.5.6.7.8.9.10.11");
        let p = Partition::split_off(&t, &part(1..=11), part([10, 11]));
        assert_eq!(p.to_string(), "1.2.3.4.5.6.7.8.9|10.11");
    }

    #[test]
    #[should_panic(expected = "nonempty")]
    fn degenerate_split_is_rejected() {
        let t = Partition::trivial(3);
        let all = part(1..=3);
        let _ = Partition::split(&t, &all, part(1..=3), part([]));
    }

    #[test]
    #[should_panic(expected = "partition the part")]
    fn overlapping_split_is_rejected() {
        let t = Partition::trivial(3);
        let all = part(1..=3);
        let _ = Partition::split(&t, &all, part([1, 2]), part([2, 3]));
    }
}
