//! Bidirectional push-down search connecting two maximal chains.
//!
//! Two chains of size n are adjacent when sliding one split event a
//! single level turns one into the other. `ChainPath` joins two chains
//! through that adjacency graph by growing a path out of each: for every
//! target depth from the bottom of the chain upward it selects an
//! unresolved element pair and pushes the split separating that pair
//! down to the target depth in both paths, one level per step, until
//! the heads of the two paths coincide. The walk found this way is
//! valid by construction; it is conjectured short, not proven shortest.

use std::collections::BTreeSet;

use chain::Chain;
use partition::Elem;
use tracing::debug;

/// The search state: two growing paths of chains and the set of element
/// pairs already processed.
pub struct ChainPath {
    path1: Vec<Chain>,
    path2: Vec<Chain>,
    picked: BTreeSet<(Elem, Elem)>,
}

impl ChainPath {
    pub fn new(chain1: Chain, chain2: Chain) -> Self {
        assert_eq!(
            chain1.len(),
            chain2.len(),
            "chains must partition sets of the same size"
        );
        Self {
            path1: vec![chain1],
            path2: vec![chain2],
            picked: BTreeSet::new(),
        }
    }

    /// Runs the search to completion.
    ///
    /// # Panics
    ///
    /// Panics if the two paths fail to converge. Non-convergence cannot
    /// happen for well-formed same-size chains; it would mean the
    /// push-down transformation itself is defective, and a wrong path is
    /// worse than no path.
    pub fn find(&mut self) {
        let n = self.path1[0].len();
        for d in (0..n).rev() {
            // Once the heads agree they stay equal: selection and
            // push-down are functions of the head chains alone, so any
            // further work would transform both paths in lockstep.
            if last(&self.path1) == last(&self.path2) {
                break;
            }
            let Some((i, j)) = self.next_pair(d) else { break };
            self.picked.insert((i, j));
            let d1 = depth(last(&self.path1), i, j);
            let d2 = depth(last(&self.path2), i, j);
            debug!(i, j, to_depth = d, d1, d2, "pushing pair down");
            push_down(&mut self.path1, d, i, j);
            push_down(&mut self.path2, d, i, j);
        }
        assert!(
            last(&self.path1) == last(&self.path2),
            "search paths failed to converge"
        );
    }

    // The unpicked pair still above the target depth in at least one
    // path, minimizing the tuple (2n - d1 - d2, i, j). The selection
    // formula and its lexicographic tie-break are load-bearing for
    // determinism; keep them exactly as they are.
    fn next_pair(&self, d: usize) -> Option<(Elem, Elem)> {
        let n = self.path1[0].len();
        let (c1, c2) = (last(&self.path1), last(&self.path2));
        let mut best: Option<(usize, Elem, Elem)> = None;
        for i in 1..=n as Elem {
            for j in i + 1..=n as Elem {
                if self.picked.contains(&(i, j)) {
                    continue;
                }
                let (d1, d2) = (depth(c1, i, j), depth(c2, i, j));
                if d1 >= d && d2 >= d {
                    continue;
                }
                let cand = (2 * n - d1 - d2, i, j);
                if best.map_or(true, |b| cand < b) {
                    best = Some(cand);
                }
            }
        }
        best.map(|(_, i, j)| (i, j))
    }

    /// The walk found by `find`: `path1`, then `path2` reversed without
    /// its final chain, which the converged `path1` already ends in.
    pub fn path(&self) -> impl Iterator<Item = &Chain> + '_ {
        let shared = self.path2.len() - 1;
        self.path1.iter().chain(self.path2[..shared].iter().rev())
    }
}

fn last(path: &[Chain]) -> &Chain {
    &path[path.len() - 1]
}

fn depth(c: &Chain, i: Elem, j: Elem) -> usize {
    c.split_depth(i, j)
        .expect("every pair separates somewhere in a maximal chain")
}

// One `pushed_down` application per level until the pair separates at
// `end`, recording every intermediate chain. A pair already at or past
// `end` needs no pushes.
fn push_down(path: &mut Vec<Chain>, end: usize, i: Elem, j: Elem) {
    let start = depth(last(path), i, j);
    for d in start..end {
        let next = last(path).pushed_down(d, i, j);
        path.push(next);
    }
}

#[cfg(test)]
mod tests {
    use chain::Chain;
    use partition::Elem;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use random_chain::{Gen, RandomChain};

    use crate::ChainPath;

    fn chain(s: &str) -> Chain {
        s.parse().unwrap()
    }

    fn found_path(chain1: &Chain, chain2: &Chain) -> Vec<Chain> {
        let mut cp = ChainPath::new(chain1.clone(), chain2.clone());
        cp.find();
        cp.path().cloned().collect()
    }

    fn assert_well_formed(c: &Chain) {
        let n = c.len();
        for d in 0..n {
            assert_eq!(c[d].parts().len(), d + 1);
        }
        for i in 1..=n as Elem {
            for j in i + 1..=n as Elem {
                let d = c.split_depth(i, j);
                assert!(d.is_some_and(|d| (1..n).contains(&d)));
            }
        }
    }

    fn diff_count(a: &Chain, b: &Chain) -> usize {
        (0..a.len()).filter(|&d| a[d] != b[d]).count()
    }

    #[test]
    fn directly_adjacent_chains() {
        // The two n=3 chains are one push of (1, 3) apart; the found
        // walk is just the pair of them.
        let c1 = chain("1.2.3 -> 1|2.3 -> 1|2|3");
        let c2 = chain("1.2.3 -> 1.3|2 -> 1|2|3");
        assert_eq!(found_path(&c1, &c2), [c1.clone(), c2.clone()]);
        assert_eq!(found_path(&c2, &c1), [c2, c1]);
    }

    #[test]
    fn identical_chains_yield_a_single_element_path() {
        let c = chain("1.2.3.4 -> 1.2|3.4 -> 1|2|3.4 -> 1|2|3|4");
        assert_eq!(found_path(&c, &c), [c.clone()]);
    }

    #[test]
    fn all_n3_pairs_are_adjacent() {
        let chains = [
            chain("1.2.3 -> 1|2.3 -> 1|2|3"),
            chain("1.2.3 -> 1.3|2 -> 1|2|3"),
            chain("1.2.3 -> 1.2|3 -> 1|2|3"),
        ];
        for a in &chains {
            for b in &chains {
                let path = found_path(a, b);
                let expect = if a == b { 1 } else { 2 };
                assert_eq!(path.len(), expect);
                assert_eq!(path[0], *a);
                assert_eq!(path[path.len() - 1], *b);
            }
        }
    }

    #[test]
    fn every_step_of_the_walk_is_an_adjacency() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        for n in 2..=9 {
            for _ in 0..5 {
                let gen = RandomChain { n };
                let c1 = gen.generate(&mut rng);
                let c2 = gen.generate(&mut rng);
                let path = found_path(&c1, &c2);

                assert_eq!(path[0], c1);
                assert_eq!(path[path.len() - 1], c2);
                for c in &path {
                    assert_well_formed(c);
                }
                for pair in path.windows(2) {
                    assert_eq!(diff_count(&pair[0], &pair[1]), 1);
                }
            }
        }
    }

    // Rows of (chain, chain, optimal length), the shape the brute-force
    // validator emits. The optima here are provable by hand: identical
    // chains are at distance zero, and each adjacency step changes
    // exactly one entry, so chains differing at k entries and built k
    // pushes apart are at distance exactly k.
    const LENGTHS: &str = "\
1.2.3 -> 1|2.3 -> 1|2|3,1.2.3 -> 1.3|2 -> 1|2|3,1
1.2.3 -> 1.3|2 -> 1|2|3,1.2.3 -> 1.2|3 -> 1|2|3,1
1.2.3 -> 1.2|3 -> 1|2|3,1.2.3 -> 1.2|3 -> 1|2|3,0
1.2.3.4 -> 1|2.3.4 -> 1|2|3.4 -> 1|2|3|4,1.2.3.4 -> 1.2|3.4 -> 1.2|3|4 -> 1|2|3|4,2";

    #[test]
    fn found_lengths_are_never_below_optimal() {
        for row in LENGTHS.lines() {
            let mut fields = row.split(',');
            let c1 = chain(fields.next().unwrap());
            let c2 = chain(fields.next().unwrap());
            let optimal: usize = fields.next().unwrap().parse().unwrap();

            let path = found_path(&c1, &c2);
            assert!(path.len() - 1 >= optimal);
        }
    }

    #[test]
    fn two_pushes_apart_really_is_distance_two() {
        // Cross-check the last fixture row against the transformation
        // it was derived from.
        let c1 = chain("1.2.3.4 -> 1|2.3.4 -> 1|2|3.4 -> 1|2|3|4");
        let c2 = c1.pushed_down(1, 1, 2).pushed_down(2, 1, 2);
        assert_eq!(
            c2.canonical(),
            "1.2.3.4 -> 1.2|3.4 -> 1.2|3|4 -> 1|2|3|4"
        );
        assert_eq!(diff_count(&c1, &c2), 2);
    }

    #[test]
    #[should_panic(expected = "same size")]
    fn mismatched_sizes_are_rejected() {
        let c1 = chain("1.2 -> 1|2");
        let c2 = chain("1.2.3 -> 1.2|3 -> 1|2|3");
        let _ = ChainPath::new(c1, c2);
    }
}
