use chain::Chain;
use partition::{part, Elem, Part, Partition};
use rand::{seq::SliceRandom, Rng};

pub trait Gen {
    type Output;
    fn generate<R: Rng>(&self, rng: &mut R) -> Self::Output;
}

/// Uniformly-structured random maximal chain on {1..n}: each entry
/// divides a uniformly chosen divisible part at a uniformly chosen cut
/// of a shuffle of its elements.
pub struct RandomChain {
    pub n: usize,
}

impl Gen for RandomChain {
    type Output = Chain;
    fn generate<R: Rng>(&self, rng: &mut R) -> Chain {
        let mut entries = vec![Partition::trivial(self.n)];
        for _ in 1..self.n {
            let parent = entries[entries.len() - 1].clone();
            let parts = parent.parts();
            let divisible: Vec<_> =
                parts.iter().filter(|p| p.len() > 1).collect();
            let before: &Part = *divisible
                .choose(rng)
                .expect("a non-discrete partition has a divisible part");
            let mut elems: Vec<Elem> = before.iter().copied().collect();
            elems.shuffle(rng);
            let cut = rng.gen_range(1..elems.len());
            let left = part(elems[..cut].iter().copied());
            let right = part(elems[cut..].iter().copied());
            entries.push(Partition::split(&parent, before, left, right));
        }
        Chain::new(entries)
    }
}

#[test]
fn well_formed() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_seed([0; 32]);
    for n in 1..=12 {
        for _ in 0..10 {
            let c = RandomChain { n }.generate(&mut rng);
            assert_eq!(c.len(), n);
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
    }
}

#[test]
fn deterministic_under_a_fixed_seed() {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let gen = RandomChain { n: 8 };
    let a = gen.generate(&mut ChaCha20Rng::seed_from_u64(315));
    let b = gen.generate(&mut ChaCha20Rng::seed_from_u64(315));
    assert_eq!(a, b);
    let c = gen.generate(&mut ChaCha20Rng::seed_from_u64(316));
    assert_ne!(a, c);
}

#[test]
fn uniformity() {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_seed([0; 32]);
    let n = 3000;

    let mut map = BTreeMap::new();
    for _ in 0..n {
        let c = RandomChain { n: 3 }.generate(&mut rng);
        *map.entry(c.canonical()).or_insert(0) += 1;
    }
    // The three maximal chains on {1, 2, 3}, near-equally often.
    let k = 3;
    assert_eq!(map.len(), k);
    for &v in map.values() {
        assert!(v >= (n / k) * 85 / 100);
        assert!(v <= (n / k) * 115 / 100);
    }
}
