//! Canonical atom ranking by Morgan-style iterative refinement.
//!
//! Ranks depend only on graph structure and intrinsic atom/bond fields;
//! atom tags, atom maps, and graph metadata never contribute, so
//! annotations cannot perturb identity. The canonical SMILES writer
//! traverses in rank order to produce an order-independent string key.

use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::mol::Mol;
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
};

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

#[derive(Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    singles: u8,
    doubles: u8,
    triples: u8,
    aromatics: u8,
}

fn atom_invariant<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> AtomInvariant
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let mut singles: u8 = 0;
    let mut doubles: u8 = 0;
    let mut triples: u8 = 0;
    let mut aromatics: u8 = 0;
    for edge in mol.bonds_of(idx) {
        match mol.bond(edge).bond_order() {
            BondOrder::Single => singles += 1,
            BondOrder::Double => doubles += 1,
            BondOrder::Triple => triples += 1,
            BondOrder::Aromatic => aromatics += 1,
        }
    }
    AtomInvariant {
        atomic_num: atom.atomic_num(),
        degree: mol.neighbors(idx).count() as u8,
        hydrogen_count: atom.hydrogen_count(),
        formal_charge: atom.formal_charge(),
        is_aromatic: atom.is_aromatic(),
        isotope: atom.isotope(),
        singles,
        doubles,
        triples,
        aromatics,
    }
}

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut h = Fnv1aHasher::new();
    value.hash(&mut h);
    h.finish()
}

/// Dense ranks for a value vector: equal values share a rank, ranks count
/// the number of strictly smaller positions.
fn ranks_from_values<T: Ord>(values: &[T]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| values[a].cmp(&values[b]));
    let mut ranks = vec![0usize; n];
    if n == 0 {
        return ranks;
    }
    ranks[indices[0]] = 0;
    for i in 1..n {
        ranks[indices[i]] = if values[indices[i]] == values[indices[i - 1]] {
            ranks[indices[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// One refinement sweep to fixpoint: each atom's rank is extended by the
/// multiset of its neighbors' ranks until the partition stops splitting.
/// The previous rank stays the primary sort key, so refinement only ever
/// subdivides existing classes.
fn morgan_refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    loop {
        let n = ranks.len();
        let values: Vec<u128> = (0..n)
            .map(|i| {
                let mut neighbor_ranks: Vec<usize> = mol
                    .neighbors(NodeIndex::new(i))
                    .map(|nb| ranks[nb.index()])
                    .collect();
                neighbor_ranks.sort_unstable();
                ((ranks[i] as u128) << 64) | hash_one(&neighbor_ranks) as u128
            })
            .collect();
        let refined = ranks_from_values(&values);
        if count_distinct(&refined) == count_distinct(ranks) {
            return;
        }
        *ranks = refined;
    }
}

/// Canonical rank of every atom (0-based, a permutation of `0..n`).
///
/// Ties left after invariant refinement are broken by promoting one
/// member of the smallest tied class and re-refining; for tied classes
/// that are graph automorphisms the resulting string is the same
/// whichever member is promoted.
pub fn canonical_ranks<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
    B: HasBondOrder,
{
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let values: Vec<u64> = mol
        .atoms()
        .map(|idx| hash_one(&atom_invariant(mol, idx)))
        .collect();
    let mut ranks = ranks_from_values(&values);
    morgan_refine(mol, &mut ranks);

    while count_distinct(&ranks) < n {
        let tied_rank = lowest_tied_rank(&ranks);
        let chosen = ranks
            .iter()
            .position(|&r| r == tied_rank)
            .expect("tied rank exists");
        let values: Vec<usize> = ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| 2 * r + usize::from(i != chosen))
            .collect();
        ranks = ranks_from_values(&values);
        morgan_refine(mol, &mut ranks);
    }

    ranks
}

fn lowest_tied_rank(ranks: &[usize]) -> usize {
    let mut counts = vec![0usize; ranks.len()];
    for &r in ranks {
        counts[r] += 1;
    }
    counts
        .iter()
        .position(|&c| c > 1)
        .expect("caller checked a tie exists")
}
