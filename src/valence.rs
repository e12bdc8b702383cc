use petgraph::graph::NodeIndex;

use crate::element;
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub atomic_num: u8,
    /// Twice the actual valence (aromatic bonds contribute 1.5).
    pub twice_valence: u16,
    pub allowed_valences: Vec<u8>,
}

impl std::fmt::Display for ValenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = element::symbol(self.atomic_num).unwrap_or("?");
        write!(
            f,
            "atom {} ({}): valence {} not in {:?}",
            self.atom_idx.index(),
            sym,
            self.twice_valence as f32 / 2.0,
            self.allowed_valences,
        )
    }
}

impl std::error::Error for ValenceError {}

/// Twice an atom's total valence: bond-order sum (aromatic = 1.5) plus
/// implicit hydrogens, in half-order units.
pub fn twice_total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u16
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    let bond_sum: u16 = mol
        .bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().doubled() as u16)
        .sum();
    bond_sum + 2 * mol.atom(atom).hydrogen_count() as u16
}

/// Structural validity oracle: every uncharged, non-aromatic atom of an
/// element with known default valences must sit exactly on one of them.
///
/// Charged, aromatic, and exotic atoms are skipped; this is a cheap
/// plausibility filter for rewrite candidates, not a full perception
/// pass. Failures are values; nothing here panics on bad molecules.
pub fn check_valence<A, B>(mol: &Mol<A, B>) -> Result<(), Vec<ValenceError>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity,
    B: HasBondOrder,
{
    let errors: Vec<ValenceError> = mol
        .atoms()
        .filter_map(|idx| {
            let atom = mol.atom(idx);
            if atom.formal_charge() != 0 || atom.is_aromatic() {
                return None;
            }
            let allowed = element::default_valences(atom.atomic_num());
            if allowed.is_empty() {
                return None;
            }
            let v2 = twice_total_valence(mol, idx);
            if allowed.iter().any(|&a| 2 * a as u16 == v2) {
                return None;
            }
            Some(ValenceError {
                atom_idx: idx,
                atomic_num: atom.atomic_num(),
                twice_valence: v2,
                allowed_valences: allowed.to_vec(),
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Implicit hydrogen count for an atom whose bonds sum to
/// `twice_bond_sum` half-orders: the smallest charge-adjusted default
/// valence that accommodates the bonds decides, anything exotic gets
/// zero.
///
/// Shared by the SMILES parser (bare atoms) and the rewrite engine
/// (recomputing template-atom hydrogens after bonds change).
pub fn implicit_hydrogen_count(atomic_num: u8, formal_charge: i8, twice_bond_sum: u16) -> u8 {
    element::default_valences(atomic_num)
        .iter()
        .filter_map(|&v| {
            let adjusted = v as i16 + formal_charge as i16;
            if adjusted > 0 {
                Some(2 * adjusted as u16)
            } else {
                None
            }
        })
        .find(|&v2| v2 >= twice_bond_sum)
        .map(|v2| ((v2 - twice_bond_sum) / 2) as u8)
        .unwrap_or(0)
}
