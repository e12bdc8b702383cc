//! Highlight annotations: which atoms and bonds a renderer should
//! emphasize, and the resolver that unions substructure matches from a
//! pattern list into one annotation.
//!
//! The wire form is a fixed three-line text block (a color directive, a
//! space-separated list of 1-based atom indices, and a space-separated
//! list of 1-based bond indices) attached to the molecule metadata
//! under [`HIGHLIGHT_PROP`]. Downstream renderers parse this block
//! verbatim; do not reformat it.

use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph_ops::get_fragments;
use crate::mol::Mol;
use crate::substruct::get_substruct_matches;

/// Display color for highlighted atoms and bonds.
pub const HIGHLIGHT_COLOR: &str = "#ff0000";

/// Molecule metadata key carrying the highlight block.
pub const HIGHLIGHT_PROP: &str = "Renderer_Highlight";

/// A set of atom and bond indices to emphasize, with the fixed display
/// color. Ordered sets keep the wire form deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    color: &'static str,
    atoms: BTreeSet<usize>,
    bonds: BTreeSet<usize>,
}

impl Highlight {
    pub fn new() -> Self {
        Self {
            color: HIGHLIGHT_COLOR,
            atoms: BTreeSet::new(),
            bonds: BTreeSet::new(),
        }
    }

    pub fn add_atom(&mut self, idx: usize) {
        self.atoms.insert(idx);
    }

    pub fn add_bond(&mut self, idx: usize) {
        self.bonds.insert(idx);
    }

    pub fn atoms(&self) -> &BTreeSet<usize> {
        &self.atoms
    }

    pub fn bonds(&self) -> &BTreeSet<usize> {
        &self.bonds
    }

    pub fn contains_atom(&self, idx: usize) -> bool {
        self.atoms.contains(&idx)
    }

    pub fn contains_bond(&self, idx: usize) -> bool {
        self.bonds.contains(&idx)
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty() && self.bonds.is_empty()
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Highlight {
    /// The exact renderer contract: `COLOR`, `ATOMS`, `BONDS` lines with
    /// 1-based indices.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<usize>| {
            set.iter()
                .map(|i| (i + 1).to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(
            f,
            "COLOR {}\nATOMS {}\nBONDS {}",
            self.color,
            join(&self.atoms),
            join(&self.bonds)
        )
    }
}

/// Attach a highlight block to the molecule metadata. Attaching the same
/// annotation twice is a no-op; attaching a different one replaces it.
pub fn attach_highlight(mol: &mut Mol<Atom, Bond>, highlight: &Highlight) {
    mol.set_prop(HIGHLIGHT_PROP, highlight.to_string());
}

/// Union of all atoms and bonds touched by any pattern in `patterns`.
///
/// Every pattern is decomposed into connected fragments and each
/// fragment is matched independently. When two instances of a
/// multi-fragment pattern overlap in the target, the whole pattern has
/// no embedding at the overlap even though each fragment does; matching
/// per fragment is what keeps those atoms highlighted. Bonds are
/// collected between matched-atom pairs of a single embedding only.
/// Empty patterns contribute nothing.
pub fn highlight_patterns(mol: &Mol<Atom, Bond>, patterns: &[Mol<Atom, Bond>]) -> Highlight {
    let mut highlight = Highlight::new();
    for pattern in patterns {
        if pattern.atom_count() == 0 {
            continue;
        }
        for fragment in get_fragments(pattern) {
            for mapping in get_substruct_matches(mol, &fragment) {
                let matched: Vec<_> = mapping.iter().map(|&(_, t)| t).collect();
                for (i, &a) in matched.iter().enumerate() {
                    for &b in matched.iter().skip(i + 1) {
                        if let Some(edge) = mol.bond_between(a, b) {
                            highlight.add_bond(edge.index());
                        }
                    }
                }
                for &a in &matched {
                    highlight.add_atom(a.index());
                }
            }
        }
    }
    highlight
}

/// Resolve and attach in one step.
pub fn apply_highlight(mol: &mut Mol<Atom, Bond>, patterns: &[Mol<Atom, Bond>]) -> Highlight {
    let highlight = highlight_patterns(mol, patterns);
    attach_highlight(mol, &highlight);
    highlight
}

/// Batch resolver: one annotation per input slot, in order. `None`
/// inputs (unparsable upstream) get an empty annotation. Inputs are
/// independent, so the batch fans out across the rayon pool.
pub fn highlight_batch(
    mols: &[Option<Mol<Atom, Bond>>],
    patterns: &[Mol<Atom, Bond>],
) -> Vec<Highlight> {
    mols.par_iter()
        .map(|slot| match slot {
            Some(mol) => highlight_patterns(mol, patterns),
            None => Highlight::new(),
        })
        .collect()
}
