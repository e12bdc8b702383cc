use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

/// Split a molecule into its connected fragments, each a standalone `Mol`
/// with compact indices.
pub fn get_fragments<A: Clone, B: Clone>(mol: &Mol<A, B>) -> Vec<Mol<A, B>> {
    let components = connected_components(mol);
    let mut fragments = Vec::with_capacity(components.len());
    for component in &components {
        let mut frag = Mol::new();
        let mut index_map = vec![NodeIndex::new(0); mol.atom_count()];
        for &old_idx in component {
            let new_idx = frag.add_atom(mol.atom(old_idx).clone());
            index_map[old_idx.index()] = new_idx;
        }
        for &old_idx in component {
            for edge in mol.bonds_of(old_idx) {
                if let Some((a, b)) = mol.bond_endpoints(edge) {
                    if a == old_idx && a.index() < b.index() {
                        frag.add_bond(
                            index_map[a.index()],
                            index_map[b.index()],
                            mol.bond(edge).clone(),
                        );
                    }
                }
            }
        }
        fragments.push(frag);
    }
    fragments
}

/// Which input a combined node or edge came from, with its index there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Left(usize),
    Right(usize),
}

/// Result of [`combine_mols`]: the disjoint union plus the index
/// bookkeeping needed to address atoms of either input inside it.
///
/// The union preserves insertion order (all of the left input's atoms
/// and bonds first, then the right's, each block keeping its internal
/// order), so the lookups are pure offset arithmetic and stay valid no
/// matter what is later added to `mol`.
pub struct Combined<A, B> {
    pub mol: Mol<A, B>,
    atom_split: usize,
    bond_split: usize,
}

impl<A, B> Combined<A, B> {
    /// Combined index of a left-input atom.
    pub fn left_atom(&self, idx: NodeIndex) -> NodeIndex {
        idx
    }

    /// Combined index of a right-input atom.
    pub fn right_atom(&self, idx: NodeIndex) -> NodeIndex {
        NodeIndex::new(self.atom_split + idx.index())
    }

    /// Combined index of a left-input bond.
    pub fn left_bond(&self, idx: EdgeIndex) -> EdgeIndex {
        idx
    }

    /// Combined index of a right-input bond.
    pub fn right_bond(&self, idx: EdgeIndex) -> EdgeIndex {
        EdgeIndex::new(self.bond_split + idx.index())
    }

    /// Which input a combined atom index originated from.
    pub fn atom_origin(&self, idx: NodeIndex) -> Origin {
        if idx.index() < self.atom_split {
            Origin::Left(idx.index())
        } else {
            Origin::Right(idx.index() - self.atom_split)
        }
    }

    /// Which input a combined bond index originated from.
    pub fn bond_origin(&self, idx: EdgeIndex) -> Origin {
        if idx.index() < self.bond_split {
            Origin::Left(idx.index())
        } else {
            Origin::Right(idx.index() - self.bond_split)
        }
    }
}

/// Disjoint union of two molecules.
///
/// No bonds are created between the parts; callers that need cross-part
/// bonds add them afterwards through the [`Combined`] lookups. Graph
/// metadata is merged with left-side precedence.
pub fn combine_mols<A: Clone, B: Clone>(a: &Mol<A, B>, b: &Mol<A, B>) -> Combined<A, B> {
    let mut mol = Mol::new();
    for idx in a.atoms() {
        mol.add_atom(a.atom(idx).clone());
    }
    for edge in a.bonds() {
        let (x, y) = a.bond_endpoints(edge).expect("edge has endpoints");
        mol.add_bond(x, y, a.bond(edge).clone());
    }
    let atom_split = a.atom_count();
    let bond_split = a.bond_count();
    for idx in b.atoms() {
        mol.add_atom(b.atom(idx).clone());
    }
    for edge in b.bonds() {
        let (x, y) = b.bond_endpoints(edge).expect("edge has endpoints");
        mol.add_bond(
            NodeIndex::new(atom_split + x.index()),
            NodeIndex::new(atom_split + y.index()),
            b.bond(edge).clone(),
        );
    }
    for (k, v) in b.props() {
        mol.set_prop(k.clone(), v.clone());
    }
    for (k, v) in a.props() {
        mol.set_prop(k.clone(), v.clone());
    }
    Combined {
        mol,
        atom_split,
        bond_split,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::smiles::from_smiles;

    #[test]
    fn components_disconnected() {
        let mol = from_smiles("[Na+].[Cl-]").unwrap();
        let comps = connected_components(&mol);
        assert_eq!(comps.len(), 2);
    }

    #[test]
    fn components_single() {
        let mol = from_smiles("CCO").unwrap();
        assert_eq!(num_components(&mol), 1);
    }

    #[test]
    fn components_empty() {
        let mol: Mol<(), ()> = Mol::new();
        assert_eq!(num_components(&mol), 0);
    }

    #[test]
    fn fragments_three() {
        let mol = from_smiles("[Na+].[Cl-].O").unwrap();
        let frags = get_fragments(&mol);
        assert_eq!(frags.len(), 3);
        let mut counts: Vec<usize> = frags.iter().map(|f| f.atom_count()).collect();
        counts.sort();
        assert_eq!(counts, vec![1, 1, 1]);
    }

    #[test]
    fn fragments_single_keeps_bonds() {
        let mol = from_smiles("CCO").unwrap();
        let frags = get_fragments(&mol);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].atom_count(), mol.atom_count());
        assert_eq!(frags[0].bond_count(), mol.bond_count());
    }

    #[test]
    fn combine_offsets() {
        let a = from_smiles("CCO").unwrap();
        let b = from_smiles("N").unwrap();
        let combined = combine_mols(&a, &b);
        assert_eq!(combined.mol.atom_count(), 4);
        assert_eq!(combined.mol.bond_count(), 2);
        assert_eq!(combined.left_atom(NodeIndex::new(2)).index(), 2);
        assert_eq!(combined.right_atom(NodeIndex::new(0)).index(), 3);
        assert_eq!(
            combined.mol.atom(combined.right_atom(NodeIndex::new(0))).atomic_num,
            7
        );
    }

    #[test]
    fn combine_origin_lookup() {
        let a = from_smiles("CC").unwrap();
        let b = from_smiles("OO").unwrap();
        let combined = combine_mols(&a, &b);
        assert_eq!(combined.atom_origin(NodeIndex::new(1)), Origin::Left(1));
        assert_eq!(combined.atom_origin(NodeIndex::new(2)), Origin::Right(0));
        assert_eq!(combined.bond_origin(EdgeIndex::new(0)), Origin::Left(0));
        assert_eq!(combined.bond_origin(EdgeIndex::new(1)), Origin::Right(0));
    }

    #[test]
    fn combine_keeps_parts_disjoint() {
        let a = from_smiles("CC").unwrap();
        let b = from_smiles("OO").unwrap();
        let combined = combine_mols(&a, &b);
        assert_eq!(num_components(&combined.mol), 2);
    }

    #[test]
    fn combine_with_empty() {
        let a: Mol<Atom, Bond> = Mol::new();
        let b = from_smiles("C").unwrap();
        let combined = combine_mols(&a, &b);
        assert_eq!(combined.mol.atom_count(), 1);
        assert_eq!(combined.right_atom(NodeIndex::new(0)).index(), 0);
    }

    #[test]
    fn combine_merges_props_left_wins() {
        let mut a = from_smiles("C").unwrap();
        let mut b = from_smiles("O").unwrap();
        a.set_prop("shared", "left");
        b.set_prop("shared", "right");
        b.set_prop("only_right", "x");
        let combined = combine_mols(&a, &b);
        assert_eq!(combined.mol.prop("shared"), Some("left"));
        assert_eq!(combined.mol.prop("only_right"), Some("x"));
    }
}
