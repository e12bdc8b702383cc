//! Substructure matching: VF2-style backtracking search for all
//! embeddings of a query graph in a target graph.
//!
//! An embedding is injective and preserves adjacency; atom and bond
//! compatibility is decided by predicates. The default predicates match
//! on atomic number (a query aromatic atom additionally requires an
//! aromatic target atom) and exact bond order, except that bond order is
//! not checked between two aromatic atom pairs. Atom maps and tags are
//! never consulted.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder};

/// One embedding: `(query_node, target_node)` pairs.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

pub fn has_substruct_match<A, B>(target: &Mol<A, B>, query: &Mol<A, B>) -> bool
where
    A: HasAtomicNum + HasAromaticity,
    B: HasBondOrder,
{
    get_substruct_match(target, query).is_some()
}

pub fn get_substruct_match<A, B>(target: &Mol<A, B>, query: &Mol<A, B>) -> Option<AtomMapping>
where
    A: HasAtomicNum + HasAromaticity,
    B: HasBondOrder,
{
    default_engine(target, query).find_first()
}

pub fn get_substruct_matches<A, B>(target: &Mol<A, B>, query: &Mol<A, B>) -> Vec<AtomMapping>
where
    A: HasAtomicNum + HasAromaticity,
    B: HasBondOrder,
{
    default_engine(target, query).find_all()
}

pub fn has_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> bool {
    get_substruct_match_with(target, query, atom_match, bond_match).is_some()
}

pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Option<AtomMapping> {
    custom_engine(target, query, atom_match, bond_match).find_first()
}

pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Vec<AtomMapping> {
    custom_engine(target, query, atom_match, bond_match).find_all()
}

fn default_engine<'a, A, B>(
    target: &'a Mol<A, B>,
    query: &'a Mol<A, B>,
) -> Vf2<'a, A, B, A, B, impl Fn(NodeIndex, NodeIndex) -> bool + 'a, impl Fn(EdgeIndex, EdgeIndex) -> bool + 'a>
where
    A: HasAtomicNum + HasAromaticity,
    B: HasBondOrder,
{
    let atom_ok = move |t: NodeIndex, q: NodeIndex| {
        let ta = target.atom(t);
        let qa = query.atom(q);
        ta.atomic_num() == qa.atomic_num() && (!qa.is_aromatic() || ta.is_aromatic())
    };
    let bond_ok = move |te: EdgeIndex, qe: EdgeIndex| {
        let (t1, t2) = target.bond_endpoints(te).expect("edge has endpoints");
        let (q1, q2) = query.bond_endpoints(qe).expect("edge has endpoints");
        let both_target_aromatic = target.atom(t1).is_aromatic() && target.atom(t2).is_aromatic();
        let both_query_aromatic = query.atom(q1).is_aromatic() && query.atom(q2).is_aromatic();
        (both_target_aromatic && both_query_aromatic)
            || target.bond(te).bond_order() == query.bond(qe).bond_order()
    };
    Vf2::new(target, query, atom_ok, bond_ok)
}

fn custom_engine<'a, A1, B1, A2, B2, FA, FB>(
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: FA,
    bond_match: FB,
) -> Vf2<'a, A1, B1, A2, B2, impl Fn(NodeIndex, NodeIndex) -> bool + 'a, impl Fn(EdgeIndex, EdgeIndex) -> bool + 'a>
where
    FA: Fn(&A1, &A2) -> bool + 'a,
    FB: Fn(&B1, &B2) -> bool + 'a,
{
    let atom_ok = move |t: NodeIndex, q: NodeIndex| atom_match(target.atom(t), query.atom(q));
    let bond_ok = move |te: EdgeIndex, qe: EdgeIndex| bond_match(target.bond(te), query.bond(qe));
    Vf2::new(target, query, atom_ok, bond_ok)
}

/// Backtracking state. Predicates work on indices so they can see atom
/// context (needed for the aromatic bond waiver) without widening the
/// public closure signatures.
struct Vf2<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_ok: FA,
    bond_ok: FB,
    query_order: Vec<NodeIndex>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FA, FB> Vf2<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    fn new(target: &'a Mol<A1, B1>, query: &'a Mol<A2, B2>, atom_ok: FA, bond_ok: FB) -> Self {
        // most-constrained first: high-degree query atoms prune earlier
        let mut query_order: Vec<NodeIndex> = query.atoms().collect();
        query_order
            .sort_by(|&a, &b| query.neighbors(b).count().cmp(&query.neighbors(a).count()));
        Self {
            target,
            query,
            atom_ok,
            bond_ok,
            query_order,
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    fn find_first(&mut self) -> Option<AtomMapping> {
        let mut results = Vec::new();
        self.recurse(0, &mut results, true);
        results.into_iter().next()
    }

    fn find_all(&mut self) -> Vec<AtomMapping> {
        let mut results = Vec::new();
        self.recurse(0, &mut results, false);
        results
    }

    fn recurse(&mut self, depth: usize, results: &mut Vec<AtomMapping>, first_only: bool) {
        if depth == self.query_order.len() {
            let mapping = self
                .query_order
                .iter()
                .map(|&qn| (qn, self.query_map[qn.index()].expect("mapped at this depth")))
                .collect();
            results.push(mapping);
            return;
        }

        if first_only && !results.is_empty() {
            return;
        }

        let query_node = self.query_order[depth];

        for t_idx in 0..self.target_used.len() {
            if self.target_used[t_idx] {
                continue;
            }

            let target_node = NodeIndex::new(t_idx);
            if !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[t_idx] = true;

            self.recurse(depth + 1, results, first_only);

            if first_only && !results.is_empty() {
                return;
            }

            self.query_map[query_node.index()] = None;
            self.target_used[t_idx] = false;
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.atom_ok)(target_node, query_node) {
            return false;
        }

        for q_neighbor in self.query.neighbors(query_node) {
            if let Some(t_mapped) = self.query_map[q_neighbor.index()] {
                let q_edge = self
                    .query
                    .bond_between(query_node, q_neighbor)
                    .expect("bond must exist between neighbors");
                match self.target.bond_between(target_node, t_mapped) {
                    Some(t_edge) => {
                        if !(self.bond_ok)(t_edge, q_edge) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
        }

        true
    }
}
