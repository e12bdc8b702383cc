//! Reaction application: rewrite rules over molecular graphs.
//!
//! A [`RewriteRule`] pairs a reactant pattern with a product pattern;
//! atom-map labels (`[C:1]`) link atoms across the two sides. Applying a
//! rule enumerates every embedding of the reactant pattern, rewrites each
//! match site, and works a queue of novel products until it settles on
//! one result per input molecule.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use log::{debug, trace};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph_ops::combine_mols;
use crate::highlight::{attach_highlight, Highlight};
use crate::mol::Mol;
use crate::smiles::{from_smiles, to_canonical_smiles, SmilesError};
use crate::substruct::{get_substruct_matches, AtomMapping};
use crate::valence::{check_valence, implicit_hydrogen_count};

/// Atom tag recording which rule label produced a product atom. The
/// product highlight is a pure function of this tag set.
pub const OLD_MAP_TAG: &str = "old_map_num";

/// Role of a pattern atom across the rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Labeled on both sides: the matched target atom survives under
    /// this label.
    Retained(u16),
    /// Reactant side only: the matched target atom is deleted.
    Removed,
    /// Product side only: a fresh atom is created from the template.
    Introduced,
}

/// Errors raised while building a rule. These are configuration errors:
/// they surface before any molecule is processed and fail a whole batch.
/// Per-molecule outcomes are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// No `>>` separator found in a reaction SMILES.
    MissingSeparator,
    /// The reactant side is empty.
    EmptyReactants,
    /// The product side is empty.
    EmptyProducts,
    /// An atom-map label appears more than once on one side.
    DuplicateMapNum {
        section: &'static str,
        map_num: u16,
    },
    /// A pattern failed to parse.
    Smiles {
        section: &'static str,
        detail: SmilesError,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "no '>>' separator found in reaction SMILES"),
            Self::EmptyReactants => write!(f, "rule has no reactant pattern"),
            Self::EmptyProducts => write!(f, "rule has no product pattern"),
            Self::DuplicateMapNum { section, map_num } => {
                write!(f, "atom map {map_num} appears twice in the {section} pattern")
            }
            Self::Smiles { section, detail } => {
                write!(f, "invalid {section} pattern: {detail}")
            }
        }
    }
}

impl std::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Smiles { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

/// A graph-rewrite rule: reactant pattern, product pattern, and the
/// provenance mapping implied by their shared atom-map labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRule {
    reactant: Mol<Atom, Bond>,
    product: Mol<Atom, Bond>,
    reactant_roles: Vec<NodeRole>,
    product_roles: Vec<NodeRole>,
    product_node_of_label: HashMap<u16, NodeIndex>,
}

fn collect_labels(
    pattern: &Mol<Atom, Bond>,
    section: &'static str,
) -> Result<HashMap<u16, NodeIndex>, RuleError> {
    let mut labels = HashMap::new();
    for idx in pattern.atoms() {
        let map_num = pattern.atom(idx).map_num;
        if map_num == 0 {
            continue;
        }
        if labels.insert(map_num, idx).is_some() {
            return Err(RuleError::DuplicateMapNum { section, map_num });
        }
    }
    Ok(labels)
}

impl RewriteRule {
    /// Build a rule from two pattern graphs. Fails if the reactant
    /// pattern is empty or a label repeats within one side.
    pub fn new(reactant: Mol<Atom, Bond>, product: Mol<Atom, Bond>) -> Result<Self, RuleError> {
        if reactant.atom_count() == 0 {
            return Err(RuleError::EmptyReactants);
        }
        let reactant_labels = collect_labels(&reactant, "reactant")?;
        let product_labels = collect_labels(&product, "product")?;

        let reactant_roles = reactant
            .atoms()
            .map(|idx| {
                let map_num = reactant.atom(idx).map_num;
                if map_num != 0 && product_labels.contains_key(&map_num) {
                    NodeRole::Retained(map_num)
                } else {
                    NodeRole::Removed
                }
            })
            .collect();
        let product_roles = product
            .atoms()
            .map(|idx| {
                let map_num = product.atom(idx).map_num;
                if map_num != 0 && reactant_labels.contains_key(&map_num) {
                    NodeRole::Retained(map_num)
                } else {
                    NodeRole::Introduced
                }
            })
            .collect();

        Ok(Self {
            reactant,
            product,
            reactant_roles,
            product_roles,
            product_node_of_label: product_labels,
        })
    }

    /// Build a rule from reaction SMILES (`[C:1][Br:2]>>[C:1]O`). This is
    /// plain SMILES with atom maps on both sides of `>>`, not a query
    /// language.
    pub fn from_rxn_smiles(s: &str) -> Result<Self, RuleError> {
        let (lhs, rhs) = s.split_once(">>").ok_or(RuleError::MissingSeparator)?;
        if lhs.trim().is_empty() {
            return Err(RuleError::EmptyReactants);
        }
        if rhs.trim().is_empty() {
            return Err(RuleError::EmptyProducts);
        }
        let reactant = from_smiles(lhs).map_err(|detail| RuleError::Smiles {
            section: "reactant",
            detail,
        })?;
        let product = from_smiles(rhs).map_err(|detail| RuleError::Smiles {
            section: "product",
            detail,
        })?;
        Self::new(reactant, product)
    }

    pub fn reactant(&self) -> &Mol<Atom, Bond> {
        &self.reactant
    }

    pub fn product(&self) -> &Mol<Atom, Bond> {
        &self.product
    }

    pub fn reactant_roles(&self) -> &[NodeRole] {
        &self.reactant_roles
    }

    pub fn product_roles(&self) -> &[NodeRole] {
        &self.product_roles
    }

    /// Apply the rule to one molecule, returning one product or `None`.
    ///
    /// A work queue starts with the input; each pass pops the front
    /// graph, rewrites every embedding of the reactant pattern in it, and
    /// enqueues the candidates that survive filtering and are canonically
    /// novel. The loop stops as soon as the queue holds fewer than two
    /// entries after a pass. That is a breadth bound, not exhaustion: at
    /// most the first frontier graph is ever re-expanded, and branchy
    /// rewrite networks are deliberately left under-explored. The result is the
    /// front of the queue: the earliest product never itself re-expanded.
    pub fn apply(&self, mol: &Mol<Atom, Bond>) -> Option<Mol<Atom, Bond>> {
        if mol.atom_count() == 0 {
            return None;
        }
        let mut queue: VecDeque<Mol<Atom, Bond>> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(to_canonical_smiles(mol));
        queue.push_back(mol.clone());

        while let Some(current) = queue.pop_front() {
            self.expand(&current, &mut seen, &mut queue);
            if queue.len() < 2 {
                break;
            }
        }
        queue.pop_front()
    }

    /// Batch application: one slot per input, `None` slots (unparsable
    /// upstream) and no-product outcomes stay `None`. Inputs are
    /// independent, so the batch fans out across the rayon pool; the
    /// rule is shared read-only.
    pub fn apply_batch(&self, mols: &[Option<Mol<Atom, Bond>>]) -> Vec<Option<Mol<Atom, Bond>>> {
        mols.par_iter()
            .map(|slot| slot.as_ref().and_then(|mol| self.apply(mol)))
            .collect()
    }

    /// One pass: rewrite every embedding in `current`, filter, dedup,
    /// highlight, enqueue.
    fn expand(
        &self,
        current: &Mol<Atom, Bond>,
        seen: &mut HashSet<String>,
        queue: &mut VecDeque<Mol<Atom, Bond>>,
    ) {
        let embeddings = get_substruct_matches(current, &self.reactant);
        debug!("{} embedding(s) of the reactant pattern", embeddings.len());
        for mapping in &embeddings {
            let mut candidate = self.rewrite_at(current, mapping);
            if check_valence(&candidate).is_err() {
                trace!("candidate discarded: valence check failed");
                continue;
            }
            let key = to_canonical_smiles(&candidate);
            // a candidate can pass the valence check yet serialize to
            // something unparsable; treat it like any other bad product
            if from_smiles(&key).is_err() {
                trace!("candidate discarded: canonical form does not re-parse");
                continue;
            }
            if seen.contains(&key) {
                continue;
            }
            highlight_product(&mut candidate);
            seen.insert(key);
            queue.push_back(candidate);
        }
    }

    /// Rewrite one embedding into a full candidate molecule.
    fn rewrite_at(&self, target: &Mol<Atom, Bond>, mapping: &AtomMapping) -> Mol<Atom, Bond> {
        let query_of_target: HashMap<NodeIndex, NodeIndex> =
            mapping.iter().map(|&(q, t)| (t, q)).collect();
        let mut target_of_label: HashMap<u16, NodeIndex> = HashMap::new();
        for &(q, t) in mapping {
            if let NodeRole::Retained(label) = self.reactant_roles[q.index()] {
                target_of_label.insert(label, t);
            }
        }

        // rewritten core: one atom per product-template node
        let mut core: Mol<Atom, Bond> = Mol::new();
        let mut core_node: Vec<NodeIndex> = Vec::with_capacity(self.product.atom_count());
        for p_idx in self.product.atoms() {
            let template = self.product.atom(p_idx);
            let atom = match self.product_roles[p_idx.index()] {
                NodeRole::Retained(label) => {
                    let t_idx = target_of_label[&label];
                    let mut atom = target.atom(t_idx).clone();
                    atom.atomic_num = template.atomic_num;
                    atom.formal_charge = template.formal_charge;
                    if template.isotope != 0 {
                        atom.isotope = template.isotope;
                    }
                    if template.hydrogen_count > 0 {
                        atom.hydrogen_count = template.hydrogen_count;
                    }
                    atom.map_num = 0;
                    atom.set_tag(OLD_MAP_TAG, label.to_string());
                    atom
                }
                _ => {
                    let mut atom = template.clone();
                    atom.map_num = 0;
                    atom
                }
            };
            core_node.push(core.add_atom(atom));
        }
        for edge in self.product.bonds() {
            let (a, b) = self.product.bond_endpoints(edge).expect("edge has endpoints");
            core.add_bond(
                core_node[a.index()],
                core_node[b.index()],
                self.product.bond(edge).clone(),
            );
        }

        // target bonds between two retained atoms that neither pattern
        // describes survive unchanged (e.g. ring bonds closing around
        // the matched region)
        for edge in target.bonds() {
            let (t1, t2) = target.bond_endpoints(edge).expect("edge has endpoints");
            let (q1, q2) = match (query_of_target.get(&t1), query_of_target.get(&t2)) {
                (Some(&q1), Some(&q2)) => (q1, q2),
                _ => continue,
            };
            let (l1, l2) = match (
                self.reactant_roles[q1.index()],
                self.reactant_roles[q2.index()],
            ) {
                (NodeRole::Retained(l1), NodeRole::Retained(l2)) => (l1, l2),
                _ => continue,
            };
            if self.reactant.bond_between(q1, q2).is_some() {
                continue;
            }
            let p1 = self.product_node_of_label[&l1];
            let p2 = self.product_node_of_label[&l2];
            if self.product.bond_between(p1, p2).is_some() {
                continue;
            }
            core.add_bond(
                core_node[p1.index()],
                core_node[p2.index()],
                target.bond(edge).clone(),
            );
        }

        // carried remainder: unmatched atoms reachable from a retained
        // atom without crossing the matched region. Anything attached
        // only through removed atoms is dropped with them.
        let mut carried: Mol<Atom, Bond> = Mol::new();
        let mut carried_node: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut anchors: Vec<(NodeIndex, NodeIndex, Bond)> = Vec::new();
        let mut bfs: VecDeque<NodeIndex> = VecDeque::new();
        // label order fixes atom numbering in the candidate, keeping
        // repeated applications bit-identical
        let mut labels: Vec<u16> = target_of_label.keys().copied().collect();
        labels.sort_unstable();
        for label in labels {
            let t_idx = target_of_label[&label];
            let p_idx = self.product_node_of_label[&label];
            let core_anchor = core_node[p_idx.index()];
            for nb in target.neighbors(t_idx) {
                if query_of_target.contains_key(&nb) {
                    continue;
                }
                let edge = target.bond_between(t_idx, nb).expect("neighbor bond exists");
                anchors.push((core_anchor, nb, target.bond(edge).clone()));
                if !carried_node.contains_key(&nb) {
                    carried_node.insert(nb, carried.add_atom(target.atom(nb).clone()));
                    bfs.push_back(nb);
                }
            }
        }
        while let Some(t_idx) = bfs.pop_front() {
            for nb in target.neighbors(t_idx) {
                if query_of_target.contains_key(&nb) || carried_node.contains_key(&nb) {
                    continue;
                }
                carried_node.insert(nb, carried.add_atom(target.atom(nb).clone()));
                bfs.push_back(nb);
            }
        }
        for edge in target.bonds() {
            let (t1, t2) = target.bond_endpoints(edge).expect("edge has endpoints");
            if let (Some(&c1), Some(&c2)) = (carried_node.get(&t1), carried_node.get(&t2)) {
                carried.add_bond(c1, c2, target.bond(edge).clone());
            }
        }

        // disjoint union, then stitch the attachment bonds across the seam
        let mut combined = combine_mols(&core, &carried);
        for (core_anchor, t_nb, bond) in anchors {
            let a = combined.left_atom(core_anchor);
            let b = combined.right_atom(carried_node[&t_nb]);
            combined.mol.add_bond(a, b, bond);
        }

        // hydrogen bookkeeping: template atoms without an explicit H
        // count get theirs recomputed for the bonds they ended up with;
        // carried atoms keep what they had
        for p_idx in self.product.atoms() {
            if self.product.atom(p_idx).hydrogen_count > 0 {
                continue;
            }
            let idx = combined.left_atom(core_node[p_idx.index()]);
            let sum2: u16 = combined
                .mol
                .bonds_of(idx)
                .map(|e| combined.mol.bond(e).order.doubled() as u16)
                .sum();
            let (atomic_num, formal_charge) = {
                let atom = combined.mol.atom(idx);
                (atom.atomic_num, atom.formal_charge)
            };
            combined.mol.atom_mut(idx).hydrogen_count =
                implicit_hydrogen_count(atomic_num, formal_charge, sum2);
        }

        combined.mol
    }
}

/// Highlight a rewrite product: every atom that kept a rule label, plus
/// every bond joining two such atoms. Attaches the block to the molecule
/// metadata.
pub fn highlight_product(mol: &mut Mol<Atom, Bond>) {
    let mut highlight = Highlight::new();
    let tagged: Vec<NodeIndex> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).has_tag(OLD_MAP_TAG))
        .collect();
    for (i, &a) in tagged.iter().enumerate() {
        for &b in tagged.iter().skip(i + 1) {
            if let Some(edge) = mol.bond_between(a, b) {
                highlight.add_bond(edge.index());
            }
        }
        highlight.add_atom(a.index());
    }
    attach_highlight(mol, &highlight);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HIGHLIGHT_PROP;

    fn mol(smiles: &str) -> Mol<Atom, Bond> {
        from_smiles(smiles).unwrap_or_else(|e| panic!("bad SMILES {smiles:?}: {e}"))
    }

    fn canonical(smiles: &str) -> String {
        to_canonical_smiles(&mol(smiles))
    }

    // --- Rule construction ---

    #[test]
    fn parse_simple_rule() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        assert_eq!(rule.reactant().atom_count(), 2);
        assert_eq!(rule.product().atom_count(), 2);
    }

    #[test]
    fn error_no_separator() {
        assert_eq!(
            RewriteRule::from_rxn_smiles("[C:1][Br:2]"),
            Err(RuleError::MissingSeparator)
        );
    }

    #[test]
    fn error_empty_sides() {
        assert_eq!(
            RewriteRule::from_rxn_smiles("[C:1]>>"),
            Err(RuleError::EmptyProducts)
        );
        assert_eq!(
            RewriteRule::from_rxn_smiles(">>[C:1]"),
            Err(RuleError::EmptyReactants)
        );
    }

    #[test]
    fn error_duplicate_label() {
        let err = RewriteRule::from_rxn_smiles("[C:1][C:1]>>[C:1]").unwrap_err();
        assert_eq!(
            err,
            RuleError::DuplicateMapNum {
                section: "reactant",
                map_num: 1
            }
        );
    }

    #[test]
    fn error_bad_pattern_smiles() {
        let err = RewriteRule::from_rxn_smiles("[C:1]>>[Xx:1]").unwrap_err();
        assert!(matches!(
            err,
            RuleError::Smiles {
                section: "product",
                ..
            }
        ));
    }

    #[test]
    fn roles_classified() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        assert_eq!(
            rule.reactant_roles(),
            &[NodeRole::Retained(1), NodeRole::Removed]
        );
        assert_eq!(
            rule.product_roles(),
            &[NodeRole::Retained(1), NodeRole::Introduced]
        );
    }

    // --- Application basics ---

    #[test]
    fn substitution_simple() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("CBr")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("CO"));
    }

    #[test]
    fn substituents_are_carried() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("CCCBr")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("CCCO"));
    }

    #[test]
    fn no_match_returns_none() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        assert!(rule.apply(&mol("CCO")).is_none());
    }

    #[test]
    fn empty_input_returns_none() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        assert!(rule.apply(&Mol::new()).is_none());
    }

    #[test]
    fn bond_order_change() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][C:2]>>[C:1]=[C:2]").unwrap();
        let product = rule.apply(&mol("CC")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("C=C"));
        let edge = product.bonds().next().unwrap();
        assert_eq!(product.bond(edge).order, crate::bond::BondOrder::Double);
    }

    #[test]
    fn charge_change() {
        let rule = RewriteRule::from_rxn_smiles("[O:1]>>[O-:1]").unwrap();
        let product = rule.apply(&mol("CO")).unwrap();
        let o_idx = product
            .atoms()
            .find(|&i| product.atom(i).atomic_num == 8)
            .unwrap();
        assert_eq!(product.atom(o_idx).formal_charge, -1);
        assert_eq!(product.atom(o_idx).hydrogen_count, 0);
    }

    #[test]
    fn element_change() {
        let rule = RewriteRule::from_rxn_smiles("[N:1]>>[O:1]").unwrap();
        let product = rule.apply(&mol("CN")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("CO"));
    }

    #[test]
    fn unmapped_product_atom_created() {
        let rule = RewriteRule::from_rxn_smiles("[N:1]>>[N:1]C").unwrap();
        let product = rule.apply(&mol("N")).unwrap();
        assert_eq!(product.atom_count(), 2);
        assert_eq!(to_canonical_smiles(&product), canonical("CN"));
    }

    #[test]
    fn cleavage_produces_fragments() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][O:2]>>[C:1].[O:2]").unwrap();
        let product = rule.apply(&mol("CCO")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("CC.O"));
    }

    #[test]
    fn ring_bonds_survive_around_match() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("BrC1CCC1")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("OC1CCC1"));
    }

    #[test]
    fn unpatterned_bond_between_retained_atoms_preserved() {
        let rule = RewriteRule::from_rxn_smiles("[C:1].[N:2]>>[C:1].[N+:2]").unwrap();
        let product = rule.apply(&mol("CN")).unwrap();
        assert_eq!(product.bond_count(), 1, "the C-N bond must survive");
        let n_idx = product
            .atoms()
            .find(|&i| product.atom(i).atomic_num == 7)
            .unwrap();
        assert_eq!(product.atom(n_idx).formal_charge, 1);
    }

    #[test]
    fn fragment_attached_only_to_removed_atom_is_dropped() {
        // the sulfur is removed, taking the far methyl with it: that
        // methyl is only reachable through the matched region
        let rule = RewriteRule::from_rxn_smiles("[C:1][S:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("CSC")).unwrap();
        assert_eq!(product.atom_count(), 2);
        assert_eq!(to_canonical_smiles(&product), canonical("CO"));
    }

    #[test]
    fn double_substitution_via_queue() {
        // two distinct sites: the mono products differ, so the queue
        // keeps two entries and the front one gets re-expanded once
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("BrCCC(C)Br")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("OCCC(C)O"));
    }

    #[test]
    fn symmetric_sites_stop_after_one_pass() {
        // both mono products are canonically identical; the duplicate is
        // never enqueued, the queue stays below two, and the surviving
        // product still carries one bromine
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("BrCCBr")).unwrap();
        assert_eq!(to_canonical_smiles(&product), canonical("OCCBr"));
    }

    #[test]
    fn identity_rewrite_is_deduplicated_to_none() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][C:2]>>[C:1][C:2]").unwrap();
        assert!(rule.apply(&mol("CCC")).is_none());
    }

    // --- Filtering ---

    #[test]
    fn invalid_candidates_are_discarded_silently() {
        // pentavalent carbon: every candidate fails the valence check
        let rule = RewriteRule::from_rxn_smiles("[C:1]>>[CH5:1]").unwrap();
        assert!(rule.apply(&mol("C")).is_none());
    }

    #[test]
    fn queue_never_holds_canonical_duplicates() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let input = mol("BrCCBr");
        let mut seen = HashSet::new();
        seen.insert(to_canonical_smiles(&input));
        let mut queue = VecDeque::new();
        rule.expand(&input, &mut seen, &mut queue);
        let keys: Vec<String> = queue.iter().map(to_canonical_smiles).collect();
        let distinct: HashSet<&String> = keys.iter().collect();
        assert_eq!(keys.len(), distinct.len());
        assert_eq!(queue.len(), 1, "symmetric duplicate must be dropped");
    }

    // --- Provenance and highlighting ---

    #[test]
    fn retained_atoms_carry_provenance_tags() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let product = rule.apply(&mol("CCBr")).unwrap();
        let tagged: Vec<_> = product
            .atoms()
            .filter(|&i| product.atom(i).has_tag(OLD_MAP_TAG))
            .collect();
        assert_eq!(tagged.len(), 1);
        assert_eq!(product.atom(tagged[0]).tag(OLD_MAP_TAG), Some("1"));
    }

    #[test]
    fn product_highlight_attached_on_enqueue() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][C:2][Br:3]>>[C:1][C:2]O").unwrap();
        let product = rule.apply(&mol("CCBr")).unwrap();
        let block = product.prop(HIGHLIGHT_PROP).unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "COLOR #ff0000");
        assert!(lines[1].starts_with("ATOMS "));
        assert!(lines[2].starts_with("BONDS "));
        // both retained carbons highlighted, and the bond between them
        let atom_ids: Vec<&str> = lines[1]["ATOMS ".len()..].split_whitespace().collect();
        let bond_ids: Vec<&str> = lines[2]["BONDS ".len()..].split_whitespace().collect();
        assert_eq!(atom_ids.len(), 2);
        assert_eq!(bond_ids.len(), 1);
    }

    #[test]
    fn highlighted_bonds_join_highlighted_atoms() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][C:2][Br:3]>>[C:1][C:2]O").unwrap();
        let product = rule.apply(&mol("CCCBr")).unwrap();
        let block = product.prop(HIGHLIGHT_PROP).unwrap();
        let ids = |line: &str, prefix: &str| -> Vec<usize> {
            line[prefix.len()..]
                .split_whitespace()
                .map(|t| t.parse::<usize>().unwrap() - 1)
                .collect()
        };
        let lines: Vec<&str> = block.lines().collect();
        let atoms = ids(lines[1], "ATOMS ");
        let bonds = ids(lines[2], "BONDS ");
        assert!(!atoms.is_empty());
        for bond in bonds {
            let (a, b) = product
                .bond_endpoints(petgraph::graph::EdgeIndex::new(bond))
                .unwrap();
            assert!(atoms.contains(&a.index()));
            assert!(atoms.contains(&b.index()));
        }
        // every highlighted atom carries a rule label
        for &a in &atoms {
            assert!(product.atom(NodeIndex::new(a)).has_tag(OLD_MAP_TAG));
        }
    }

    // --- Batch ---

    #[test]
    fn batch_one_slot_per_input() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let inputs = vec![Some(mol("CBr")), None, Some(mol("CC"))];
        let out = rule.apply_batch(&inputs);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_some());
        assert!(out[1].is_none());
        assert!(out[2].is_none());
    }

    #[test]
    fn batch_repeated_input_identical_results() {
        let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
        let inputs = vec![Some(mol("CCBr")), Some(mol("CCBr"))];
        let out = rule.apply_batch(&inputs);
        let a = to_canonical_smiles(out[0].as_ref().unwrap());
        let b = to_canonical_smiles(out[1].as_ref().unwrap());
        assert_eq!(a, b);
    }
}
