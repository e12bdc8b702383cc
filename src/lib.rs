//! molrewrite: reaction-based rewriting and substructure highlighting
//! for molecular graphs.
//!
//! The crate has two algorithmic cores. The [reaction engine](rxn)
//! applies a rewrite rule (reactant/product patterns linked by atom-map
//! labels) to a molecule, enumerating match sites, deduplicating
//! products by canonical SMILES, and tagging surviving atoms with their
//! rule provenance. The [highlight resolver](highlight) unions all
//! substructure matches of a pattern list into a renderer annotation,
//! matching per connected fragment so overlapping pattern instances are
//! not missed.
//!
//! Everything they need ships in the supporting modules: SMILES
//! parsing and writing, canonical ranking, valence checking, VF2
//! substructure search, and graph splitting/combining.
//!
//! # Example
//!
//! ```
//! use molrewrite::{from_smiles, to_canonical_smiles, RewriteRule};
//!
//! let rule = RewriteRule::from_rxn_smiles("[C:1][Br:2]>>[C:1]O").unwrap();
//! let input = from_smiles("CCBr").unwrap();
//! let product = rule.apply(&input).unwrap();
//! assert_eq!(
//!     to_canonical_smiles(&product),
//!     to_canonical_smiles(&from_smiles("CCO").unwrap()),
//! );
//! ```

pub mod atom;
pub mod bond;
pub mod canonical;
pub mod element;
pub mod graph_ops;
pub mod highlight;
pub mod mol;
pub mod rxn;
pub mod smiles;
pub mod substruct;
pub mod traits;
pub mod valence;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use canonical::canonical_ranks;
pub use graph_ops::{combine_mols, connected_components, get_fragments, num_components, Combined};
pub use highlight::{
    apply_highlight, attach_highlight, highlight_batch, highlight_patterns, Highlight,
    HIGHLIGHT_COLOR, HIGHLIGHT_PROP,
};
pub use mol::Mol;
pub use rxn::{highlight_product, NodeRole, RewriteRule, RuleError, OLD_MAP_TAG};
pub use smiles::{from_smiles, to_canonical_smiles, to_smiles, SmilesError};
pub use substruct::{
    get_substruct_match, get_substruct_match_with, get_substruct_matches,
    get_substruct_matches_with, has_substruct_match, has_substruct_match_with, AtomMapping,
};
pub use valence::{check_valence, implicit_hydrogen_count, twice_total_valence, ValenceError};
