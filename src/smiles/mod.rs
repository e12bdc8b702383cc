pub mod error;
mod parser;
mod writer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles};

/// Parse a SMILES string into a molecular graph.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    parser::parse(s)
}
