use std::collections::BTreeMap;

/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties plus two annotation channels:
/// the SMILES atom-map number (`map_num`), which identifies corresponding
/// atoms across the two sides of a rewrite rule, and a free-form
/// string-keyed tag map for per-atom metadata such as rewrite provenance.
/// Neither channel participates in canonical identity or substructure
/// matching.
///
/// # Examples
///
/// ```
/// use molrewrite::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// assert_eq!(carbon.map_num, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance (the common case).
    pub isotope: u16,
    /// Number of virtual (suppressed) hydrogens on this atom.
    ///
    /// These are not graph nodes. After SMILES parsing, this count is the
    /// single source of truth for how many Hs the atom carries.
    pub hydrogen_count: u8,
    /// Whether this atom is part of an aromatic system.
    pub is_aromatic: bool,
    /// SMILES atom class (`[C:1]`). `0` means unlabeled. Rewrite rules use
    /// this to link reactant-pattern atoms to product-pattern atoms.
    pub map_num: u16,
    /// Mutable string-keyed tags. Annotation only; ignored by matching and
    /// canonicalization.
    pub tags: BTreeMap<String, String>,
}

impl Atom {
    /// Bare atom of the given element; every other field at its default.
    pub fn of_element(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
