//! Minimal periodic-table data: symbol lookup, default valences, and the
//! SMILES organic/aromatic subsets. Only what parsing, writing, and the
//! valence check need.

static SYMBOLS: [&str; 119] = [
    "*", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg",
    "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Element symbol for an atomic number, or `None` if out of range.
pub fn symbol(atomic_num: u8) -> Option<&'static str> {
    if atomic_num == 0 {
        return None;
    }
    SYMBOLS.get(atomic_num as usize).copied()
}

/// Atomic number for an exact (case-sensitive) element symbol.
pub fn from_symbol(sym: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&s| s == sym)
        .filter(|&i| i > 0)
        .map(|i| i as u8)
}

/// Default valences used for implicit-hydrogen assignment and the valence
/// check. Elements without an entry are never assigned implicit hydrogens
/// and are skipped by the check.
pub fn default_valences(atomic_num: u8) -> &'static [u8] {
    match atomic_num {
        1 => &[1],        // H
        5 => &[3],        // B
        6 => &[4],        // C
        7 => &[3],        // N
        8 => &[2],        // O
        9 => &[1],        // F
        14 => &[4],       // Si
        15 => &[3, 5],    // P
        16 => &[2, 4, 6], // S
        17 => &[1],       // Cl
        33 => &[3, 5],    // As
        34 => &[2, 4, 6], // Se
        35 => &[1],       // Br
        52 => &[2, 4, 6], // Te
        53 => &[1],       // I
        _ => &[],
    }
}

/// Whether the element may be written bare (no brackets) in SMILES.
pub fn is_organic_subset(atomic_num: u8) -> bool {
    matches!(atomic_num, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
}

/// Lowercase symbol for elements that may appear as aromatic atoms, or
/// `None` for elements SMILES never writes aromatic.
pub fn aromatic_symbol(atomic_num: u8) -> Option<&'static str> {
    match atomic_num {
        5 => Some("b"),
        6 => Some("c"),
        7 => Some("n"),
        8 => Some("o"),
        15 => Some("p"),
        16 => Some("s"),
        33 => Some("as"),
        34 => Some("se"),
        _ => None,
    }
}

/// Atomic number for a lowercase aromatic symbol.
pub fn from_aromatic_symbol(sym: &str) -> Option<u8> {
    match sym {
        "b" => Some(5),
        "c" => Some(6),
        "n" => Some(7),
        "o" => Some(8),
        "p" => Some(15),
        "s" => Some(16),
        "as" => Some(33),
        "se" => Some(34),
        _ => None,
    }
}
