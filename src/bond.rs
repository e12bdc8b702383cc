#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    /// Aromatic bonds are a first-class order here; this crate does not
    /// kekulize, so rings round-trip exactly as written.
    Aromatic,
}

impl BondOrder {
    /// Twice the nominal bond order; aromatic counts as 1.5. Integer
    /// arithmetic for valence sums without a float in sight.
    pub fn doubled(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub order: BondOrder,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self { order }
    }
}

impl Default for Bond {
    fn default() -> Self {
        Self {
            order: BondOrder::Single,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}
