//! Single-pass SMILES parser.
//!
//! Accepts the organic subset, aromatic lowercase atoms, bracket atoms
//! (isotope, explicit H, charge, atom class), branches, ring closures
//! (including `%nn`), explicit bonds `- = # :`, and dot-separated
//! fragments. Stereo markers (`@`, `/`, `\`) are consumed and discarded;
//! this crate carries no stereochemistry. Implicit bonds between two
//! aromatic atoms are aromatic, otherwise single; there is no
//! kekulization step.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element;
use crate::mol::Mol;
use crate::valence::implicit_hydrogen_count;

use super::error::SmilesError;

struct RingEntry {
    node: NodeIndex,
    order: Option<BondOrder>,
}

pub(super) fn parse(input: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    Parser::new(trimmed).run()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mol: Mol<Atom, Bond>,
    /// Per-atom flag: bracket atoms carry their hydrogen count explicitly.
    bracketed: Vec<bool>,
    prev: Option<NodeIndex>,
    branch_stack: Vec<NodeIndex>,
    pending: Option<BondOrder>,
    rings: HashMap<u16, RingEntry>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            mol: Mol::new(),
            bracketed: Vec::new(),
            prev: None,
            branch_stack: Vec::new(),
            pending: None,
            rings: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn run(mut self) -> Result<Mol<Atom, Bond>, SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    let prev = self
                        .prev
                        .ok_or(SmilesError::UnmatchedParen { pos: self.pos })?;
                    self.branch_stack.push(prev);
                    self.advance();
                }
                ')' => {
                    if self.pending.is_some() {
                        return Err(SmilesError::UnexpectedChar { pos: self.pos, ch });
                    }
                    let prev = self
                        .branch_stack
                        .pop()
                        .ok_or(SmilesError::UnmatchedParen { pos: self.pos })?;
                    self.prev = Some(prev);
                    self.advance();
                }
                '-' | '=' | '#' | ':' | '/' | '\\' => {
                    if self.pending.is_some() || self.prev.is_none() {
                        return Err(SmilesError::UnexpectedChar { pos: self.pos, ch });
                    }
                    self.pending = Some(match ch {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        ':' => BondOrder::Aromatic,
                        // '/' and '\' carried direction info; here they are
                        // plain single bonds
                        _ => BondOrder::Single,
                    });
                    self.advance();
                }
                '.' => {
                    if self.pending.is_some() {
                        return Err(SmilesError::UnexpectedChar { pos: self.pos, ch });
                    }
                    self.prev = None;
                    self.advance();
                }
                '0'..='9' => {
                    let digit = ch as u16 - '0' as u16;
                    self.advance();
                    self.ring_closure(digit)?;
                }
                '%' => {
                    self.advance();
                    let d1 = self.digit()?;
                    let d2 = self.digit()?;
                    self.ring_closure(d1 * 10 + d2)?;
                }
                '[' => {
                    let idx = self.bracket_atom()?;
                    self.finish_atom(idx, true)?;
                }
                _ => {
                    let idx = self.organic_atom()?;
                    self.finish_atom(idx, false)?;
                }
            }
        }

        if let Some(&digit) = self.rings.keys().next() {
            return Err(SmilesError::UnclosedRing { digit });
        }
        if !self.branch_stack.is_empty() {
            return Err(SmilesError::UnmatchedParen { pos: self.pos });
        }
        if self.pending.is_some() {
            return Err(SmilesError::UnexpectedEnd);
        }

        self.assign_implicit_hydrogens();
        Ok(self.mol)
    }

    fn digit(&mut self) -> Result<u16, SmilesError> {
        match self.peek() {
            Some(ch @ '0'..='9') => {
                self.advance();
                Ok(ch as u16 - '0' as u16)
            }
            Some(ch) => Err(SmilesError::UnexpectedChar { pos: self.pos, ch }),
            None => Err(SmilesError::UnexpectedEnd),
        }
    }

    fn read_number(&mut self) -> Option<u16> {
        let mut value: u32 = 0;
        let mut seen = false;
        while let Some(ch @ '0'..='9') = self.peek() {
            seen = true;
            value = (value * 10 + (ch as u32 - '0' as u32)).min(u16::MAX as u32);
            self.advance();
        }
        if seen {
            Some(value as u16)
        } else {
            None
        }
    }

    fn implicit_order(&self, a: NodeIndex, b: NodeIndex) -> BondOrder {
        if self.mol.atom(a).is_aromatic && self.mol.atom(b).is_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn finish_atom(&mut self, idx: NodeIndex, bracketed: bool) -> Result<(), SmilesError> {
        self.bracketed.push(bracketed);
        if let Some(prev) = self.prev {
            let order = self
                .pending
                .take()
                .unwrap_or_else(|| self.implicit_order(prev, idx));
            self.mol.add_bond(prev, idx, Bond::new(order));
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn ring_closure(&mut self, digit: u16) -> Result<(), SmilesError> {
        let node = match self.prev {
            Some(n) => n,
            None => {
                return Err(SmilesError::UnexpectedChar {
                    pos: self.pos.saturating_sub(1),
                    ch: char::from_digit((digit % 10) as u32, 10).unwrap_or('0'),
                })
            }
        };
        let order = self.pending.take();
        if let Some(entry) = self.rings.remove(&digit) {
            let bond_order = match (entry.order, order) {
                (Some(a), Some(b)) if a != b => {
                    return Err(SmilesError::RingBondConflict { digit })
                }
                (Some(a), _) => a,
                (None, Some(b)) => b,
                (None, None) => self.implicit_order(entry.node, node),
            };
            self.mol.add_bond(entry.node, node, Bond::new(bond_order));
        } else {
            self.rings.insert(digit, RingEntry { node, order });
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<NodeIndex, SmilesError> {
        let pos = self.pos;
        let ch = self.peek().ok_or(SmilesError::UnexpectedEnd)?;
        let (atomic_num, aromatic) = match ch {
            'C' if self.chars.get(self.pos + 1) == Some(&'l') => {
                self.advance();
                (17, false)
            }
            'B' if self.chars.get(self.pos + 1) == Some(&'r') => {
                self.advance();
                (35, false)
            }
            'B' => (5, false),
            'C' => (6, false),
            'N' => (7, false),
            'O' => (8, false),
            'P' => (15, false),
            'S' => (16, false),
            'F' => (9, false),
            'I' => (53, false),
            'b' => (5, true),
            'c' => (6, true),
            'n' => (7, true),
            'o' => (8, true),
            'p' => (15, true),
            's' => (16, true),
            _ => return Err(SmilesError::UnexpectedChar { pos, ch }),
        };
        self.advance();
        let atom = Atom {
            atomic_num,
            is_aromatic: aromatic,
            ..Atom::default()
        };
        Ok(self.mol.add_atom(atom))
    }

    fn bracket_atom(&mut self) -> Result<NodeIndex, SmilesError> {
        let start = self.pos;
        self.advance(); // '['
        let mut atom = Atom::default();

        if let Some(iso) = self.read_number() {
            atom.isotope = iso;
        }

        let ch = self.peek().ok_or(SmilesError::UnclosedBracket { pos: start })?;
        if ch.is_ascii_uppercase() {
            let mut sym = ch.to_string();
            self.advance();
            if let Some(c2) = self.peek() {
                if c2.is_ascii_lowercase() {
                    let two = format!("{sym}{c2}");
                    if element::from_symbol(&two).is_some() {
                        sym = two;
                        self.advance();
                    }
                }
            }
            atom.atomic_num = element::from_symbol(&sym).ok_or(SmilesError::InvalidElement {
                pos: start + 1,
                text: sym,
            })?;
        } else if ch.is_ascii_lowercase() {
            let mut sym = ch.to_string();
            self.advance();
            if let Some(c2) = self.peek() {
                if c2.is_ascii_lowercase() {
                    let two = format!("{sym}{c2}");
                    if element::from_aromatic_symbol(&two).is_some() {
                        sym = two;
                        self.advance();
                    }
                }
            }
            atom.atomic_num =
                element::from_aromatic_symbol(&sym).ok_or(SmilesError::InvalidElement {
                    pos: start + 1,
                    text: sym,
                })?;
            atom.is_aromatic = true;
        } else {
            return Err(SmilesError::UnexpectedChar { pos: self.pos, ch });
        }

        loop {
            let ch = self.peek().ok_or(SmilesError::UnclosedBracket { pos: start })?;
            match ch {
                ']' => {
                    self.advance();
                    break;
                }
                '@' => {
                    // tetrahedral marker, discarded
                    self.advance();
                    if self.peek() == Some('@') {
                        self.advance();
                    }
                }
                'H' => {
                    self.advance();
                    atom.hydrogen_count = self.read_number().unwrap_or(1).min(u8::MAX as u16) as u8;
                }
                '+' | '-' => {
                    let sign: i16 = if ch == '+' { 1 } else { -1 };
                    self.advance();
                    let magnitude = if let Some(n) = self.read_number() {
                        n as i16
                    } else {
                        let mut m: i16 = 1;
                        while self.peek() == Some(ch) {
                            self.advance();
                            m += 1;
                        }
                        m
                    };
                    let charge = sign * magnitude;
                    if !(-15..=15).contains(&charge) {
                        return Err(SmilesError::InvalidCharge { pos: self.pos });
                    }
                    atom.formal_charge = charge as i8;
                }
                ':' => {
                    self.advance();
                    atom.map_num = self.read_number().ok_or(SmilesError::UnexpectedChar {
                        pos: self.pos,
                        ch: ':',
                    })?;
                }
                _ => return Err(SmilesError::UnexpectedChar { pos: self.pos, ch }),
            }
        }

        Ok(self.mol.add_atom(atom))
    }

    fn assign_implicit_hydrogens(&mut self) {
        let atoms: Vec<NodeIndex> = self.mol.atoms().collect();
        for idx in atoms {
            if self.bracketed[idx.index()] {
                continue;
            }
            let sum2: u16 = self
                .mol
                .bonds_of(idx)
                .map(|e| self.mol.bond(e).order.doubled() as u16)
                .sum();
            let atom = self.mol.atom(idx);
            let h = implicit_hydrogen_count(atom.atomic_num, atom.formal_charge, sum2);
            self.mol.atom_mut(idx).hydrogen_count = h;
        }
    }
}
