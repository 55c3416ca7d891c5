//! SMILES reader for the reference engine.
//!
//! Covers the organic subset, bracket atoms (charge, explicit hydrogens,
//! atom maps), branches, ring closures, and aromatic lowercase forms.
//! Attachment points are read from `[*:n]` atom maps and `[Rn]` pseudo
//! atoms and registered in the molecule's attachment list. Tetrahedral
//! `@`/`@@` marks and `/`/`\` bond directions are accepted and discarded;
//! wedge stereo enters the model through molfiles.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::error::ParseError;
use crate::molecule::Molecule;
use crate::simple::element::{implicit_hydrogens, Element};

fn err(pos: usize, msg: impl Into<String>) -> ParseError {
    ParseError::Smiles {
        pos,
        msg: msg.into(),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mol: Molecule,
    prev: Option<NodeIndex>,
    stack: Vec<Option<NodeIndex>>,
    pending: Option<BondOrder>,
    rings: HashMap<u16, (NodeIndex, Option<BondOrder>)>,
    /// Explicit hydrogen counts of bracket atoms; bare atoms get theirs
    /// computed after the graph is complete.
    explicit_h: Vec<(NodeIndex, Option<u8>)>,
}

pub fn parse(text: &str) -> Result<Molecule, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(err(0, "empty input"));
    }
    let mut p = Parser {
        chars: trimmed.chars().collect(),
        pos: 0,
        mol: Molecule::new(),
        prev: None,
        stack: Vec::new(),
        pending: None,
        rings: HashMap::new(),
        explicit_h: Vec::new(),
    };
    p.run()?;
    Ok(p.mol)
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    self.bump();
                    if self.prev.is_none() {
                        return Err(err(self.pos - 1, "branch before any atom"));
                    }
                    self.stack.push(self.prev);
                }
                ')' => {
                    self.bump();
                    self.prev = self
                        .stack
                        .pop()
                        .ok_or_else(|| err(self.pos - 1, "unmatched ')'"))?;
                }
                '-' | '/' | '\\' => {
                    self.bump();
                    self.set_pending(BondOrder::Single)?;
                }
                '=' => {
                    self.bump();
                    self.set_pending(BondOrder::Double)?;
                }
                '#' => {
                    self.bump();
                    self.set_pending(BondOrder::Triple)?;
                }
                ':' => {
                    self.bump();
                    self.set_pending(BondOrder::Aromatic)?;
                }
                '.' => {
                    self.bump();
                    if self.pending.is_some() {
                        return Err(err(self.pos - 1, "bond before dot"));
                    }
                    self.prev = None;
                }
                '%' => {
                    self.bump();
                    let d1 = self.digit()?;
                    let d2 = self.digit()?;
                    self.ring_bond(d1 * 10 + d2)?;
                }
                '0'..='9' => {
                    self.bump();
                    self.ring_bond(c as u16 - '0' as u16)?;
                }
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom, None)?;
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.attach(atom, Some(()))?;
                }
            }
        }
        if !self.stack.is_empty() {
            return Err(err(self.pos, "unmatched '('"));
        }
        if let Some((&digit, _)) = self.rings.iter().next() {
            return Err(err(self.pos, format!("unclosed ring {}", digit)));
        }
        self.finish();
        Ok(())
    }

    fn set_pending(&mut self, order: BondOrder) -> Result<(), ParseError> {
        if self.pending.is_some() {
            return Err(err(self.pos - 1, "two bond symbols in a row"));
        }
        self.pending = Some(order);
        Ok(())
    }

    fn digit(&mut self) -> Result<u16, ParseError> {
        match self.bump() {
            Some(c @ '0'..='9') => Ok(c as u16 - '0' as u16),
            _ => Err(err(self.pos, "expected ring digit")),
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .ok()
    }

    /// Bare organic-subset atom, optionally aromatic lowercase.
    fn organic_atom(&mut self) -> Result<Atom, ParseError> {
        let start = self.pos;
        let c = self.bump().ok_or_else(|| err(start, "unexpected end"))?;
        let (elem, aromatic) = match c {
            'C' if self.peek() == Some('l') => {
                self.bump();
                (Element::Cl, false)
            }
            'B' if self.peek() == Some('r') => {
                self.bump();
                (Element::Br, false)
            }
            'B' => (Element::B, false),
            'C' => (Element::C, false),
            'N' => (Element::N, false),
            'O' => (Element::O, false),
            'P' => (Element::P, false),
            'S' => (Element::S, false),
            'F' => (Element::F, false),
            'I' => (Element::I, false),
            'b' => (Element::B, true),
            'c' => (Element::C, true),
            'n' => (Element::N, true),
            'o' => (Element::O, true),
            'p' => (Element::P, true),
            's' => (Element::S, true),
            '*' => {
                return Ok(Atom::default());
            }
            other => {
                return Err(err(start, format!("unexpected character '{}'", other)));
            }
        };
        Ok(Atom {
            atomic_num: elem.atomic_num(),
            is_aromatic: aromatic,
            ..Atom::default()
        })
    }

    fn bracket_atom(&mut self) -> Result<Atom, ParseError> {
        let open = self.pos;
        self.bump(); // '['
        if matches!(self.peek(), Some('0'..='9')) {
            return Err(err(self.pos, "isotope labels are not supported"));
        }

        let mut atom = Atom::default();
        let sym_start = self.pos;
        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some('R') => {
                self.bump();
                let label = self
                    .number()
                    .ok_or_else(|| err(self.pos, "expected R-group number"))?;
                atom.rgroup = label_u8(label, sym_start)?;
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let mut sym: String = String::new();
                sym.push(self.bump().expect("peeked"));
                if matches!(self.peek(), Some(c2) if c2.is_ascii_lowercase()) {
                    let two: String = format!("{}{}", sym, self.peek().expect("peeked"));
                    if Element::from_symbol(&two).is_some() {
                        self.bump();
                        sym = two;
                    }
                }
                let aromatic = sym.chars().next().expect("nonempty").is_ascii_lowercase();
                let lookup: String = sym
                    .char_indices()
                    .map(|(i, c)| if i == 0 { c.to_ascii_uppercase() } else { c })
                    .collect();
                let elem = Element::from_symbol(&lookup)
                    .ok_or_else(|| err(sym_start, format!("unknown element '{}'", sym)))?;
                if aromatic && !elem.has_aromatic_form() {
                    return Err(err(sym_start, format!("'{}' cannot be aromatic", sym)));
                }
                atom.atomic_num = elem.atomic_num();
                atom.is_aromatic = aromatic;
            }
            _ => return Err(err(open, "unclosed bracket atom")),
        }

        // tetrahedral marks carry no meaning in this model
        while self.peek() == Some('@') {
            self.bump();
        }

        let mut h = 0u8;
        if self.peek() == Some('H') {
            self.bump();
            h = self.number().unwrap_or(1) as u8;
        }

        match self.peek() {
            Some('+') => {
                self.bump();
                atom.formal_charge = self.signed_charge(1)?;
            }
            Some('-') => {
                self.bump();
                atom.formal_charge = self.signed_charge(-1)?;
            }
            _ => {}
        }

        if self.peek() == Some(':') {
            self.bump();
            let map = self
                .number()
                .ok_or_else(|| err(self.pos, "expected atom map number"))?;
            if atom.atomic_num == 0 && atom.rgroup == 0 {
                atom.rgroup = label_u8(map, self.pos)?;
            }
        }

        if self.bump() != Some(']') {
            return Err(err(open, "unclosed bracket atom"));
        }

        atom.hydrogen_count = h;
        Ok(atom)
    }

    fn signed_charge(&mut self, sign: i8) -> Result<i8, ParseError> {
        let repeat_char = if sign > 0 { '+' } else { '-' };
        let mut magnitude: i8 = 1;
        if let Some(n) = self.number() {
            if n == 0 || n > 15 {
                return Err(err(self.pos, "charge out of range"));
            }
            magnitude = n as i8;
        } else {
            while self.peek() == Some(repeat_char) {
                self.bump();
                magnitude += 1;
            }
        }
        Ok(sign * magnitude)
    }

    /// Add the atom to the graph and bond it to the chain head.
    /// `bare` is `Some` for non-bracket atoms, which get computed hydrogens.
    fn attach(&mut self, atom: Atom, bare: Option<()>) -> Result<NodeIndex, ParseError> {
        let explicit = if bare.is_some() {
            None
        } else {
            Some(atom.hydrogen_count)
        };
        let aromatic = atom.is_aromatic;
        let rgroup = atom.rgroup;
        let idx = self.mol.add_atom(atom);
        self.explicit_h.push((idx, explicit));
        if rgroup > 0 {
            self.mol.attachments_mut().set(rgroup, idx);
        }
        if let Some(prev) = self.prev {
            let order = self.bond_order_to(prev, aromatic);
            self.mol.add_bond(prev, idx, Bond { order, stereo: None });
        } else if self.pending.is_some() {
            return Err(err(self.pos, "bond without preceding atom"));
        }
        self.prev = Some(idx);
        Ok(idx)
    }

    fn bond_order_to(&mut self, prev: NodeIndex, aromatic: bool) -> BondOrder {
        match self.pending.take() {
            Some(order) => order,
            None => {
                if aromatic && self.mol.atom(prev).is_aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            }
        }
    }

    fn ring_bond(&mut self, digit: u16) -> Result<(), ParseError> {
        let here = self
            .prev
            .ok_or_else(|| err(self.pos - 1, "ring digit before any atom"))?;
        let pending = self.pending.take();
        match self.rings.remove(&digit) {
            None => {
                self.rings.insert(digit, (here, pending));
                Ok(())
            }
            Some((there, opened)) => {
                let order = match (opened, pending) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(err(
                            self.pos - 1,
                            format!("conflicting bond types on ring closure {}", digit),
                        ));
                    }
                    (Some(a), _) | (_, Some(a)) => a,
                    (None, None) => {
                        if self.mol.atom(here).is_aromatic && self.mol.atom(there).is_aromatic {
                            BondOrder::Aromatic
                        } else {
                            BondOrder::Single
                        }
                    }
                };
                self.mol.add_bond(there, here, Bond { order, stereo: None });
                Ok(())
            }
        }
    }

    /// Compute implicit hydrogens for bare atoms once the graph is closed.
    fn finish(&mut self) {
        for (idx, explicit) in std::mem::take(&mut self.explicit_h) {
            if explicit.is_some() {
                continue;
            }
            let atom = self.mol.atom(idx);
            if atom.atomic_num == 0 {
                continue;
            }
            let elem = match Element::from_atomic_num(atom.atomic_num) {
                Some(e) => e,
                None => continue,
            };
            let bos: u8 = self
                .mol
                .bonds_of(idx)
                .map(|e| match self.mol.bond(e).order {
                    BondOrder::Single | BondOrder::Aromatic => 1,
                    BondOrder::Double => 2,
                    BondOrder::Triple => 3,
                })
                .sum();
            let h = implicit_hydrogens(elem, atom.is_aromatic, bos);
            self.mol.atom_mut(idx).hydrogen_count = h;
        }
    }
}

fn label_u8(value: u32, pos: usize) -> Result<u8, ParseError> {
    if (1..=255).contains(&value) {
        Ok(value as u8)
    } else {
        Err(err(pos, "R-group label out of range"))
    }
}
