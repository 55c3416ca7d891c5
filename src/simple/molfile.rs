//! MDL molfile (V2000) reader and writer.
//!
//! This is the format that carries wedge stereo and attachment points
//! between tools. Attachment points travel as `R#` atoms plus an
//! `M  RGP` property line; charges travel as `M  CHG`. Wedge codes on
//! single bonds are 1 (up), 6 (down), and 4 (either/wavy).

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, StereoKind};
use crate::error::ParseError;
use crate::molecule::Molecule;
use crate::simple::element::{implicit_hydrogens, Element};

pub fn write(mol: &Molecule) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("  chemkit            2D\n");
    out.push('\n');
    out.push_str(&format!(
        "{:3}{:3}  0  0  0  0  0  0  0  0999 V2000\n",
        mol.atom_count(),
        mol.bond_count()
    ));

    // 1-based serials in iteration order
    let serial: HashMap<NodeIndex, usize> =
        mol.atoms().enumerate().map(|(i, n)| (n, i + 1)).collect();

    let mut rgp_pairs: Vec<(usize, u8)> = Vec::new();
    let mut chg_pairs: Vec<(usize, i8)> = Vec::new();
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let [x, y] = mol.position(idx).unwrap_or([0.0, 0.0]);
        let symbol = if atom.rgroup > 0 {
            rgp_pairs.push((serial[&idx], atom.rgroup));
            "R#"
        } else if atom.atomic_num == 0 {
            "*"
        } else {
            Element::from_atomic_num(atom.atomic_num)
                .map(|e| e.symbol())
                .unwrap_or("*")
        };
        if atom.formal_charge != 0 {
            chg_pairs.push((serial[&idx], atom.formal_charge));
        }
        out.push_str(&format!(
            "{:10.4}{:10.4}{:10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0\n",
            x, y, 0.0, symbol
        ));
    }

    for e in mol.bonds() {
        let (a, b) = match mol.bond_endpoints(e) {
            Some(pair) => pair,
            None => continue,
        };
        let bond = mol.bond(e);
        let order = match bond.order {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        };
        let stereo = match bond.stereo {
            Some(StereoKind::Up) => 1,
            Some(StereoKind::Wavy) => 4,
            Some(StereoKind::Down) => 6,
            None => 0,
        };
        out.push_str(&format!(
            "{:3}{:3}{:3}{:3}\n",
            serial[&a], serial[&b], order, stereo
        ));
    }

    for (serial, charge) in chg_pairs {
        out.push_str(&format!("M  CHG{:3}{:4}{:4}\n", 1, serial, charge));
    }
    for (serial, label) in rgp_pairs {
        out.push_str(&format!("M  RGP{:3}{:4}{:4}\n", 1, serial, label));
    }
    out.push_str("M  END\n");
    out
}

fn err(line: usize, msg: impl Into<String>) -> ParseError {
    ParseError::Molfile {
        line,
        msg: msg.into(),
    }
}

fn field(text: &str, line: usize, range: std::ops::Range<usize>) -> Result<&str, ParseError> {
    match text.get(range) {
        Some(slice) => Ok(slice.trim()),
        None => Err(err(line, "line too short")),
    }
}

fn parse_usize(text: &str, line: usize, what: &str) -> Result<usize, ParseError> {
    text.parse()
        .map_err(|_| err(line, format!("malformed {}", what)))
}

pub fn read(text: &str) -> Result<Molecule, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 4 {
        return Err(err(lines.len(), "missing header block"));
    }
    let counts = lines[3];
    let natoms = parse_usize(field(counts, 4, 0..3)?, 4, "atom count")?;
    let nbonds = parse_usize(field(counts, 4, 3..6)?, 4, "bond count")?;
    if lines.len() < 4 + natoms + nbonds {
        return Err(err(lines.len(), "truncated connection table"));
    }

    let mut mol = Molecule::new();
    let mut by_serial: Vec<NodeIndex> = Vec::with_capacity(natoms);

    for i in 0..natoms {
        let lineno = 5 + i;
        let line = lines[4 + i];
        let x: f64 = field(line, lineno, 0..10)?
            .parse()
            .map_err(|_| err(lineno, "malformed x coordinate"))?;
        let y: f64 = field(line, lineno, 10..20)?
            .parse()
            .map_err(|_| err(lineno, "malformed y coordinate"))?;
        let symbol = field(line, lineno, 31..34)?;

        let atom = symbol_to_atom(symbol, lineno)?;
        let idx = mol.add_atom(atom);
        mol.set_position(idx, [x, y]);
        by_serial.push(idx);
    }

    for i in 0..nbonds {
        let lineno = 5 + natoms + i;
        let line = lines[4 + natoms + i];
        let a = parse_usize(field(line, lineno, 0..3)?, lineno, "atom serial")?;
        let b = parse_usize(field(line, lineno, 3..6)?, lineno, "atom serial")?;
        let order = parse_usize(field(line, lineno, 6..9)?, lineno, "bond type")?;
        let stereo = if line.len() >= 12 {
            parse_usize(field(line, lineno, 9..12)?, lineno, "bond stereo")?
        } else {
            0
        };

        let a = resolve_serial(&by_serial, a, lineno)?;
        let b = resolve_serial(&by_serial, b, lineno)?;
        let order = match order {
            1 => BondOrder::Single,
            2 => BondOrder::Double,
            3 => BondOrder::Triple,
            4 => BondOrder::Aromatic,
            other => return Err(err(lineno, format!("unsupported bond type {}", other))),
        };
        let stereo = match stereo {
            0 => None,
            1 => Some(StereoKind::Up),
            4 => Some(StereoKind::Wavy),
            6 => Some(StereoKind::Down),
            other => return Err(err(lineno, format!("unsupported wedge code {}", other))),
        };
        mol.add_bond(a, b, Bond { order, stereo });
    }

    for (i, line) in lines.iter().enumerate().skip(4 + natoms + nbonds) {
        let lineno = i + 1;
        if line.starts_with("M  END") {
            break;
        }
        if let Some(rest) = line.strip_prefix("M  CHG") {
            for (serial, value) in property_pairs(rest, lineno)? {
                let idx = resolve_serial(&by_serial, serial, lineno)?;
                mol.atom_mut(idx).formal_charge = value as i8;
            }
        } else if let Some(rest) = line.strip_prefix("M  RGP") {
            for (serial, value) in property_pairs(rest, lineno)? {
                if !(1..=255).contains(&value) {
                    return Err(err(lineno, "R-group label out of range"));
                }
                let idx = resolve_serial(&by_serial, serial, lineno)?;
                mol.atom_mut(idx).rgroup = value as u8;
                mol.attachments_mut().set(value as u8, idx);
            }
        }
        // other property lines are ignored
    }

    finish(&mut mol);
    Ok(mol)
}

fn resolve_serial(
    by_serial: &[NodeIndex],
    serial: usize,
    lineno: usize,
) -> Result<NodeIndex, ParseError> {
    if serial == 0 || serial > by_serial.len() {
        return Err(err(lineno, format!("atom serial {} out of range", serial)));
    }
    Ok(by_serial[serial - 1])
}

fn symbol_to_atom(symbol: &str, lineno: usize) -> Result<Atom, ParseError> {
    if symbol == "R#" || symbol == "*" || symbol == "A" || symbol == "Q" {
        // label for R# atoms arrives later via M RGP
        return Ok(Atom::default());
    }
    if let Some(digits) = symbol.strip_prefix('R') {
        if let Ok(label) = digits.parse::<u8>() {
            return Ok(Atom {
                rgroup: label,
                ..Atom::default()
            });
        }
    }
    match Element::from_symbol(symbol) {
        Some(e) => Ok(Atom::from_atomic_num(e.atomic_num())),
        None => Err(err(lineno, format!("unknown atom symbol '{}'", symbol))),
    }
}

/// "nn ppp vvv ppp vvv ..." property payload as (serial, value) pairs.
fn property_pairs(rest: &str, lineno: usize) -> Result<Vec<(usize, i32)>, ParseError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let count: usize = tokens
        .first()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| err(lineno, "malformed property line"))?;
    if tokens.len() < 1 + 2 * count {
        return Err(err(lineno, "malformed property line"));
    }
    let mut pairs = Vec::with_capacity(count);
    for chunk in tokens[1..1 + 2 * count].chunks(2) {
        let serial = parse_usize(chunk[0], lineno, "atom serial")?;
        let value: i32 = chunk[1]
            .parse()
            .map_err(|_| err(lineno, "malformed property value"))?;
        pairs.push((serial, value));
    }
    Ok(pairs)
}

/// Derive aromatic flags from order-4 bonds, register any R-group atoms
/// that arrived without an RGP line, and fill in implicit hydrogens.
fn finish(mol: &mut Molecule) {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for &idx in &nodes {
        let aromatic = mol
            .bonds_of(idx)
            .any(|e| mol.bond(e).order == BondOrder::Aromatic);
        mol.atom_mut(idx).is_aromatic = aromatic;
    }
    for &idx in &nodes {
        let rgroup = mol.atom(idx).rgroup;
        if rgroup > 0 && mol.attachments().get(rgroup).is_none() {
            mol.attachments_mut().set(rgroup, idx);
        }
    }
    for &idx in &nodes {
        let atom = mol.atom(idx);
        if atom.atomic_num == 0 {
            continue;
        }
        let elem = match Element::from_atomic_num(atom.atomic_num) {
            Some(e) => e,
            None => continue,
        };
        let bos: u8 = mol
            .bonds_of(idx)
            .map(|e| match mol.bond(e).order {
                BondOrder::Single | BondOrder::Aromatic => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
            })
            .sum();
        let h = implicit_hydrogens(elem, mol.atom(idx).is_aromatic, bos);
        mol.atom_mut(idx).hydrogen_count = h;
    }
}
