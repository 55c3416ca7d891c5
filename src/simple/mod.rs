//! Built-in reference engine.
//!
//! [`SimpleEngine`] implements [`ChemEngine`] entirely in this crate: a
//! SMILES and V2000 molfile codec, Kekulé dearomatization, a zig-zag 2D
//! layout, Hill-formula analysis, and a PNG sketch renderer. It covers
//! the organic elements plus a few common salts; production deployments
//! can swap in a heavier engine behind the same trait.

pub mod element;
pub mod kekulize;
pub mod layout;
pub mod molfile;
pub mod render;
pub mod smiles;
pub mod writer;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::engine::{ChemEngine, ExportFormat, MoleculeInfo, RenderOptions};
use crate::error::{EngineError, ParseError};
use crate::molecule::Molecule;
use element::Element;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEngine;

impl SimpleEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Molfiles carry a three-line header and a counts line; SMILES never
/// spans lines.
fn looks_like_molfile(text: &str) -> bool {
    text.contains("V2000") || text.trim().contains('\n')
}

impl ChemEngine for SimpleEngine {
    fn parse(&self, text: &str) -> Result<Molecule, ParseError> {
        if looks_like_molfile(text) {
            molfile::read(text)
        } else {
            smiles::parse(text)
        }
    }

    /// No 3D model here; any requested dimension gets the 2D layout.
    fn clean(&self, mol: &mut Molecule, _dimension: u8) {
        layout::assign_2d(mol);
    }

    fn dearomatize(&self, mol: &mut Molecule) -> Result<(), EngineError> {
        kekulize::dearomatize(mol)
    }

    fn implicitize_hydrogens(&self, mol: &mut Molecule) {
        let foldable: Vec<(NodeIndex, NodeIndex)> = mol
            .atoms()
            .filter(|&n| {
                let a = mol.atom(n);
                a.atomic_num == 1 && a.rgroup == 0 && a.formal_charge == 0
            })
            .filter_map(|n| {
                let (nbr, edge) = mol.single_neighbor(n)?;
                let plain = mol.bond(edge).order == BondOrder::Single;
                (plain && mol.atom(nbr).atomic_num != 1).then_some((n, nbr))
            })
            .collect();
        for (h, heavy) in foldable {
            let carried = mol.atom(h).hydrogen_count;
            mol.atom_mut(heavy).hydrogen_count += 1 + carried;
            let _ = mol.remove_atom(h);
        }
    }

    fn export(&self, mol: &Molecule, format: ExportFormat) -> Result<String, EngineError> {
        match format {
            ExportFormat::Smiles => Ok(writer::write(mol, false)),
            ExportFormat::UniqueSmiles | ExportFormat::ExtendedSmiles => {
                Ok(writer::write(mol, true))
            }
            ExportFormat::Molfile => Ok(molfile::write(mol)),
        }
    }

    fn valence_check(&self, mol: &Molecule, atom: NodeIndex) -> bool {
        let a = mol.atom(atom);
        // charged atoms and placeholders are outside the simple model
        if a.atomic_num == 0 || a.formal_charge != 0 {
            return true;
        }
        let elem = match Element::from_atomic_num(a.atomic_num) {
            Some(e) => e,
            None => return true,
        };
        let allowed = elem.default_valences();
        if allowed.is_empty() {
            return true;
        }

        // half units, so an aromatic bond can count as one and a half
        let mut halves: u32 = 2 * a.hydrogen_count as u32;
        let mut any_aromatic = false;
        for e in mol.bonds_of(atom) {
            halves += match mol.bond(e).order {
                BondOrder::Single => 2,
                BondOrder::Double => 4,
                BondOrder::Triple => 6,
                BondOrder::Aromatic => {
                    any_aromatic = true;
                    3
                }
            };
        }
        allowed.iter().any(|&v| {
            let v2 = 2 * v as u32;
            v2 == halves || (any_aromatic && v2 + 1 == halves)
        })
    }

    fn analyze(&self, mol: &Molecule) -> Result<MoleculeInfo, EngineError> {
        Ok(MoleculeInfo {
            formula: hill_formula(mol)?,
            molecular_weight: total_mass(mol, Element::atomic_weight)?,
            exact_mass: total_mass(mol, Element::exact_mass)?,
        })
    }

    fn render(&self, mol: &Molecule, opts: &RenderOptions) -> Result<Vec<u8>, EngineError> {
        render::render(mol, opts)
    }
}

fn element_of(atomic_num: u8) -> Result<Option<Element>, EngineError> {
    if atomic_num == 0 {
        // attachment points and wildcards carry no mass
        return Ok(None);
    }
    match Element::from_atomic_num(atomic_num) {
        Some(e) => Ok(Some(e)),
        None => Err(EngineError::Analysis {
            msg: format!("no element data for atomic number {}", atomic_num),
        }),
    }
}

fn total_mass(mol: &Molecule, mass: impl Fn(Element) -> f64) -> Result<f64, EngineError> {
    let h = mass(Element::H);
    let mut total = 0.0;
    for idx in mol.atoms() {
        let a = mol.atom(idx);
        if let Some(elem) = element_of(a.atomic_num)? {
            total += mass(elem);
        }
        total += a.hydrogen_count as f64 * h;
    }
    Ok(total)
}

/// Hill system: C first, then H, then the rest alphabetically; net charge
/// appended as `+`, `2+`, `-`, `2-`.
fn hill_formula(mol: &Molecule) -> Result<String, EngineError> {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut net_charge: i32 = 0;

    for idx in mol.atoms() {
        let a = mol.atom(idx);
        if let Some(elem) = element_of(a.atomic_num)? {
            *counts.entry(elem.symbol()).or_default() += 1;
        }
        let hc = a.hydrogen_count as u32;
        if hc > 0 {
            *counts.entry("H").or_default() += hc;
        }
        net_charge += a.formal_charge as i32;
    }

    let mut result = String::new();
    if counts.contains_key("C") {
        append_element(&mut result, "C", counts.remove("C").expect("present"));
        if let Some(h) = counts.remove("H") {
            append_element(&mut result, "H", h);
        }
    }
    for (sym, count) in &counts {
        append_element(&mut result, sym, *count);
    }

    match net_charge.cmp(&0) {
        std::cmp::Ordering::Greater => {
            if net_charge > 1 {
                write!(result, "{net_charge}+").expect("write to string");
            } else {
                result.push('+');
            }
        }
        std::cmp::Ordering::Less => {
            if net_charge < -1 {
                write!(result, "{}-", net_charge.unsigned_abs()).expect("write to string");
            } else {
                result.push('-');
            }
        }
        std::cmp::Ordering::Equal => {}
    }
    Ok(result)
}

fn append_element(buf: &mut String, symbol: &str, count: u32) {
    buf.push_str(symbol);
    if count > 1 {
        write!(buf, "{count}").expect("write to string");
    }
}
