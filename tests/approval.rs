//! Fixture-driven checks against known-good values.
//!
//! The fixture lists compositions from reference tables plus
//! canonicalization equivalence classes. Failures are accumulated so one
//! bad entry reports alongside the rest.

use serde::Deserialize;

use chemkit::{ChemEngine, Converter, SimpleEngine};

#[derive(Deserialize)]
struct Cases {
    composition: Vec<CompositionEntry>,
    canonical_pairs: Vec<CanonicalPair>,
    valid_smiles: Vec<String>,
    invalid_smiles: Vec<String>,
}

#[derive(Deserialize)]
struct CompositionEntry {
    smiles: String,
    formula: String,
    average_mw: f64,
    exact_mw: f64,
}

#[derive(Deserialize)]
struct CanonicalPair {
    a: String,
    b: String,
    same: bool,
}

fn cases() -> Cases {
    serde_json::from_str(include_str!("approval_data/cases.json")).unwrap()
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
fn approval_composition() {
    let engine = SimpleEngine::new();
    let conv = Converter::new(&engine);

    let mut failures = Vec::new();
    for entry in cases().composition {
        let mol = match engine.parse(&entry.smiles) {
            Ok(m) => m,
            Err(e) => {
                failures.push(format!("[parse] {}: {}", entry.smiles, e));
                continue;
            }
        };
        let info = match conv.molecule_info(&mol) {
            Ok(i) => i,
            Err(e) => {
                failures.push(format!("[analyze] {}: {}", entry.smiles, e));
                continue;
            }
        };
        if info.formula != entry.formula {
            failures.push(format!(
                "[formula] {}: expected {:?}, got {:?}",
                entry.smiles, entry.formula, info.formula
            ));
        }
        if !approx_eq(info.molecular_weight, entry.average_mw, 0.01) {
            failures.push(format!(
                "[average] {}: expected {}, got {}",
                entry.smiles, entry.average_mw, info.molecular_weight
            ));
        }
        if !approx_eq(info.exact_mass, entry.exact_mw, 0.001) {
            failures.push(format!(
                "[exact] {}: expected {}, got {}",
                entry.smiles, entry.exact_mw, info.exact_mass
            ));
        }
    }
    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}

#[test]
fn approval_canonicalization() {
    let engine = SimpleEngine::new();
    let conv = Converter::new(&engine);

    let mut failures = Vec::new();
    for pair in cases().canonical_pairs {
        let ca = match conv.canonicalize(&pair.a) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("[canon] {}: {}", pair.a, e));
                continue;
            }
        };
        let cb = match conv.canonicalize(&pair.b) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("[canon] {}: {}", pair.b, e));
                continue;
            }
        };
        if (ca == cb) != pair.same {
            failures.push(format!(
                "[pair] {:?} vs {:?}: expected same={}, got {:?} and {:?}",
                pair.a, pair.b, pair.same, ca, cb
            ));
        }
        // canonical output must survive its own round trip
        for (orig, canon) in [(&pair.a, &ca), (&pair.b, &cb)] {
            match conv.canonicalize(canon) {
                Ok(again) if &again == canon => {}
                Ok(again) => failures.push(format!(
                    "[idempotence] {}: {:?} re-canonicalized to {:?}",
                    orig, canon, again
                )),
                Err(e) => failures.push(format!("[reparse] {}: {}", canon, e)),
            }
        }
    }
    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}

#[test]
fn approval_validation() {
    let engine = SimpleEngine::new();
    let conv = Converter::new(&engine);

    let data = cases();
    let mut failures = Vec::new();
    for s in &data.valid_smiles {
        if !conv.validate_smiles(s) {
            failures.push(format!("[valid] {} was rejected", s));
        }
    }
    for s in &data.invalid_smiles {
        if conv.validate_smiles(s) {
            failures.push(format!("[invalid] {} was accepted", s));
        }
    }
    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}
