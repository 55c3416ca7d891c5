//! SMILES writer for the reference engine.
//!
//! Builds a DFS forest over the molecule, assigns ring-closure digits to
//! the back edges, then prints each tree. In canonical mode atoms are
//! visited in the order given by iteratively refined invariant ranks, so
//! equivalent structures print identically regardless of input order.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::molecule::Molecule;
use crate::simple::element::{implicit_hydrogens, Element};

pub fn write(mol: &Molecule, canonical: bool) -> String {
    let ranks = if canonical {
        canonical_ranks(mol)
    } else {
        mol.atoms().enumerate().map(|(i, n)| (n, i)).collect()
    };

    let mut out = String::new();
    let mut visited: HashMap<NodeIndex, bool> = mol.atoms().map(|n| (n, false)).collect();
    let mut roots: Vec<NodeIndex> = mol.atoms().collect();
    roots.sort_by_key(|n| (ranks[n], n.index()));

    let mut first_component = true;
    for root in roots {
        if visited[&root] {
            continue;
        }
        if !first_component {
            out.push('.');
        }
        first_component = false;
        write_component(mol, root, &ranks, &mut visited, &mut out);
    }
    out
}

struct Tree {
    children: HashMap<NodeIndex, Vec<(NodeIndex, BondOrder)>>,
    /// digit, bond order, opposite end of the ring bond
    rings: HashMap<NodeIndex, Vec<(u16, BondOrder, NodeIndex)>>,
}

fn write_component(
    mol: &Molecule,
    root: NodeIndex,
    ranks: &HashMap<NodeIndex, usize>,
    visited: &mut HashMap<NodeIndex, bool>,
    out: &mut String,
) {
    let mut tree = Tree {
        children: HashMap::new(),
        rings: HashMap::new(),
    };
    let mut next_digit: u16 = 1;
    let mut stack = vec![(root, None::<NodeIndex>, BondOrder::Single)];
    while let Some((node, parent, incoming)) = stack.pop() {
        if visited[&node] {
            continue;
        }
        visited.insert(node, true);
        tree.children.entry(node).or_default();
        // tree membership is decided when a node is reached, not when it
        // is queued, so a queued node claimed through another path first
        // turns this edge into a ring closure below
        if let Some(p) = parent {
            tree.children.entry(p).or_default().push((node, incoming));
        }

        for (other, edge) in mol.incident(node) {
            let order = mol.bond(edge).order;
            if Some(other) == parent {
                continue;
            }
            if visited[&other] {
                let digit = next_digit;
                next_digit += 1;
                tree.rings
                    .entry(other)
                    .or_default()
                    .push((digit, order, node));
                tree.rings
                    .entry(node)
                    .or_default()
                    .push((digit, order, other));
            } else {
                stack.push((other, Some(node), order));
            }
        }
    }
    for kids in tree.children.values_mut() {
        kids.sort_by_key(|(n, _)| (ranks[n], n.index()));
    }
    for rings in tree.rings.values_mut() {
        rings.sort_by_key(|&(digit, _, _)| digit);
    }
    print_node(mol, root, None, &tree, out);
}

fn print_node(
    mol: &Molecule,
    node: NodeIndex,
    incoming: Option<(NodeIndex, BondOrder)>,
    tree: &Tree,
    out: &mut String,
) {
    if let Some((parent, order)) = incoming {
        push_bond(mol, parent, node, order, out);
    }
    push_atom(mol, node, out);
    for &(digit, order, other) in tree.rings.get(&node).into_iter().flatten() {
        push_bond(mol, node, other, order, out);
        push_digit(digit, out);
    }
    let kids = &tree.children[&node];
    for (i, &(child, order)) in kids.iter().enumerate() {
        let last = i + 1 == kids.len();
        if !last {
            out.push('(');
        }
        print_node(mol, child, Some((node, order)), tree, out);
        if !last {
            out.push(')');
        }
    }
}

fn push_digit(digit: u16, out: &mut String) {
    if digit < 10 {
        out.push((b'0' + digit as u8) as char);
    } else {
        out.push('%');
        out.push_str(&format!("{:02}", digit));
    }
}

fn push_bond(mol: &Molecule, a: NodeIndex, b: NodeIndex, order: BondOrder, out: &mut String) {
    let aromatic_pair = mol.atom(a).is_aromatic && mol.atom(b).is_aromatic;
    match order {
        BondOrder::Single => {
            // a plain bond between two aromatic atoms reads back as
            // aromatic, so it needs the explicit dash
            if aromatic_pair {
                out.push('-');
            }
        }
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
        BondOrder::Aromatic => {
            if !aromatic_pair {
                out.push(':');
            }
        }
    }
}

fn push_atom(mol: &Molecule, idx: NodeIndex, out: &mut String) {
    let atom = mol.atom(idx);

    if atom.rgroup > 0 || atom.atomic_num == 0 {
        if atom.rgroup > 0 {
            out.push_str(&format!("[*:{}]", atom.rgroup));
        } else {
            out.push('*');
        }
        return;
    }

    let elem = Element::from_atomic_num(atom.atomic_num);
    let symbol = match elem {
        Some(e) => e.symbol(),
        None => "*",
    };

    let bare_ok = match elem {
        Some(e) => {
            e.is_organic_subset()
                && atom.formal_charge == 0
                && (!atom.is_aromatic || e.has_aromatic_form())
                && atom.hydrogen_count == expected_hydrogens(mol, idx, e)
        }
        None => false,
    };

    if bare_ok {
        if atom.is_aromatic {
            out.push_str(&symbol.to_ascii_lowercase());
        } else {
            out.push_str(symbol);
        }
        return;
    }

    out.push('[');
    if atom.is_aromatic && elem.map(|e| e.has_aromatic_form()).unwrap_or(false) {
        out.push_str(&symbol.to_ascii_lowercase());
    } else {
        out.push_str(symbol);
    }
    match atom.hydrogen_count {
        0 => {}
        1 => out.push('H'),
        n => out.push_str(&format!("H{}", n)),
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("+{}", c)),
        c => out.push_str(&format!("{}", c)),
    }
    out.push(']');
}

/// The count a reader would infer for a bare atom; printing bare is only
/// safe when it matches what the atom actually carries.
fn expected_hydrogens(mol: &Molecule, idx: NodeIndex, elem: Element) -> u8 {
    let bos: u8 = mol
        .bonds_of(idx)
        .map(|e| match mol.bond(e).order {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        })
        .sum();
    implicit_hydrogens(elem, mol.atom(idx).is_aromatic, bos)
}

/// Invariant-refinement ranks. Atoms start from local invariants
/// (element, aromaticity, degree, hydrogens, charge, attachment label)
/// and are refined against sorted neighbor ranks until the partition
/// stops splitting.
pub fn canonical_ranks(mol: &Molecule) -> HashMap<NodeIndex, usize> {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    if nodes.is_empty() {
        return HashMap::new();
    }

    let initial_key = |n: NodeIndex| -> (u8, bool, usize, u8, i8, u8) {
        let a = mol.atom(n);
        (
            a.atomic_num,
            a.is_aromatic,
            mol.bond_count_of(n),
            a.hydrogen_count,
            a.formal_charge,
            a.rgroup,
        )
    };

    let mut keys: Vec<(NodeIndex, (u8, bool, usize, u8, i8, u8))> =
        nodes.iter().map(|&n| (n, initial_key(n))).collect();
    keys.sort_by(|a, b| a.1.cmp(&b.1));
    let mut ranks: HashMap<NodeIndex, usize> = HashMap::new();
    let mut rank = 0usize;
    for i in 0..keys.len() {
        if i > 0 && keys[i].1 != keys[i - 1].1 {
            rank += 1;
        }
        ranks.insert(keys[i].0, rank);
    }
    let mut distinct = rank + 1;

    for _ in 0..nodes.len() {
        let mut refined: Vec<(NodeIndex, (usize, Vec<usize>))> = nodes
            .iter()
            .map(|&n| {
                let mut nbr: Vec<usize> = mol.neighbors(n).map(|m| ranks[&m]).collect();
                nbr.sort_unstable();
                (n, (ranks[&n], nbr))
            })
            .collect();
        refined.sort_by(|a, b| a.1.cmp(&b.1));

        let mut next: HashMap<NodeIndex, usize> = HashMap::new();
        let mut r = 0usize;
        for i in 0..refined.len() {
            if i > 0 && refined[i].1 != refined[i - 1].1 {
                r += 1;
            }
            next.insert(refined[i].0, r);
        }
        let next_distinct = r + 1;
        if next_distinct == distinct && next == ranks {
            break;
        }
        distinct = next_distinct;
        ranks = next;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::smiles;

    fn roundtrip(input: &str) -> String {
        write(&smiles::parse(input).unwrap(), false)
    }

    fn canonical(input: &str) -> String {
        write(&smiles::parse(input).unwrap(), true)
    }

    #[test]
    fn atom_and_bond_counts_survive() {
        for s in ["CCO", "C=CC#N", "CC(C)(C)C", "c1ccccc1", "C1CC1CC1CC1"] {
            let reparsed = smiles::parse(&roundtrip(s)).unwrap();
            let orig = smiles::parse(s).unwrap();
            assert_eq!(reparsed.atom_count(), orig.atom_count(), "{}", s);
            assert_eq!(reparsed.bond_count(), orig.bond_count(), "{}", s);
        }
    }

    #[test]
    fn canonical_is_order_independent() {
        assert_eq!(canonical("OCC"), canonical("CCO"));
        assert_eq!(canonical("C(C)(C)O"), canonical("OC(C)C"));
        assert_eq!(canonical("c1ccccc1O"), canonical("Oc1ccccc1"));
        assert_eq!(canonical("N#CC"), canonical("CC#N"));
    }

    #[test]
    fn canonical_is_idempotent() {
        for s in ["CCO", "c1ccc(O)cc1", "CC(=O)NC", "[*:1]CCO"] {
            let once = canonical(s);
            let twice = write(&smiles::parse(&once).unwrap(), true);
            assert_eq!(once, twice, "{}", s);
        }
    }

    #[test]
    fn distinct_molecules_stay_distinct() {
        assert_ne!(canonical("CCO"), canonical("COC"));
        assert_ne!(canonical("C1CCCCC1"), canonical("CCCCCC"));
    }

    #[test]
    fn charges_and_attachments_print_in_brackets() {
        assert_eq!(roundtrip("[NH4+]"), "[NH4+]");
        assert_eq!(roundtrip("[O-2]"), "[O-2]");
        let out = roundtrip("[*:3]CC");
        assert!(out.contains("[*:3]"), "{}", out);
    }

    #[test]
    fn ring_digit_emitted_on_both_ends() {
        let out = roundtrip("C1CCCCC1");
        assert_eq!(out.matches('1').count(), 2, "{}", out);
    }
}
