//! Dearomatization: replace aromatic bonds with an alternating Kekulé
//! assignment of single and double bonds, then drop the aromatic flags.
//!
//! Each atom whose valence gap demands a double bond must receive exactly
//! one, which is a maximum-matching problem over the aromatic subgraph,
//! solved here with BFS augmenting paths. Atoms left unmatched mean no
//! valid Kekulé structure exists.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::BondOrder;
use crate::error::EngineError;
use crate::molecule::Molecule;
use crate::simple::element::Element;

pub fn dearomatize(mol: &mut Molecule) -> Result<(), EngineError> {
    let aromatic_edges: Vec<EdgeIndex> = mol
        .bonds()
        .filter(|&e| mol.bond(e).order == BondOrder::Aromatic)
        .collect();

    if aromatic_edges.is_empty() {
        for idx in mol.atoms().collect::<Vec<_>>() {
            mol.atom_mut(idx).is_aromatic = false;
        }
        return Ok(());
    }

    // removal leaves holes in the index space, so size by the bound
    let cap = mol.node_bound();

    let mut aromatic_adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![vec![]; cap];
    for &e in &aromatic_edges {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
        }
    }

    let mut needs_double = vec![false; cap];
    let mut candidates: Vec<NodeIndex> = Vec::new();
    for node in mol.atoms() {
        if aromatic_adj[node.index()].is_empty() {
            continue;
        }
        let atom = mol.atom(node);
        let elem = match Element::from_atomic_num(atom.atomic_num) {
            Some(e) => e,
            None => continue,
        };

        let bond_order_sum: u8 = mol
            .bonds_of(node)
            .map(|e| match mol.bond(e).order {
                BondOrder::Single | BondOrder::Aromatic => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
            })
            .sum();
        let total_used = bond_order_sum + atom.hydrogen_count;

        if let Some(tv) = target_valence(elem, total_used, atom.formal_charge) {
            let gap = tv - total_used;
            let is_bare_charged = gap == 2 && atom.hydrogen_count == 0 && atom.formal_charge != 0;
            if gap == 1 || is_bare_charged {
                needs_double[node.index()] = true;
                candidates.push(node);
            }
        }
    }

    let mut matched_edge: Vec<Option<EdgeIndex>> = vec![None; cap];
    for &start in &candidates {
        if matched_edge[start.index()].is_some() {
            continue;
        }
        augment(mol, &aromatic_adj, &needs_double, &mut matched_edge, start);
    }

    let unmatched: Vec<usize> = candidates
        .iter()
        .filter(|&&v| matched_edge[v.index()].is_none())
        .map(|v| v.index())
        .collect();
    if !unmatched.is_empty() {
        return Err(EngineError::Kekulize {
            msg: format!("unmatched atoms {:?}", unmatched),
        });
    }

    let matched_edges: HashSet<EdgeIndex> = matched_edge.iter().filter_map(|e| *e).collect();
    for e in aromatic_edges {
        mol.bond_mut(e).order = if matched_edges.contains(&e) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    for idx in mol.atoms().collect::<Vec<_>>() {
        mol.atom_mut(idx).is_aromatic = false;
    }
    Ok(())
}

fn target_valence(elem: Element, current_used: u8, formal_charge: i8) -> Option<u8> {
    let valences = elem.default_valences();
    if valences.is_empty() {
        return None;
    }
    let charge = formal_charge as i16;
    valences
        .iter()
        .filter_map(|&v| {
            let adjusted = v as i16 + charge;
            if adjusted > 0 {
                Some(adjusted as u8)
            } else {
                None
            }
        })
        .find(|&v| v >= current_used)
}

fn augment(
    mol: &Molecule,
    aromatic_adj: &[Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    start: NodeIndex,
) -> bool {
    let cap = aromatic_adj.len();
    let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; cap];
    let mut visited = vec![false; cap];
    let mut queue = VecDeque::new();

    visited[start.index()] = true;
    queue.push_back(start);

    while let Some(u) = queue.pop_front() {
        for &(v, e) in &aromatic_adj[u.index()] {
            if !needs_double[v.index()] || visited[v.index()] {
                continue;
            }
            if Some(e) == matched_edge[u.index()] {
                continue;
            }
            visited[v.index()] = true;
            prev[v.index()] = Some((u, e));

            if matched_edge[v.index()].is_none() {
                flip_path(matched_edge, &prev, start, v);
                return true;
            }

            let matched_e = matched_edge[v.index()].expect("checked above");
            let (ea, eb) = mol.bond_endpoints(matched_e).expect("valid edge");
            let w = if ea == v { eb } else { ea };

            if !visited[w.index()] {
                visited[w.index()] = true;
                prev[w.index()] = Some((v, matched_e));
                queue.push_back(w);
            }
        }
    }
    false
}

/// Walk back along the alternating path, swapping matched and unmatched
/// edges so the matching grows by one.
fn flip_path(
    matched_edge: &mut [Option<EdgeIndex>],
    prev: &[Option<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    end: NodeIndex,
) {
    let mut cur = end;
    let mut is_new_match = true;
    while cur != start {
        let (p, e) = prev[cur.index()].expect("path exists");
        if is_new_match {
            matched_edge[cur.index()] = Some(e);
            matched_edge[p.index()] = Some(e);
        }
        is_new_match = !is_new_match;
        cur = p;
    }
}
