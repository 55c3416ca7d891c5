//! Quick 2D coordinate assignment.
//!
//! A zig-zag BFS placement: each atom sits one bond length from its
//! parent, with children fanned out at 60-degree steps alternating above
//! and below the incoming direction. Not a pretty depiction layout, but
//! deterministic, overlap-poor for chains and trees, and good enough for
//! molfile output and raster sketches. Ring geometry is approximated, not
//! closed.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::NodeIndex;

use crate::molecule::Molecule;

const BOND_LENGTH: f64 = 1.5;
const COMPONENT_GAP: f64 = 2.0 * BOND_LENGTH;

pub fn assign_2d(mol: &mut Molecule) {
    mol.clear_positions();
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    let mut placed: HashMap<NodeIndex, [f64; 2]> = HashMap::new();
    let mut offset_x = 0.0f64;

    for &root in &nodes {
        if placed.contains_key(&root) {
            continue;
        }
        let mut component_max_x = offset_x;
        placed.insert(root, [offset_x, 0.0]);

        // (node, unit direction the chain arrived from, zig-zag parity)
        let mut queue: VecDeque<(NodeIndex, [f64; 2], f64)> = VecDeque::new();
        queue.push_back((root, [1.0, 0.0], 1.0));
        while let Some((node, dir, sign)) = queue.pop_front() {
            let here = placed[&node];
            let mut fresh: Vec<NodeIndex> = mol
                .neighbors(node)
                .filter(|n| !placed.contains_key(n))
                .collect();
            fresh.sort_by_key(|n| n.index());

            for (i, &next) in fresh.iter().enumerate() {
                // alternate the fan above and below the incoming direction
                let applied = if i % 2 == 0 { sign } else { -sign };
                let angle = applied * fan_angle(i);
                let out = rotate(dir, angle);
                let pos = [
                    here[0] + out[0] * BOND_LENGTH,
                    here[1] + out[1] * BOND_LENGTH,
                ];
                placed.insert(next, pos);
                component_max_x = component_max_x.max(pos[0]);
                queue.push_back((next, out, -applied));
            }
        }
        offset_x = component_max_x + COMPONENT_GAP;
    }

    for (node, pos) in placed {
        mol.set_position(node, pos);
    }
}

/// Unsigned fan magnitude per child slot: 60, 60, 120, 120, then straight.
fn fan_angle(child: usize) -> f64 {
    const DEG60: f64 = std::f64::consts::FRAC_PI_3;
    match child {
        0 | 1 => DEG60,
        2 | 3 => 2.0 * DEG60,
        _ => 0.0,
    }
}

fn rotate(v: [f64; 2], angle: f64) -> [f64; 2] {
    let (sin, cos) = angle.sin_cos();
    [v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos]
}
