use std::collections::BTreeMap;
use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableUnGraph;
use petgraph::visit::EdgeRef;

use crate::atom::{Atom, AtomFlag};
use crate::attachment::AttachmentList;
use crate::bond::Bond;
use crate::error::TopologyError;

/// The atom/bond graph of one molecule plus its attachment registry.
///
/// Atoms and bonds are owned exclusively by the molecule; outside code holds
/// stable indices, never references. The graph is a petgraph
/// [`StableUnGraph`], so indices survive removals — an index handed out
/// before a join still names the same atom afterwards. Node iteration
/// follows insertion order, which keeps exports stable.
///
/// 2D coordinates produced by the engine's layout step live in a side table
/// keyed by node index, keeping [`Atom`] itself free of computed state.
///
/// A `Molecule` carries no locking: it is mutated only by its owning caller.
/// Independent molecules may be processed in parallel.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: StableUnGraph<Atom, Bond>,
    positions: BTreeMap<usize, [f64; 2]>,
    attachments: AttachmentList,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        self.graph.add_node(atom)
    }

    /// Connect two member atoms. Panics if either index is not a member;
    /// use [`bind_atoms`](crate::join::bind_atoms) for a checked variant.
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: Bond) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut Atom {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &Bond {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut Bond {
        &mut self.graph[idx]
    }

    pub fn contains_atom(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Atoms in insertion order.
    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    /// Incident bonds of `idx` paired with the atom on the far end.
    pub fn incident(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx {
                e.target()
            } else {
                e.source()
            };
            (other, e.id())
        })
    }

    /// Exclusive upper bound on node index values, including holes left by
    /// removals. Sizes scratch tables indexed by `NodeIndex::index`.
    pub fn node_bound(&self) -> usize {
        use petgraph::visit::NodeIndexable;
        self.graph.node_bound()
    }

    pub fn bond_count_of(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The sole neighbor of `idx` and the bond to it, when `idx` has exactly
    /// one incident bond.
    pub fn single_neighbor(&self, idx: NodeIndex) -> Option<(NodeIndex, EdgeIndex)> {
        let mut edges = self.graph.edges(idx);
        let first = edges.next()?;
        if edges.next().is_some() {
            return None;
        }
        let (a, b) = self.graph.edge_endpoints(first.id())?;
        let other = if a == idx { b } else { a };
        Some((other, first.id()))
    }

    /// Detach an atom together with its incident bonds. Any attachment
    /// entries and layout coordinates referring to it are dropped as well.
    pub fn remove_atom(&mut self, idx: NodeIndex) -> Result<Atom, TopologyError> {
        let atom = self
            .graph
            .remove_node(idx)
            .ok_or(TopologyError::AtomNotAMember)?;
        self.positions.remove(&idx.index());
        self.attachments.remove_atom(idx);
        Ok(atom)
    }

    pub fn remove_bond(&mut self, idx: EdgeIndex) -> Result<Bond, TopologyError> {
        self.graph
            .remove_edge(idx)
            .ok_or(TopologyError::BondNotAMember)
    }

    /// Union another molecule's atoms, bonds, coordinates, and attachment
    /// entries into this one. Returns the index translation for the copied
    /// atoms. Attachment labels shared by both molecules resolve to the
    /// merged-in fragment; relabel first when that is not intended.
    pub fn merge(&mut self, other: &Molecule) -> HashMap<NodeIndex, NodeIndex> {
        let mut map = HashMap::with_capacity(other.atom_count());
        for idx in other.atoms() {
            let new = self.graph.add_node(other.atom(idx).clone());
            if let Some(&pos) = other.positions.get(&idx.index()) {
                self.positions.insert(new.index(), pos);
            }
            map.insert(idx, new);
        }
        for edge in other.bonds() {
            if let Some((a, b)) = other.bond_endpoints(edge) {
                self.graph
                    .add_edge(map[&a], map[&b], other.bond(edge).clone());
            }
        }
        for (label, idx) in other.attachments.remapped(&map).iter() {
            self.attachments.set(label, idx);
        }
        map
    }

    /// Renumber every attachment placeholder currently labeled `from` to
    /// `to`. Atoms already marked [`AtomFlag::Processed`] are skipped
    /// silently — their label is final. Relabeled atoms become `Processed`.
    pub fn change_atom_label(&mut self, from: u8, to: u8) {
        let targets: Vec<NodeIndex> = self
            .atoms()
            .filter(|&idx| {
                let a = self.atom(idx);
                a.flag != AtomFlag::Processed && a.rgroup == from
            })
            .collect();
        for idx in targets {
            if let Some(at) = self.attachments.get(from) {
                if at == idx {
                    self.attachments.remove(from);
                    self.attachments.set(to, idx);
                }
            }
            let atom = self.atom_mut(idx);
            atom.rgroup = to;
            atom.flag = AtomFlag::Processed;
        }
    }

    /// Whether attachment atom `idx` sits on a stereo bond. Fails unless the
    /// atom has exactly one connection, the only shape an unconsumed
    /// attachment point may have.
    pub fn is_single_stereo(&self, idx: NodeIndex) -> Result<bool, TopologyError> {
        if !self.contains_atom(idx) {
            return Err(TopologyError::AtomNotAMember);
        }
        let bonds = self.bond_count_of(idx);
        if bonds != 1 {
            return Err(TopologyError::AttachmentArity { bonds });
        }
        let (_, edge) = self.single_neighbor(idx).expect("arity checked above");
        Ok(self.bond(edge).stereo.is_some())
    }

    pub fn attachments(&self) -> &AttachmentList {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut AttachmentList {
        &mut self.attachments
    }

    pub fn set_attachments(&mut self, attachments: AttachmentList) {
        self.attachments = attachments;
    }

    pub fn position(&self, idx: NodeIndex) -> Option<[f64; 2]> {
        self.positions.get(&idx.index()).copied()
    }

    pub fn set_position(&mut self, idx: NodeIndex, pos: [f64; 2]) {
        self.positions.insert(idx.index(), pos);
    }

    pub fn clear_positions(&mut self) {
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{BondOrder, StereoKind};

    fn ethanol_like() -> (Molecule, NodeIndex, NodeIndex, NodeIndex) {
        let mut mol = Molecule::new();
        let c1 = mol.add_atom(Atom::from_atomic_num(6));
        let c2 = mol.add_atom(Atom::from_atomic_num(6));
        let o = mol.add_atom(Atom::from_atomic_num(8));
        mol.add_bond(c1, c2, Bond::single());
        mol.add_bond(c2, o, Bond::single());
        (mol, c1, c2, o)
    }

    #[test]
    fn add_and_count() {
        let (mol, c1, _, o) = ethanol_like();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.atom(c1).atomic_num, 6);
        assert_eq!(mol.atom(o).atomic_num, 8);
    }

    #[test]
    fn remove_atom_detaches_bonds() {
        let (mut mol, _, c2, _) = ethanol_like();
        mol.remove_atom(c2).unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn remove_atom_not_a_member() {
        let (mut mol, _, c2, _) = ethanol_like();
        mol.remove_atom(c2).unwrap();
        assert_eq!(mol.remove_atom(c2), Err(TopologyError::AtomNotAMember));
    }

    #[test]
    fn indices_stable_across_removal() {
        let (mut mol, c1, c2, o) = ethanol_like();
        mol.remove_atom(c1).unwrap();
        assert_eq!(mol.atom(c2).atomic_num, 6);
        assert_eq!(mol.atom(o).atomic_num, 8);
        assert!(mol.bond_between(c2, o).is_some());
    }

    #[test]
    fn single_neighbor() {
        let (mol, c1, c2, _) = ethanol_like();
        let (nb, _) = mol.single_neighbor(c1).unwrap();
        assert_eq!(nb, c2);
        assert!(mol.single_neighbor(c2).is_none());
    }

    #[test]
    fn merge_remaps_attachments() {
        let (mut mol, _, _, _) = ethanol_like();

        let mut frag = Molecule::new();
        let r = frag.add_atom(Atom::rgroup_placeholder(2));
        let n = frag.add_atom(Atom::from_atomic_num(7));
        frag.add_bond(r, n, Bond::single());
        frag.attachments_mut().set(2, r);

        let map = mol.merge(&frag);
        assert_eq!(mol.atom_count(), 5);
        assert_eq!(mol.bond_count(), 3);
        let merged_r = mol.attachments().get(2).unwrap();
        assert_eq!(merged_r, map[&r]);
        assert_eq!(mol.atom(merged_r).rgroup, 2);
        // the source fragment is untouched
        assert_eq!(frag.atom_count(), 2);
        assert_eq!(frag.attachments().get(2), Some(r));
    }

    #[test]
    fn clone_is_deep() {
        let (mut mol, c1, _, _) = ethanol_like();
        mol.attachments_mut().set(1, c1);
        let mut copy = mol.clone();
        copy.attachments_mut().set(1, NodeIndex::new(2));
        copy.atom_mut(c1).rgroup = 9;
        assert_eq!(mol.attachments().get(1), Some(c1));
        assert_eq!(mol.atom(c1).rgroup, 0);
    }

    #[test]
    fn change_atom_label_skips_processed() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::rgroup_placeholder(1));
        let b = mol.add_atom(Atom::rgroup_placeholder(1));
        mol.atom_mut(b).flag = AtomFlag::Processed;

        mol.change_atom_label(1, 3);
        assert_eq!(mol.atom(a).rgroup, 3);
        assert_eq!(mol.atom(a).flag, AtomFlag::Processed);
        assert_eq!(mol.atom(b).rgroup, 1);
    }

    #[test]
    fn change_atom_label_updates_registry() {
        let mut mol = Molecule::new();
        let r = mol.add_atom(Atom::rgroup_placeholder(1));
        mol.attachments_mut().set(1, r);
        mol.change_atom_label(1, 5);
        assert_eq!(mol.attachments().get(1), None);
        assert_eq!(mol.attachments().get(5), Some(r));
    }

    #[test]
    fn relabel_is_final() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::rgroup_placeholder(1));
        mol.change_atom_label(1, 2);
        mol.change_atom_label(2, 3);
        assert_eq!(mol.atom(a).rgroup, 2);
    }

    #[test]
    fn is_single_stereo() {
        let mut mol = Molecule::new();
        let r = mol.add_atom(Atom::rgroup_placeholder(1));
        let c = mol.add_atom(Atom::from_atomic_num(6));
        let e = mol.add_bond(r, c, Bond::single());
        assert_eq!(mol.is_single_stereo(r), Ok(false));

        mol.bond_mut(e).stereo = Some(StereoKind::Wavy);
        assert_eq!(mol.is_single_stereo(r), Ok(true));

        let c2 = mol.add_atom(Atom::from_atomic_num(6));
        mol.add_bond(r, c2, Bond::single());
        assert_eq!(
            mol.is_single_stereo(r),
            Err(TopologyError::AttachmentArity { bonds: 2 })
        );
    }

    #[test]
    fn bond_orders_kept() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::from_atomic_num(6));
        let b = mol.add_atom(Atom::from_atomic_num(8));
        let e = mol.add_bond(
            a,
            b,
            Bond {
                order: BondOrder::Double,
                stereo: None,
            },
        );
        assert_eq!(mol.bond(e).order, BondOrder::Double);
    }
}
