use std::collections::BTreeMap;
use std::collections::HashMap;

use petgraph::graph::NodeIndex;

/// Registry of R-group labels to attachment-point atoms of one molecule.
///
/// Labels are unique within a molecule. Entries are kept sorted by label so
/// iteration order is deterministic. A registry is only meaningful together
/// with the molecule whose node indices it stores; [`clone_list`] produces
/// an independent copy so reusing a fragment template across assemblies
/// never aliases state.
///
/// [`clone_list`]: AttachmentList::clone_list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentList {
    entries: BTreeMap<u8, NodeIndex>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `atom` as the attachment point for `label`, replacing any
    /// previous entry for that label.
    pub fn set(&mut self, label: u8, atom: NodeIndex) {
        self.entries.insert(label, atom);
    }

    pub fn get(&self, label: u8) -> Option<NodeIndex> {
        self.entries.get(&label).copied()
    }

    pub fn remove(&mut self, label: u8) -> Option<NodeIndex> {
        self.entries.remove(&label)
    }

    /// Drop every entry pointing at `atom`. Used when a placeholder atom is
    /// deleted from the owning molecule.
    pub fn remove_atom(&mut self, atom: NodeIndex) {
        self.entries.retain(|_, &mut idx| idx != atom);
    }

    pub fn labels(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, NodeIndex)> + '_ {
        self.entries.iter().map(|(&l, &idx)| (l, idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Independent deep copy; mutations of the copy never affect `self`.
    pub fn clone_list(&self) -> Self {
        self.clone()
    }

    /// Copy of this registry with every atom index translated through
    /// `map`. Entries whose atom has no translation are dropped. Used when a
    /// fragment's atoms are merged into another molecule under new indices.
    pub fn remapped(&self, map: &HashMap<NodeIndex, NodeIndex>) -> Self {
        let entries = self
            .entries
            .iter()
            .filter_map(|(&label, idx)| map.get(idx).map(|&new| (label, new)))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn set_get_remove() {
        let mut list = AttachmentList::new();
        list.set(1, n(4));
        list.set(2, n(7));
        assert_eq!(list.get(1), Some(n(4)));
        assert_eq!(list.get(2), Some(n(7)));
        assert_eq!(list.get(3), None);
        assert_eq!(list.remove(1), Some(n(4)));
        assert_eq!(list.get(1), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clone_list_is_independent() {
        let mut list = AttachmentList::new();
        list.set(1, n(0));
        let mut copy = list.clone_list();
        copy.set(1, n(9));
        copy.set(2, n(3));
        assert_eq!(list.get(1), Some(n(0)));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn labels_sorted() {
        let mut list = AttachmentList::new();
        list.set(3, n(0));
        list.set(1, n(1));
        list.set(2, n(2));
        let labels: Vec<u8> = list.labels().collect();
        assert_eq!(labels, vec![1, 2, 3]);
    }

    #[test]
    fn remapped_translates_and_drops() {
        let mut list = AttachmentList::new();
        list.set(1, n(0));
        list.set(2, n(1));
        let mut map = HashMap::new();
        map.insert(n(0), n(10));
        let remapped = list.remapped(&map);
        assert_eq!(remapped.get(1), Some(n(10)));
        assert_eq!(remapped.get(2), None);
    }

    #[test]
    fn remove_atom_clears_entries() {
        let mut list = AttachmentList::new();
        list.set(1, n(5));
        list.set(2, n(5));
        list.set(3, n(6));
        list.remove_atom(n(5));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(3), Some(n(6)));
    }
}
