//! Stereo-aware merging of monomer fragments.
//!
//! [`join_fragments`] consumes a matched pair of attachment points and
//! produces one connected molecule. The join is atomic: both inputs are
//! taken by reference and the result is built fresh, so no fragment is ever
//! left partially merged.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::debug;

use crate::atom::AtomFlag;
use crate::bond::{Bond, BondOrder, StereoElement};
use crate::error::{ChemError, StereoMergeError, TopologyError};
use crate::molecule::Molecule;

/// Connect two member atoms with a plain single bond.
pub fn bind_atoms(
    mol: &mut Molecule,
    atom1: NodeIndex,
    atom2: NodeIndex,
) -> Result<EdgeIndex, TopologyError> {
    if !mol.contains_atom(atom1) || !mol.contains_atom(atom2) {
        return Err(TopologyError::AtomNotAMember);
    }
    Ok(mol.add_bond(atom1, atom2, Bond::single()))
}

/// Derive the stereo bond that replaces an attachment point at a junction.
///
/// `rgroup_atom`'s single bond is cloned with its termini swapped to the
/// retained neighbor `atom1` and the far atom `atom2` that takes the
/// placeholder's place. The placeholder's terminus slot is substituted by
/// `atom2`, so the descriptor keeps its directional sense relative to
/// `atom1`.
pub fn stereo_information(
    mol: &Molecule,
    rgroup_atom: NodeIndex,
    atom1: NodeIndex,
    atom2: NodeIndex,
) -> Result<StereoElement, ChemError> {
    if !mol.contains_atom(rgroup_atom) {
        return Err(TopologyError::AtomNotAMember.into());
    }
    let bonds = mol.bond_count_of(rgroup_atom);
    if bonds != 1 {
        return Err(TopologyError::AttachmentArity { bonds }.into());
    }
    let (neighbor, edge) = mol
        .single_neighbor(rgroup_atom)
        .ok_or(StereoMergeError::MissingBond)?;
    if neighbor != atom1 {
        return Err(StereoMergeError::Inconsistent {
            msg: "atom1 is not the attachment atom's neighbor".into(),
        }
        .into());
    }
    let bond = mol.bond(edge).clone();
    if bond.stereo.is_some() && bond.order != BondOrder::Single {
        return Err(StereoMergeError::Inconsistent {
            msg: "stereo descriptor on a non-single bond".into(),
        }
        .into());
    }
    let (a, b) = mol.bond_endpoints(edge).expect("edge of a member atom");
    // Substitute the placeholder terminus, keep the neighbor in its slot.
    let (atom1, atom2) = if a == rgroup_atom {
        (atom2, atom1)
    } else {
        debug_assert_eq!(b, rgroup_atom);
        (atom1, atom2)
    };
    Ok(StereoElement { bond, atom1, atom2 })
}

/// Merge two fragments at the attachment points registered under the given
/// labels, transplanting any stereo descriptor onto the new junction bond.
///
/// Preconditions and failure modes:
/// - the labels must be registered and their atoms must have exactly one
///   bond each, otherwise [`TopologyError`];
/// - a stereo descriptor that cannot be carried over yields
///   [`StereoMergeError`];
/// - on any failure neither input is mutated.
///
/// The placeholder atoms and their labels are consumed; every other
/// attachment point of either fragment remains registered in the result and
/// available for further joins. The junction's neighbor atoms are marked
/// [`AtomFlag::Processed`].
pub fn join_fragments(
    first: &Molecule,
    first_label: u8,
    second: &Molecule,
    second_label: u8,
) -> Result<Molecule, ChemError> {
    let r1 = resolve_attachment(first, first_label)?;
    let r2 = resolve_attachment(second, second_label)?;

    let (n1, e1) = first.single_neighbor(r1).expect("arity validated");
    let (n2, e2) = second.single_neighbor(r2).expect("arity validated");
    let stereo_on_first = first.bond(e1).stereo.is_some();
    let stereo_on_second = second.bond(e2).stereo.is_some();

    let mut result = first.clone();
    let map = result.merge(second);
    let r2 = map[&r2];
    let n2 = map[&n2];

    // Derive the junction bond before removing the placeholders: the stereo
    // clone needs the original bonds intact.
    let junction = if stereo_on_first {
        stereo_information(&result, r1, n1, n2)?
    } else if stereo_on_second {
        stereo_information(&result, r2, n2, n1)?
    } else {
        StereoElement {
            bond: Bond::single(),
            atom1: n1,
            atom2: n2,
        }
    };

    result.remove_atom(r1).expect("placeholder is a member");
    result.remove_atom(r2).expect("placeholder is a member");
    result.add_bond(junction.atom1, junction.atom2, junction.bond.clone());

    for idx in [n1, n2] {
        let atom = result.atom_mut(idx);
        if atom.flag == AtomFlag::None {
            atom.flag = AtomFlag::Processed;
        }
    }

    debug!(
        first_label,
        second_label,
        stereo = ?junction.bond.stereo,
        atoms = result.atom_count(),
        "joined fragments"
    );
    Ok(result)
}

fn resolve_attachment(mol: &Molecule, label: u8) -> Result<NodeIndex, ChemError> {
    let idx = mol
        .attachments()
        .get(label)
        .ok_or(TopologyError::MissingAttachment { label })?;
    if !mol.contains_atom(idx) {
        return Err(TopologyError::AtomNotAMember.into());
    }
    let bonds = mol.bond_count_of(idx);
    if bonds != 1 {
        return Err(TopologyError::AttachmentArity { bonds }.into());
    }
    Ok(idx)
}
