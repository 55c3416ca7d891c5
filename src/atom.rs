/// Processing state of an atom during fragment assembly.
///
/// An atom starts as `None` and becomes `Processed` exactly once, when the
/// attachment point it belongs to is consumed by a join or when a relabel
/// finalizes its R-group number. `Processed` atoms are never relabeled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtomFlag {
    #[default]
    None,
    Processed,
}

/// Node type of the molecular graph.
///
/// `Atom` stores the intrinsic properties the assembly layer manipulates.
/// Computed properties (valence, coordinates) live with the engine; 2D
/// positions produced by layout are kept in a side table on
/// [`Molecule`](crate::Molecule) rather than here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, …). `0` marks a pseudo atom, typically
    /// an attachment-point placeholder.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Number of implicit (suppressed) hydrogens. Not graph nodes; after
    /// parsing this count is the single source of truth for attached Hs.
    pub hydrogen_count: u8,
    /// Whether the atom sits in an aromatic system. Cleared by
    /// dearomatization once bonds carry concrete Kekulé orders.
    pub is_aromatic: bool,
    /// R-group label of an attachment-point atom. `0` means the atom is not
    /// an attachment point.
    pub rgroup: u8,
    /// Assembly processing state. Mutated only by relabel and join
    /// operations.
    pub flag: AtomFlag,
}

impl Atom {
    /// Plain element atom with everything else defaulted.
    pub fn from_atomic_num(atomic_num: u8) -> Self {
        Atom {
            atomic_num,
            ..Atom::default()
        }
    }

    /// Attachment-point placeholder carrying the given R-group label.
    pub fn rgroup_placeholder(label: u8) -> Self {
        Atom {
            atomic_num: 0,
            rgroup: label,
            ..Atom::default()
        }
    }
}
