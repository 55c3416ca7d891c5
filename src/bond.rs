use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    /// Aromatic bonds exist only between parsing and dearomatization; after
    /// a Kekulé rewrite every bond has a concrete order.
    Aromatic,
}

/// Wedge-style stereo descriptor on a bond.
///
/// `Up`/`Down` record a defined out-of-plane direction, `Wavy` records an
/// explicitly undefined configuration. The descriptor is directional: it is
/// read from the bond's first terminal atom toward the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoKind {
    Up,
    Down,
    Wavy,
}

/// Edge type of the molecular graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    pub stereo: Option<StereoKind>,
}

impl Default for Bond {
    fn default() -> Self {
        Self {
            order: BondOrder::Single,
            stereo: None,
        }
    }
}

impl Bond {
    pub fn single() -> Self {
        Bond::default()
    }
}

/// A stereo-bearing bond derived during a fragment join.
///
/// Produced by [`stereo_information`](crate::join::stereo_information) when
/// an attachment point's single bond carries a descriptor: the bond is a
/// clone of that original bond with its termini swapped to the two retained
/// neighbor atoms, so the descriptor keeps its sense relative to `atom1`.
/// Both endpoints must belong to the same molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoElement {
    pub bond: Bond,
    pub atom1: NodeIndex,
    pub atom2: NodeIndex,
}

impl StereoElement {
    /// The descriptor carried by the derived bond.
    pub fn kind(&self) -> Option<StereoKind> {
        self.bond.stereo
    }
}
