//! The capability interface consumed from a chemistry engine.
//!
//! The assembly layer depends only on [`ChemEngine`]; swapping the concrete
//! engine requires no change above this boundary. An engine value is
//! constructed once at process start (it may hold licensing or setup state)
//! and passed by reference into every call — per-call operations treat it as
//! read-only, so one engine may serve many threads.

use petgraph::graph::NodeIndex;

use crate::error::{EngineError, ParseError};
use crate::molecule::Molecule;

/// Input notation accepted at the conversion surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Smiles,
    Molfile,
    /// Accepted at the API surface; conversion and rendering of sequences
    /// are explicit not-yet-supported stubs.
    Sequence,
}

/// Textual export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Smiles,
    /// Canonical/unique SMILES: structurally identical molecules always
    /// export to the same string regardless of input atom ordering.
    UniqueSmiles,
    /// Extended unique SMILES (engine-specific extensions allowed).
    ExtendedSmiles,
    Molfile,
}

/// Raster output formats for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Gif,
    Jpg,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Jpg => "jpg",
        }
    }
}

/// Parameters forwarded to the engine's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Background color as 0xRRGGBB.
    pub background_rgb: u32,
}

/// Result of elemental-composition analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeInfo {
    /// Molecular formula in Hill order.
    pub formula: String,
    /// Average molecular weight in daltons.
    pub molecular_weight: f64,
    /// Monoisotopic exact mass in daltons.
    pub exact_mass: f64,
}

/// Contract a pluggable chemistry engine fulfills for the assembly layer.
///
/// Implementations wrap their native failures into the crate's error
/// taxonomy; no engine-native error type may escape these methods. All
/// operations are synchronous and run to completion once invoked.
pub trait ChemEngine {
    /// Parse SMILES or molfile text into a molecule. The notation is
    /// detected from the text itself.
    fn parse(&self, text: &str) -> Result<Molecule, ParseError>;

    /// Regenerate coordinates in place. `dimension` is 2 or 3; engines
    /// without 3D support may fall back to 2D.
    fn clean(&self, mol: &mut Molecule, dimension: u8);

    /// Rewrite aromatic rings to an alternating-bond Kekulé form.
    fn dearomatize(&self, mol: &mut Molecule) -> Result<(), EngineError>;

    /// Fold explicit hydrogen atoms into their heavy neighbor's implicit
    /// hydrogen count.
    fn implicitize_hydrogens(&self, mol: &mut Molecule);

    /// Export to a textual format. Molfile export uses the coordinates a
    /// preceding [`clean`](ChemEngine::clean) produced.
    fn export(&self, mol: &Molecule, format: ExportFormat) -> Result<String, EngineError>;

    /// Whether the atom's valence is acceptable. Atoms the engine has no
    /// valence model for report `true`.
    fn valence_check(&self, mol: &Molecule, atom: NodeIndex) -> bool;

    /// Elemental-composition analysis: formula, average weight, exact mass.
    fn analyze(&self, mol: &Molecule) -> Result<MoleculeInfo, EngineError>;

    /// Render the molecule to raster image bytes.
    fn render(&self, mol: &Molecule, opts: &RenderOptions) -> Result<Vec<u8>, EngineError>;
}
