//! Error taxonomy of the assembly layer.
//!
//! Engine-native failures are wrapped into these types inside each
//! [`ChemEngine`](crate::engine::ChemEngine) implementation, so no
//! engine-specific error crosses the public surface. Conversion and join
//! failures carry their cause for diagnostics but present a uniform kind
//! through [`ChemError`].

use std::fmt;

/// Malformed input text, with the source notation distinguished so callers
/// can report format-specific diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Smiles { pos: usize, msg: String },
    Molfile { line: usize, msg: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smiles { pos, msg } => {
                write!(f, "invalid SMILES at position {}: {}", pos, msg)
            }
            Self::Molfile { line, msg } => {
                write!(f, "invalid molfile at line {}: {}", line, msg)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A structural precondition failed: an atom or bond is not a member of the
/// molecule it was claimed to belong to, or an attachment point has the
/// wrong shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The atom is not part of the molecule.
    AtomNotAMember,
    /// The bond is not part of the molecule.
    BondNotAMember,
    /// No attachment point is registered under the label.
    MissingAttachment { label: u8 },
    /// An attachment atom must have exactly one connection.
    AttachmentArity { bonds: usize },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtomNotAMember => write!(f, "atom not found in the molecule"),
            Self::BondNotAMember => write!(f, "bond not found in the molecule"),
            Self::MissingAttachment { label } => {
                write!(f, "no attachment point registered for R{}", label)
            }
            Self::AttachmentArity { bonds } => write!(
                f,
                "attachment atom must have a single connection, found {}",
                bonds
            ),
        }
    }
}

impl std::error::Error for TopologyError {}

/// The stereo configuration at a junction could not be derived or cloned
/// during a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StereoMergeError {
    /// The attachment atom has no bond to take a descriptor from.
    MissingBond,
    /// The descriptor sits on a bond whose geometry cannot be carried over
    /// to the junction (e.g. a wedge on a non-single bond).
    Inconsistent { msg: String },
}

impl fmt::Display for StereoMergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBond => write!(f, "attachment atom carries no bond"),
            Self::Inconsistent { msg } => {
                write!(f, "inconsistent stereo configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for StereoMergeError {}

/// A computation inside the chemistry engine failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Export to a textual format failed.
    Export { msg: String },
    /// Elemental-composition analysis failed.
    Analysis { msg: String },
    /// No valid Kekulé assignment exists for an aromatic system.
    Kekulize { msg: String },
    /// The engine does not support the requested format or operation.
    Unsupported { msg: String },
    /// Writing the rendered image failed.
    Render { msg: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export { msg } => write!(f, "export failed: {}", msg),
            Self::Analysis { msg } => write!(f, "unable to analyse molecule: {}", msg),
            Self::Kekulize { msg } => write!(f, "cannot kekulize: {}", msg),
            Self::Unsupported { msg } => write!(f, "unsupported by engine: {}", msg),
            Self::Render { msg } => write!(f, "unable to write image output: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Top-level error of the assembly layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChemError {
    Parse(ParseError),
    Topology(TopologyError),
    StereoMerge(StereoMergeError),
    Engine(EngineError),
    /// Sequence notation is accepted at the API surface but its conversion
    /// and rendering paths are not implemented.
    SequenceUnsupported,
}

impl fmt::Display for ChemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{}", e),
            Self::Topology(e) => write!(f, "{}", e),
            Self::StereoMerge(e) => write!(f, "{}", e),
            Self::Engine(e) => write!(f, "{}", e),
            Self::SequenceUnsupported => {
                write!(f, "sequence notation is not supported")
            }
        }
    }
}

impl std::error::Error for ChemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Topology(e) => Some(e),
            Self::StereoMerge(e) => Some(e),
            Self::Engine(e) => Some(e),
            Self::SequenceUnsupported => None,
        }
    }
}

impl From<ParseError> for ChemError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<TopologyError> for ChemError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

impl From<StereoMergeError> for ChemError {
    fn from(e: StereoMergeError) -> Self {
        Self::StereoMerge(e)
    }
}

impl From<EngineError> for ChemError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}
