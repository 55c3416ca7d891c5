//! Engine-agnostic small-molecule toolkit.
//!
//! The crate models molecules as petgraph graphs of atoms and bonds with
//! a registry of numbered attachment points, and routes all notation and
//! computation work through the [`ChemEngine`] trait. [`Converter`] wraps
//! an engine with the user-facing operations: format conversion,
//! canonicalization, validation, analysis, and rendering. [`join`] merges
//! two fragments at their attachment points while carrying wedge stereo
//! across the junction.
//!
//! [`SimpleEngine`] is the built-in reference engine; anything that can
//! implement the trait can replace it.

pub mod atom;
pub mod attachment;
pub mod bond;
pub mod convert;
pub mod engine;
pub mod error;
pub mod join;
pub mod molecule;
pub mod simple;

pub use atom::{Atom, AtomFlag};
pub use attachment::AttachmentList;
pub use bond::{Bond, BondOrder, StereoElement, StereoKind};
pub use convert::Converter;
pub use engine::{
    ChemEngine, ExportFormat, ImageFormat, InputFormat, MoleculeInfo, RenderOptions,
};
pub use error::{ChemError, EngineError, ParseError, StereoMergeError, TopologyError};
pub use join::{bind_atoms, join_fragments, stereo_information};
pub use molecule::Molecule;
pub use simple::SimpleEngine;
