//! Notation conversion orchestrated over a [`ChemEngine`].
//!
//! The cleanup applied before export is deliberately format-specific and
//! must stay that way: molfile export regenerates 2D geometry and then
//! dearomatizes, while SMILES export only dearomatizes.

use tracing::debug;

use crate::attachment::AttachmentList;
use crate::engine::{ChemEngine, ExportFormat, ImageFormat, InputFormat, MoleculeInfo, RenderOptions};
use crate::error::ChemError;
use crate::molecule::Molecule;

/// Converts between external notations and exports assembled structures.
///
/// Borrows the process-wide engine handle; a converter is cheap to create
/// and carries no state of its own.
pub struct Converter<'e, E: ChemEngine> {
    engine: &'e E,
}

impl<'e, E: ChemEngine> Converter<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Round-trip between notations: SMILES input exports a cleaned
    /// molfile, molfile input exports SMILES. Sequence input is an explicit
    /// not-yet-supported stub.
    pub fn convert(&self, data: &str, format: InputFormat) -> Result<String, ChemError> {
        debug!(?format, len = data.len(), "convert");
        match format {
            InputFormat::Smiles => {
                let mut mol = self.parse_cleaned(data)?;
                self.to_molfile(&mut mol)
            }
            InputFormat::Molfile => {
                let mut mol = self.parse_cleaned(data)?;
                self.to_smiles(&mut mol)
            }
            InputFormat::Sequence => Err(ChemError::SequenceUnsupported),
        }
    }

    /// Export an assembled molecule to the requested notation, applying the
    /// per-format cleanup.
    pub fn export_molecule(
        &self,
        mol: &mut Molecule,
        format: InputFormat,
    ) -> Result<String, ChemError> {
        match format {
            InputFormat::Smiles => self.to_smiles(mol),
            InputFormat::Molfile => self.to_molfile(mol),
            InputFormat::Sequence => Err(ChemError::SequenceUnsupported),
        }
    }

    /// Normalize a SMILES string so that structurally identical molecules
    /// always produce the same text. Idempotent.
    pub fn canonicalize(&self, smiles: &str) -> Result<String, ChemError> {
        let mut mol = self.engine.parse(smiles)?;
        self.engine.implicitize_hydrogens(&mut mol);
        Ok(self.engine.export(&mol, ExportFormat::UniqueSmiles)?)
    }

    /// `true` when the text parses and every atom passes the engine's
    /// valence check.
    pub fn validate_smiles(&self, smiles: &str) -> bool {
        let mut mol = match self.engine.parse(smiles) {
            Ok(mol) => mol,
            Err(_) => return false,
        };
        if self.engine.dearomatize(&mut mol).is_err() {
            return false;
        }
        let atoms: Vec<_> = mol.atoms().collect();
        atoms.into_iter().all(|idx| self.engine.valence_check(&mol, idx))
    }

    /// Elemental composition of an assembled molecule.
    pub fn molecule_info(&self, mol: &Molecule) -> Result<MoleculeInfo, ChemError> {
        Ok(self.engine.analyze(mol)?)
    }

    /// Render a molfile to raster image bytes of the given size and
    /// background color (0xRRGGBB).
    pub fn render_mol(
        &self,
        molfile: &str,
        format: ImageFormat,
        width: u32,
        height: u32,
        background_rgb: u32,
    ) -> Result<Vec<u8>, ChemError> {
        let mol = self.parse_cleaned(molfile)?;
        let opts = RenderOptions {
            format,
            width,
            height,
            background_rgb,
        };
        Ok(self.engine.render(&mol, &opts)?)
    }

    /// Sequence rendering is not implemented; this fails rather than
    /// guessing an output.
    pub fn render_sequence(
        &self,
        _sequence: &str,
        _format: ImageFormat,
        _width: u32,
        _height: u32,
        _background_rgb: u32,
    ) -> Result<Vec<u8>, ChemError> {
        Err(ChemError::SequenceUnsupported)
    }

    /// Parse a fragment string into a molecule carrying a deep copy of the
    /// given attachment registry.
    pub fn molecule(
        &self,
        data: &str,
        attachments: Option<&AttachmentList>,
    ) -> Result<Molecule, ChemError> {
        let mut mol = self.parse_cleaned(data)?;
        if let Some(list) = attachments {
            mol.set_attachments(list.clone_list());
        }
        Ok(mol)
    }

    fn parse_cleaned(&self, data: &str) -> Result<Molecule, ChemError> {
        let mut mol = self.engine.parse(data)?;
        self.engine.clean(&mut mol, 2);
        Ok(mol)
    }

    // Molfile export: layout, then Kekulé rewrite.
    fn to_molfile(&self, mol: &mut Molecule) -> Result<String, ChemError> {
        self.engine.clean(mol, 2);
        self.engine.dearomatize(mol)?;
        Ok(self.engine.export(mol, ExportFormat::Molfile)?)
    }

    // SMILES export: Kekulé rewrite only, no geometry pass.
    fn to_smiles(&self, mol: &mut Molecule) -> Result<String, ChemError> {
        self.engine.dearomatize(mol)?;
        Ok(self.engine.export(mol, ExportFormat::Smiles)?)
    }
}
