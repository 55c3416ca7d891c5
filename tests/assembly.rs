//! End-to-end assembly flows through the public API: parse fragments,
//! join them at registered attachment points, and push the result out
//! through every supported surface.

use chemkit::{
    join_fragments, ChemEngine, ChemError, Converter, ImageFormat, InputFormat, Molecule,
    SimpleEngine, StereoKind,
};

fn engine() -> SimpleEngine {
    SimpleEngine::new()
}

fn parse(text: &str) -> Molecule {
    engine().parse(text).unwrap()
}

#[test]
fn peptide_bond_formation() {
    // carboxyl side of one residue, amine side of the next
    let acid = parse("CC(N)C(=O)O[*:1]");
    let amine = parse("[*:2]NC(C)C(=O)O");
    let joined = join_fragments(&acid, 1, &amine, 2).unwrap();

    assert_eq!(joined.atom_count(), acid.atom_count() + amine.atom_count() - 2);
    assert!(joined.attachments().is_empty());

    let eng = engine();
    let conv = Converter::new(&eng);
    let info = conv.molecule_info(&joined).unwrap();
    assert_eq!(info.formula, "C6H12N2O4");
}

#[test]
fn joined_molecule_exports_to_both_notations() {
    let eng = engine();
    let conv = Converter::new(&eng);

    let left = parse("c1ccccc1[*:1]");
    let right = parse("[*:2]O");
    let mut phenol = join_fragments(&left, 1, &right, 2).unwrap();

    let smiles = conv
        .export_molecule(&mut phenol.clone(), InputFormat::Smiles)
        .unwrap();
    let reparsed = eng.parse(&smiles).unwrap();
    assert_eq!(reparsed.atom_count(), 7);
    assert_eq!(reparsed.bond_count(), 7);

    let molfile = conv
        .export_molecule(&mut phenol, InputFormat::Molfile)
        .unwrap();
    assert!(molfile.contains("V2000"));
    let reparsed = eng.parse(&molfile).unwrap();
    assert_eq!(reparsed.atom_count(), 7);
    assert_eq!(reparsed.bond_count(), 7);
}

#[test]
fn wedge_travels_from_smiles_fragment_to_molfile() {
    let eng = engine();
    let conv = Converter::new(&eng);

    let mut sugar = parse("OCC1OC(CO)C(O)C1[*:1]");
    let r = sugar.attachments().get(1).unwrap();
    let (_, e) = sugar.single_neighbor(r).unwrap();
    sugar.bond_mut(e).stereo = Some(StereoKind::Up);
    assert_eq!(sugar.is_single_stereo(r), Ok(true));

    let cap = parse("[*:2]N");
    let mut joined = join_fragments(&sugar, 1, &cap, 2).unwrap();

    let molfile = conv
        .export_molecule(&mut joined, InputFormat::Molfile)
        .unwrap();
    let back = eng.parse(&molfile).unwrap();
    let wedges: Vec<StereoKind> = back.bonds().filter_map(|e| back.bond(e).stereo).collect();
    assert_eq!(wedges, vec![StereoKind::Up]);

    // the wedge sits on the junction bond, between two real atoms
    let wedge_bond = back
        .bonds()
        .find(|&e| back.bond(e).stereo.is_some())
        .unwrap();
    let (a, b) = back.bond_endpoints(wedge_bond).unwrap();
    assert_ne!(back.atom(a).atomic_num, 0);
    assert_ne!(back.atom(b).atomic_num, 0);
}

#[test]
fn convert_round_trip_preserves_composition() {
    let eng = engine();
    let conv = Converter::new(&eng);

    for smiles in ["CCO", "CC(=O)NC", "c1ccc2ccccc2c1", "OS(=O)(=O)O"] {
        let molfile = conv.convert(smiles, InputFormat::Smiles).unwrap();
        let back = conv.convert(&molfile, InputFormat::Molfile).unwrap();

        let a = conv.molecule_info(&eng.parse(smiles).unwrap()).unwrap();
        let b = conv.molecule_info(&eng.parse(&back).unwrap()).unwrap();
        assert_eq!(a.formula, b.formula, "{}", smiles);
    }
}

#[test]
fn render_joined_molecule() {
    let eng = engine();
    let conv = Converter::new(&eng);

    let left = parse("CC[*:1]");
    let right = parse("[*:2]CO");
    let mut joined = join_fragments(&left, 1, &right, 2).unwrap();
    let molfile = conv
        .export_molecule(&mut joined, InputFormat::Molfile)
        .unwrap();

    let png = conv
        .render_mol(&molfile, ImageFormat::Png, 200, 150, 0xffffff)
        .unwrap();
    assert_eq!(&png[1..4], b"PNG");
    assert!(png.len() > 100);
}

#[test]
fn sequence_surfaces_fail_loudly() {
    let eng = engine();
    let conv = Converter::new(&eng);
    assert_eq!(
        conv.convert("PEPTIDE", InputFormat::Sequence).unwrap_err(),
        ChemError::SequenceUnsupported
    );
    assert_eq!(
        conv.render_sequence("PEPTIDE", ImageFormat::Png, 64, 64, 0)
            .unwrap_err(),
        ChemError::SequenceUnsupported
    );
}

#[test]
fn three_way_assembly_consumes_labels_in_order() {
    // backbone with two open valences, capped twice
    let backbone = parse("[*:1]CC(C)C[*:2]");
    let cap_a = parse("[*:3]O");
    let cap_b = parse("[*:4]N");

    let once = join_fragments(&backbone, 1, &cap_a, 3).unwrap();
    assert!(once.attachments().get(1).is_none());
    assert!(once.attachments().get(2).is_some());

    let twice = join_fragments(&once, 2, &cap_b, 4).unwrap();
    assert!(twice.attachments().is_empty());

    let eng = engine();
    let conv = Converter::new(&eng);
    let info = conv.molecule_info(&twice).unwrap();
    assert_eq!(info.formula, "C4H11NO");
}

#[test]
fn canonicalization_matches_across_input_notations() {
    let eng = engine();
    let conv = Converter::new(&eng);

    // the same structure entered as SMILES and as a molfile should reach
    // the same canonical string
    let direct = conv.canonicalize("CC(C)CO").unwrap();
    let molfile = conv.convert("OCC(C)C", InputFormat::Smiles).unwrap();
    let from_molfile = conv.convert(&molfile, InputFormat::Molfile).unwrap();
    let indirect = conv.canonicalize(&from_molfile).unwrap();
    assert_eq!(direct, indirect);
}
