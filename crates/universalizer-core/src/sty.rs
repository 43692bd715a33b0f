//! UMLS semantic types (STY) -> Biolink categories.

/// Literal prefix of STY CURIEs (`STY:T047`).
pub const STY_PREFIX: &str = "STY:";

/// Penultimate path segment of STY IRIs (`.../ontology/STY/T047`).
pub const STY_PATH_MARKER: &str = "STY";

const STY_CATEGORIES: &[(&str, &str)] = &[
    ("T005", "biolink:Virus"),
    ("T007", "biolink:Bacterium"),
    ("T017", "biolink:AnatomicalEntity"),
    ("T019", "biolink:Disease"),
    ("T020", "biolink:PhenotypicFeature"),
    ("T021", "biolink:GrossAnatomicalStructure"),
    ("T022", "biolink:AnatomicalEntity"),
    ("T023", "biolink:GrossAnatomicalStructure"),
    ("T024", "biolink:GrossAnatomicalStructure"),
    ("T025", "biolink:Cell"),
    ("T026", "biolink:CellularComponent"),
    ("T028", "biolink:Gene"),
    ("T029", "biolink:AnatomicalEntity"),
    ("T030", "biolink:AnatomicalEntity"),
    ("T031", "biolink:AnatomicalEntity"),
    ("T033", "biolink:PhenotypicFeature"),
    ("T034", "biolink:ClinicalFinding"),
    ("T037", "biolink:Disease"),
    ("T038", "biolink:BiologicalProcess"),
    ("T039", "biolink:PhysiologicalProcess"),
    ("T040", "biolink:PhysiologicalProcess"),
    ("T041", "biolink:Behavior"),
    ("T042", "biolink:PhysiologicalProcess"),
    ("T043", "biolink:PhysiologicalProcess"),
    ("T044", "biolink:MolecularActivity"),
    ("T045", "biolink:BiologicalProcess"),
    ("T046", "biolink:PathologicalProcess"),
    ("T047", "biolink:Disease"),
    ("T048", "biolink:Disease"),
    ("T049", "biolink:Disease"),
    ("T050", "biolink:PhenotypicFeature"),
    ("T059", "biolink:Procedure"),
    ("T060", "biolink:Procedure"),
    ("T061", "biolink:Procedure"),
    ("T074", "biolink:Device"),
    ("T075", "biolink:Device"),
    ("T086", "biolink:NucleicAcidEntity"),
    ("T087", "biolink:Polypeptide"),
    ("T088", "biolink:NucleicAcidEntity"),
    ("T103", "biolink:ChemicalEntity"),
    ("T104", "biolink:ChemicalEntity"),
    ("T109", "biolink:ChemicalEntity"),
    ("T114", "biolink:NucleicAcidEntity"),
    ("T116", "biolink:Protein"),
    ("T121", "biolink:Drug"),
    ("T123", "biolink:ChemicalEntity"),
    ("T125", "biolink:ChemicalEntity"),
    ("T126", "biolink:Protein"),
    ("T127", "biolink:ChemicalEntity"),
    ("T129", "biolink:ChemicalEntity"),
    ("T131", "biolink:ChemicalEntity"),
    ("T184", "biolink:PhenotypicFeature"),
    ("T190", "biolink:Disease"),
    ("T191", "biolink:Disease"),
    ("T192", "biolink:Protein"),
    ("T195", "biolink:Drug"),
    ("T196", "biolink:ChemicalEntity"),
    ("T197", "biolink:ChemicalEntity"),
    ("T200", "biolink:Drug"),
    ("T201", "biolink:ClinicalAttribute"),
];

/// Extract the code from `STY:T047` or `http://.../STY/T047`.
pub fn semantic_type_code(object: &str) -> Option<&str> {
    if let Some(code) = object.strip_prefix(STY_PREFIX) {
        return (!code.is_empty()).then_some(code);
    }
    if !object.contains("://") {
        return None;
    }
    let mut segments = object.trim_end_matches('/').rsplit('/');
    let code = segments.next()?;
    let marker = segments.next()?;
    (marker == STY_PATH_MARKER && !code.is_empty()).then_some(code)
}

pub fn category_for_code(code: &str) -> Option<&'static str> {
    STY_CATEGORIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, category)| *category)
}
