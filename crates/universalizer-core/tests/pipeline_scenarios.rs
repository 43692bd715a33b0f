use std::fs;
use std::path::Path;
use universalizer_core::diagnostics::{
    CATEGORY_REMAP_FILE, ID_REMAP_FILE, UNEXPECTED_CATEGORIES_FILE, UNEXPECTED_IDS_FILE,
};
use universalizer_core::{
    merge_mappings, run, run_with, MappingRow, MappingTables, NormalizeConfig, PrefixRegistry,
    RunOptions, UniversalizerError,
};

const NODE_HEADER: &str = "id\tcategory\tname\n";
const EDGE_HEADER: &str = "id\tsubject\tpredicate\tobject\tprovided_by\n";

fn write_graph(dir: &Path, nodes: &str, edges: &str) {
    fs::write(dir.join("test_nodes.tsv"), format!("{NODE_HEADER}{nodes}")).unwrap();
    fs::write(dir.join("test_edges.tsv"), format!("{EDGE_HEADER}{edges}")).unwrap();
}

fn read_rows(dir: &Path, table: &str) -> Vec<String> {
    fs::read_to_string(dir.join(table))
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

fn category_options<'a>(registry: &'a PrefixRegistry, mappings: &'a MappingTables) -> RunOptions<'a> {
    RunOptions {
        update_categories: true,
        ..RunOptions::new(registry, mappings)
    }
}

#[test]
fn obo_ids_are_converted_in_nodes_and_edge_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(
        dir.path(),
        "OBO:MONDO_0005148\tbiolink:Disease\tdiabetes\nOBO:HP.owl#0001\tbiolink:PhenotypicFeature\tx\n",
        "e1\tOBO:MONDO_0005148\tbiolink:has_phenotype\tOBO:HP.owl#0001\tsrc\n",
    );
    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let mappings = MappingTables::default();

    let report = run_with(dir.path(), &RunOptions::new(&registry, &mappings)).unwrap();
    assert_eq!(report.ids_remapped, 1);
    assert_eq!(report.identifier_anomalies, 2);

    assert_eq!(
        read_rows(dir.path(), "test_nodes.tsv"),
        vec![
            "MONDO:0005148\tbiolink:Disease\tdiabetes",
            "OBO:HP.owl#0001\tbiolink:PhenotypicFeature\tx",
        ]
    );
    assert_eq!(
        read_rows(dir.path(), "test_edges.tsv"),
        vec!["e1\tMONDO:0005148\tbiolink:has_phenotype\tOBO:HP.owl#0001\tsrc"]
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(ID_REMAP_FILE)).unwrap(),
        "Old ID\tNew ID\nOBO:MONDO_0005148\tMONDO:0005148\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(UNEXPECTED_IDS_FILE)).unwrap(),
        "ID\nOBO:MONDO_0005148\nOBO:HP.owl#0001\n"
    );
}

#[test]
fn uninformative_categories_collapse_to_named_thing() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(
        dir.path(),
        "GO:0008150\t\tprocess\nGO:0003674\tbiolink:OntologyClass\tfunction\nGO:0005575\tbiolink:CellularComponent\tcomponent\n",
        "",
    );
    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let mappings = MappingTables::default();

    let report = run_with(dir.path(), &category_options(&registry, &mappings)).unwrap();
    assert_eq!(report.rewrite.categories_updated, 2);
    assert_eq!(
        read_rows(dir.path(), "test_nodes.tsv"),
        vec![
            "GO:0008150\tbiolink:NamedThing\tprocess",
            "GO:0003674\tbiolink:NamedThing\tfunction",
            "GO:0005575\tbiolink:CellularComponent\tcomponent",
        ]
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(CATEGORY_REMAP_FILE)).unwrap(),
        "Old ID\tNew Category\nGO:0003674\tbiolink:NamedThing\nGO:0008150\tbiolink:NamedThing\n"
    );
}

#[test]
fn category_edges_are_folded_into_their_subject() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(
        dir.path(),
        "UMLS:C0011849\t\tdiabetes\nUMLS:C0017337\tbiolink:NamedThing\tgene\nMONDO:0005148\tbiolink:OntologyClass\tt2d\n",
        "e1\tMONDO:0005148\tbiolink:category\tbiolink:Disease\ts\n\
e2\tUMLS:C0011849\tbiolink:related_to\tSTY:T047\ts\n\
e3\tUMLS:C0017337\tbiolink:related_to\thttp://purl.bioontology.org/ontology/STY/T028\ts\n\
e4\tUMLS:C0011849\tbiolink:related_to\tMONDO:0005148\ts\n",
    );
    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let mappings = MappingTables::default();

    let report = run_with(dir.path(), &category_options(&registry, &mappings)).unwrap();
    assert_eq!(report.rewrite.edges_removed, 3);
    assert_eq!(
        read_rows(dir.path(), "test_nodes.tsv"),
        vec![
            "UMLS:C0011849\tbiolink:Disease\tdiabetes",
            "UMLS:C0017337\tbiolink:Gene\tgene",
            "MONDO:0005148\tbiolink:Disease\tt2d",
        ]
    );
    assert_eq!(
        read_rows(dir.path(), "test_edges.tsv"),
        vec!["e4\tUMLS:C0011849\tbiolink:related_to\tMONDO:0005148\ts"]
    );
}

#[test]
fn named_thing_edge_overrides_a_specific_category() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(
        dir.path(),
        "GO:0008150\tbiolink:BiologicalProcess\tprocess\n",
        "e1\tGO:0008150\tbiolink:category\tbiolink:NamedThing\ts\n",
    );
    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let mappings = MappingTables::default();

    let report = run_with(dir.path(), &category_options(&registry, &mappings)).unwrap();
    assert_eq!(report.rewrite.edges_removed, 1);
    assert_eq!(
        read_rows(dir.path(), "test_nodes.tsv"),
        vec!["GO:0008150\tbiolink:NamedThing\tprocess"]
    );
    assert!(read_rows(dir.path(), "test_edges.tsv").is_empty());
}

#[test]
fn equivalence_mappings_outrank_edge_assertions() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(
        dir.path(),
        "DOID:9352\tbiolink:OntologyClass\tt2d\nDOID:1\tbiolink:Disease\tother\n",
        "e1\tDOID:9352\tbiolink:category\tbiolink:PhenotypicFeature\ts\n\
e2\tDOID:1\tbiolink:subclass_of\tDOID:9352\ts\n",
    );
    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let rows = vec![MappingRow::new("DOID:9352", "MONDO:0005148", "biolink:Disease")];
    let mappings = merge_mappings([rows.as_slice()]);

    let report = run_with(dir.path(), &category_options(&registry, &mappings)).unwrap();
    assert_eq!(report.rewrite.nodes_updated, 1);
    assert_eq!(
        read_rows(dir.path(), "test_nodes.tsv"),
        vec![
            "MONDO:0005148\tbiolink:Disease\tt2d",
            "DOID:1\tbiolink:Disease\tother",
        ]
    );
    assert_eq!(
        read_rows(dir.path(), "test_edges.tsv"),
        vec!["e2\tDOID:1\tbiolink:subclass_of\tMONDO:0005148\ts"]
    );
}

#[test]
fn config_driven_run_uses_every_side_input() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph");
    let maps = dir.path().join("maps");
    let oracle = dir.path().join("oracle");
    fs::create_dir_all(&graph).unwrap();
    fs::create_dir_all(&maps).unwrap();
    fs::create_dir_all(&oracle).unwrap();

    write_graph(
        &graph,
        "HP:0000001\t\tall\nGO:0008150\t\tprocess\nGO:0003674\tbiolink:MolecularActivity\tfunction\nNCIT:C1\t\tthing\n",
        "",
    );
    fs::write(
        maps.join("a.sssom.tsv"),
        "# mapping_set_id: test\nsubject_id\tobject_id\tobject_category\nNCIT:C1\t\tbiolink:Drug\n",
    )
    .unwrap();
    fs::write(dir.path().join("namespaces.tsv"), "prefix\tcategory\nHP\tbiolink:PhenotypicFeature\n").unwrap();
    fs::write(
        oracle.join("go.tsv"),
        "GO:0008150\tbiolink:BiologicalProcess\nGO:0003674\tbiolink:BiologicalProcess\n",
    )
    .unwrap();

    let config = NormalizeConfig {
        update_categories: true,
        namespace_map: Some(dir.path().join("namespaces.tsv")),
        map_paths: vec![maps],
        oracle_dir: Some(oracle),
        ..NormalizeConfig::default()
    };
    let report = run(&graph, &config).unwrap();
    assert_eq!(report.category_anomalies, 1);

    assert_eq!(
        read_rows(&graph, "test_nodes.tsv"),
        vec![
            "HP:0000001\tbiolink:PhenotypicFeature\tall",
            "GO:0008150\tbiolink:BiologicalProcess\tprocess",
            "GO:0003674\tbiolink:MolecularActivity\tfunction",
            "NCIT:C1\tbiolink:Drug\tthing",
        ]
    );
    assert_eq!(
        fs::read_to_string(graph.join(UNEXPECTED_CATEGORIES_FILE)).unwrap(),
        "ID\tCategory\nGO:0003674\tbiolink:BiologicalProcess\n"
    );
}

#[test]
fn failed_rewrite_leaves_both_tables_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let nodes = format!("{NODE_HEADER}OBO:GO_0008150\t\tprocess\n");
    fs::write(dir.path().join("test_nodes.tsv"), &nodes).unwrap();
    let mut edges = EDGE_HEADER.as_bytes().to_vec();
    edges.extend_from_slice(b"e1\tOBO:GO_0008150\tbiolink:related_to\t\xff\xfe\ts\n");
    fs::write(dir.path().join("test_edges.tsv"), &edges).unwrap();

    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let mappings = MappingTables::default();
    let err = run_with(dir.path(), &RunOptions::new(&registry, &mappings)).unwrap_err();
    assert!(matches!(err, UniversalizerError::Rewrite { .. }));

    assert_eq!(fs::read_to_string(dir.path().join("test_nodes.tsv")).unwrap(), nodes);
    assert_eq!(fs::read(dir.path().join("test_edges.tsv")).unwrap(), edges);
    assert!(!dir.path().join("test_nodes.tsv.tmp").exists());
    assert!(!dir.path().join("test_edges.tsv.tmp").exists());
    // diagnostics are still there for the next attempt
    assert!(dir.path().join(ID_REMAP_FILE).exists());
}

#[test]
fn wrong_file_count_is_rejected_before_anything_is_written() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(dir.path(), "GO:1\t\tx\n", "");
    fs::write(dir.path().join("extra_nodes.tsv"), NODE_HEADER).unwrap();

    let registry = PrefixRegistry::with_default_contexts().unwrap();
    let mappings = MappingTables::default();
    let err = run_with(dir.path(), &RunOptions::new(&registry, &mappings)).unwrap_err();
    assert!(matches!(err, UniversalizerError::GraphFiles { .. }));
    assert!(!dir.path().join(UNEXPECTED_IDS_FILE).exists());
}
