use std::fs;
use std::path::Path;
use std::process::Command;

fn universalizer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_universalizer"))
}

fn write_graph(dir: &Path) {
    fs::write(
        dir.join("kg_nodes.tsv"),
        "id\tcategory\nOBO:GO_0008150\tbiolink:OntologyClass\nHP:0000118\t\n",
    )
    .unwrap();
    fs::write(
        dir.join("kg_edges.tsv"),
        "id\tsubject\tpredicate\tobject\n\
e1\tOBO:GO_0008150\tbiolink:category\tbiolink:BiologicalProcess\n\
e2\tHP:0000118\tbiolink:related_to\tOBO:GO_0008150\n",
    )
    .unwrap();
}

#[test]
fn run_prints_json_report_and_rewrites_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(dir.path());

    let out = universalizer()
        .arg("run")
        .arg(dir.path())
        .arg("--update-categories")
        .arg("--json")
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["ids_remapped"], 1);
    assert_eq!(report["edges_removed"], 1);
    assert_eq!(report["nodes_updated"], 2);

    let nodes = fs::read_to_string(dir.path().join("kg_nodes.tsv")).unwrap();
    assert_eq!(
        nodes,
        "id\tcategory\nGO:0008150\tbiolink:BiologicalProcess\nHP:0000118\tbiolink:NamedThing\n"
    );
    let edges = fs::read_to_string(dir.path().join("kg_edges.tsv")).unwrap();
    assert_eq!(
        edges,
        "id\tsubject\tpredicate\tobject\ne2\tHP:0000118\tbiolink:related_to\tGO:0008150\n"
    );
}

#[test]
fn config_file_and_flags_combine() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph");
    fs::create_dir_all(&graph).unwrap();
    write_graph(&graph);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"update_categories": true}"#).unwrap();

    let status = universalizer()
        .arg("run")
        .arg(&graph)
        .arg("--config")
        .arg(&config)
        .arg("--no-diagnostics")
        .status()
        .unwrap();
    assert!(status.success());

    let nodes = fs::read_to_string(graph.join("kg_nodes.tsv")).unwrap();
    assert!(nodes.contains("GO:0008150\tbiolink:BiologicalProcess"));
    assert!(!graph.join("unexpected_ids.tsv").exists());
}

#[test]
fn missing_tables_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("kg_nodes.tsv"), "id\tcategory\n").unwrap();

    let out = universalizer().arg("run").arg(dir.path()).output().unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("expected one node table and one edge table"), "stderr: {stderr}");
}

#[test]
fn unknown_context_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(dir.path());

    let out = universalizer()
        .arg("run")
        .arg(dir.path())
        .arg("--contexts")
        .arg("obo,not-a-context")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let nodes = fs::read_to_string(dir.path().join("kg_nodes.tsv")).unwrap();
    assert!(nodes.contains("OBO:GO_0008150"));
}
