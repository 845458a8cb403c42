use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn tokens_lists_placeholders() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("tokens").arg(fixture_path("letter.json"));

    cmd.assert().success().stdout(
        predicate::str::contains("name\n")
            .and(predicate::str::contains("order:ref\n"))
            .and(predicate::str::contains("item\n"))
            .and(predicate::str::contains("qty\n")),
    );
}

#[test]
fn merge_substitutes_bindings() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--bindings")
        .arg(fixture_path("bindings.json"));

    cmd.assert().success().stdout(
        predicate::str::contains("Ada Lovelace")
            .and(predicate::str::contains("A-1024"))
            .and(predicate::str::contains("{{na").not())
            .and(predicate::str::contains("{{order").not())
            // the table was not filled, so its tokens survive
            .and(predicate::str::contains("{{item}}")),
    );
}

#[test]
fn merge_fills_positional_table() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--table")
        .arg(fixture_path("records.json"))
        .arg("--skip-header");

    cmd.assert().success().stdout(
        predicate::str::contains("Widget")
            .and(predicate::str::contains("Gadget"))
            .and(predicate::str::contains("\"1.5\""))
            .and(predicate::str::contains("{{item}}").not()),
    );
}

#[test]
fn merge_fills_composite_table_and_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("merged.json");

    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--composite")
        .arg(fixture_path("composite.json"))
        .arg("--skip-header")
        .arg("--output")
        .arg(&target);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&target).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    let rows = json["document"]["body"][1]["table"]["rows"]
        .as_array()
        .expect("table rows");
    assert_eq!(rows.len(), 3);
    assert!(written.contains("Gadget"));
    assert!(!written.contains("{{qty}}"));
    assert!(json["media"].as_array().unwrap().is_empty());
}

#[test]
fn merge_rejects_unsupported_binding_values() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--bindings")
        .arg(fixture_path("bad_bindings.json"));

    cmd.assert().failure().code(1).stderr(predicate::str::contains(
        "Element of kind number is not valid for substitution",
    ));
}

#[test]
fn merge_honours_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("docfill.toml");
    std::fs::write(&config, "[output]\npretty = false\n").unwrap();

    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("{\"document\":"));
}

#[test]
fn missing_document_fails() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("tokens").arg(fixture_path("absent.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}

#[test]
fn merge_applies_set_overrides() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--set")
        .arg("output.pretty=false");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("{\"document\":"));
}

#[test]
fn merge_rejects_zero_replacement_limit() {
    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.arg("merge")
        .arg(fixture_path("letter.json"))
        .arg("--set")
        .arg("merge.max_replacements_per_token=0");

    cmd.assert().failure().code(1).stderr(
        predicate::str::contains("Configuration error")
            .and(predicate::str::contains("max_replacements_per_token")),
    );
}

#[test]
fn merge_reads_docfill_toml_from_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("docfill.toml"), "[output]\npretty = false\n").unwrap();

    let mut cmd = cargo_bin_cmd!("docfill");
    cmd.current_dir(dir.path())
        .arg("merge")
        .arg(fixture_path("letter.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("{\"document\":"));
}
