//! End-to-end tests for the CLI library
//!
//! Tests a source file through Session compilation, rendering and JSON
//! artifact output.

use cli::{split_programs, summarize, write_artifact, CliError, Session};
use std::fs;
use tempfile::TempDir;

const PROGRAMS: &str = "{int a a = 1 print(a)}$\n\
                        {string s s = \"ok\" print(s)}$\n\
                        {int b c = 2}$\n";

/// Test complete workflow: file -> session -> render -> artifact
#[test]
fn e2e_file_workflow() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("programs.txt");
    let out = dir.path().join("out.json");
    fs::write(&source, PROGRAMS).unwrap();

    let session = Session::new().with_print_symbols(true);
    let reports = session.compile_file(&source).unwrap();
    assert_eq!(reports.len(), 3);

    let rendered: Vec<String> = reports.iter().map(|r| session.render(r)).collect();
    assert!(rendered[0].contains("Runtime Image"));
    assert!(rendered[1].contains("Symbol Table"));
    assert!(rendered[2].contains("ERROR [Semantic Analysis] (3:8) undeclared identifier c"));
    assert!(!rendered[2].contains("Runtime Image"));

    write_artifact(&out, &reports).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["units"].as_array().unwrap().len(), 3);
    assert_eq!(json["units"][2]["errors"], 1);

    match summarize(&reports) {
        Err(CliError::CompileFailed {
            errors,
            failed,
            units,
        }) => assert_eq!((errors, failed, units), (1, 1, 3)),
        other => panic!("unexpected {:?}", other),
    }
}

/// Test that splitting matches what the session compiles
#[test]
fn e2e_split_matches_session() {
    let units = split_programs(PROGRAMS);
    let reports = Session::new().compile_source(PROGRAMS);
    assert_eq!(units.len(), reports.len());
    for (unit, report) in units.iter().zip(&reports) {
        assert_eq!(unit, &report.unit);
    }
}

/// Test that fresh state is used for each unit
#[test]
fn e2e_units_do_not_share_symbols() {
    let reports = Session::new().compile_source("{int a a = 1}$ {a = 2}$");
    assert!(reports[0].succeeded());
    assert!(!reports[1].succeeded());
    let code = reports[0].output.code.as_ref().unwrap();
    assert_eq!(code.temps.len(), 1);
}
