//! Integration test: full batches over scratch schema and event directories.
//!
//! Each test lays out a `schema/` and `event/` directory, runs the pipeline,
//! and checks exactly which findings were recorded against which files.

use std::path::{Path, PathBuf};

use evlint_core::{CollectingSink, Config, LogSink, ProblemKind, ProblemSink};
use evlint_schema::Pipeline;

/// A scratch workspace with schema and event directories.
struct Batch {
    root: tempfile::TempDir,
}

impl Batch {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("schema")).unwrap();
        std::fs::create_dir(root.path().join("event")).unwrap();
        Self { root }
    }

    fn schema(&self, file_name: &str, body: &str) -> &Self {
        std::fs::write(self.root.path().join("schema").join(file_name), body).unwrap();
        self
    }

    fn event(&self, file_name: &str, body: &str) -> &Self {
        std::fs::write(self.root.path().join("event").join(file_name), body).unwrap();
        self
    }

    fn result_file(&self) -> PathBuf {
        self.root.path().join("result.log")
    }

    fn config(&self) -> Config {
        Config {
            schema_dir: self.root.path().join("schema"),
            event_dir: self.root.path().join("event"),
            result_file: self.result_file(),
            ..Config::default()
        }
    }

    fn run(&self) -> CollectingSink {
        let mut sink = CollectingSink::new();
        Pipeline::new(self.config())
            .unwrap()
            .run(&mut sink)
            .expect("batch should complete");
        sink
    }
}

fn user_schema(batch: &Batch) -> &Batch {
    batch.schema("user.schema", r#"{"type": "object", "required": ["name"]}"#)
}

#[test]
fn conforming_event_produces_no_findings() {
    let batch = Batch::new();
    user_schema(&batch).event("ann.json", r#"{"event": "user", "name": "Ann"}"#);

    let sink = batch.run();

    assert!(sink.problems().is_empty(), "{:?}", sink.problems());
}

#[test]
fn missing_required_property_produces_one_mismatch() {
    let batch = Batch::new();
    user_schema(&batch).event("anon.json", r#"{"event": "user"}"#);

    let sink = batch.run();

    assert_eq!(sink.problems().len(), 1);
    let problem = &sink.problems()[0];
    assert_eq!(problem.subject, "anon.json");
    match &problem.kind {
        ProblemKind::ContentSchemaMismatch { name, detail } => {
            assert_eq!(name, "user");
            assert!(detail.contains("name"), "detail: {detail}");
        }
        other => panic!("expected ContentSchemaMismatch, got: {other}"),
    }
}

#[test]
fn unknown_schema_produces_one_finding() {
    let batch = Batch::new();
    user_schema(&batch).event("ghost.json", r#"{"event": "ghost"}"#);

    let sink = batch.run();

    assert_eq!(sink.problems().len(), 1);
    assert_eq!(
        sink.problems()[0].kind,
        ProblemKind::UnknownSchemaReference {
            name: "ghost".into()
        }
    );
}

#[test]
fn each_defective_event_produces_exactly_one_finding() {
    let batch = Batch::new();
    user_schema(&batch)
        .event("a-not-json.json", "{\"event\": ")
        .event("b-not-object.json", r#"[{"event": "user"}]"#)
        .event("c-no-key.json", r#"{"name": "Ann"}"#)
        .event("d-empty-key.json", r#"{"event": "", "name": "Ann"}"#);

    let sink = batch.run();

    let found: Vec<(&str, &str)> = sink
        .problems()
        .iter()
        .map(|p| (p.subject.as_str(), p.kind.code()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("a-not-json.json", "malformed_json"),
            ("b-not-object.json", "not_an_object"),
            ("c-no-key.json", "missing_schema_reference"),
            ("d-empty-key.json", "missing_schema_reference"),
        ]
    );
}

#[test]
fn non_schema_files_in_schema_directory_are_invisible() {
    let batch = Batch::new();
    batch
        .schema("notes.txt", "not json")
        .schema("user.json", r#"{"type": "object"}"#)
        .event("u.json", r#"{"event": "user"}"#);

    let sink = batch.run();

    // `user.json` is not a schema file, so "user" is unknown.
    assert_eq!(sink.subjects(), vec!["u.json"]);
    assert_eq!(sink.problems()[0].kind.code(), "unknown_schema_reference");
}

#[test]
fn bad_schema_is_known_but_unusable() {
    let batch = Batch::new();
    batch
        .schema("list.schema", "[1, 2]")
        .event("e1.json", r#"{"event": "list"}"#)
        .event("e2.json", r#"{"event": "list"}"#);

    let sink = batch.run();

    let found: Vec<(&str, &str)> = sink
        .problems()
        .iter()
        .map(|p| (p.subject.as_str(), p.kind.code()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("list.schema", "bad_schema"),
            ("list.schema", "invalid_schema_definition"),
            ("list.schema", "invalid_schema_definition"),
        ]
    );
}

#[test]
fn one_bad_event_does_not_stop_the_batch() {
    let batch = Batch::new();
    user_schema(&batch)
        .event("1.json", "garbage")
        .event("2.json", r#"{"event": "user", "name": "Bo"}"#)
        .event("3.json", r#"{"event": "user"}"#);

    let mut sink = CollectingSink::new();
    let report = Pipeline::new(batch.config())
        .unwrap()
        .run(&mut sink)
        .unwrap();

    assert_eq!(report.events_checked, 3);
    assert_eq!(report.events_passed, 1);
    assert_eq!(report.problems, 2);
    assert_eq!(sink.subjects(), vec!["1.json", "3.json"]);
}

fn strip_timestamps(log: &str) -> Vec<String> {
    log.lines()
        .map(|line| match line.strip_prefix('[') {
            Some(rest) => rest.split_once("] ").map_or(line, |(_, tail)| tail).to_string(),
            None => line.to_string(),
        })
        .collect()
}

fn run_into_log(config: &Config, log: &Path) {
    let mut sink = LogSink::open(log).unwrap();
    Pipeline::new(config.clone()).unwrap().run(&mut sink).unwrap();
    assert!(sink.recorded() > 0);
}

#[test]
fn repeated_runs_append_identical_blocks() {
    let batch = Batch::new();
    user_schema(&batch)
        .schema("list.schema", "[]")
        .event("a.json", r#"{"event": "ghost"}"#)
        .event("b.json", r#"{"event": "user"}"#)
        .event("c.json", r#"{"event": "user", "name": "Cy"}"#);
    let config = batch.config();
    let log = batch.result_file();

    run_into_log(&config, &log);
    let first = std::fs::read_to_string(&log).unwrap();
    run_into_log(&config, &log);
    let both = std::fs::read_to_string(&log).unwrap();

    assert!(both.starts_with(&first));
    let second = &both[first.len()..];
    assert_eq!(strip_timestamps(&first), strip_timestamps(second));
    assert_eq!(first.matches("file \"").count(), 3);
    assert!(first.contains("file \"a.json\"\nproblem: No such schema: ghost\n"));
}

#[test]
fn missing_event_directory_is_fatal() {
    let batch = Batch::new();
    let mut config = batch.config();
    config.event_dir = batch.root.path().join("nope");

    let mut sink = CollectingSink::new();
    let err = Pipeline::new(config).unwrap().run(&mut sink).unwrap_err();

    assert!(err.to_string().contains("nope"), "got: {err}");
}
