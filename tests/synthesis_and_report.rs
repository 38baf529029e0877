use mutation_harness::config::{COVERAGE_DIR, CONFIG_FILE_NAME, Element};
use mutation_harness::prelude::*;
use mutation_harness::progress::SessionState;

use tempfile::tempdir;

const ORIGINAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<phpunit bootstrap="tests/bootstrap.php" colors="true" printerClass="Custom\Printer">
    <testsuites>
        <testsuite name="all">
            <directory>tests</directory>
        </testsuite>
    </testsuites>
    <logging>
        <log type="coverage-html" target="build/html"/>
        <log type="junit" target="build/junit.xml"/>
    </logging>
</phpunit>
"#;

#[test]
fn synthesis_end_to_end_without_filter() {
    let tmp = tempdir().expect("tempdir should be created");
    let options = SynthesisOptions::default()
        .with_output_dir(tmp.path())
        .with_config_dir("/work/project")
        .with_result_log_path(tmp.path().join("junit.xml"))
        .with_source_dirs(["src/A", "src/B"])
        .with_skip_coverage(false);

    let path = ConfigSynthesizer::new(options)
        .synthesize_str(ORIGINAL, "7.2.13")
        .expect("synthesis should succeed");
    assert_eq!(path, tmp.path().join(CONFIG_FILE_NAME));

    let written = ConfigDocument::load(&path).expect("synthesized file should parse");
    let root = written.root();

    assert_eq!(root.count_children("filter"), 1);
    let whitelist = root
        .child("filter")
        .and_then(|filter| filter.child("whitelist"))
        .expect("whitelist should be generated");
    let dirs: Vec<String> = whitelist.children().map(Element::text).collect();
    assert_eq!(
        dirs,
        vec!["/work/project/src/A".to_string(), "/work/project/src/B".to_string()]
    );

    assert_eq!(root.count_children("logging"), 1);
    let log_types: Vec<&str> = root
        .child("logging")
        .expect("logging should exist")
        .children()
        .filter_map(|log| log.attribute("type"))
        .collect();
    assert_eq!(log_types, vec!["coverage-xml", "junit"]);

    let coverage_target = tmp.path().join(COVERAGE_DIR).display().to_string();
    assert!(
        root.child("logging")
            .expect("logging should exist")
            .children()
            .any(|log| log.attribute("target") == Some(coverage_target.as_str()))
    );
    assert!(!std::fs::read_to_string(&path)
        .expect("file should be readable")
        .contains("build/html"));

    assert_eq!(root.attribute("executionOrder"), Some("random"));
    assert_eq!(root.attribute("resolveDependencies"), Some("true"));
    assert_eq!(root.attribute("stopOnFailure"), Some("true"));
    assert_eq!(root.attribute("colors"), Some("false"));
    assert_eq!(root.attribute("printerClass"), None);
    assert_eq!(root.attribute("bootstrap"), Some("/work/project/tests/bootstrap.php"));
}

#[test]
fn resynthesizing_output_is_stable() {
    let tmp = tempdir().expect("tempdir should be created");
    let synthesizer = ConfigSynthesizer::new(
        SynthesisOptions::default()
            .with_output_dir(tmp.path())
            .with_config_dir("/work/project")
            .with_result_log_path(tmp.path().join("junit.xml")),
    );

    let first = synthesizer
        .build(&ConfigDocument::parse(ORIGINAL).expect("fixture should parse"), "8.0")
        .expect("first build should succeed");
    let second = synthesizer
        .build(&first, "8.0")
        .expect("second build should succeed");
    assert_eq!(first, second);
}

#[test]
fn dispatched_run_renders_progress_and_summary() {
    let events = vec![
        RunEvent::RunStarted { total: 3 },
        RunEvent::MutantCompleted(MutantResult::new(
            MutantResultKind::Killed,
            "PublicVisibility",
            "src/A.php",
            "",
        )),
        RunEvent::MutantCompleted(MutantResult::new(
            MutantResultKind::Escaped,
            "Plus",
            "src/B.php",
            "-$a + $b\n+$a - $b",
        )),
        RunEvent::MutantCompleted(MutantResult::new(
            MutantResultKind::TimedOut,
            "For_",
            "src/C.php",
            "",
        )),
        RunEvent::RunFinished,
    ];

    let mut reporter = ProgressReporter::new(
        RunSession::new(),
        Vec::new(),
        DefaultMetrics::new(),
        PlainDiff,
        ReporterOptions::default().with_show_mutations(true),
    );
    {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(&mut reporter);
        dispatcher
            .dispatch_all(&events)
            .expect("ordered events should be accepted");
    }

    let (session, bytes) = reporter.into_parts();
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(session.processed_count(), 3);

    let text = String::from_utf8(bytes).expect("output should be utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        ".: killed, M: escaped, S: uncovered, E: fatal error, T: timed out"
    );
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], format!(".MT{}   (3 / 3)", " ".repeat(47)));
    assert_eq!(lines[3], "1) Plus");
    assert_eq!(lines[4], "src/B.php");
    assert_eq!(lines[5], "-$a + $b");
    assert_eq!(lines[6], "+$a - $b");
    assert!(text.contains("3 mutations were generated:"));
    assert!(text.contains("         Mutation Score Indicator (MSI): 66%"));
    assert!(text.ends_with("(i.e. false positives).\n"));
}

#[test]
fn out_of_order_delivery_aborts_dispatch() {
    let mut reporter = ProgressReporter::new(
        RunSession::new(),
        Vec::new(),
        DefaultMetrics::new(),
        PlainDiff,
        ReporterOptions::default(),
    );
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(&mut reporter);

    let err = dispatcher
        .dispatch(&RunEvent::RunFinished)
        .expect_err("finish before start should be rejected");
    assert!(matches!(err, ReporterError::ProtocolViolation { .. }));
    assert!(err.to_string().contains("run_finished"));
}
