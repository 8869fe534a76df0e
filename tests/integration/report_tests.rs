use dupelines::config::{ScanConfig, Settings};
use dupelines::duplicates::FinderError;
use dupelines::error::ExitCode;
use dupelines::output::ReportFormat;
use dupelines::signal::ShutdownHandler;
use dupelines::{run_scan, RunOptions};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const QUIET: RunOptions = RunOptions {
    quiet: true,
    color: false,
};

fn sample_tree() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path().join("project");
    fs::create_dir_all(root.join("src")).unwrap();
    let block = "fn load_configuration_file() {\n    let contents = read_the_file(path);\n    parse_contents(contents)\n}\n";
    fs::write(root.join("src/a.rs"), block).unwrap();
    fs::write(root.join("src/b.rs"), format!("// b\n{block}")).unwrap();
    fs::write(root.join("src/c.rs"), "let contents = read_the_file(path);\n").unwrap();
    dir
}

fn config(root: &Path, out: &Path, format: ReportFormat) -> ScanConfig {
    ScanConfig::from_settings(Settings {
        root: root.to_path_buf(),
        out: out.to_path_buf(),
        format,
        ..Settings::default()
    })
    .unwrap()
}

fn without_timestamp(report: &str) -> String {
    report
        .lines()
        .filter(|line| !line.starts_with("Generated: "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_text_report_written() {
    let dir = sample_tree();
    let root = dir.path().join("project");
    let out = dir.path().join("report.txt");

    let outcome = run_scan(&config(&root, &out, ReportFormat::Text), QUIET, &ShutdownHandler::new()).unwrap();
    assert_eq!(outcome.report_path, out);

    let report = fs::read_to_string(&out).unwrap();
    assert!(report.starts_with("Duplicate scan report\nGenerated: "));
    assert!(report.contains(&format!("Root: {}\n", root.display())));
    assert!(report.contains("Scanned files: 3, total lines: 10\n"));
    assert!(report.contains("Duplicate 3-line blocks: 2 groups\n"));
    assert!(report.contains(
        "Occurrences: 3\nLine:\nlet contents = read_the_file(path);\nLocations:\n- src/a.rs:2\n- src/b.rs:3\n- src/c.rs:1\n"
    ));
    assert!(report.contains(
        "Occurrences: 2\nBlock:\nfn load_configuration_file() {\nlet contents = read_the_file(path);\nparse_contents(contents)\nLocations:\n- src/a.rs:1\n- src/b.rs:2\n"
    ));
}

#[test]
fn test_repeat_scan_is_identical_apart_from_timestamp() {
    let dir = sample_tree();
    let root = dir.path().join("project");
    let out = root.join("duplicate_report.txt");
    let config = config(&root, &out, ReportFormat::Text);

    run_scan(&config, QUIET, &ShutdownHandler::new()).unwrap();
    let first = fs::read_to_string(&out).unwrap();

    // The report now sits inside the root; its default name keeps it out
    run_scan(&config, QUIET, &ShutdownHandler::new()).unwrap();
    let second = fs::read_to_string(&out).unwrap();

    assert_eq!(without_timestamp(&first), without_timestamp(&second));
}

#[test]
fn test_json_report_matches_index() {
    let dir = sample_tree();
    let root = dir.path().join("project");
    let out = dir.path().join("report.json");

    let outcome = run_scan(&config(&root, &out, ReportFormat::Json), QUIET, &ShutdownHandler::new()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

    assert_eq!(value["totals"]["total_files"], 3);
    assert_eq!(value["totals"]["total_lines"], 10);
    assert_eq!(
        value["summary"]["line_groups"],
        outcome.index.lines().len()
    );
    assert_eq!(
        value["block_duplicates"].as_array().unwrap().len(),
        outcome.index.blocks().len()
    );
    assert_eq!(value["line_duplicates"][0]["occurrences"], 3);
    assert_eq!(value["line_duplicates"][0]["locations"][2]["path"], "src/c.rs");
}

#[test]
fn test_unwritable_report_fails_without_output() {
    let dir = sample_tree();
    let root = dir.path().join("project");
    let out = dir.path().join("missing").join("report.txt");

    let err = run_scan(&config(&root, &out, ReportFormat::Text), QUIET, &ShutdownHandler::new()).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("report.txt"));
    assert!(!out.exists());
    assert!(!dir.path().join("missing").exists());
}

#[test]
fn test_failed_write_keeps_previous_report() {
    let dir = sample_tree();
    let root = dir.path().join("project");
    let out = dir.path().join("occupied");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("keep.txt"), "keep").unwrap();

    assert!(run_scan(&config(&root, &out, ReportFormat::Text), QUIET, &ShutdownHandler::new()).is_err());
    assert_eq!(fs::read_to_string(out.join("keep.txt")).unwrap(), "keep");

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".dupelines-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_interrupted_run_writes_nothing() {
    let dir = sample_tree();
    let root = dir.path().join("project");
    let out = dir.path().join("report.txt");

    let shutdown = ShutdownHandler::new();
    shutdown.request_shutdown();
    let err = run_scan(&config(&root, &out, ReportFormat::Text), QUIET, &shutdown).unwrap_err();

    assert!(err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<FinderError>(), Some(FinderError::Interrupted))));
    assert_eq!(ExitCode::for_error(&err), ExitCode::Interrupted);
    assert!(!out.exists());
}

#[test]
fn test_missing_root_is_general_error() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("report.txt");

    let err = run_scan(
        &config(&dir.path().join("nope"), &out, ReportFormat::Text),
        QUIET,
        &ShutdownHandler::new(),
    )
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(!out.exists());
}
