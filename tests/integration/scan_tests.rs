use dupelines::duplicates::{DuplicateFinder, FinderConfig, FinderError, IndexerConfig};
use dupelines::scanner::WalkerConfig;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

const HANDLER: &str = "def handler():\n    x = compute(1)\n    return x\n";

fn finder(indexer: IndexerConfig) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_indexer_config(indexer))
}

fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn locations(occurrences: &[dupelines::duplicates::Occurrence]) -> Vec<String> {
    occurrences.iter().map(ToString::to_string).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (index, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(index.is_empty());
    assert_eq!(index.totals().total_files, 0);
    assert_eq!(index.totals().total_lines, 0);
    assert_eq!(summary.candidate_files, 0);
    assert!(summary.root.is_absolute());
}

#[test]
fn test_single_line_duplicate_across_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.py", "import requests_client_wrapper_lib\n");
    write(dir.path(), "b.py", "import requests_client_wrapper_lib\n");

    let config = IndexerConfig {
        min_line_length: 20,
        block_size: 1,
        ..IndexerConfig::default()
    };
    let (index, _) = finder(config).find_duplicates(dir.path()).unwrap();

    let groups = index.line_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].content(), "import requests_client_wrapper_lib");
    assert_eq!(locations(groups[0].occurrences()), vec!["a.py:1", "b.py:1"]);
    assert!(index.blocks().is_empty());
}

#[test]
fn test_block_duplicate_reported_at_start_lines() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.py", HANDLER);
    write(dir.path(), "b.py", format!("import os\n\n{HANDLER}"));

    // The normalized window is 14 + 14 + 8 = 36 characters
    let config = IndexerConfig {
        block_size: 3,
        min_block_total_length: 30,
        ..IndexerConfig::default()
    };
    let (index, _) = finder(config).find_duplicates(dir.path()).unwrap();

    let groups = index.block_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].content(), "def handler():\nx = compute(1)\nreturn x");
    assert_eq!(locations(groups[0].occurrences()), vec!["a.py:1", "b.py:3"]);
}

#[test]
fn test_block_below_total_length_not_reported() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.py", HANDLER);
    write(dir.path(), "b.py", HANDLER);

    let (index, _) = finder(IndexerConfig::default())
        .find_duplicates(dir.path())
        .unwrap();

    assert!(index.blocks().is_empty());
}

#[test]
fn test_binary_content_excluded_before_reading() {
    let dir = tempdir().unwrap();
    let line = "let shared_configuration_value = 42;\n";
    write(dir.path(), "a.rs", line);
    write(dir.path(), "b.rs", line);
    let mut binary = line.as_bytes().to_vec();
    binary.push(0);
    binary.extend_from_slice(line.as_bytes());
    write(dir.path(), "c.rs", &binary);

    let (index, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.candidate_files, 2);
    assert_eq!(index.totals().total_files, 2);
    assert_eq!(index.totals().total_lines, 2);
    assert_eq!(index.line_occurrence_count(), 2);
}

#[test]
fn test_oversized_file_never_a_candidate() {
    let dir = tempdir().unwrap();
    let line = "let shared_configuration_value = 42;\n";
    write(dir.path(), "small.rs", line);
    write(dir.path(), "big.rs", line.repeat(10));

    let walker = WalkerConfig::new(Vec::new(), Vec::new(), line.len() as u64);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));

    let candidates = finder.discover(dir.path()).unwrap();
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].ends_with("small.rs"));

    let (index, _) = finder.find_duplicates(dir.path()).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.totals().total_lines, 1);
}

#[test]
fn test_closing_brace_never_a_key() {
    let dir = tempdir().unwrap();
    let braces = "}\n".repeat(300);
    write(dir.path(), "a.js", &braces);
    write(dir.path(), "b.js", &braces);

    let config = IndexerConfig {
        min_line_length: 0,
        block_size: 1,
        ..IndexerConfig::default()
    };
    let (index, _) = finder(config).find_duplicates(dir.path()).unwrap();

    assert!(index.lines().is_empty());
    assert_eq!(index.totals().total_lines, 600);
}

#[test]
fn test_totals_count_every_raw_line() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.txt", "a\n\n   \nb");
    write(dir.path(), "two.txt", "x\r\ny\rz\n");
    write(dir.path(), "empty.txt", "");

    let (index, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(index.totals().total_files, 3);
    assert_eq!(index.totals().total_lines, 7);
}

#[test]
fn test_nested_paths_use_forward_slashes() {
    let dir = tempdir().unwrap();
    let line = "const DEFAULT_TIMEOUT_MILLISECONDS = 3000;\n";
    write(dir.path(), "src/app/config.ts", line);
    write(dir.path(), "src/lib/config.ts", line);

    let (index, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let groups = index.line_groups();
    assert_eq!(
        locations(groups[0].occurrences()),
        vec!["src/app/config.ts:1", "src/lib/config.ts:1"]
    );
}

#[test]
fn test_default_and_extra_exclusions() {
    let dir = tempdir().unwrap();
    let line = "const DEFAULT_TIMEOUT_MILLISECONDS = 3000;\n";
    write(dir.path(), "src/main.ts", line);
    write(dir.path(), "node_modules/pkg/index.ts", line);
    write(dir.path(), "generated/api.ts", line);
    write(dir.path(), "package-lock.json", line);
    write(dir.path(), "schema.sql", line);
    write(dir.path(), "logo.svg", line);

    let walker = WalkerConfig::new(
        vec!["generated".to_string()],
        vec!["schema.sql".to_string()],
        WalkerConfig::default().max_file_size,
    );
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (index, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.candidate_files, 1);
    assert!(index.is_empty());
}

#[test]
fn test_occurrences_follow_discovery_order() {
    let dir = tempdir().unwrap();
    let line = "return Err(anyhow::anyhow!(\"not found\"));\n";
    write(dir.path(), "b/z.rs", line);
    write(dir.path(), "a.rs", format!("{line}{line}"));
    write(dir.path(), "b/a.rs", line);

    let (index, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let groups = index.line_groups();
    assert_eq!(
        locations(groups[0].occurrences()),
        vec!["a.rs:1", "a.rs:2", "b/a.rs:1", "b/z.rs:1"]
    );
}

#[test]
fn test_thread_count_does_not_change_results() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let body = format!(
            "fn shared_helper_function() -> usize {{\n    compute_the_shared_value({})\n}}\nlet unique_value_{i} = {i};\n",
            i % 3
        );
        write(dir.path(), &format!("src/m{i:02}.rs"), body);
    }

    let (default_index, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let single = DuplicateFinder::new(FinderConfig::default().with_threads(1));
    let (single_index, _) = single.find_duplicates(dir.path()).unwrap();

    assert_eq!(default_index.lines(), single_index.lines());
    assert_eq!(default_index.blocks(), single_index.blocks());
    assert_eq!(
        default_index.totals().total_lines,
        single_index.totals().total_lines
    );
}

#[test]
fn test_missing_root_is_error() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults().find_duplicates(&dir.path().join("missing"));
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_file_root_is_error() {
    let dir = tempdir().unwrap();
    write(dir.path(), "file.txt", "text");
    let result = DuplicateFinder::with_defaults().find_duplicates(&dir.path().join("file.txt"));
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_shutdown_flag_interrupts_scan() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", "some text content here for the scanner");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));
    let result = finder.find_duplicates(dir.path());

    assert!(matches!(result, Err(FinderError::Interrupted)));
}
