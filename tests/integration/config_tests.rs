use clap::Parser;
use dupelines::cli::Cli;
use dupelines::config::{ConfigError, ScanConfig, Settings};
use dupelines::output::ReportFormat;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn load(args: &[&str]) -> Result<ScanConfig, ConfigError> {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())?;
    ScanConfig::from_settings(settings)
}

#[test]
fn test_cli_only() {
    let config = load(&[
        "dupelines",
        "--root",
        "/src",
        "--block-size",
        "1",
        "--exclude-dir",
        "fixtures",
    ])
    .unwrap();

    assert_eq!(config.root(), Path::new("/src"));
    assert_eq!(config.indexer().block_size, 1);
    assert!(!config.indexer().blocks_enabled());
    assert!(config.exclude_dirs().contains("fixtures"));
    assert!(config.exclude_dirs().contains("node_modules"));
}

#[test]
fn test_config_file_with_cli_override() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.toml");
    fs::write(
        &path,
        r#"
root = "/from/file"
min_line_length = 40
max_file_size_bytes = 1000
exclude_files = ["schema.sql"]
exclude_dirs = ["generated"]
top = 3
"#,
    )
    .unwrap();
    let path_arg = path.to_string_lossy().into_owned();

    let config = load(&[
        "dupelines",
        "--config",
        &path_arg,
        "--root",
        "/from/cli",
        "--exclude-dir",
        "tmp",
        "--format",
        "json",
    ])
    .unwrap();

    assert_eq!(config.root(), Path::new("/from/cli"));
    assert_eq!(config.indexer().min_line_length, 40);
    assert_eq!(config.max_file_size(), 1000);
    assert_eq!(config.format(), ReportFormat::Json);
    assert_eq!(config.preview().top, 3);
    assert!(config.exclude_files().contains("schema.sql"));
    assert!(config.exclude_files().contains("Cargo.lock"));
    assert!(config.exclude_dirs().contains("generated"));
    assert!(config.exclude_dirs().contains("tmp"));
    assert!(config.exclude_dirs().contains(".git"));
}

#[test]
fn test_missing_config_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml").to_string_lossy().into_owned();

    let result = load(&["dupelines", "--config", &missing]);
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_zero_block_size_rejected() {
    let result = load(&["dupelines", "--block-size", "0"]);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_size_suffix_accepted() {
    let config = load(&["dupelines", "--max-file-size-bytes", "512KiB"]).unwrap();
    assert_eq!(config.max_file_size(), 524_288);
}
