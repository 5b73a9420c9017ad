use clap::CommandFactory;

use super::*;

fn default_of(id: &str) -> Option<String> {
    let command = Cli::command();
    let arg = command.get_arguments().find(|a| a.get_id().as_str() == id)?;
    arg.get_default_values()
        .first()
        .map(|v| v.to_string_lossy().into_owned())
}

#[test]
fn parses_required_flags() {
    let cli = Cli::try_parse_from([
        "salesort",
        "--collection",
        "best-sellers",
        "--file",
        "sales.jsonl",
    ])
    .expect("expected valid cli args");

    assert_eq!(cli.collection, "best-sellers");
    assert_eq!(cli.file, PathBuf::from("sales.jsonl"));
    assert!(cli.format.is_none());
    assert!(!cli.dry_run);
    assert!(!cli.set_manual);
}

#[test]
fn declared_defaults_for_pacing_and_log_dir() {
    assert_eq!(default_of("delay_ms").as_deref(), Some("500"));
    assert_eq!(default_of("log_dir").as_deref(), Some("logs"));
}

#[test]
fn pacing_and_log_dir_fall_back_to_env() {
    let command = Cli::command();
    let env_of = |id: &str| {
        command
            .get_arguments()
            .find(|a| a.get_id().as_str() == id)
            .and_then(|a| a.get_env())
            .map(|v| v.to_string_lossy().into_owned())
    };
    assert_eq!(env_of("delay_ms").as_deref(), Some("SALESORT_DELAY_MS"));
    assert_eq!(env_of("log_dir").as_deref(), Some("SALESORT_LOG_DIR"));
    assert_eq!(env_of("collection").as_deref(), Some("SALESORT_COLLECTION"));
}

#[test]
fn parses_all_flags() {
    let cli = Cli::try_parse_from([
        "salesort",
        "--collection",
        "summer",
        "--file",
        "export.txt",
        "--format",
        "csv",
        "--delay-ms",
        "0",
        "--log-dir",
        "/tmp/runs",
        "--dry-run",
        "--set-manual",
    ])
    .expect("expected valid cli args");

    assert_eq!(cli.format, Some(FormatArg::Csv));
    assert_eq!(cli.delay_ms, 0);
    assert_eq!(cli.log_dir, PathBuf::from("/tmp/runs"));
    assert!(cli.dry_run);
    assert!(cli.set_manual);
}

#[test]
fn missing_file_flag_is_rejected() {
    let result = Cli::try_parse_from(["salesort", "--collection", "summer"]);
    assert!(result.is_err());
}

#[test]
fn unknown_format_value_is_rejected() {
    let result = Cli::try_parse_from([
        "salesort",
        "--collection",
        "summer",
        "--file",
        "a.csv",
        "--format",
        "xml",
    ]);
    assert!(result.is_err());
}

#[test]
fn format_is_inferred_from_extension() {
    let cli = Cli::try_parse_from(["salesort", "--collection", "c", "--file", "sales.CSV"]).unwrap();
    let options = cli.run_options().unwrap();
    assert_eq!(options.format, InputFormat::Csv);
    assert_eq!(options.delay, Duration::from_millis(cli.delay_ms));
}

#[test]
fn explicit_format_overrides_extension() {
    let cli = Cli::try_parse_from([
        "salesort",
        "--collection",
        "c",
        "--file",
        "sales.txt",
        "--format",
        "jsonl",
    ])
    .unwrap();
    assert_eq!(cli.run_options().unwrap().format, InputFormat::JsonLines);
}

#[test]
fn unrecognised_extension_without_format_fails() {
    let cli = Cli::try_parse_from(["salesort", "--collection", "c", "--file", "sales.txt"]).unwrap();
    let err = cli.run_options().unwrap_err();
    assert!(err.to_string().contains("--format"));
}
