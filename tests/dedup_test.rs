//! CSV deduplication tests.

use drain::core::dedup::{deduplicate, DedupOptions, KeepMode};
use drain::domain::DedupError;
use std::path::{Path, PathBuf};

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn options(input: &Path) -> DedupOptions {
    DedupOptions::new(input)
}

#[test]
fn keep_first_emits_first_occurrence_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "users.csv",
        "sub,email\n1,a@x.com\n2,b@x.com\n1,a2@x.com\n",
    );

    let report = deduplicate(&options(&input)).unwrap();

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.unique_keys, 2);
    assert_eq!(report.duplicate_keys, 1);
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.duplicate_rows(), 1);

    let output = report.output.unwrap();
    let contents = std::fs::read_to_string(output).unwrap();
    assert_eq!(contents, "sub,email\n1,a@x.com\n2,b@x.com\n");
}

#[test]
fn keep_last_retains_last_values_in_first_seen_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "users.csv",
        "sub,email\n1,a@x.com\n2,b@x.com\n1,a2@x.com\n",
    );

    let mut opts = options(&input);
    opts.keep = KeepMode::Last;
    let report = deduplicate(&opts).unwrap();

    assert_eq!(report.rows_written, 2);
    let contents = std::fs::read_to_string(report.output.unwrap()).unwrap();
    // Key 1 keeps its last value but stays in first-seen position.
    assert_eq!(contents, "sub,email\n1,a2@x.com\n2,b@x.com\n");
}

#[test]
fn dry_run_reports_counts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "users.csv",
        "sub,email\n1,a@x.com\n1,a2@x.com\n1,a3@x.com\n2,b@x.com\n",
    );
    let before = std::fs::read_to_string(&input).unwrap();

    let mut opts = options(&input);
    opts.dry_run = true;
    let report = deduplicate(&opts).unwrap();

    assert_eq!(report.total_rows, 4);
    assert_eq!(report.unique_keys, 2);
    assert_eq!(report.duplicate_keys, 1);
    assert_eq!(report.duplicate_rows(), 2);
    assert_eq!(report.rows_written, 0);
    assert!(report.output.is_none());

    // The input is untouched and no output file appears.
    assert_eq!(std::fs::read_to_string(&input).unwrap(), before);
    assert!(!dir.path().join("users_deduplicated.csv").exists());
}

#[test]
fn default_output_path_gets_a_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "users.csv", "sub\n1\n1\n");

    let report = deduplicate(&options(&input)).unwrap();

    assert_eq!(
        report.output.unwrap(),
        dir.path().join("users_deduplicated.csv")
    );
}

#[test]
fn explicit_output_path_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "users.csv", "sub\n1\n1\n");
    let output = dir.path().join("clean.csv");

    let mut opts = options(&input);
    opts.output = Some(output.clone());
    let report = deduplicate(&opts).unwrap();

    assert_eq!(report.output.unwrap(), output);
    assert!(output.exists());
}

#[test]
fn output_equal_to_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "users.csv", "sub\n1\n");

    let mut opts = options(&input);
    opts.output = Some(input.clone());
    let err = deduplicate(&opts).unwrap_err();

    assert!(matches!(err, DedupError::OutputCollidesWithInput(_)));
    // The input survives intact.
    assert_eq!(std::fs::read_to_string(&input).unwrap(), "sub\n1\n");
}

#[test]
fn multi_column_keys_distinguish_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "users.csv",
        "sub,tenant,email\n1,t1,a@x.com\n1,t2,b@x.com\n1,t1,c@x.com\n",
    );

    let mut opts = options(&input);
    opts.key_columns = vec!["sub".to_string(), "tenant".to_string()];
    let report = deduplicate(&opts).unwrap();

    // (1,t1) and (1,t2) are distinct keys.
    assert_eq!(report.unique_keys, 2);
    let contents = std::fs::read_to_string(report.output.unwrap()).unwrap();
    assert_eq!(contents, "sub,tenant,email\n1,t1,a@x.com\n1,t2,b@x.com\n");
}

#[test]
fn missing_key_column_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "users.csv", "email,name\na@x.com,Alice\n");

    let err = deduplicate(&options(&input)).unwrap_err();

    match err {
        DedupError::MissingKeyColumns { missing, available } => {
            assert_eq!(missing, vec!["sub".to_string()]);
            assert_eq!(available, vec!["email".to_string(), "name".to_string()]);
        }
        other => panic!("expected MissingKeyColumns, got {other:?}"),
    }
    // Fail-fast: no output is produced.
    assert!(!dir.path().join("users_deduplicated.csv").exists());
}

#[test]
fn malformed_row_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "users.csv",
        "sub,email\n1,a@x.com\n2,b@x.com,extra-field\n",
    );

    let err = deduplicate(&options(&input)).unwrap_err();
    assert!(matches!(err, DedupError::MalformedRow { row: 2, .. }));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = deduplicate(&options(&dir.path().join("absent.csv"))).unwrap_err();
    assert!(matches!(err, DedupError::InputNotFound(_)));
}

#[test]
fn empty_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "users.csv", "");

    let err = deduplicate(&options(&input)).unwrap_err();
    assert!(matches!(err, DedupError::EmptyInput));
}

#[test]
fn quoted_fields_with_delimiters_survive() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "users.csv",
        "sub,address\n1,\"1 Main St, Springfield\"\n1,\"2 Oak Ave, Shelbyville\"\n",
    );

    let report = deduplicate(&options(&input)).unwrap();

    assert_eq!(report.rows_written, 1);
    let contents = std::fs::read_to_string(report.output.unwrap()).unwrap();
    assert_eq!(contents, "sub,address\n1,\"1 Main St, Springfield\"\n");
}
