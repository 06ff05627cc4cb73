//! CLI argument handling (no network involved)

use assert_cmd::Command;

fn scb_client() -> Command {
    Command::cargo_bin("scb-client").unwrap()
}

#[test]
fn test_help_lists_commands() {
    let output = scb_client().arg("--help").assert().success().get_output().clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("variables"));
    assert!(stdout.contains("query"));
    assert!(stdout.contains("--base-url"));
}

#[test]
fn test_query_help_lists_options() {
    let output = scb_client()
        .args(["query", "--help"])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    for flag in [
        "--select",
        "--time-top",
        "--response-format",
        "--size-limit",
        "--partition-by",
        "--max-retries",
        "--estimate-only",
        "--output",
        "--timeout-secs",
        "--no-validate",
    ] {
        assert!(stdout.contains(flag), "missing {flag}");
    }
}

#[test]
fn test_short_table_path_rejected() {
    scb_client()
        .args(["query", "BE/BE0101"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_malformed_select_rejected() {
    scb_client()
        .args(["query", "BE/BE0101/BE0101A/BefolkningNy", "--select", "Region"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unknown_response_format_rejected() {
    scb_client()
        .args([
            "query",
            "BE/BE0101/BE0101A/BefolkningNy",
            "--response-format",
            "xml",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_negative_size_limit_rejected() {
    scb_client()
        .args([
            "query",
            "BE/BE0101/BE0101A/BefolkningNy",
            "--size-limit=-5",
        ])
        .assert()
        .failure()
        .code(2);
}
