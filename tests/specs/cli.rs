//! Black-box CLI specs: invoke the stratus binary and verify stdout,
//! stderr and exit codes.

use assert_cmd::Command;
use std::path::PathBuf;

fn write_template(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("template.sts");
    std::fs::write(&path, content).expect("template written");
    path
}

fn stratus() -> Command {
    Command::cargo_bin("stratus").expect("binary builds")
}

#[test]
fn compile_prints_the_resolved_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(
        &dir,
        "sub = create subnet cidr={net.cidr} vpc=@default\n\
         update subnet id=$sub public=true\n",
    );

    let assert = stratus()
        .arg("compile")
        .arg(&tpl)
        .arg("net.cidr=10.0.2.0/24")
        .arg("--no-prompt")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert!(
        stdout.contains("sub = create subnet cidr=10.0.2.0/24 vpc=vpc-default"),
        "got: {}",
        stdout
    );
    assert!(stdout.contains("update subnet id=$sub public=true"), "got: {}", stdout);
}

#[test]
fn compile_json_reports_fillers_and_variables() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(&dir, "name = web-{env}\ncreate subnet cidr=10.0.0.0/24 vpc=v name=$name\n");

    let assert = stratus()
        .arg("compile")
        .arg(&tpl)
        .arg("env=prod")
        .arg("--no-prompt")
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let json_line = stdout
        .lines()
        .find(|l| l.starts_with('{'))
        .expect("json line present");
    let parsed: serde_json::Value = serde_json::from_str(json_line).expect("valid json");
    assert_eq!(parsed["resolved_variables"]["name"], "web-prod");
}

#[test]
fn compile_without_fillers_fails_on_unresolved_holes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(&dir, "create subnet cidr={net.cidr} vpc=v\n");

    let assert = stratus()
        .arg("compile")
        .arg(&tpl)
        .arg("--no-prompt")
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("unresolved holes"), "got: {}", stderr);
}

#[test]
fn run_executes_against_the_local_provider() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(
        &dir,
        "sub = create subnet cidr=10.0.2.0/24 vpc=@default name=web-subnet\n\
         update subnet id=$sub public=true\n",
    );

    let assert = stratus()
        .arg("run")
        .arg(&tpl)
        .arg("--no-prompt")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert!(stdout.contains("[OK] sub = create subnet"), "got: {}", stdout);
    assert!(stdout.contains("-> subnet-0001"), "got: {}", stdout);
    assert!(stdout.contains("[OK] update subnet id=subnet-0001"), "got: {}", stdout);
}

#[test]
fn run_halts_with_a_nonzero_exit_on_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(
        &dir,
        "create subnet cidr=10.0.2.0/24 vpc=@default\n\
         update subnet id=subnet-9999 public=true\n\
         create loadbalancer name=lb subnets=[sub-1]\n",
    );

    let assert = stratus()
        .arg("run")
        .arg(&tpl)
        .arg("--no-prompt")
        .assert()
        .failure();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert!(stdout.contains("[KO] update subnet"), "got: {}", stdout);
    // halted before the third statement
    assert!(!stdout.contains("loadbalancer"), "got: {}", stdout);
}

#[test]
fn dry_run_previews_without_mutating() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(&dir, "create subnet cidr=10.0.2.0/24 vpc=@default\n");

    let assert = stratus()
        .arg("run")
        .arg(&tpl)
        .arg("--dry-run")
        .arg("--no-prompt")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert!(stdout.contains("subnet creation ok"), "got: {}", stdout);
}

#[test]
fn defaults_file_feeds_fillers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(&dir, "create subnet cidr={net.cidr} vpc=v\n");
    let defaults = dir.path().join("defaults.toml");
    std::fs::write(&defaults, "[net]\ncidr = \"10.9.0.0/16\"\n").expect("defaults written");

    let assert = stratus()
        .arg("compile")
        .arg(&tpl)
        .arg("--defaults")
        .arg(&defaults)
        .arg("--no-prompt")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert!(stdout.contains("cidr=10.9.0.0/16"), "got: {}", stdout);
}

#[test]
fn parse_errors_name_the_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tpl = write_template(&dir, "create subnet cidr=10.0.0.0/24\ncreate\n");

    let assert = stratus()
        .arg("compile")
        .arg(&tpl)
        .arg("--no-prompt")
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("line 2"), "got: {}", stderr);
}
