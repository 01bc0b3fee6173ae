use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const REGISTRY: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/app";

fn stevedore() -> assert_cmd::Command {
    cargo_bin_cmd!("stevedore")
}

/// A command running in an empty directory with prompts disabled.
fn offline(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = stevedore();
    cmd.current_dir(dir.path()).args(["--interactive", "false"]);
    cmd
}

// ── Help ──

#[test]
fn shows_help() {
    stevedore()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Deploy docker images to AWS ECR and Elastic Beanstalk",
        ))
        .stdout(predicate::str::contains("--registry-uri"))
        .stdout(predicate::str::contains("ecr-uri"));
}

#[test]
fn version_flag_requires_a_value() {
    stevedore().arg("--version").assert().failure();
}

// ── Validation before any external command ──

#[test]
fn missing_version_fails_without_running_tools() {
    let tmp = TempDir::new().unwrap();

    offline(&tmp)
        .args(["--name", "app", "--registry-uri", REGISTRY, "--eb", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Deploy failed"))
        .stderr(predicate::str::contains("version"))
        .stdout(predicate::str::contains("Checking environment").not());
}

#[test]
fn invalid_registry_uri_fails() {
    let tmp = TempDir::new().unwrap();

    offline(&tmp)
        .args(["-n", "app", "-v", "1.0.0", "-u", "not-a-registry", "--eb", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid registry URI 'not-a-registry'"));
}

#[test]
fn platform_deploy_requires_platform_names() {
    let tmp = TempDir::new().unwrap();

    offline(&tmp)
        .args(["-n", "app", "-v", "1.0.0", "-u", REGISTRY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("platform_app"));
}

#[test]
fn silent_still_reports_failures() {
    let tmp = TempDir::new().unwrap();

    offline(&tmp)
        .args(["--silent", "-u", REGISTRY, "--eb", "false"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Deploy failed"));
}

// ── Configuration sources ──

#[test]
fn malformed_config_file_fails() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("stevedore.toml"), "[deploy\nname = ").unwrap();

    offline(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("stevedore.toml"));
}

#[test]
fn config_file_values_are_used() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("stevedore.toml"),
        "[deploy]\nname = \"web\"\nversion = \"2.0.0\"\nregistry_uri = \"bogus\"\neb = false\n",
    )
    .unwrap();

    offline(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid registry URI 'bogus'"));
}

#[test]
fn flags_override_config_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("stevedore.toml"),
        "[deploy]\nversion = \"2.0.0\"\nregistry_uri = \"from-config\"\neb = false\n",
    )
    .unwrap();

    offline(&tmp)
        .args(["--ecr-uri", "from-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'from-flag'"))
        .stderr(predicate::str::contains("from-config").not());
}

#[test]
fn malformed_platform_config_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let eb_dir = tmp.path().join(".elasticbeanstalk");
    std::fs::create_dir_all(&eb_dir).unwrap();
    std::fs::write(eb_dir.join("config.yml"), "global: [unterminated").unwrap();

    offline(&tmp)
        .args(["-u", REGISTRY, "--eb", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required option `version`"));
}
