use assert_cmd::Command;
use predicates::prelude::*;
use reflect_digest::utils::{digest, digest_with, Algorithm};
use std::io::Write;
use tempfile::NamedTempFile;

const ABC_MD5: &str = "900150983cd24fb0d6963f7d28e17f72";

fn reflect_digest() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("reflect_digest").unwrap();
    // Keep the default algorithm independent of the caller's environment
    cmd.env_remove("DIGEST_ALGORITHM");
    cmd
}

fn abc_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"abc").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_parts_are_concatenated() {
    let joined = reflect_digest().arg("abc").assert().success().get_output().stdout.clone();

    reflect_digest()
        .args(["a", "b", "c"])
        .assert()
        .success()
        .stdout(joined)
        .stdout(format!("{}\n", ABC_MD5));
}

#[test]
fn test_json_output() {
    let output = reflect_digest()
        .args(["--json", "a", "b", "c"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(json["algorithm"], "md5");
    assert_eq!(json["input"], "abc");
    assert_eq!(json["digest"], digest("abc"));
}

#[test]
fn test_file_conflicts_with_parts() {
    let file = abc_file();

    reflect_digest()
        .arg("--file")
        .arg(file.path())
        .arg("extra")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_file_with_sha256() {
    let file = abc_file();

    reflect_digest()
        .args(["-a", "sha256", "--file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(format!("{}\n", digest_with(Algorithm::Sha256, b"abc")));
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();

    reflect_digest()
        .arg("--file")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_stdin() {
    reflect_digest()
        .arg("--stdin")
        .write_stdin("abc")
        .assert()
        .success()
        .stdout(format!("{}\n", ABC_MD5));
}

#[test]
fn test_algorithm_from_environment() {
    let output = reflect_digest()
        .env("DIGEST_ALGORITHM", "sha256")
        .arg("abc")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.trim_end().len(), Algorithm::Sha256.hex_len());
    assert_eq!(text.trim_end(), digest_with(Algorithm::Sha256, b"abc"));
}

#[test]
fn test_unknown_algorithm_is_rejected() {
    reflect_digest()
        .args(["--algorithm", "sha1", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported digest algorithm: sha1"));
}
