// CLI behavior tests for the dataroom binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dataroom(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dataroom").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DATAROOM_BACKEND_API_KEY")
        .env_remove("DATAROOM_BACKEND__API_KEY")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();

    dataroom(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("onboard"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("overview"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_reads_file_and_redacts_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("dataroom.toml"),
        r#"
[backend]
url = "https://project.example.co"
api_key = "super-secret-key"
logo_bucket = "brand-assets"
"#,
    )
    .unwrap();

    dataroom(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://project.example.co"))
        .stdout(predicate::str::contains("brand-assets"))
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("super-secret-key").not());
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.toml");
    std::fs::write(&config_path, "[backend]\nurl = \"https://from-file.example\"\n").unwrap();

    dataroom(&dir)
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .env("DATAROOM_BACKEND__URL", "https://from-env.example")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://from-env.example"));
}

#[test]
fn test_dry_run_onboarding_succeeds() {
    let dir = TempDir::new().unwrap();

    dataroom(&dir)
        .args([
            "onboard",
            "--user-id",
            "0b7d5e0c-3f4e-4c8f-8f57-2a4c1d9e0b11",
            "--organization",
            "Acme Inc",
            "--data-room",
            "Due Diligence",
            "--invite",
            "a@x.com",
            "--invite",
            "b@y.com",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invitations: 2"))
        .stdout(predicate::str::contains("Onboarding complete"))
        .stdout(predicate::str::contains("Logo: none"));
}

#[test]
fn test_dry_run_uploads_logo_from_disk() {
    let dir = TempDir::new().unwrap();
    let logo = dir.path().join("acme.png");
    std::fs::write(&logo, [0x89, b'P', b'N', b'G']).unwrap();

    dataroom(&dir)
        .args([
            "onboard",
            "--user-id",
            "0b7d5e0c-3f4e-4c8f-8f57-2a4c1d9e0b11",
            "--organization",
            "Acme Inc",
            "--data-room",
            "Due Diligence",
            "--dry-run",
            "--logo",
        ])
        .arg(&logo)
        .assert()
        .success()
        .stdout(predicate::str::contains("memory://storage/organization-logos/"));
}

#[test]
fn test_malformed_invite_is_rejected_before_onboarding() {
    let dir = TempDir::new().unwrap();

    dataroom(&dir)
        .args([
            "onboard",
            "--user-id",
            "0b7d5e0c-3f4e-4c8f-8f57-2a4c1d9e0b11",
            "--organization",
            "Acme Inc",
            "--data-room",
            "Due Diligence",
            "--invite",
            "not-an-email",
            "--dry-run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid invitee email: not-an-email"))
        .stdout(predicate::str::contains("Backend calls made").not());
}

#[test]
fn test_status_without_api_key_fails() {
    let dir = TempDir::new().unwrap();

    dataroom(&dir)
        .args(["status", "--user-id", "0b7d5e0c-3f4e-4c8f-8f57-2a4c1d9e0b11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api key is not set"));
}

#[test]
fn test_malformed_user_id_is_rejected() {
    let dir = TempDir::new().unwrap();

    dataroom(&dir)
        .args(["status", "--user-id", "not-a-uuid"])
        .assert()
        .failure();
}
