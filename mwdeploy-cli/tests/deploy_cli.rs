//! End-to-end runs of the `mwdeploy` binary against a throwaway topology
//! whose external tools are `true` or `false`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    config: PathBuf,
}

/// Staging with extensions Foo, Bar (+ a non-checkout Stray) and skin Vector.
fn fixture(git: &str, rsync: &str) -> Fixture {
    let root = TempDir::new().expect("tempdir");
    let staging = root.path().join("staging");
    let production = root.path().join("production");

    for checkout in ["extensions/Foo", "extensions/Bar", "skins/Vector"] {
        fs::create_dir_all(staging.join(checkout).join(".git")).expect("create checkout");
    }
    fs::create_dir_all(staging.join("extensions/Stray")).expect("create stray");
    fs::create_dir_all(staging.join("vendor")).expect("create vendor");
    fs::create_dir_all(&production).expect("create production");

    let config = root.path().join("topology.yaml");
    fs::write(
        &config,
        format!(
            "staging_root: {staging}\n\
             production_root: {production}\n\
             servers: [mw1, mw2]\n\
             tools:\n  git: {git}\n  composer: \"true\"\n  rsync: {rsync}\n  php: \"true\"\n  ssh: ssh\n",
            staging = staging.display(),
            production = production.display(),
        ),
    )
    .expect("write topology");

    Fixture {
        _root: root,
        config,
    }
}

fn mwdeploy(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mwdeploy"));
    cmd.env_remove("MWDEPLOY_CONFIG")
        .env_remove("MWDEPLOY_HOSTNAME")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config);
    cmd
}

// ---------------------------------------------------------------------------
// deploy
// ---------------------------------------------------------------------------

#[test]
fn single_extension_deploy_on_local_host_succeeds() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "Foo", "--servers", "mw1"])
        .args(["--local-host", "mw1.example.org"])
        .assert()
        .success()
        .stdout(contains("extension update (Foo)"))
        .stdout(contains("local sync"))
        .stdout(contains("remote sync").not());
}

#[test]
fn unknown_extension_is_rejected_before_any_step() {
    let fx = fixture("\"false\"", "\"false\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "Nope", "--servers", "mw1"])
        .args(["--local-host", "mw1"])
        .assert()
        .failure()
        .stderr(contains("invalid extension: Nope"));
}

#[test]
fn checkout_without_git_marker_is_not_deployable() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "Stray", "--servers", "mw1"])
        .args(["--local-host", "mw1"])
        .assert()
        .failure()
        .stderr(contains("invalid extension: Stray"));
}

#[test]
fn lang_requires_l10n() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--lang", "de", "--servers", "mw1", "--local-host", "mw1"])
        .assert()
        .failure()
        .stderr(contains("--lang requires --l10n flag"));
}

#[test]
fn missing_servers_is_rejected() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "Foo", "--local-host", "mw1"])
        .assert()
        .failure()
        .stderr(contains("at least one server required"));
}

#[test]
fn empty_target_lists_mean_not_given() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "", "--upgrade-skins", ""])
        .args(["--upgrade-vendor", "--servers", "mw1", "--local-host", "mw1"])
        .assert()
        .success()
        .stdout(contains("dependency update"))
        .stdout(contains("extension update").not());
}

#[test]
fn empty_lang_does_not_require_l10n() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--lang", "", "--upgrade-vendor"])
        .args(["--servers", "mw1", "--local-host", "mw1"])
        .assert()
        .success()
        .stdout(contains("localization rebuild").not());
}

#[test]
fn fail_fast_stops_after_first_failed_pull() {
    let fx = fixture("\"false\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "Foo,Bar", "--servers", "mw1"])
        .args(["--local-host", "mw1"])
        .assert()
        .failure()
        .stdout(contains("extension update (Foo)"))
        .stdout(contains("extension update (Bar)").not())
        .stderr(contains("failed to update extension Foo"));
}

#[test]
fn force_attempts_every_step_then_fails() {
    let fx = fixture("\"false\"", "\"true\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--upgrade-extensions", "Foo,Bar", "--servers", "mw1"])
        .args(["--local-host", "mw1", "--force"])
        .assert()
        .failure()
        .stdout(contains("extension update (Foo)"))
        .stdout(contains("extension update (Bar)"))
        .stdout(contains("local sync"))
        .stdout(contains("2 of 3 steps failed"))
        .stderr(contains("deployment completed with errors"));
}

#[test]
fn dry_run_prints_commands_without_running_them() {
    // Every tool fails for real; a dry run must still succeed.
    let fx = fixture("\"false\"", "\"false\"");
    mwdeploy(&fx.config)
        .args(["deploy", "--dry-run", "--upgrade-extensions", "Foo"])
        .args(["--servers", "all", "--local-host", "mw1"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("pull --recurse-submodules --quiet"))
        .stdout(contains("mediawikiuser@mw2:"));
}

#[test]
fn json_report_lists_remote_sync() {
    let fx = fixture("\"true\"", "\"true\"");
    let output = mwdeploy(&fx.config)
        .args(["deploy", "--json", "--servers", "mw2", "--local-host", "mw1"])
        .output()
        .expect("run mwdeploy");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["local_host"], "mw1");
    assert_eq!(report["local_sequence"], false);
    assert_eq!(report["outcomes"][0]["step"]["kind"], "sync_remote");
    assert_eq!(report["outcomes"][0]["step"]["target"], "mw2");
    assert_eq!(report["outcomes"][0]["succeeded"], true);
}

#[test]
fn hostname_can_come_from_environment() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .env("MWDEPLOY_HOSTNAME", "mw2.example.org")
        .args(["deploy", "--json", "--servers", "mw1,mw2"])
        .assert()
        .success()
        .stdout(contains("\"local_host\": \"mw2\""))
        .stdout(contains("\"target\": \"mw1\""));
}

// ---------------------------------------------------------------------------
// inventory & config
// ---------------------------------------------------------------------------

#[test]
fn inventory_json_lists_only_git_checkouts() {
    let fx = fixture("\"true\"", "\"true\"");
    let output = mwdeploy(&fx.config)
        .args(["inventory", "--json"])
        .output()
        .expect("run mwdeploy");
    assert!(output.status.success());

    let inventory: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(inventory["extensions"], serde_json::json!(["Bar", "Foo"]));
    assert_eq!(inventory["skins"], serde_json::json!(["Vector"]));
}

#[test]
fn inventory_table_names_targets() {
    let fx = fixture("\"true\"", "\"true\"");
    mwdeploy(&fx.config)
        .arg("inventory")
        .assert()
        .success()
        .stdout(contains("2 extensions | 1 skins"))
        .stdout(contains("Vector"))
        .stdout(contains("Stray").not());
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    mwdeploy(&dir.path().join("absent.yaml"))
        .arg("inventory")
        .assert()
        .failure()
        .stderr(contains("failed to load topology"));
}
