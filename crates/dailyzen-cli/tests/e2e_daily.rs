//! E2E tests for the read-only daily surface: today, quotes, share, plans,
//! tips, config and completions.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn zen_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zen"));
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("DAILYZEN_DATA_DIR", home.join("data"));
    cmd.env("DAILYZEN_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("DAILYZEN_SANDBOX_OUTCOME");
    cmd
}

fn json_of(home: &Path, args: &[&str]) -> Value {
    let output = zen_cmd(home).args(args).arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn today_is_selected_by_day_of_year() {
    let dir = TempDir::new().unwrap();

    let jan1 = json_of(dir.path(), &["today", "--date", "2024-01-01"]);
    assert_eq!(jan1["id"], "1");
    assert_eq!(jan1["author"], "Lao Tzu");
    assert_eq!(jan1["favorite"], false);
    assert_eq!(jan1["premium"], false);
    assert_eq!(jan1["date"], "2024-01-01");

    let jan2 = json_of(dir.path(), &["today", "--date", "2024-01-02"]);
    assert_eq!(jan2["id"], "2");

    // Day 30 of a 30-quote catalog wraps to the first quote.
    let jan30 = json_of(dir.path(), &["today", "--date", "2024-01-30"]);
    assert_eq!(jan30["id"], "0");
}

#[test]
fn same_day_gives_same_quote() {
    let dir = TempDir::new().unwrap();
    let a = json_of(dir.path(), &["today", "--date", "2025-07-14"]);
    let b = json_of(dir.path(), &["today", "--date", "2025-07-14"]);
    assert_eq!(a, b);
}

#[test]
fn text_output_is_tab_separated() {
    let dir = TempDir::new().unwrap();
    zen_cmd(dir.path())
        .args(["--format", "text", "today", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1\tNature does not hurry"));
}

#[test]
fn quotes_lists_the_whole_catalog() {
    let dir = TempDir::new().unwrap();
    let quotes = json_of(dir.path(), &["quotes"]);
    let quotes = quotes.as_array().unwrap();
    assert_eq!(quotes.len(), 30);
    assert_eq!(quotes[0]["id"], "0");
    assert_eq!(quotes[29]["id"], "29");
}

#[test]
fn share_composes_signed_message() {
    let dir = TempDir::new().unwrap();
    zen_cmd(dir.path())
        .args(["--format", "text", "share", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\u{201c}Nature does not hurry, yet everything is accomplished.\u{201d} \u{2014} Lao Tzu (via Daily Zen",
        ));

    let shared = json_of(dir.path(), &["share", "--date", "2024-01-01"]);
    assert_eq!(shared["outcome"], "shared");
}

#[test]
fn share_signature_comes_from_config() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/dailyzen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[share]\nsignature = \"from my terminal\"\n").unwrap();

    zen_cmd(dir.path())
        .args(["--format", "text", "share"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("(from my terminal)\n"));
}

#[test]
fn plans_and_tips_are_listed() {
    let dir = TempDir::new().unwrap();
    let plans = json_of(dir.path(), &["plans"]);
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["price"], "$0.99 / month");
    assert_eq!(plans[1]["price"], "$4.99 lifetime");
    assert_eq!(plans[1]["default"], true);

    let tips = json_of(dir.path(), &["tips"]);
    let ids: Vec<&str> = tips
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["tip.small", "tip.medium", "tip.large"]);
}

#[test]
fn broken_config_fails_with_parse_code() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/dailyzen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[reminder\nhour = 9").unwrap();

    zen_cmd(dir.path())
        .args(["today"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn missing_catalog_file_fails_with_parse_code() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/dailyzen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[quotes]\npath = {:?}\n", dir.path().join("nope.toml")),
    )
    .unwrap();

    zen_cmd(dir.path())
        .args(["--format", "text", "today"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn custom_catalog_replaces_builtin() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("mine.toml");
    fs::write(
        &catalog,
        "[[quotes]]\ntext = \"A\"\nauthor = \"X\"\n\n[[quotes]]\ntext = \"B\"\nauthor = \"Y\"\n",
    )
    .unwrap();
    let config_dir = dir.path().join("config/dailyzen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[quotes]\npath = {catalog:?}\n"),
    )
    .unwrap();

    // Jan 1 is day 1: position 1 of 2.
    let jan1 = json_of(dir.path(), &["today", "--date", "2024-01-01"]);
    assert_eq!(jan1["text"], "B");
    let jan2 = json_of(dir.path(), &["today", "--date", "2024-01-02"]);
    assert_eq!(jan2["text"], "A");
}

#[test]
fn empty_catalog_shows_placeholder() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("empty.toml");
    fs::write(&catalog, "").unwrap();
    let config_dir = dir.path().join("config/dailyzen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[quotes]\npath = {catalog:?}\n"),
    )
    .unwrap();

    for command in ["today", "share", "fav"] {
        let placeholder = json_of(dir.path(), &[command]);
        assert_eq!(placeholder["status"], "empty", "{command}");
        assert_eq!(placeholder["message"], "no quote today");
        assert_eq!(placeholder["error_code"], "E1002");
        assert!(placeholder["quote"].is_null());
    }
    assert!(json_of(dir.path(), &["quotes"]).as_array().unwrap().is_empty());

    zen_cmd(dir.path())
        .args(["--format", "pretty", "today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quote today."))
        .stdout(predicate::str::contains("Quote list is empty (E1002)"));
}

#[test]
fn config_show_reports_data_dir() {
    let dir = TempDir::new().unwrap();
    let shown = json_of(dir.path(), &["config", "show"]);
    assert_eq!(
        shown["data_dir"].as_str().unwrap(),
        dir.path().join("data").to_str().unwrap()
    );
    assert_eq!(shown["settings"]["reminder"]["hour"], 9);
    assert_eq!(shown["output"], "json");
}

#[test]
fn completions_generate_for_bash() {
    let dir = TempDir::new().unwrap();
    zen_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zen"));
}

#[test]
fn completions_write_to_file_despite_broken_config() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/dailyzen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "not toml at all [").unwrap();

    let script = dir.path().join("_zen");
    zen_cmd(dir.path())
        .args(["completions", "zsh", "--out"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(fs::read_to_string(&script).unwrap().contains("#compdef zen"));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    zen_cmd(dir.path()).args(["meditate"]).assert().failure();
}
