//! Tests of the `jsonteng` binary.

use assert_cmd::Command;
use jsonteng::test_utils::TemplateDir;
use predicates::prelude::*;
use serde_json::{Value, json};

/// A `jsonteng` command isolated from the user's configuration and environment.
fn jsonteng(dir: &TemplateDir, config: &str) -> Command {
    let config_path = dir.write("config.toml", config).unwrap();
    let mut cmd = Command::cargo_bin("jsonteng").unwrap();
    cmd.current_dir(dir.path())
        .env("JSONTENG_CONFIG", config_path)
        .env("NO_COLOR", "1")
        .env_remove("TEMPLATE_HOME")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_resolves_template_file_with_binding_files() {
    let dir = TemplateDir::new().unwrap();
    dir.write("templates/vm.json", r##"{"name": "${name}", "disks": ["#for-each", "${disks}", "disk.json"]}"##)
        .unwrap();
    dir.write("templates/disk.json", r#"{"id": "${_index_}", "gb": "${gb}"}"#).unwrap();
    dir.write("site.json", r#"{"name": "web01", "disks": [{"gb": 10}, {"gb": 50}]}"#).unwrap();

    let output = jsonteng(&dir, "template_home = \"templates\"\n")
        .args(["-b", "site.json;{\"name\": \"shadowed\"}", "vm.json"])
        .assert()
        .success();

    assert_eq!(
        stdout_json(output.get_output()),
        json!({"name": "web01", "disks": [{"id": 0, "gb": 10}, {"id": 1, "gb": 50}]})
    );
}

#[test]
fn test_pretty_and_raw_output() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "")
        .args(["-b", r#"{"a": 1}"#, r#"{"a": "${a}"}"#])
        .assert()
        .success()
        .stdout("{\n  \"a\": 1\n}\n");

    jsonteng(&dir, "")
        .args(["--raw", "-b", r#"{"a": 1}"#, r#"{"a": "${a}"}"#])
        .assert()
        .success()
        .stdout("{\"a\":1}\n");
}

#[test]
fn test_environment_binding_from_config_and_flag() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "raw = true\n[env]\nregion = \"eu\"\nzone = \"a\"\n")
        .args(["-e", r#"{"zone": "b"}"#, r#"["${region}", "${zone}"]"#])
        .assert()
        .success()
        .stdout("[\"eu\",\"b\"]\n");
}

#[test]
fn test_stats_flag() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "")
        .args(["-r", "-s", "-b", r#"{"a": 1, "b": 2}"#, r#"["${a}", "${a}", "${b}"]"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parameter usage"))
        .stdout(predicate::str::contains("\"a\": 2"));
}

#[test]
fn test_list_tags() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "")
        .arg("--list-tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("for-each"))
        .stdout(predicate::str::contains("one-of"))
        .stdout(predicate::str::contains("ipv4-host-ip"));
}

#[test]
fn test_unresolvable_parameter_fails_with_suggestion() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "")
        .args(["-b", r#"{"hostname": "web"}"#, r#"{"host": "${hostnme}"}"#])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unable to resolve parameter \"hostnme\""))
        .stderr(predicate::str::contains("Did you mean: hostname?"));
}

#[test]
fn test_unknown_tag_fails() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "")
        .arg(r##"["#one-off", "x"]"##)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tag \"one-off\""))
        .stderr(predicate::str::contains("Did you mean: one-of"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "unknown_key = 1\n")
        .arg("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration file"))
        .stderr(predicate::str::contains("unknown_key"));
}

#[test]
fn test_missing_template_argument() {
    let dir = TemplateDir::new().unwrap();

    jsonteng(&dir, "").assert().failure().stderr(predicate::str::contains("Usage"));
}
