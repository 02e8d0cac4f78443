use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn satchel(dir: &std::path::Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("satchel")?;
    cmd.arg("--dir").arg(dir);
    Ok(cmd)
}

#[test]
fn test_dir_command() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .arg("dir")
        .assert()
        .success()
        .stdout(predicate::str::contains(temp_dir.path().to_string_lossy().into_owned()));

    Ok(())
}

#[test]
fn test_info_reports_settings() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .args(["--app-id", "notes", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("application: notes"))
        .stdout(predicate::str::contains("format: json"))
        .stdout(predicate::str::contains("storage limit: -1"));

    Ok(())
}

#[test]
fn test_save_then_load() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .args(["save", "prefs", r#"{"theme":"dark","size":12}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 'prefs'"));

    assert!(temp_dir.path().join("prefs").is_file());

    satchel(temp_dir.path())?
        .args(["load", "prefs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"theme\": \"dark\""))
        .stdout(predicate::str::contains("\"size\": 12"));

    Ok(())
}

#[test]
fn test_values_with_type_keys_load_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .args(["save", "attachment", r##"{"$type":"text/plain","body":{"$ref":"#/a"}}"##])
        .assert()
        .success();

    satchel(temp_dir.path())?
        .args(["load", "attachment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"$type\": \"text/plain\""))
        .stdout(predicate::str::contains("\"$ref\": \"#/a\""));

    Ok(())
}

#[test]
fn test_names_outside_the_directory_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let storage_dir = temp_dir.path().join("storage");

    satchel(&storage_dir)?
        .args(["save", "../escaped", "1"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("escaped").exists());
    Ok(())
}

#[test]
fn test_load_missing_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .args(["load", "never-saved"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No stored value"));

    Ok(())
}

#[test]
fn test_raw_entries() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?.args(["put", "log"]).write_stdin("one").assert().success();
    satchel(temp_dir.path())?
        .args(["put", "log", "--append"])
        .write_stdin(" two")
        .assert()
        .success();

    satchel(temp_dir.path())?
        .args(["cat", "log"])
        .assert()
        .success()
        .stdout("one two");

    satchel(temp_dir.path())?.args(["rm", "log"]).assert().success();
    satchel(temp_dir.path())?
        .args(["rm", "log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No entry named 'log'"));

    Ok(())
}

#[test]
fn test_invalid_json_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .args(["save", "prefs", "{ nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON value"));

    assert!(!temp_dir.path().join("prefs").exists());
    Ok(())
}

#[test]
fn test_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("satchel.json");
    std::fs::write(&config_path, r#"{ "storage_limit": 500, "backend": "filesystem" }"#)?;

    satchel(temp_dir.path())?
        .arg("--config")
        .arg(&config_path)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("storage limit: 500"))
        .stdout(predicate::str::contains("backend: filesystem"));

    std::fs::write(&config_path, r#"{ "storage_limit": -7 }"#)?;
    satchel(temp_dir.path())?
        .arg("--config")
        .arg(&config_path)
        .arg("info")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid storage limit -7"));

    Ok(())
}

#[test]
fn test_unknown_format_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    satchel(temp_dir.path())?
        .args(["--format", "xml", "dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported format"));

    Ok(())
}
