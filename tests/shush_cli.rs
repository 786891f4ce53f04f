use std::error::Error;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

fn shush(temp: &assert_fs::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("shush");
    cmd.current_dir(temp).env("HOME", temp.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn strips_python_file_and_keeps_preserved_comment() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let file = temp.child("a.py");
    file.write_str("x = 1  # keep\n# TODO: fix\ny = 2\n")?;

    shush(&temp).arg("a.py").assert().success();

    file.assert("x = 1\n# TODO: fix\ny = 2\n");
    Ok(())
}

#[test]
fn comment_only_lines_are_deleted_unless_preserving_lines() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let dropped = temp.child("drop.js");
    dropped.write_str("a();\n    // note\nb(); /* x */\n")?;
    let kept = temp.child("keep.js");
    kept.write_str("a();\n    // note\nb();\n")?;

    shush(&temp).arg("drop.js").assert().success();
    shush(&temp)
        .arg("keep.js")
        .arg("--preserve-lines")
        .assert()
        .success();

    dropped.assert("a();\nb();\n");
    kept.assert("a();\n    \nb();\n");
    Ok(())
}

#[test]
fn dry_run_previews_without_writing() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let file = temp.child("main.go");
    let src = "package main\n// gone\nfunc main() {} // trailing\n";
    file.write_str(src)?;

    shush(&temp)
        .arg("main.go")
        .arg("--dry-run")
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Preview: main.go"))
        .stdout(predicate::str::contains("2 lines would be changed"))
        .stdout(predicate::str::contains("+ func main() {}"));

    file.assert(src);
    Ok(())
}

#[test]
fn backup_keeps_original_contents() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let file = temp.child("run.sh");
    file.write_str("echo hi # greet\n")?;

    shush(&temp).arg("run.sh").arg("--backup").assert().success();

    file.assert("echo hi\n");
    temp.child("run.sh.bak").assert("echo hi # greet\n");
    Ok(())
}

#[test]
fn inline_flag_leaves_block_comments() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let file = temp.child("lib.c");
    file.write_str("int x; /* block */ // line\n")?;

    shush(&temp).arg("lib.c").arg("--inline").assert().success();

    file.assert("int x; /* block */\n");
    Ok(())
}

#[test]
fn directory_mode_is_flat_unless_recursive() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let top = temp.child("src/top.rs");
    top.write_str("fn a() {} // x\n")?;
    let nested = temp.child("src/inner/deep.rs");
    nested.write_str("fn b() {} // y\n")?;
    temp.child("src/notes.txt").write_str("keep # this\n")?;

    shush(&temp).arg("src").assert().success();
    top.assert("fn a() {}\n");
    nested.assert("fn b() {} // y\n");

    shush(&temp).arg("src").arg("-r").assert().success();
    nested.assert("fn b() {}\n");
    temp.child("src/notes.txt").assert("keep # this\n");
    Ok(())
}

#[test]
fn shushignore_and_exclude_skip_files() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child(".shushignore").write_str("vendor/\n")?;
    let vendored = temp.child("vendor/lib.py");
    vendored.write_str("x = 1  # vendored\n")?;
    let generated = temp.child("gen/out.py");
    generated.write_str("y = 2  # generated\n")?;
    let own = temp.child("app.py");
    own.write_str("z = 3  # mine\n")?;

    shush(&temp)
        .arg(".")
        .arg("-r")
        .arg("--exclude")
        .arg("gen/**")
        .assert()
        .success();

    own.assert("z = 3\n");
    vendored.assert("x = 1  # vendored\n");
    generated.assert("y = 2  # generated\n");
    Ok(())
}

#[test]
fn directory_without_supported_files_fails() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("docs/readme.txt").write_str("text\n")?;

    shush(&temp)
        .arg("docs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no supported files found"));
    Ok(())
}

#[test]
fn unsupported_single_file_is_fatal() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("notes.txt").write_str("hello # there\n")?;

    shush(&temp)
        .arg("notes.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file extension: txt"));
    Ok(())
}

#[test]
fn project_config_overrides_preserve_patterns() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child(".shush.toml")
        .write_str("preserve = [\"*KEEP*\"]\n")?;
    let file = temp.child("a.ts");
    file.write_str("a(); // KEEP me\nb(); // TODO: drop\n")?;

    shush(&temp).arg("a.ts").assert().success();

    file.assert("a(); // KEEP me\nb();\n");
    Ok(())
}

#[test]
fn config_command_lists_defaults() -> TestResult {
    let temp = assert_fs::TempDir::new()?;

    shush(&temp)
        .arg("--config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using defaults"))
        .stdout(predicate::str::contains("TODO:"));
    Ok(())
}

#[test]
fn create_config_refuses_to_overwrite() -> TestResult {
    let temp = assert_fs::TempDir::new()?;

    shush(&temp).arg("--create-config").assert().success();
    temp.child(".shush.toml")
        .assert(predicate::str::contains("*IMPORTANT*"));

    shush(&temp)
        .arg("--create-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    Ok(())
}

#[test]
fn conflicting_flags_are_rejected() -> TestResult {
    let temp = assert_fs::TempDir::new()?;

    shush(&temp)
        .arg("--staged")
        .arg("--unstaged")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
    Ok(())
}

#[test]
fn project_hook_install_and_uninstall() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let home = temp.child("home");
    home.create_dir_all()?;
    let settings = temp.child(".claude/settings.json");
    settings.write_str("{\"model\": \"x\"}")?;

    shush(&temp)
        .env("HOME", home.path())
        .args(["--install-hook", "-s", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hooks installed for project scope"));
    settings.assert(predicate::str::contains("shush --changes-only"));
    settings.assert(predicate::str::contains("\"model\": \"x\""));

    shush(&temp)
        .env("HOME", home.path())
        .args(["--install-hook", "-s", "project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already installed"));

    shush(&temp)
        .env("HOME", home.path())
        .args(["--uninstall-hook", "-s", "project"])
        .assert()
        .success();
    settings.assert(predicate::str::contains("shush --changes-only").not());
    Ok(())
}

#[test]
fn non_utf8_file_is_reported_and_left_byte_identical() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let latin1: &[u8] = b"name = 'caf\xe9'\nx = 1  # drop\n";
    let file = temp.child("a.py");
    file.write_binary(latin1)?;

    shush(&temp)
        .arg("a.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid UTF-8"));

    assert_eq!(std::fs::read(file.path())?, latin1);
    Ok(())
}

#[test]
fn non_utf8_file_does_not_stop_directory_run() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let latin1: &[u8] = b"s = 'caf\xe9'  # x\n";
    let bad = temp.child("src/bad.py");
    bad.write_binary(latin1)?;
    let good = temp.child("src/good.py");
    good.write_str("y = 2  # drop\n")?;

    shush(&temp)
        .arg("src")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.py is not valid UTF-8"));

    assert_eq!(std::fs::read(bad.path())?, latin1);
    good.assert("y = 2\n");
    Ok(())
}

#[test]
fn unknown_config_key_keeps_user_patterns() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child(".shush.toml")
        .write_str("preserve = [\"*KEEP*\"]\nexclude = [\"gen/**\"]\n")?;
    let file = temp.child("a.ts");
    file.write_str("a(); // KEEP me\n")?;

    shush(&temp).arg("a.ts").assert().success();

    file.assert("a(); // KEEP me\n");
    Ok(())
}
