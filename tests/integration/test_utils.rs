//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the orgtrack binary isolated from the user's config and state directories.
pub fn run_orgtrack(home: &Path, args: &[&str]) -> Output {
    let config_home = home.join("config");
    let state_home = home.join("state");
    fs::create_dir_all(&config_home).unwrap();
    fs::create_dir_all(&state_home).unwrap();

    Command::new(env!("CARGO_BIN_EXE_orgtrack"))
        .env("HOME", home.as_os_str())
        .env("XDG_CONFIG_HOME", config_home.as_os_str())
        .env("XDG_STATE_HOME", state_home.as_os_str())
        .env_remove("ORGTRACK_LOG")
        .env_remove("ORGTRACK_ENV")
        .args(args)
        .output()
        .unwrap()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
