//! End-to-end tests of the library API: a directory source, the bean
//! parser, a file-backed registry and the real shell runner.

#![cfg(unix)]

use std::fs;
use std::path::Path;

use espresso::bean::{sha256_hex, BeanParser, DirSource, SourceFetcher};
use espresso::runner::Installer;
use espresso::shell::ShellScriptRunner;
use espresso::state::{FileBackend, Registry};
use espresso::EspressoError;
use std::collections::HashMap;
use tempfile::TempDir;

fn write_bean(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(format!("{}.bean", name)), content).unwrap();
}

fn installer(
    beans: &Path,
    state: &Path,
    pins: HashMap<String, String>,
) -> Installer<SourceFetcher<DirSource, BeanParser>, ShellScriptRunner> {
    let registry = Registry::load(FileBackend::in_dir(state)).unwrap();
    let fetcher = SourceFetcher::new(DirSource::new(beans), BeanParser::new()).with_pins(pins);
    let runner = ShellScriptRunner::default().capture_output(true);
    Installer::new(registry, fetcher, runner)
}

#[test]
fn registry_survives_restart() {
    let temp = TempDir::new().unwrap();
    let beans = temp.path().join("beans");
    fs::create_dir_all(&beans).unwrap();
    write_bean(&beans, "app", "depends=(lib)\ntrue\n");
    write_bean(&beans, "lib", "true\n");
    let state = temp.path().join("state");

    let report = installer(&beans, &state, HashMap::new())
        .install("app")
        .unwrap();
    assert_eq!(report.installed, vec!["lib", "app"]);

    let reopened = installer(&beans, &state, HashMap::new());
    assert!(reopened.with_registry(|r| r.contains("app") && r.contains("lib")));
    assert!(reopened.install("app").unwrap().is_noop());
}

#[test]
fn pinned_bean_must_match() {
    let temp = TempDir::new().unwrap();
    let beans = temp.path().join("beans");
    fs::create_dir_all(&beans).unwrap();
    write_bean(&beans, "app", "true\n");
    let state = temp.path().join("state");

    let wrong = HashMap::from([("app".to_string(), "0".repeat(64))]);
    let err = installer(&beans, &state, wrong).install("app").unwrap_err();
    assert!(matches!(err, EspressoError::IntegrityMismatch { .. }));

    let right = HashMap::from([("app".to_string(), sha256_hex(b"true\n"))]);
    installer(&beans, &state, right).install("app").unwrap();
}

#[test]
fn remove_uses_recorded_uninstall_after_bean_disappears() {
    let temp = TempDir::new().unwrap();
    let beans = temp.path().join("beans");
    fs::create_dir_all(&beans).unwrap();
    let marker = temp.path().join("installed-marker");
    write_bean(
        &beans,
        "tool",
        &format!(
            "case \"$1\" in\n  remove) rm -f '{0}' ;;\n  *) touch '{0}' ;;\nesac\n",
            marker.display()
        ),
    );
    let state = temp.path().join("state");

    installer(&beans, &state, HashMap::new())
        .install("tool")
        .unwrap();
    assert!(marker.exists());

    fs::remove_file(beans.join("tool.bean")).unwrap();
    installer(&beans, &state, HashMap::new())
        .remove("tool")
        .unwrap();

    assert!(!marker.exists());
    let registry = Registry::load(FileBackend::in_dir(&state)).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn script_stderr_is_reported_on_failure() {
    let temp = TempDir::new().unwrap();
    let beans = temp.path().join("beans");
    fs::create_dir_all(&beans).unwrap();
    write_bean(&beans, "app", "echo 'compiler not found' >&2\nexit 2\n");
    let state = temp.path().join("state");

    let err = installer(&beans, &state, HashMap::new())
        .install("app")
        .unwrap_err();

    assert!(err.to_string().contains("compiler not found"));
    assert_eq!(err.package(), Some("app"));
}
