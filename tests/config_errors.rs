// tests/config_errors.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use assetpipe::config::{load_and_validate, load_or_default};
use assetpipe::dag::TaskGraph;
use assetpipe::errors::{AssetpipeError, ConfigurationError};
use assetpipe::tasks::{TaskDef, standard_tasks};
use assetpipe::types::SourceMapMode;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn invalid_message(result: Result<impl std::fmt::Debug, AssetpipeError>) -> String {
    match result {
        Err(AssetpipeError::Configuration(ConfigurationError::Invalid(msg))) => msg,
        other => panic!("expected an invalid-config error, got {other:?}"),
    }
}

#[test]
fn full_config_round_trips_into_accessors() {
    let file = config_file(
        r#"
[paths]
stylesheet_dir = "web/less"
css_out = "public/css"

[sources]
scripts = ["web/js/*.js"]

[output]
js_bundle = "app.js"
source_map = "inline"

[browsers]
firefox = "100"

[watch]
debounce_ms = 200
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.paths().stylesheet_dir, PathBuf::from("web/less"));
    assert_eq!(cfg.paths().library_dir(), PathBuf::from("web/less/lib"));
    assert_eq!(cfg.paths().css_out, PathBuf::from("public/css"));
    assert_eq!(cfg.sources().scripts, vec!["web/js/*.js".to_string()]);
    assert_eq!(cfg.output().js_bundle, "app.js");
    assert_eq!(cfg.output().css_bundle, "style.css");
    assert_eq!(cfg.output().source_map, SourceMapMode::Inline);
    assert_eq!(cfg.browsers().len(), 1);
    assert_eq!(cfg.watch().debounce_ms, 200);
}

#[test]
fn unknown_browser_is_rejected() {
    let file = config_file("[browsers]\nnetscape = \"4\"\n");
    let msg = invalid_message(load_and_validate(file.path()));
    assert!(msg.contains("netscape"), "message: {msg}");
}

#[test]
fn malformed_browser_version_is_rejected() {
    let file = config_file("[browsers]\nchrome = \"latest\"\n");
    invalid_message(load_and_validate(file.path()));
}

#[test]
fn bad_glob_is_rejected() {
    let file = config_file("[sources]\nscripts = [\"js/[.js\"]\n");
    let msg = invalid_message(load_and_validate(file.path()));
    assert!(msg.contains("js/[.js"), "message: {msg}");
}

#[test]
fn empty_required_source_set_is_rejected() {
    let file = config_file("[sources]\nfonts = []\n");
    let msg = invalid_message(load_and_validate(file.path()));
    assert!(msg.contains("fonts"), "message: {msg}");
}

#[test]
fn zero_debounce_is_rejected() {
    let file = config_file("[watch]\ndebounce_ms = 0\n");
    invalid_message(load_and_validate(file.path()));
}

#[test]
fn empty_tool_command_is_rejected() {
    let file = config_file("[tools]\njs_minifier = []\n");
    let msg = invalid_message(load_and_validate(file.path()));
    assert!(msg.contains("js_minifier"), "message: {msg}");
}

#[test]
fn toml_syntax_error_is_reported_as_toml() {
    let file = config_file("[paths\ncss_out = 1\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetpipeError::Toml(_))
    ));
}

#[test]
fn missing_explicit_config_is_an_io_error() {
    let path = Path::new("definitely/not/here/Assetpipe.toml");
    match load_or_default(Some(path)) {
        Err(AssetpipeError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected an IO error, got {other:?}"),
    }
}

#[test]
fn unknown_task_is_a_configuration_error() {
    let graph = TaskGraph::new(standard_tasks()).unwrap();
    assert!(matches!(
        graph.resolve("deploy"),
        Err(ConfigurationError::UnknownTask(name)) if name == "deploy"
    ));
}

#[test]
fn unknown_dependency_names_both_tasks() {
    let mut defs = standard_tasks();
    defs.push(TaskDef::aggregate("release", &["default", "upload"]));

    match TaskGraph::new(defs) {
        Err(ConfigurationError::UnknownDependency { task, dependency }) => {
            assert_eq!(task, "release");
            assert_eq!(dependency, "upload");
        }
        other => panic!("expected an unknown-dependency error, got {other:?}"),
    }
}
