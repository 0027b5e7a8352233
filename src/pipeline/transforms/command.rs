// src/pipeline/transforms/command.rs

//! Stages backed by an external program.
//!
//! The program receives a file's contents on stdin and must write the
//! transformed contents to stdout. A non-zero exit fails the stage with the
//! program's stderr as message.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::errors::{Result, TransformError};
use crate::pipeline::transforms::map_each;
use crate::pipeline::{SourceFile, Transform};

#[derive(Debug, Clone)]
pub struct CommandTransform {
    name: String,
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandTransform {
    /// Build from an argv list such as `["lessc", "--include-path={include}", "-"]`.
    ///
    /// `vars` are substituted into every argument, e.g. `("include", "/p/less")`
    /// turns `{include}` into `/p/less`.
    pub fn from_argv(name: impl Into<String>, argv: &[String], vars: &[(&str, &str)]) -> Self {
        let mut args: Vec<String> = argv
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect();
        let program = if args.is_empty() {
            String::new()
        } else {
            args.remove(0)
        };

        Self {
            name: name.into(),
            program,
            args,
            envs: Vec::new(),
        }
    }

    /// Set an environment variable for every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn run_one(&self, mut file: SourceFile) -> Result<SourceFile> {
        debug!(stage = %self.name, program = %self.program, file = ?file.path, "running external tool");

        let fail = |message: String| TransformError::new(&self.name, &file.path, message);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("failed to start `{}`: {e}", self.program)))?;

        let stdin = child.stdin.take();
        let input = &file.contents;

        // Feed stdin from a scoped thread so a tool that writes before it has
        // read all of its input cannot deadlock against us.
        let output = std::thread::scope(|scope| {
            if let Some(mut stdin) = stdin {
                scope.spawn(move || {
                    let _ = stdin.write_all(input);
                });
            }
            child.wait_with_output()
        })
        .map_err(|e| fail(format!("waiting for `{}`: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(fail(format!("`{}` exited with {code}: {stderr}", self.program)).into());
        }

        file.contents = output.stdout;
        Ok(file)
    }
}

impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        map_each(files, |file| self.run_one(file))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::errors::AssetpipeError;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn substitutes_variables() {
        let t = CommandTransform::from_argv(
            "stylesheet-compile",
            &argv(&["lessc", "--include-path={include}", "-"]),
            &[("include", "/p/less")],
        );
        assert_eq!(t.program(), "lessc");
        assert_eq!(t.args(), ["--include-path=/p/less", "-"]);
    }

    #[test]
    fn passes_configured_environment() {
        let t = CommandTransform::from_argv(
            "autoprefix",
            &argv(&["sh", "-c", "cat; printf '%s' \"$BROWSERSLIST\""]),
            &[],
        )
        .with_env("BROWSERSLIST", "safari >= 13");
        let out = t.apply(vec![SourceFile::new("", "a.css", ".a{}")]).unwrap();
        assert_eq!(out[0].contents, b".a{}safari >= 13");
    }

    #[test]
    fn pipes_contents_through_program() {
        let t = CommandTransform::from_argv("upper", &argv(&["tr", "a-z", "A-Z"]), &[]);
        let out = t.apply(vec![SourceFile::new("", "a.js", "var a;")]).unwrap();
        assert_eq!(out[0].contents, b"VAR A;");
    }

    #[test]
    fn failure_names_file_and_message() {
        let t = CommandTransform::from_argv(
            "stylesheet-compile",
            &argv(&["sh", "-c", "echo 'ParseError: bad' >&2; exit 2"]),
            &[],
        );
        let err = t
            .apply(vec![SourceFile::new("less", "less/main.less", "@x")])
            .unwrap_err();
        match err {
            AssetpipeError::Transform(e) => {
                assert_eq!(e.file, std::path::PathBuf::from("less/main.less"));
                assert!(e.message.contains("ParseError: bad"));
                assert!(e.message.contains("exited with 2"));
            }
            other => panic!("expected transform error, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_a_transform_error() {
        let t = CommandTransform::from_argv("minify-js", &argv(&["definitely-not-installed-xyz"]), &[]);
        let err = t.apply(vec![SourceFile::new("", "a.js", "")]).unwrap_err();
        assert!(matches!(err, AssetpipeError::Transform(_)));
    }
}
