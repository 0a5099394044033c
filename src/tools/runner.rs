//! External command execution
//!
//! Tool commands are configured as shell templates. The runner fills in the
//! placeholders, checks that the program exists and runs it through `sh -c`
//! with an optional timeout.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::cli::Output;

/// Placeholder values substituted into command templates as `{name}`
#[derive(Debug, Clone, Default)]
pub struct Vars(Vec<(&'static str, String)>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.retain(|(existing, _)| *existing != name);
        self.0.push((name, value.into()));
        self
    }

    pub fn with_path<P: AsRef<Path>>(self, name: &'static str, path: P) -> Self {
        self.with(name, path.as_ref().to_string_lossy().into_owned())
    }

    /// Fill `template`, quoting values for the shell where needed
    pub fn expand(&self, template: &str) -> String {
        self.0.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), &shell_quote(value))
        })
    }
}

fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
    /// The program is not installed
    Missing,
    TimedOut,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Succeeded)
    }
}

pub struct Runner<'a> {
    output: &'a Output,
    cwd: PathBuf,
    timeout: Option<Duration>,
}

impl<'a> Runner<'a> {
    /// `timeout_secs == 0` runs commands without a time limit
    pub fn new<P: AsRef<Path>>(output: &'a Output, cwd: P, timeout_secs: u64) -> Self {
        Self {
            output,
            cwd: cwd.as_ref().to_path_buf(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }

    pub fn output(&self) -> &Output {
        self.output
    }

    /// Expand and run one command template
    pub async fn run(&self, label: &str, template: &str, vars: &Vars) -> Result<RunStatus> {
        let command = vars.expand(template);
        let Some(program) = command.split_whitespace().next() else {
            tracing::warn!("{label}: empty command, nothing to run");
            return Ok(RunStatus::Missing);
        };

        if which::which(program).is_err() {
            tracing::warn!("{label}: '{program}' not found in PATH");
            self.output.warning(&format!("{label}: {program} is not installed"));
            return Ok(RunStatus::Missing);
        }

        tracing::debug!("{label}: {command}");
        let spinner = self.output.spinner(label);

        let child = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {label}: {command}"))?;

        let finished = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => Some(result),
                Err(_) => None,
            },
            None => Some(child.wait_with_output().await),
        };
        spinner.finish_and_clear();

        let Some(result) = finished else {
            tracing::warn!("{label}: timed out after {:?}", self.timeout.unwrap_or_default());
            self.output.warning(&format!("{label} timed out"));
            return Ok(RunStatus::TimedOut);
        };

        let out = result.with_context(|| format!("Failed to wait for {label}"))?;
        if out.status.success() {
            tracing::debug!("{label}: finished successfully");
            Ok(RunStatus::Succeeded)
        } else {
            tracing::debug!(
                "{label}: exited with {}\n{}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim_end()
            );
            Ok(RunStatus::Failed)
        }
    }

    /// Run a command and report whether it succeeded
    pub async fn succeeds(&self, label: &str, template: &str, vars: &Vars) -> Result<bool> {
        Ok(self.run(label, template, vars).await?.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_placeholders() {
        let vars = Vars::new()
            .with_path("src", "/project/src")
            .with("output", "/tmp/out dir/style.json");
        assert_eq!(
            vars.expand("flake8 --output-file {output} {src}"),
            "flake8 --output-file '/tmp/out dir/style.json' /project/src"
        );
        assert_eq!(vars.expand("{unknown}"), "{unknown}");
    }

    #[test]
    fn test_later_value_replaces_earlier() {
        let vars = Vars::new().with("output", "a.json").with("output", "b.json");
        assert_eq!(vars.expand("{output}"), "b.json");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain/path.txt"), "plain/path.txt");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[tokio::test]
    async fn test_run_status() {
        let temp = TempDir::new().unwrap();
        let output = Output::silent();
        let runner = Runner::new(&output, temp.path(), 0);
        let vars = Vars::new().with_path("file", temp.path().join("touched"));

        assert_eq!(runner.run("true", "true", &vars).await.unwrap(), RunStatus::Succeeded);
        assert_eq!(runner.run("false", "false", &vars).await.unwrap(), RunStatus::Failed);
        assert_eq!(
            runner.run("missing", "definitely-not-a-tool-7f3a --x", &vars).await.unwrap(),
            RunStatus::Missing
        );

        assert!(runner.succeeds("touch", "touch {file}", &vars).await.unwrap());
        assert!(temp.path().join("touched").exists());
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let temp = TempDir::new().unwrap();
        let output = Output::silent();
        let runner = Runner::new(&output, temp.path(), 1);

        assert_eq!(runner.run("sleep", "sleep 30", &Vars::new()).await.unwrap(), RunStatus::TimedOut);
    }
}
