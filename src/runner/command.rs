//! Command descriptions and captured output.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Characters that force an argument to be quoted when displayed.
const SHELL_META: &[char] = &[
    ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}', '<',
    '>', '|', '&', ';', '#', '~',
];

/// An external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path.
    program: String,
    /// Arguments.
    args: Vec<String>,
    /// Working directory.
    cwd: Option<PathBuf>,
    /// Extra environment variables.
    envs: BTreeMap<String, String>,
}

/// Output captured from a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code if available.
    pub exit_code: Option<i32>,
}

impl CommandSpec {
    /// Creates a command for the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: BTreeMap::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// Sets several environment variables, later values winning.
    #[must_use]
    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in vars {
            self.envs.insert(key.clone(), value.clone());
        }
        self
    }

    /// Returns the program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Returns the working directory.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Returns the extra environment variables.
    #[must_use]
    pub const fn environment(&self) -> &BTreeMap<String, String> {
        &self.envs
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return String::from("''");
    }
    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', "'\\''"))
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_arg(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_arg(arg))?;
        }
        Ok(())
    }
}

impl CommandOutput {
    /// Returns stderr, or stdout when stderr is empty, trimmed.
    #[must_use]
    pub fn error_text(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_only_when_needed() {
        let command = CommandSpec::new("python")
            .arg("bin/clear_redis.py")
            .arg("prod")
            .arg("/srv/my dino");
        assert_eq!(command.to_string(), "python bin/clear_redis.py prod '/srv/my dino'");
    }

    #[test]
    fn test_display_escapes_single_quotes() {
        let command = CommandSpec::new("echo").arg("it's").arg("");
        assert_eq!(command.to_string(), "echo 'it'\\''s' ''");
    }

    #[test]
    fn test_envs_merge_with_later_values_winning() {
        let overlay: BTreeMap<String, String> =
            [(String::from("PATH"), String::from("/venv/bin"))].into_iter().collect();
        let command = CommandSpec::new("git")
            .env("PATH", "/usr/bin")
            .env("LANG", "C")
            .envs(&overlay);

        assert_eq!(command.environment().get("PATH").map(String::as_str), Some("/venv/bin"));
        assert_eq!(command.environment().get("LANG").map(String::as_str), Some("C"));
    }

    #[test]
    fn test_error_text_prefers_stderr() {
        let output = CommandOutput {
            stdout: String::from("out\n"),
            stderr: String::from(" err \n"),
            exit_code: Some(1),
        };
        assert_eq!(output.error_text(), "err");

        let output = CommandOutput {
            stdout: String::from("only stdout\n"),
            ..CommandOutput::default()
        };
        assert_eq!(output.error_text(), "only stdout");
    }
}
