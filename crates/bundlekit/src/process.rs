//! Subprocess execution.
//!
//! Every bundler operation ends up here as a [`CommandLine`] handed to a
//! [`CommandRunner`]. The contract with the external tool is argv in, exit
//! state plus captured stdout/stderr out.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::CommandExecutionError;

/// Number of stderr lines kept in error messages.
pub const STDERR_PREVIEW_LINES: usize = 5;

/// Program plus arguments, optionally pinned to a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Split an argv vector into program and arguments. `None` when empty.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Option<Self> {
        let (program, rest) = argv.split_first()?;
        Some(Self::new(program.as_ref()).args(rest.iter().map(|a| a.as_ref().to_string())))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// `program arg...` with each token shell-escaped.
    pub fn render(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|token| shell_escape(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// How the child's stdout/stderr are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Collect both streams for diagnostics.
    Capture,
    /// Share the parent's terminal (long-running watch, interactive installs).
    Inherit,
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitState {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitState {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (_, Some(signal)) => write!(f, "signal {signal}"),
            (Some(code), None) => write!(f, "exit status: {code}"),
            (None, None) => f.write_str("an unknown status"),
        }
    }
}

impl From<ExitStatus> for ExitState {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: ExitState,
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the adapters and the operating system.
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Run `command` to completion.
    ///
    /// Only a failure to launch is an `Err`; any exit state is returned.
    fn run(&self, command: &CommandLine, stdio: StdioMode) -> io::Result<ProcessOutput>;
}

/// Runs commands with [`std::process::Command`], blocking the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine, stdio: StdioMode) -> io::Result<ProcessOutput> {
        tracing::debug!(command = %command, ?stdio, "spawning");
        let mut process = command.to_command();
        match stdio {
            StdioMode::Capture => {
                let output = process.stdin(Stdio::null()).output()?;
                Ok(ProcessOutput {
                    status: output.status.into(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            StdioMode::Inherit => {
                let status = process.status()?;
                Ok(ProcessOutput {
                    status: status.into(),
                    ..ProcessOutput::default()
                })
            }
        }
    }
}

/// Run `command` and turn anything but a zero exit into a
/// [`CommandExecutionError`].
pub fn run_checked(
    runner: &dyn CommandRunner,
    command: &CommandLine,
    stdio: StdioMode,
) -> Result<ProcessOutput, CommandExecutionError> {
    let output = runner
        .run(command, stdio)
        .map_err(|source| CommandExecutionError::launch(command, source))?;

    if output.status.success() {
        return Ok(output);
    }
    Err(CommandExecutionError::from_output(command, &output))
}

/// Run `command`, failing only when it cannot be launched.
pub fn run_unchecked(
    runner: &dyn CommandRunner,
    command: &CommandLine,
    stdio: StdioMode,
) -> Result<ProcessOutput, CommandExecutionError> {
    runner
        .run(command, stdio)
        .map_err(|source| CommandExecutionError::launch(command, source))
}

/// First [`STDERR_PREVIEW_LINES`] lines of `stderr` plus a count of the rest.
/// `None` when there is nothing to show.
pub fn truncate_stderr(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    if lines.iter().all(|line| line.trim().is_empty()) {
        return None;
    }

    let mut preview = lines
        .iter()
        .take(STDERR_PREVIEW_LINES)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    if lines.len() > STDERR_PREVIEW_LINES {
        let remaining = lines.len() - STDERR_PREVIEW_LINES;
        preview.push_str(&format!("\n... ({remaining} more lines)"));
    }
    Some(preview)
}

/// Quote `token` for a POSIX shell when it contains anything unusual.
pub fn shell_escape(token: &str) -> String {
    if token.is_empty() {
        return "''".to_string();
    }
    let plain = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_escapes_tokens() {
        let cmd = CommandLine::new("bun")
            .arg("build")
            .arg("./app/javascript/application.js")
            .arg("--define=A=it's");
        assert_eq!(
            cmd.render(),
            r"bun build ./app/javascript/application.js '--define=A=it'\''s'"
        );
    }

    #[test]
    fn empty_token_is_quoted() {
        assert_eq!(shell_escape(""), "''");
        assert_eq!(shell_escape("hello world"), "'hello world'");
    }

    #[test]
    fn from_argv_splits_program() {
        let cmd = CommandLine::from_argv(&["npm", "install", "react"]).unwrap();
        assert_eq!(cmd.program(), "npm");
        assert_eq!(cmd.arguments(), ["install", "react"]);
        assert!(CommandLine::from_argv::<&str>(&[]).is_none());
    }

    #[test]
    fn truncate_keeps_five_lines() {
        let stderr = (1..=8).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let preview = truncate_stderr(&stderr).unwrap();
        assert!(preview.starts_with("line 1\nline 2"));
        assert!(preview.contains("line 5"));
        assert!(!preview.contains("line 6"));
        assert!(preview.ends_with("... (3 more lines)"));
    }

    #[test]
    fn truncate_ignores_blank_output() {
        assert!(truncate_stderr("").is_none());
        assert!(truncate_stderr("\n  \n").is_none());
        assert_eq!(truncate_stderr("oops\n").as_deref(), Some("oops"));
    }

    #[test]
    fn exit_state_success() {
        assert!(ExitState::exited(0).success());
        assert!(!ExitState::exited(1).success());
        assert!(!ExitState::signaled(15).success());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_streams() {
        let cmd = CommandLine::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemRunner.run(&cmd, StdioMode::Capture).unwrap();
        assert_eq!(output.status, ExitState::exited(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_signals() {
        let cmd = CommandLine::new("sh").args(["-c", "kill -TERM $$"]);
        let output = SystemRunner.run(&cmd, StdioMode::Capture).unwrap();
        assert_eq!(output.status.signal, Some(15));
        assert_eq!(output.status.code, None);
    }

    #[test]
    fn exit_state_display() {
        assert_eq!(ExitState::exited(2).to_string(), "exit status: 2");
        assert_eq!(ExitState::signaled(2).to_string(), "signal 2");
        assert_eq!(ExitState::default().to_string(), "an unknown status");
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let cmd = CommandLine::new("bundlekit-definitely-not-installed");
        let err = run_checked(&SystemRunner, &cmd, StdioMode::Capture).unwrap_err();
        assert!(err.is_launch_failure());
        assert!(err.to_string().contains("bundlekit-definitely-not-installed"));
    }
}
