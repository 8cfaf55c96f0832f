//! Error types for adapters, subprocess execution and the build lifecycle.

use std::fmt;
use std::sync::Arc;

use bundlekit_config::{ConfigError, ResolvedConfig};
use miette::Diagnostic;
use thiserror::Error;

use crate::process::{CommandLine, ProcessOutput, truncate_stderr};

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by hook observers.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Loading, resolving or validating configuration failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// The config selects a bundler no adapter exists for.
    #[error("unsupported bundler: {name}. Available: {}", available.join(", "))]
    #[diagnostic(
        code(bundlekit::unsupported_bundler),
        help("Set 'bundler' in config/bundlekit.yml to one of the available names")
    )]
    UnsupportedBundler {
        name: String,
        available: Vec<&'static str>,
    },

    /// A bundler subprocess failed.
    #[error(transparent)]
    #[diagnostic(code(bundlekit::command_failed))]
    CommandExecution(#[from] Box<CommandExecutionError>),

    /// Any other adapter failure.
    #[error("{0}")]
    #[diagnostic(code(bundlekit::operation))]
    Operation(String),

    /// An observer registered on the hook registry failed.
    #[error("{event} hook failed: {source}")]
    #[diagnostic(code(bundlekit::hook))]
    Hook {
        event: HookEvent,
        #[source]
        source: HookError,
    },

    /// A build failed; wraps the cause with the timing and config of the run.
    #[error("build failed after {duration_ms}ms ({env}): {source}", env = .config.env())]
    #[diagnostic(code(bundlekit::build_failed))]
    BuildFailed {
        #[source]
        source: Box<Error>,
        config: Arc<ResolvedConfig>,
        duration_ms: f64,
    },
}

impl Error {
    /// Innermost error, looking through [`Error::BuildFailed`].
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::BuildFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The subprocess failure behind this error, if any.
    pub fn command_failure(&self) -> Option<&CommandExecutionError> {
        match self.root_cause() {
            Error::CommandExecution(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<CommandExecutionError> for Error {
    fn from(err: CommandExecutionError) -> Self {
        Error::CommandExecution(Box::new(err))
    }
}

/// Lifecycle points observers can register on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Error,
    BuildStart,
    BuildComplete,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookEvent::Error => "error",
            HookEvent::BuildStart => "build-start",
            HookEvent::BuildComplete => "build-complete",
        })
    }
}

/// Why a subprocess counts as failed.
#[derive(Debug)]
pub enum FailureKind {
    /// Exited with a non-zero status.
    Exit { code: i32 },
    /// Terminated by a signal.
    Signal { signal: i32 },
    /// The executable could not be launched at all.
    Launch { source: std::io::Error },
}

/// A failed subprocess with the diagnostics needed to explain it.
///
/// A launch failure keeps its [`std::io::Error`] as the error source, so
/// reports show the OS reason beneath the command line.
#[derive(Debug, Diagnostic)]
#[diagnostic(code(bundlekit::command_failed))]
pub struct CommandExecutionError {
    /// Shell-escaped command line.
    pub command: String,
    pub kind: FailureKind,
    /// Truncated standard error, when any was captured.
    #[help]
    pub stderr: Option<String>,
}

impl CommandExecutionError {
    pub fn launch(command: &CommandLine, source: std::io::Error) -> Self {
        Self {
            command: command.render(),
            kind: FailureKind::Launch { source },
            stderr: None,
        }
    }

    /// Classify a finished process that did not succeed.
    pub fn from_output(command: &CommandLine, output: &ProcessOutput) -> Self {
        let kind = match (output.status.signal, output.status.code) {
            (Some(signal), _) => FailureKind::Signal { signal },
            (None, Some(code)) => FailureKind::Exit { code },
            (None, None) => FailureKind::Exit { code: -1 },
        };
        Self {
            command: command.render(),
            kind,
            stderr: truncate_stderr(&output.stderr),
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.kind {
            FailureKind::Exit { code } => Some(code),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self.kind {
            FailureKind::Signal { signal } => Some(signal),
            _ => None,
        }
    }

    pub fn is_launch_failure(&self) -> bool {
        matches!(self.kind, FailureKind::Launch { .. })
    }
}

impl fmt::Display for CommandExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FailureKind::Exit { code } => {
                write!(f, "command failed (exit status: {code}): {}", self.command)?;
            }
            FailureKind::Signal { signal } => {
                write!(f, "command terminated by signal {signal}: {}", self.command)?;
            }
            FailureKind::Launch { .. } => {
                write!(f, "command could not be launched: {}", self.command)?;
            }
        }
        if let Some(stderr) = &self.stderr {
            write!(f, "\n{stderr}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FailureKind::Launch { source } => Some(source),
            FailureKind::Exit { .. } | FailureKind::Signal { .. } => None,
        }
    }
}
