//! One adapter per external bundler.
//!
//! Every adapter turns the abstract [`Operation`]s into subprocess
//! invocations through the same [`Bundler`] default methods; the variants
//! only differ in their default [`CommandTable`].

mod bun;
mod commands;
mod esbuild;
mod rollup;
mod webpack;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use bundlekit_config::{DEFAULT_BUNDLER, ResolvedConfig};
use once_cell::sync::OnceCell;

pub use bun::{BUN_LOCATIONS, BunAdapter, locate_bun};
pub use commands::{
    CommandTable, Operation, OverrideLookup, OverrideRejection, lookup_overrides,
    resolve_command_table,
};
pub use esbuild::EsbuildAdapter;
pub use rollup::RollupAdapter;
pub use webpack::WebpackAdapter;

use crate::error::{Error, Result};
use crate::package::PackageManager;
use crate::process::{
    CommandLine, CommandRunner, ExitState, ProcessOutput, StdioMode, run_checked, run_unchecked,
};

/// Everything an adapter needs from its surroundings.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub config: Arc<ResolvedConfig>,
    /// Project root; every subprocess runs here.
    pub root: PathBuf,
    pub runner: Arc<dyn CommandRunner>,
}

/// State shared by every adapter: its settings and the lazily merged
/// command table.
#[derive(Debug)]
pub struct AdapterCore {
    settings: AdapterSettings,
    commands: OnceCell<CommandTable>,
}

impl AdapterCore {
    pub fn new(settings: AdapterSettings) -> Self {
        Self {
            settings,
            commands: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub fn root(&self) -> &Path {
        &self.settings.root
    }
}

/// The capability set shared by every bundler variant.
pub trait Bundler: Send + Sync + fmt::Debug {
    fn kind(&self) -> BundlerKind;

    fn core(&self) -> &AdapterCore;

    /// Variant defaults before `commands` overrides are applied.
    fn default_commands(&self) -> CommandTable;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn config(&self) -> &ResolvedConfig {
        &self.core().settings.config
    }

    /// Default table merged with the config's overrides, computed once.
    fn command_table(&self) -> &CommandTable {
        self.core()
            .commands
            .get_or_init(|| resolve_command_table(self.default_commands(), self.config()))
    }

    /// Command line for `operation`, rooted at the project directory.
    fn command(&self, operation: Operation) -> Result<CommandLine> {
        let argv = self.command_table().get(operation).ok_or_else(|| {
            Error::Operation(format!("{} has no '{operation}' command", self.name()))
        })?;
        let command = CommandLine::from_argv(argv).ok_or_else(|| {
            Error::Operation(format!("{} has an empty '{operation}' command", self.name()))
        })?;
        Ok(command.current_dir(self.core().root()))
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.core().settings.runner.as_ref()
    }

    /// Run the build command with the config-derived arguments followed by
    /// `extra_args`. Any unsuccessful exit is an error.
    fn build(&self, extra_args: &[String]) -> Result<ProcessOutput> {
        let command = self
            .command(Operation::Build)?
            .args(self.config().build_arguments())
            .args(extra_args.iter().cloned());
        tracing::info!(bundler = self.name(), command = %command, "building");
        Ok(run_checked(self.runner(), &command, StdioMode::Capture)?)
    }

    /// Run the watch command in the foreground until it exits.
    ///
    /// Watchers end by being interrupted, so any exit state is returned as-is;
    /// only a launch failure is an error.
    fn watch(&self, extra_args: &[String]) -> Result<ExitState> {
        let command = self
            .command(Operation::Watch)?
            .args(self.config().build_arguments())
            .args(extra_args.iter().cloned());
        tracing::info!(bundler = self.name(), command = %command, "watching");
        let output = run_unchecked(self.runner(), &command, StdioMode::Inherit)?;
        if !output.status.success() {
            tracing::debug!(status = ?output.status, "watcher exited");
        }
        Ok(output.status)
    }

    fn install(&self, extra_args: &[String]) -> Result<ProcessOutput> {
        let command = self
            .command(Operation::Install)?
            .args(extra_args.iter().cloned());
        Ok(run_checked(self.runner(), &command, StdioMode::Inherit)?)
    }

    /// Whether the package manager succeeded in adding `packages`.
    fn add_packages(&self, packages: &[String]) -> Result<bool> {
        let command = self.command(Operation::Add)?.args(packages.iter().cloned());
        Ok(run_unchecked(self.runner(), &command, StdioMode::Inherit)?
            .status
            .success())
    }

    fn remove_packages(&self, packages: &[String]) -> Result<bool> {
        let command = self
            .command(Operation::Remove)?
            .args(packages.iter().cloned());
        Ok(run_unchecked(self.runner(), &command, StdioMode::Inherit)?
            .status
            .success())
    }

    fn exec_raw(&self, args: &[String]) -> Result<bool> {
        let command = self.command(Operation::Exec)?.args(args.iter().cloned());
        Ok(run_unchecked(self.runner(), &command, StdioMode::Inherit)?
            .status
            .success())
    }

    /// Trimmed stdout of the version command.
    fn version(&self) -> Result<String> {
        let command = self.command(Operation::Version)?;
        let output = run_checked(self.runner(), &command, StdioMode::Capture)?;
        Ok(output.stdout.trim().to_string())
    }

    /// Whether the version command exits zero.
    fn is_available(&self) -> bool {
        let Ok(command) = self.command(Operation::Version) else {
            return false;
        };
        match self.runner().run(&command, StdioMode::Capture) {
            Ok(output) => output.status.success(),
            Err(err) => {
                tracing::debug!(bundler = self.name(), "version check failed: {err}");
                false
            }
        }
    }
}

/// The supported bundlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundlerKind {
    Bun,
    Esbuild,
    Rollup,
    Webpack,
}

impl BundlerKind {
    pub const ALL: [BundlerKind; 4] = [
        BundlerKind::Bun,
        BundlerKind::Esbuild,
        BundlerKind::Rollup,
        BundlerKind::Webpack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BundlerKind::Bun => "bun",
            BundlerKind::Esbuild => "esbuild",
            BundlerKind::Rollup => "rollup",
            BundlerKind::Webpack => "webpack",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.into_iter().map(Self::name).collect()
    }
}

impl fmt::Display for BundlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BundlerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnsupportedBundler {
                name: s.to_string(),
                available: Self::names(),
            })
    }
}

/// Build the adapter selected by the config's `bundler` key.
pub fn create_bundler(settings: AdapterSettings) -> Result<Box<dyn Bundler>> {
    let name = settings.config.bundler().unwrap_or(DEFAULT_BUNDLER);
    let kind: BundlerKind = name.parse()?;
    Ok(create_bundler_of_kind(kind, settings))
}

pub fn create_bundler_of_kind(kind: BundlerKind, settings: AdapterSettings) -> Box<dyn Bundler> {
    tracing::debug!(bundler = kind.name(), root = %settings.root.display(), "creating adapter");
    match kind {
        BundlerKind::Bun => Box::new(BunAdapter::new(settings)),
        BundlerKind::Esbuild => Box::new(EsbuildAdapter::new(settings)),
        BundlerKind::Rollup => Box::new(RollupAdapter::new(settings)),
        BundlerKind::Webpack => Box::new(WebpackAdapter::new(settings)),
    }
}

/// Table shared by the tools that run under node and leave dependency
/// management to the project's package manager.
fn node_tool_commands(tool: &str, manager: PackageManager) -> CommandTable {
    CommandTable::new()
        .with(Operation::Build, [tool])
        .with(Operation::Watch, [tool, "--watch"])
        .with(Operation::Install, manager.install_command())
        .with(Operation::Add, manager.add_command())
        .with(Operation::Remove, manager.remove_command())
        .with(Operation::Exec, ["node"])
        .with(Operation::Version, [tool, "--version"])
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use super::*;
    use crate::process::{CommandRunner, ProcessOutput};

    /// Records every command and answers with a fixed output.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub calls: Mutex<Vec<(CommandLine, StdioMode)>>,
        pub output: ProcessOutput,
    }

    impl RecordingRunner {
        pub fn with_output(output: ProcessOutput) -> Self {
            Self {
                calls: Mutex::default(),
                output,
            }
        }

        pub fn argv(&self) -> Vec<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(cmd, _)| {
                    std::iter::once(cmd.program().to_string())
                        .chain(cmd.arguments().iter().cloned())
                        .collect()
                })
                .collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &CommandLine, stdio: StdioMode) -> std::io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push((command.clone(), stdio));
            Ok(self.output.clone())
        }
    }

    pub fn settings(
        config: serde_json::Value,
        root: &Path,
        runner: Arc<dyn CommandRunner>,
    ) -> AdapterSettings {
        let values = match config {
            serde_json::Value::Object(map) => map,
            _ => unreachable!("fixture must be a mapping"),
        };
        AdapterSettings {
            config: Arc::new(ResolvedConfig::new("development", values)),
            root: root.to_path_buf(),
            runner,
        }
    }

    pub fn succeeded(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            status: ExitState::exited(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use bundlekit_config::KNOWN_BUNDLERS;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn kinds_match_known_bundlers() {
        assert_eq!(BundlerKind::names(), KNOWN_BUNDLERS);
        assert!(BundlerKind::names().len() >= 4);
    }

    #[test]
    fn unknown_bundler_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let err = create_bundler(settings(json!({"bundler": "parcel"}), dir.path(), runner))
            .unwrap_err();
        match err {
            Error::UnsupportedBundler { name, available } => {
                assert_eq!(name, "parcel");
                assert_eq!(available, ["bun", "esbuild", "rollup", "webpack"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_bundler_key_selects_bun() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let adapter = create_bundler(settings(json!({}), dir.path(), runner)).unwrap();
        assert_eq!(adapter.kind(), BundlerKind::Bun);
    }

    #[test]
    fn build_appends_config_arguments_then_extra_args() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(succeeded("")));
        let adapter = create_bundler(settings(
            json!({"bundler": "esbuild", "entrypoint": "app.js", "outdir": "out", "minify": true}),
            dir.path(),
            runner.clone(),
        ))
        .unwrap();

        adapter.build(&["--metafile=meta.json".to_string()]).unwrap();

        assert_eq!(
            runner.argv(),
            vec![vec!["esbuild", "app.js", "--outdir=out", "--minify", "--metafile=meta.json"]]
        );
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].0.cwd(), Some(dir.path()));
        assert_eq!(calls[0].1, StdioMode::Capture);
    }

    #[test]
    fn build_failure_is_command_execution_error() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(ProcessOutput {
            status: ExitState::exited(1),
            stdout: String::new(),
            stderr: "✘ [ERROR] Could not resolve \"react\"\n".to_string(),
        }));
        let adapter =
            create_bundler(settings(json!({"bundler": "rollup"}), dir.path(), runner)).unwrap();

        let err = adapter.build(&[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit status: 1"), "{message}");
        assert!(message.contains("rollup"), "{message}");
        assert!(message.contains("Could not resolve"), "{message}");
    }

    #[test]
    fn version_is_trimmed_and_availability_follows_exit() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(succeeded("5.94.0\n")));
        let adapter =
            create_bundler(settings(json!({"bundler": "webpack"}), dir.path(), runner)).unwrap();
        assert_eq!(adapter.version().unwrap(), "5.94.0");
        assert!(adapter.is_available());

        let failing = Arc::new(RecordingRunner::with_output(ProcessOutput {
            status: ExitState::exited(127),
            ..ProcessOutput::default()
        }));
        let adapter =
            create_bundler(settings(json!({"bundler": "webpack"}), dir.path(), failing)).unwrap();
        assert!(!adapter.is_available());
    }

    #[test]
    fn watch_returns_exit_state_without_failing() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(ProcessOutput {
            status: ExitState::signaled(2),
            ..ProcessOutput::default()
        }));
        let adapter =
            create_bundler(settings(json!({"bundler": "esbuild"}), dir.path(), runner.clone()))
                .unwrap();

        let status = adapter.watch(&[]).unwrap();
        assert_eq!(status.signal, Some(2));
        assert_eq!(runner.argv()[0][..2], ["esbuild", "--watch"]);
        assert_eq!(runner.calls.lock().unwrap()[0].1, StdioMode::Inherit);
    }

    #[test]
    fn add_and_remove_report_success_flag() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(ProcessOutput {
            status: ExitState::exited(1),
            ..ProcessOutput::default()
        }));
        let adapter =
            create_bundler(settings(json!({"bundler": "esbuild"}), dir.path(), runner.clone()))
                .unwrap();

        assert!(!adapter.add_packages(&["react".to_string()]).unwrap());
        assert!(!adapter.remove_packages(&["lodash".to_string()]).unwrap());
        assert!(adapter.install(&[]).is_err());
        assert_eq!(
            runner.argv(),
            vec![
                vec!["npm", "install", "react"],
                vec!["npm", "uninstall", "lodash"],
                vec!["npm", "install"],
            ]
        );
    }

    #[test]
    fn command_overrides_replace_defaults() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(succeeded("")));
        let adapter = create_bundler(settings(
            json!({"bundler": "webpack", "commands": {"build": "npx webpack --config prod.js"}}),
            dir.path(),
            runner.clone(),
        ))
        .unwrap();

        adapter.build(&[]).unwrap();
        assert_eq!(runner.argv()[0], ["npx", "webpack", "--config", "prod.js"]);
        assert_eq!(
            adapter.command_table().get(Operation::Version).unwrap(),
            ["webpack", "--version"]
        );
    }
}
