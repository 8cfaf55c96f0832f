use std::path::{Path, PathBuf};

use super::{AdapterCore, AdapterSettings, Bundler, BundlerKind, CommandTable, Operation};
use crate::package::PackageScripts;

/// System-wide install locations checked after `~/.bun/bin/bun`.
pub const BUN_LOCATIONS: [&str; 3] = ["/usr/local/bin/bun", "/opt/homebrew/bin/bun", "/usr/bin/bun"];

/// Path of the bun executable, or plain `bun` to rely on `PATH`.
pub fn locate_bun() -> String {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    locate_bun_in(home.as_deref(), |path| path.is_file())
}

fn locate_bun_in(home: Option<&Path>, exists: impl Fn(&Path) -> bool) -> String {
    home.map(|home| home.join(".bun/bin/bun"))
        .into_iter()
        .chain(BUN_LOCATIONS.iter().map(PathBuf::from))
        .find(|candidate| exists(candidate))
        .map(|found| found.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bun".to_string())
}

/// Bun is its own package manager, so every operation goes through one
/// executable. Build and watch defer to the package's `build`/`watch`
/// scripts when it defines them.
#[derive(Debug)]
pub struct BunAdapter {
    core: AdapterCore,
    executable: String,
    scripts: PackageScripts,
}

impl BunAdapter {
    pub fn new(settings: AdapterSettings) -> Self {
        Self::with_executable(settings, locate_bun())
    }

    pub fn with_executable(settings: AdapterSettings, executable: impl Into<String>) -> Self {
        let scripts = PackageScripts::read(&settings.root);
        Self {
            core: AdapterCore::new(settings),
            executable: executable.into(),
            scripts,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn script_or(&self, script: &str, native: &[&str]) -> Vec<String> {
        let exe = self.executable.clone();
        if self.scripts.has(script) {
            vec![exe, "run".to_string(), script.to_string()]
        } else {
            std::iter::once(exe)
                .chain(native.iter().map(|arg| arg.to_string()))
                .collect()
        }
    }
}

impl Bundler for BunAdapter {
    fn kind(&self) -> BundlerKind {
        BundlerKind::Bun
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn default_commands(&self) -> CommandTable {
        let exe = self.executable.as_str();
        CommandTable::new()
            .with(Operation::Build, self.script_or("build", &["build"]))
            .with(Operation::Watch, self.script_or("watch", &["build", "--watch"]))
            .with(Operation::Install, [exe, "install"])
            .with(Operation::Add, [exe, "add"])
            .with(Operation::Remove, [exe, "remove"])
            .with(Operation::Exec, [exe])
            .with(Operation::Version, [exe, "--version"])
    }
}
