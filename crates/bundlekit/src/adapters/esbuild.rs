use super::{AdapterCore, AdapterSettings, Bundler, BundlerKind, CommandTable, Operation};

/// esbuild invoked directly; dependencies always go through npm.
#[derive(Debug)]
pub struct EsbuildAdapter {
    core: AdapterCore,
}

impl EsbuildAdapter {
    pub fn new(settings: AdapterSettings) -> Self {
        Self {
            core: AdapterCore::new(settings),
        }
    }
}

impl Bundler for EsbuildAdapter {
    fn kind(&self) -> BundlerKind {
        BundlerKind::Esbuild
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn default_commands(&self) -> CommandTable {
        CommandTable::new()
            .with(Operation::Build, ["esbuild"])
            .with(Operation::Watch, ["esbuild", "--watch"])
            .with(Operation::Install, ["npm", "install"])
            .with(Operation::Add, ["npm", "install"])
            .with(Operation::Remove, ["npm", "uninstall"])
            .with(Operation::Exec, ["node"])
            .with(Operation::Version, ["esbuild", "--version"])
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;
    use crate::adapters::test_support::{RecordingRunner, settings, succeeded};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn npm_is_used_even_with_other_lockfiles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        let runner = Arc::new(RecordingRunner::with_output(succeeded("")));
        let adapter = EsbuildAdapter::new(settings(json!({}), dir.path(), runner.clone()));

        adapter.install(&["--frozen-lockfile".to_string()]).unwrap();
        assert_eq!(runner.argv(), vec![vec!["npm", "install", "--frozen-lockfile"]]);
    }

    #[test]
    fn exec_runs_node() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::with_output(succeeded("")));
        let adapter = EsbuildAdapter::new(settings(json!({}), dir.path(), runner.clone()));

        assert!(adapter.exec_raw(&["scripts/prebuild.js".to_string()]).unwrap());
        assert_eq!(runner.argv(), vec![vec!["node", "scripts/prebuild.js"]]);
    }
}
