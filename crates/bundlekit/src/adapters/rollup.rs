use super::{
    AdapterCore, AdapterSettings, Bundler, BundlerKind, CommandTable, node_tool_commands,
};
use crate::package::PackageManager;

#[derive(Debug)]
pub struct RollupAdapter {
    core: AdapterCore,
    manager: PackageManager,
}

impl RollupAdapter {
    pub fn new(settings: AdapterSettings) -> Self {
        let manager = PackageManager::detect(&settings.root);
        Self {
            core: AdapterCore::new(settings),
            manager,
        }
    }

    /// Package manager detected from the project's lockfiles.
    pub fn package_manager(&self) -> PackageManager {
        self.manager
    }
}

impl Bundler for RollupAdapter {
    fn kind(&self) -> BundlerKind {
        BundlerKind::Rollup
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn default_commands(&self) -> CommandTable {
        node_tool_commands("rollup", self.manager)
    }
}
