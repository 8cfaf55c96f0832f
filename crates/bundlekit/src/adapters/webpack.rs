use super::{
    AdapterCore, AdapterSettings, Bundler, BundlerKind, CommandTable, node_tool_commands,
};
use crate::package::PackageManager;

#[derive(Debug)]
pub struct WebpackAdapter {
    core: AdapterCore,
    manager: PackageManager,
}

impl WebpackAdapter {
    pub fn new(settings: AdapterSettings) -> Self {
        let manager = PackageManager::detect(&settings.root);
        Self {
            core: AdapterCore::new(settings),
            manager,
        }
    }

    pub fn package_manager(&self) -> PackageManager {
        self.manager
    }
}

impl Bundler for WebpackAdapter {
    fn kind(&self) -> BundlerKind {
        BundlerKind::Webpack
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn default_commands(&self) -> CommandTable {
        node_tool_commands("webpack", self.manager)
    }
}
