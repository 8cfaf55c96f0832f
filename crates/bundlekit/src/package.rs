//! The target package: its `package.json` scripts and its package manager.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Package managers the npm-based adapters can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Pick a manager from the lockfiles in `project_root`.
    ///
    /// `yarn.lock` selects yarn, `pnpm-lock.yaml` or `pnpm-workspace.yaml`
    /// selects pnpm, anything else falls back to npm.
    pub fn detect(project_root: &Path) -> Self {
        if project_root.join("yarn.lock").exists() {
            return Self::Yarn;
        }
        if project_root.join("pnpm-lock.yaml").exists()
            || project_root.join("pnpm-workspace.yaml").exists()
        {
            return Self::Pnpm;
        }
        Self::Npm
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    pub fn install_command(&self) -> Vec<String> {
        vec![self.name().to_string(), "install".to_string()]
    }

    pub fn add_command(&self) -> Vec<String> {
        let verb = match self {
            Self::Npm => "install",
            Self::Yarn | Self::Pnpm => "add",
        };
        vec![self.name().to_string(), verb.to_string()]
    }

    pub fn remove_command(&self) -> Vec<String> {
        let verb = match self {
            Self::Npm => "uninstall",
            Self::Yarn | Self::Pnpm => "remove",
        };
        vec![self.name().to_string(), verb.to_string()]
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageDescriptor {
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

/// The `scripts` table of the project's `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageScripts {
    scripts: BTreeMap<String, String>,
}

impl PackageScripts {
    /// Read `package.json` in `project_root`. A missing or unreadable
    /// descriptor yields an empty table.
    pub fn read(project_root: &Path) -> Self {
        let path = project_root.join("package.json");
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str::<PackageDescriptor>(&content) {
            Ok(descriptor) => Self {
                scripts: descriptor.scripts,
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable package.json: {err}");
                Self::default()
            }
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}
