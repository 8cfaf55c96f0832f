//! Operation → argv tables and the `commands` override key.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bundlekit_config::{ConfigKey, ResolvedConfig};
use serde_json::Value;

/// Abstract operations every adapter maps to a subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Build,
    Watch,
    Install,
    Add,
    Remove,
    Exec,
    Version,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Build,
        Operation::Watch,
        Operation::Install,
        Operation::Add,
        Operation::Remove,
        Operation::Exec,
        Operation::Version,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Build => "build",
            Operation::Watch => "watch",
            Operation::Install => "install",
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Exec => "exec",
            Operation::Version => "version",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Argv prefix per operation. Arguments are appended at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    entries: BTreeMap<Operation, Vec<String>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, operation: Operation, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(operation, argv.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert(&mut self, operation: Operation, argv: Vec<String>) {
        self.entries.insert(operation, argv);
    }

    pub fn get(&self, operation: Operation) -> Option<&[String]> {
        self.entries.get(&operation).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, &[String])> {
        self.entries.iter().map(|(op, argv)| (*op, argv.as_slice()))
    }

    /// Replace entries with every accepted override.
    pub fn apply(&mut self, overrides: CommandTable) {
        self.entries.extend(overrides.entries);
    }
}

/// Why a `commands` override was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideRejection {
    /// `commands` is set but is not a mapping.
    NotAMapping,
    /// A key does not name an [`Operation`].
    UnknownOperation(String),
    /// An entry is neither a non-empty string nor a non-empty list of strings.
    InvalidCommand(Operation),
}

impl fmt::Display for OverrideRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideRejection::NotAMapping => f.write_str("'commands' must be a mapping"),
            OverrideRejection::UnknownOperation(key) => {
                write!(f, "'{key}' is not a bundler operation")
            }
            OverrideRejection::InvalidCommand(op) => {
                write!(f, "command for '{op}' must be a string or a list of strings")
            }
        }
    }
}

/// Outcome of reading the `commands` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideLookup {
    Found(CommandTable),
    Absent,
    Rejected(OverrideRejection),
}

/// Read the `commands` override table from `config`.
pub fn lookup_overrides(config: &ResolvedConfig) -> OverrideLookup {
    let entries = match config.get(ConfigKey::Commands) {
        None | Some(Value::Null) => return OverrideLookup::Absent,
        Some(Value::Object(entries)) => entries,
        Some(_) => return OverrideLookup::Rejected(OverrideRejection::NotAMapping),
    };

    let mut table = CommandTable::new();
    for (key, value) in entries {
        let Ok(operation) = key.parse::<Operation>() else {
            return OverrideLookup::Rejected(OverrideRejection::UnknownOperation(key.clone()));
        };
        match parse_argv(value) {
            Some(argv) => table.insert(operation, argv),
            None => return OverrideLookup::Rejected(OverrideRejection::InvalidCommand(operation)),
        }
    }
    OverrideLookup::Found(table)
}

/// Merge `defaults` with the config's overrides. A rejected override table
/// is logged and the defaults are used unchanged.
pub fn resolve_command_table(mut defaults: CommandTable, config: &ResolvedConfig) -> CommandTable {
    match lookup_overrides(config) {
        OverrideLookup::Found(overrides) => {
            tracing::debug!(env = config.env(), "applying command overrides");
            defaults.apply(overrides);
        }
        OverrideLookup::Absent => {}
        OverrideLookup::Rejected(reason) => {
            tracing::warn!(env = config.env(), "ignoring command overrides: {reason}");
        }
    }
    defaults
}

fn parse_argv(value: &Value) -> Option<Vec<String>> {
    let argv: Vec<String> = match value {
        Value::String(command) => command.split_whitespace().map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    if argv.is_empty() { None } else { Some(argv) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ResolvedConfig {
        match value {
            Value::Object(map) => ResolvedConfig::new("development", map),
            _ => unreachable!(),
        }
    }

    fn defaults() -> CommandTable {
        CommandTable::new()
            .with(Operation::Build, ["esbuild"])
            .with(Operation::Version, ["esbuild", "--version"])
    }

    #[test]
    fn absent_overrides_keep_defaults() {
        let table = resolve_command_table(defaults(), &config(json!({})));
        assert_eq!(table, defaults());
    }

    #[test]
    fn string_and_list_overrides_are_applied() {
        let table = resolve_command_table(
            defaults(),
            &config(json!({"commands": {
                "build": "npx esbuild --log-level=warning",
                "version": ["npx", "esbuild", "--version"]
            }})),
        );
        assert_eq!(
            table.get(Operation::Build).unwrap(),
            ["npx", "esbuild", "--log-level=warning"]
        );
        assert_eq!(table.get(Operation::Version).unwrap(), ["npx", "esbuild", "--version"]);
    }

    #[test]
    fn rejected_overrides_fall_back() {
        for bad in [
            json!({"commands": "esbuild"}),
            json!({"commands": {"bundle": "esbuild"}}),
            json!({"commands": {"build": 3}}),
            json!({"commands": {"build": ""}}),
            json!({"commands": {"build": ["esbuild", 1]}}),
        ] {
            let cfg = config(bad);
            assert!(matches!(lookup_overrides(&cfg), OverrideLookup::Rejected(_)));
            assert_eq!(resolve_command_table(defaults(), &cfg), defaults());
        }
    }

    #[test]
    fn rejection_reasons() {
        assert_eq!(
            lookup_overrides(&config(json!({"commands": {"bundle": "x"}}))),
            OverrideLookup::Rejected(OverrideRejection::UnknownOperation("bundle".into()))
        );
        assert_eq!(
            lookup_overrides(&config(json!({"commands": {"watch": {}}}))),
            OverrideLookup::Rejected(OverrideRejection::InvalidCommand(Operation::Watch))
        );
    }
}
