//! Repl configuration: startup aliases and identifiers from a TOML file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use trellis_cmd::{Dispatcher, NodeId};
use trellis_types::error::{Result, TrellisError};

/// A startup alias: `name` bound to the node at the exact command `path`.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasEntry {
    pub name: String,
    pub path: String,
}

/// Contents of `trellis.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplConfig {
    /// Prompt printed before each input line.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Aliases registered after the tree is built.
    #[serde(default)]
    pub alias: Vec<AliasEntry>,
    /// Identifier table seeded for `$name` substitution.
    #[serde(default)]
    pub idents: HashMap<String, u64>,
}

fn default_prompt() -> String {
    "> ".to_string()
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            alias: Vec::new(),
            idents: HashMap::new(),
        }
    }
}

/// Parse a config TOML string.
pub fn parse_config(toml_str: &str) -> Result<ReplConfig> {
    toml::from_str(toml_str).map_err(|e| TrellisError::Config(format!("trellis.toml: {e}")))
}

/// Load a config file from disk.
pub fn load_config(path: &Path) -> Result<ReplConfig> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}

/// Apply identifiers and aliases to a built dispatcher.
///
/// Entries that do not resolve are logged and skipped; a bad config line
/// should not take the repl down.
pub fn apply<U>(config: &ReplConfig, dispatcher: &Dispatcher<U>) {
    for (name, value) in &config.idents {
        dispatcher.ident_set(name, *value);
    }
    for entry in &config.alias {
        match resolve_exact(dispatcher, &entry.path) {
            Some(id) => {
                if let Err(e) = dispatcher.alias_add(id, &entry.name) {
                    log::warn!("alias '{}': {e}", entry.name);
                }
            },
            None => {
                log::warn!(
                    "alias '{}': unknown command path '{}'",
                    entry.name,
                    entry.path
                );
            },
        }
    }
}

/// Walk the tree by exact names, one word per level.
fn resolve_exact<U>(dispatcher: &Dispatcher<U>, path: &str) -> Option<NodeId> {
    let mut cursor = None;
    for word in path.split_whitespace() {
        cursor = Some(dispatcher.find(cursor, word)?);
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.prompt, "> ");
        assert!(config.alias.is_empty());
        assert!(config.idents.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
prompt = "trellis> "

[[alias]]
name = "up"
path = "service start"

[idents]
port = 8080
"#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.prompt, "trellis> ");
        assert_eq!(config.alias.len(), 1);
        assert_eq!(config.alias[0].name, "up");
        assert_eq!(config.alias[0].path, "service start");
        assert_eq!(config.idents.get("port"), Some(&8080));
    }

    #[test]
    fn parse_bad_toml_is_config_error() {
        let result = parse_config("this is [[[not valid toml");
        assert!(matches!(result, Err(TrellisError::Config(_))));
    }

    #[test]
    fn apply_resolves_alias_paths() {
        let mut dispatcher: Dispatcher<()> = Dispatcher::new(());
        let service = dispatcher.add_group(None, "service").unwrap();
        let start = dispatcher.add_group(Some(service), "start").unwrap();

        let config = parse_config(
            r#"
[[alias]]
name = "up"
path = "service start"

[[alias]]
name = "down"
path = "service shutdown"

[idents]
port = 9000
"#,
        )
        .unwrap();
        apply(&config, &dispatcher);

        assert_eq!(dispatcher.alias_find("up"), Some(start));
        // unresolvable path is skipped, not fatal
        assert!(dispatcher.alias_find("down").is_none());
        assert_eq!(dispatcher.ident_get("port"), Some(9000));
    }
}
