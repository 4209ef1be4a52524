//! # Command Registry
//!
//! Holds the command plugins known to the bot, keyed by name and by alias.
//! Plugins are handed in through an explicit list; each manifest is validated on the
//! way in and a bad or colliding plugin is skipped without affecting the rest.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::arguments::{Schema, validate_arguments};
use crate::application::errors::RegistryError;
use crate::domain::traits::{Command, CommandManifest};

pub struct CommandEntry {
    pub manifest: CommandManifest,
    pub schema: Schema,
    pub handler: Arc<dyn Command>,
}

/// Name and alias lookup tables. Built once at startup, read-only afterwards.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    names: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every plugin that passes validation. Failures are logged and skipped.
    pub fn load(commands: impl IntoIterator<Item = Arc<dyn Command>>) -> Self {
        let mut registry = Self::new();
        for command in commands {
            match registry.register(command) {
                Ok(name) => tracing::info!("Loaded command: {}", name),
                Err(e) => tracing::warn!("Skipping command plugin: {}", e),
            }
        }
        tracing::info!(
            "Command registry ready: {} commands, {} aliases",
            registry.entries.len(),
            registry.aliases.len()
        );
        registry
    }

    /// Adds one plugin. The first registration of a name or alias wins; later
    /// plugins that collide with it are refused as a whole.
    pub fn register(&mut self, handler: Arc<dyn Command>) -> Result<String, RegistryError> {
        let manifest = normalize_manifest(handler.manifest())?;

        if let Some(owner) = self.owner_of(&manifest.name) {
            return Err(if owner == manifest.name {
                RegistryError::DuplicateName(manifest.name)
            } else {
                RegistryError::DuplicateAlias {
                    alias: manifest.name,
                    owner,
                }
            });
        }
        for alias in &manifest.aliases {
            if let Some(owner) = self.owner_of(alias) {
                return Err(RegistryError::DuplicateAlias {
                    alias: alias.clone(),
                    owner,
                });
            }
        }

        let index = self.entries.len();
        self.names.insert(manifest.name.clone(), index);
        for alias in &manifest.aliases {
            self.aliases.insert(alias.clone(), index);
        }

        let name = manifest.name.clone();
        self.entries.push(CommandEntry {
            schema: Schema::from_manifest(&manifest),
            manifest,
            handler,
        });
        Ok(name)
    }

    fn owner_of(&self, token: &str) -> Option<String> {
        self.names
            .get(token)
            .or_else(|| self.aliases.get(token))
            .map(|&i| self.entries[i].manifest.name.clone())
    }

    /// Looks `token` up as a command name first, then as an alias.
    pub fn resolve(&self, token: &str) -> Option<&CommandEntry> {
        let token = token.to_lowercase();
        self.names
            .get(&token)
            .or_else(|| self.aliases.get(&token))
            .map(|&i| &self.entries[i])
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn check_command_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("name is empty".to_string());
    }
    if token.chars().any(char::is_whitespace) {
        return Err(format!("`{token}` contains whitespace"));
    }
    if token.starts_with('-') {
        return Err(format!("`{token}` starts with `-`"));
    }
    Ok(())
}

/// Lowercases names and aliases and checks the manifest is usable.
fn normalize_manifest(mut manifest: CommandManifest) -> Result<CommandManifest, RegistryError> {
    let invalid = |command: &str, reason: String| RegistryError::InvalidManifest {
        command: command.to_string(),
        reason,
    };

    manifest.name = manifest.name.trim().to_lowercase();
    check_command_token(&manifest.name).map_err(|r| invalid(&manifest.name, r))?;

    let mut aliases: Vec<String> = Vec::with_capacity(manifest.aliases.len());
    for alias in &manifest.aliases {
        let alias = alias.trim().to_lowercase();
        check_command_token(&alias).map_err(|r| invalid(&manifest.name, r))?;
        if alias == manifest.name {
            return Err(invalid(
                &manifest.name,
                format!("alias `{alias}` repeats the command name"),
            ));
        }
        if aliases.contains(&alias) {
            return Err(invalid(&manifest.name, format!("alias `{alias}` is listed twice")));
        }
        aliases.push(alias);
    }
    manifest.aliases = aliases;

    validate_arguments(&manifest.arguments).map_err(|r| invalid(&manifest.name, r))?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::arguments::{ArgumentSpec, ValueType};
    use crate::domain::traits::CommandContext;
    use async_trait::async_trait;

    struct Stub(CommandManifest);

    #[async_trait]
    impl Command for Stub {
        fn manifest(&self) -> CommandManifest {
            self.0.clone()
        }

        async fn execute(&self, _ctx: CommandContext<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn stub(manifest: CommandManifest) -> Arc<dyn Command> {
        Arc::new(Stub(manifest))
    }

    #[test]
    fn test_alias_resolves_to_same_handler() {
        let ping = stub(CommandManifest::new("ping", "Ping").alias("p").alias("pong"));
        let registry = CommandRegistry::load(vec![ping.clone()]);

        let by_name = registry.resolve("ping").unwrap();
        let by_alias = registry.resolve("p").unwrap();
        assert!(Arc::ptr_eq(&by_name.handler, &by_alias.handler));
        assert!(Arc::ptr_eq(&by_name.handler, &ping));
        assert_eq!(registry.resolve("pong").unwrap().manifest.name, "ping");
        assert!(registry.resolve("PING").is_some());
        assert!(registry.resolve("unknown").is_none());
    }

    #[test]
    fn test_invalid_manifest_skipped_loading_continues() {
        let registry = CommandRegistry::load(vec![
            stub(CommandManifest::new("", "no name")),
            stub(CommandManifest::new("two words", "bad")),
            stub(CommandManifest::new("self", "bad").alias("self")),
            stub(
                CommandManifest::new("choice", "bad")
                    .argument(ArgumentSpec::positional("c", ValueType::Choice(vec![]))),
            ),
            stub(CommandManifest::new("ok", "fine")),
        ]);
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("ok").is_some());
    }

    #[test]
    fn test_duplicates_rejected_first_wins() {
        let mut registry = CommandRegistry::new();
        registry
            .register(stub(CommandManifest::new("roll", "first").alias("dice")))
            .unwrap();

        let err = registry
            .register(stub(CommandManifest::new("Roll", "second")))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("roll".to_string()));

        let err = registry
            .register(stub(CommandManifest::new("cube", "third").alias("dice")))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateAlias {
                alias: "dice".to_string(),
                owner: "roll".to_string()
            }
        );

        let err = registry
            .register(stub(CommandManifest::new("dice", "fourth")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAlias { .. }));

        let err = registry
            .register(stub(CommandManifest::new("other", "fifth").alias("roll")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAlias { .. }));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("dice").unwrap().manifest.description, "first");
        assert!(registry.resolve("cube").is_none());
    }

    #[test]
    fn test_iter_keeps_registration_order() {
        let registry = CommandRegistry::load(vec![
            stub(CommandManifest::new("b", "")),
            stub(CommandManifest::new("a", "")),
        ]);
        let names: Vec<&str> = registry.iter().map(|e| e.manifest.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
