//! # Help Command
//!
//! Handles the `help` command.
//! Lists every registered command, or shows the usage of a single one.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::arguments::{ArgumentSpec, ValueType};
use crate::domain::traits::{Command, CommandContext, CommandManifest};
use crate::strings::{help, messages};

pub struct Help;

#[async_trait]
impl Command for Help {
    fn manifest(&self) -> CommandManifest {
        CommandManifest::new("help", "List all commands")
            .alias("h")
            .argument(
                ArgumentSpec::positional("command", ValueType::String)
                    .optional()
                    .help("Show details for one command"),
            )
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> Result<()> {
        let prefix = &ctx.config.command_prefix;
        let text = match ctx.args.str("command") {
            Some(name) => {
                let name = name.strip_prefix(prefix.as_str()).unwrap_or(name);
                match ctx.registry.resolve(name) {
                    Some(entry) => help::command_details(prefix, entry),
                    None => messages::unknown_help_topic(prefix, name),
                }
            }
            None => help::command_list(prefix, ctx.registry.iter()),
        };
        ctx.reply(&text).await?;
        Ok(())
    }
}
