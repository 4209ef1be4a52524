//! # Say Command
//!
//! Handles `say <text> [--loud]`: repeats the given text.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::arguments::{ArgumentSpec, ValueType};
use crate::domain::traits::{Command, CommandContext, CommandManifest};

pub struct Say;

#[async_trait]
impl Command for Say {
    fn manifest(&self) -> CommandManifest {
        CommandManifest::new("say", "Make the bot say something")
            .alias("echo")
            .argument(ArgumentSpec::rest("text").help("What to say"))
            .argument(
                ArgumentSpec::flag("loud", ValueType::Boolean)
                    .alias("-l")
                    .help("SHOUT IT"),
            )
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> Result<()> {
        let text = ctx.args.str("text").unwrap_or_default();
        let text = if ctx.args.flag("loud") {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        ctx.reply(&text).await?;
        Ok(())
    }
}
