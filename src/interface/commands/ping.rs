//! # Ping Command
//!
//! Handles `ping`: liveness check.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::traits::{Command, CommandContext, CommandManifest};

pub struct Ping;

#[async_trait]
impl Command for Ping {
    fn manifest(&self) -> CommandManifest {
        CommandManifest::new("ping", "Ping the bot").alias("p")
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> Result<()> {
        ctx.reply(crate::strings::messages::PONG).await?;
        Ok(())
    }
}
