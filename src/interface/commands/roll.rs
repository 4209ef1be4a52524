//! # Roll Command
//!
//! Handles `roll [sides] [--count N]`: rolls dice.

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

use crate::application::arguments::{ArgValue, ArgumentSpec, ValueType};
use crate::domain::traits::{Command, CommandContext, CommandManifest};
use crate::strings::messages;

const MAX_SIDES: i64 = 1000;
const MAX_COUNT: i64 = 100;

pub struct Roll;

#[async_trait]
impl Command for Roll {
    fn manifest(&self) -> CommandManifest {
        CommandManifest::new("roll", "Roll some dice")
            .alias("dice")
            .argument(
                ArgumentSpec::positional("sides", ValueType::Integer)
                    .default(ArgValue::Int(6))
                    .help("Sides per die (default 6)"),
            )
            .argument(
                ArgumentSpec::flag("count", ValueType::Integer)
                    .alias("-c")
                    .default(ArgValue::Int(1))
                    .help("How many dice to roll"),
            )
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> Result<()> {
        let sides = ctx.args.int("sides").unwrap_or(6);
        let count = ctx.args.int("count").unwrap_or(1);

        if !(2..=MAX_SIDES).contains(&sides) || !(1..=MAX_COUNT).contains(&count) {
            ctx.reply(messages::ROLL_RANGE).await?;
            return Ok(());
        }

        let rolls: Vec<i64> = {
            let mut rng = rand::rng();
            (0..count).map(|_| rng.random_range(1..=sides)).collect()
        };
        ctx.reply(&messages::dice_result(count, sides, &rolls)).await?;
        Ok(())
    }
}
