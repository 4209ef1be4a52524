//! # Rock Paper Scissors
//!
//! Handles `rps <move>`: one round against the bot.

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::IndexedRandom;

use crate::application::arguments::{ArgumentSpec, ValueType};
use crate::domain::traits::{Command, CommandContext, CommandManifest};
use crate::strings::messages;

const MOVES: [&str; 3] = ["rock", "paper", "scissors"];

/// `true` when `a` beats `b`.
fn beats(a: &str, b: &str) -> bool {
    matches!(
        (a, b),
        ("rock", "scissors") | ("paper", "rock") | ("scissors", "paper")
    )
}

pub struct RockPaperScissors;

#[async_trait]
impl Command for RockPaperScissors {
    fn manifest(&self) -> CommandManifest {
        CommandManifest::new("rps", "Play a game of rock paper scissors")
            .alias("rockpaperscissors")
            .argument(ArgumentSpec::positional(
                "move",
                ValueType::Choice(MOVES.iter().map(|m| m.to_string()).collect()),
            ))
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> Result<()> {
        let user = ctx.args.str("move").unwrap_or("rock");
        let bot = MOVES.choose(&mut rand::rng()).copied().unwrap_or("rock");

        let verdict = if user == bot {
            messages::RPS_TIE
        } else if beats(user, bot) {
            messages::RPS_WIN
        } else {
            messages::RPS_LOSE
        };
        ctx.reply(&messages::rps_result(user, bot, verdict)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules() {
        assert!(beats("rock", "scissors"));
        assert!(beats("paper", "rock"));
        assert!(beats("scissors", "paper"));
        assert!(!beats("rock", "paper"));
        assert!(!beats("rock", "rock"));
    }
}
