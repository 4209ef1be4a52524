//! # Application Layer
//!
//! Contains the core logic of the bot: the command registry, the argument schema parser,
//! dispatch of incoming messages, the keyword engine and its cooldown gate.

pub mod arguments;
pub mod cooldown;
pub mod dispatcher;
pub mod errors;
pub mod health;
pub mod keywords;
pub mod registry;

#[cfg(test)]
pub mod testing;
