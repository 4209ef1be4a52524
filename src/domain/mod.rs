//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the bot.
//! Independent of the Matrix SDK, serving as the contract for the other layers.

pub mod config;
pub mod traits;
pub mod types;
