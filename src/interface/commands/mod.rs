//! # Command Plugins
//!
//! Built-in command implementations. Every plugin is listed explicitly in
//! [`builtin`]; the registry receives this list at startup.

pub mod help;
pub mod ping;
pub mod roll;
pub mod rps;
pub mod say;

use std::sync::Arc;

use crate::domain::traits::Command;

pub fn builtin() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(ping::Ping),
        Arc::new(help::Help),
        Arc::new(roll::Roll),
        Arc::new(rps::RockPaperScissors),
        Arc::new(say::Say),
    ]
}
