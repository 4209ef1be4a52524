//! # Help Text
//!
//! Formatting for the `help` command: the command list and per-command details.

use crate::application::registry::CommandEntry;

pub const HEADER: &str = "**🤖 Commands**";

/// One list line, e.g. `* ping (p): Ping the bot`.
pub fn command_line(entry: &CommandEntry) -> String {
    let manifest = &entry.manifest;
    let aliases = if manifest.aliases.is_empty() {
        String::new()
    } else {
        format!(" ({})", manifest.aliases.join(", "))
    };
    format!("* `{}`{}: {}", manifest.name, aliases, manifest.description)
}

pub fn command_list<'a>(prefix: &str, entries: impl Iterator<Item = &'a CommandEntry>) -> String {
    let mut text = format!("{HEADER}\nUse: `{prefix}command args`\n\n");
    for entry in entries {
        text.push_str(&command_line(entry));
        text.push('\n');
    }
    text
}

pub fn command_details(prefix: &str, entry: &CommandEntry) -> String {
    let mut text = format!(
        "**{}** - {}\nUsage: `{}{}`\n",
        entry.manifest.name,
        entry.manifest.description,
        prefix,
        entry.schema.usage()
    );
    if !entry.manifest.aliases.is_empty() {
        text.push_str(&format!("Aliases: {}\n", entry.manifest.aliases.join(", ")));
    }
    for spec in entry.schema.arguments() {
        if let Some(help) = &spec.help {
            text.push_str(&format!("* `{}`: {}\n", spec.usage(), help));
        }
    }
    text
}
