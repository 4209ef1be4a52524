//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes error replies, the invite greeting and startup log lines.

use crate::domain::types::OutgoingMessage;

pub fn welcome(prefix: &str) -> String {
    format!("Hello bitches! 👋 Type `{prefix}help` to see what I can do.")
}

/// Sent as explicit HTML: `err` and `usage` echo user input.
pub fn usage_error(err: &str, prefix: &str, usage: &str) -> OutgoingMessage {
    OutgoingMessage::html(
        format!("⚠️ {err}\nUsage: {prefix}{usage}"),
        format!(
            "⚠️ {}<br>Usage: <code>{}{}</code>",
            escape_html(err),
            escape_html(prefix),
            escape_html(usage)
        ),
    )
}

pub fn command_failed(command: &str, err: &str) -> OutgoingMessage {
    OutgoingMessage::html(
        format!("❌ Error executing command {command}:\n{err}"),
        format!(
            "❌ <strong>Error executing command</strong> <code>{}</code>:<pre><code>{}</code></pre>",
            escape_html(command),
            escape_html(err)
        ),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn handler_timed_out(secs: u64) -> String {
    format!("timed out after {secs}s")
}

pub const PONG: &str = "Pong!";

pub fn unknown_help_topic(prefix: &str, name: &str) -> String {
    format!("No command called `{name}`. Try `{prefix}help` for the full list.")
}

pub fn dice_result(count: i64, sides: i64, rolls: &[i64]) -> String {
    let total: i64 = rolls.iter().sum();
    if rolls.len() == 1 {
        format!("🎲 You rolled a **{total}** (d{sides})")
    } else {
        let listed: Vec<String> = rolls.iter().map(i64::to_string).collect();
        format!(
            "🎲 {count}d{sides}: {} = **{total}**",
            listed.join(" + ")
        )
    }
}

pub const ROLL_RANGE: &str = "Sides must be between 2 and 1000, count between 1 and 100.";

pub fn rps_result(user: &str, bot: &str, verdict: &str) -> String {
    format!("You chose `{user}`, I chose `{bot}`!\n\n{verdict}")
}

pub const RPS_TIE: &str = "It's a tie!";
pub const RPS_WIN: &str = "You **win**! Whoohoo!";
pub const RPS_LOSE: &str = "you **LOSE** dumbass";

pub fn config_loaded(user: &str) -> String {
    format!("Loaded configuration for user: {user}")
}

pub const NO_PASSWORD: &str =
    "No password configured: set `password` in the config file or BOT_PASSWORD";

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub const SHUTDOWN: &str = "Shutting down...";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_text_is_escaped_in_html() {
        let msg = usage_error("bad value `x`<script>", "!", "say <text>");
        let html = msg.html.unwrap();
        assert!(html.contains("bad value `x`&lt;script&gt;"));
        assert!(html.contains("<code>!say &lt;text&gt;</code>"));
        assert!(!html.contains("<script>"));

        let msg = command_failed("say", "```</code><img src=x>");
        let html = msg.html.unwrap();
        assert!(html.ends_with("<pre><code>```&lt;/code&gt;&lt;img src=x&gt;</code></pre>"));
        assert_eq!(msg.body, "❌ Error executing command say:\n```</code><img src=x>");
    }
}
