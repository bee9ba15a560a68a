//! Console stand-in for the chat platform.
//!
//! Each input line is one interaction, `<user>: <text>`, where `<text>` is a
//! start command (`/ponto`) or a button press (`pause`, `resume @owner`, ...).
//! Cards are printed as text blocks; private replies are prefixed with
//! `(only <user>)`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::LazyLock;

use anyhow::Context;
use ponto_core::duration::{CARD_TIMESTAMP_FORMAT, TIME_FORMAT};
use ponto_core::{
    Action, Card, CardBody, ChannelRef, Control, MessageRef, NameResolver, Presenter, UserId,
    format_duration,
};
use regex::Regex;

/// `<user>: <text>`
static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^\s:]+)\s*:\s*(.*?)\s*$").unwrap());

/// `pause`, `resume @42`, `FINISH @ana`
static PRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(pause|resume|finish)(?:\s+@(\S+))?$").unwrap());

/// The console is a single guild channel.
pub fn console_channel() -> ChannelRef {
    ChannelRef::in_guild("console", "console")
}

/// Recognizes start commands: `prefix` followed by one of `aliases`.
#[derive(Debug, Clone)]
pub struct CommandSet {
    prefix: String,
    aliases: Vec<String>,
}

impl CommandSet {
    pub fn new(prefix: impl Into<String>, aliases: &[String]) -> Self {
        Self {
            prefix: prefix.into(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    fn is_start(&self, text: &str) -> bool {
        let Some(rest) = text.strip_prefix(&self.prefix) else {
            return false;
        };
        let name = rest.split_whitespace().next().unwrap_or_default();
        self.aliases.iter().any(|alias| *alias == name.to_lowercase())
    }

    /// Parses one input line into its actor and action. Blank lines and `#`
    /// comments yield `None`.
    pub fn parse_line(&self, line: &str) -> anyhow::Result<Option<(UserId, Action)>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let caps = LINE_RE
            .captures(trimmed)
            .with_context(|| format!("expected '<user>: <text>', got '{trimmed}'"))?;
        let actor = UserId::new(&caps[1]);
        let text = &caps[2];

        if self.is_start(text) {
            let channel = console_channel();
            return Ok(Some((actor, Action::Start { channel })));
        }

        let Some(press) = PRESS_RE.captures(text) else {
            anyhow::bail!("unknown command: {text}");
        };
        let control: Control = press[1].parse().map_err(anyhow::Error::msg)?;
        let owner = press
            .get(2)
            .map_or_else(|| actor.clone(), |m| UserId::new(m.as_str()));
        Ok(Some((actor, Action::Press { control, owner })))
    }
}

/// Prints cards and private replies to a writer.
pub struct ConsolePresenter<W> {
    out: W,
    messages: usize,
}

impl<W: Write> ConsolePresenter<W> {
    pub const fn new(out: W) -> Self {
        Self { out, messages: 0 }
    }

    /// Prints a reply only `user` would see on the chat platform.
    pub fn reply(&mut self, user: &UserId, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "(only {user}) {text}")
    }

    /// Prints an operator notice (e.g. an unreadable input line).
    pub fn notice(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "! {text}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn show(&mut self, card: &Card) -> Option<MessageRef> {
        let (message, edited) = match &card.message {
            Some(message) => (message.clone(), true),
            None => {
                self.messages += 1;
                (MessageRef::new(format!("msg-{}", self.messages)), false)
            }
        };

        let text = render_card(card, &message, edited);
        if let Err(error) = self.out.write_all(text.as_bytes()) {
            tracing::warn!(%error, message = %message, "failed to print card");
            return None;
        }
        Some(message)
    }
}

/// Renders a card as an indented text block.
pub fn render_card(card: &Card, message: &MessageRef, edited: bool) -> String {
    let mut text = String::new();
    let marker = if edited { " (edited)" } else { "" };
    let _ = writeln!(text, "[{message}{marker}] Timeclock");
    let _ = writeln!(text, "  User:         @{}", card.owner);

    match &card.body {
        CardBody::Active | CardBody::Paused => {
            let status = if card.body == CardBody::Active {
                "Active"
            } else {
                "Paused"
            };
            let _ = writeln!(
                text,
                "  Started:      {}",
                card.started_at.format(CARD_TIMESTAMP_FORMAT)
            );
            let _ = writeln!(text, "  Status:       {status}");
        }
        CardBody::Finished {
            ended_at,
            total_worked,
        } => {
            let _ = writeln!(text, "  Shift start:  {}", card.started_at.format(TIME_FORMAT));
            let _ = writeln!(text, "  Shift end:    {}", ended_at.format(TIME_FORMAT));
            let _ = writeln!(text, "  Total worked: {}", format_duration(*total_worked));
        }
    }

    let buttons = card.buttons();
    if !buttons.is_empty() {
        let labels: Vec<String> = buttons
            .iter()
            .map(|b| format!("[{}]", b.control.label()))
            .collect();
        let _ = writeln!(text, "  {}", labels.join(" "));
    }
    text
}

/// Guild display names from the config roster. Only answers inside a guild.
#[derive(Debug, Clone)]
pub struct RosterNicknames(pub BTreeMap<String, String>);

impl NameResolver for RosterNicknames {
    fn name(&self) -> &'static str {
        "guild nickname"
    }

    fn resolve(&self, user: &UserId, channel: &ChannelRef) -> Option<String> {
        channel.guild_id.as_ref()?;
        self.0.get(user.as_str()).cloned()
    }
}

/// Global usernames from the config roster.
#[derive(Debug, Clone)]
pub struct RosterUsernames(pub BTreeMap<String, String>);

impl NameResolver for RosterUsernames {
    fn name(&self) -> &'static str {
        "username"
    }

    fn resolve(&self, user: &UserId, _channel: &ChannelRef) -> Option<String> {
        self.0.get(user.as_str()).cloned()
    }
}
