//! Open work sessions and the identifiers they carry.

use std::fmt;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::duration::elapsed;

/// Stable identifier of a chat user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a session was started: the channel and, when it belongs to one, the guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub channel_id: String,
    pub guild_id: Option<String>,
}

impl ChannelRef {
    /// A channel that belongs to a guild (server).
    pub fn in_guild(guild_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            guild_id: Some(guild_id.into()),
        }
    }

    /// A channel outside any guild, e.g. a direct message.
    pub fn direct(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            guild_id: None,
        }
    }
}

/// Opaque handle of the message showing a session's card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRef(String);

impl MessageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Paused,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's open work session.
///
/// `accumulated` covers closed sub-periods only; while `Active`, the running
/// sub-period since `period_started_at` is added on top (see [`Session::worked`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub started_at: DateTime<Local>,
    pub period_started_at: DateTime<Local>,
    pub accumulated: Duration,
    pub status: SessionStatus,
    pub channel: ChannelRef,
    pub message: Option<MessageRef>,
}

impl Session {
    /// A freshly started, active session with nothing accumulated.
    pub fn start(user_id: UserId, channel: ChannelRef, now: DateTime<Local>) -> Self {
        Self {
            user_id,
            started_at: now,
            period_started_at: now,
            accumulated: Duration::zero(),
            status: SessionStatus::Active,
            channel,
            message: None,
        }
    }

    /// Total worked time as of `now`, including the running sub-period.
    pub fn worked(&self, now: &DateTime<Local>) -> Duration {
        match self.status {
            SessionStatus::Active => self.accumulated + elapsed(&self.period_started_at, now),
            SessionStatus::Paused => self.accumulated,
        }
    }

    pub(crate) fn pause(&mut self, now: DateTime<Local>) {
        self.accumulated += elapsed(&self.period_started_at, &now);
        self.period_started_at = now;
        self.status = SessionStatus::Paused;
    }

    pub(crate) fn resume(&mut self, now: DateTime<Local>) {
        self.period_started_at = now;
        self.status = SessionStatus::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 10, h, m, 0).single().unwrap()
    }

    #[test]
    fn worked_includes_running_period_only_when_active() {
        let mut session = Session::start(UserId::new("42"), ChannelRef::direct("dm"), at(9, 0));
        assert_eq!(session.worked(&at(9, 20)), Duration::minutes(20));

        session.pause(at(9, 30));
        assert_eq!(session.accumulated, Duration::minutes(30));
        assert_eq!(session.worked(&at(11, 0)), Duration::minutes(30));

        session.resume(at(9, 45));
        assert_eq!(session.worked(&at(10, 0)), Duration::minutes(45));
        assert_eq!(session.started_at, at(9, 0));
    }

    #[test]
    fn status_display() {
        assert_eq!(SessionStatus::Active.to_string(), "active");
        assert_eq!(SessionStatus::Paused.to_string(), "paused");
    }
}
