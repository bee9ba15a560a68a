//! Status cards: the view model handed to the presentation layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local};

use crate::session::{ChannelRef, MessageRef, Session, SessionStatus, UserId};

/// An interactive control attached to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Pause,
    Resume,
    Finish,
}

impl Control {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Finish => "finish",
        }
    }

    /// Button caption.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::Finish => "Finish shift",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "finish" => Ok(Self::Finish),
            _ => Err(format!("unknown control: {s}")),
        }
    }
}

/// A control bound to the user who owns the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub control: Control,
    pub owner: UserId,
}

/// What a card currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Active,
    Paused,
    Finished {
        ended_at: DateTime<Local>,
        total_worked: Duration,
    },
}

/// Everything a presenter needs to draw (or redraw) a session's card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub owner: UserId,
    pub channel: ChannelRef,
    /// Message already showing this session, if any; presenters edit it in place.
    pub message: Option<MessageRef>,
    pub started_at: DateTime<Local>,
    pub body: CardBody,
}

impl Card {
    /// Card for an open session in its current status.
    pub fn open(session: &Session) -> Self {
        let body = match session.status {
            SessionStatus::Active => CardBody::Active,
            SessionStatus::Paused => CardBody::Paused,
        };
        Self {
            owner: session.user_id.clone(),
            channel: session.channel.clone(),
            message: session.message.clone(),
            started_at: session.started_at,
            body,
        }
    }

    /// Final card for a session that has just been recorded.
    pub fn finished(session: &Session, ended_at: DateTime<Local>, total_worked: Duration) -> Self {
        Self {
            body: CardBody::Finished {
                ended_at,
                total_worked,
            },
            ..Self::open(session)
        }
    }

    /// Controls offered in the current state. Finished cards have none.
    pub fn buttons(&self) -> Vec<Button> {
        let controls: &[Control] = match self.body {
            CardBody::Active => &[Control::Pause, Control::Finish],
            CardBody::Paused => &[Control::Resume, Control::Finish],
            CardBody::Finished { .. } => &[],
        };
        controls
            .iter()
            .map(|&control| Button {
                control,
                owner: self.owner.clone(),
            })
            .collect()
    }
}

/// Renders cards on the chat surface.
pub trait Presenter {
    /// Shows `card`, editing `card.message` when set, and returns the message
    /// now showing it. Rendering problems are the presenter's to report.
    fn show(&mut self, card: &Card) -> Option<MessageRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::start(UserId::new("9"), ChannelRef::direct("dm"), Local::now())
    }

    #[test]
    fn buttons_follow_state() {
        let mut session = session();
        let active = Card::open(&session);
        let controls: Vec<_> = active.buttons().into_iter().map(|b| b.control).collect();
        assert_eq!(controls, vec![Control::Pause, Control::Finish]);

        session.pause(Local::now());
        let paused = Card::open(&session);
        let controls: Vec<_> = paused.buttons().into_iter().map(|b| b.control).collect();
        assert_eq!(controls, vec![Control::Resume, Control::Finish]);
        assert!(paused.buttons().iter().all(|b| b.owner == UserId::new("9")));

        let finished = Card::finished(&session, Local::now(), Duration::zero());
        assert!(finished.buttons().is_empty());
    }

    #[test]
    fn control_parses_case_insensitively() {
        assert_eq!("PAUSE".parse::<Control>(), Ok(Control::Pause));
        assert_eq!("finish".parse::<Control>(), Ok(Control::Finish));
        assert!("stop".parse::<Control>().is_err());
    }
}
