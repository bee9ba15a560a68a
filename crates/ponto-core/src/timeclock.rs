//! Session lifecycle: start, pause, resume and finish.
//!
//! # States
//!
//! A user has no session, an `Active` one or a `Paused` one. `finish` is
//! reachable from both open states; it appends a [`FinishedRecord`] to the
//! sink and, only once that succeeds, drops the session from the registry.
//!
//! # Turns
//!
//! Every action takes `&mut self` and runs to completion, so transitions for
//! the same user never interleave. A host serving events from several threads
//! must put the `Timeclock` behind a mutex (or a per-user actor).

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::card::{Card, Control, Presenter};
use crate::names::DisplayNames;
use crate::record::{FinishedRecord, RecordSink, SinkError};
use crate::registry::SessionRegistry;
use crate::session::{ChannelRef, Session, SessionStatus, UserId};

/// Why an action is illegal in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("you already have an open session; use the buttons on its card")]
    AlreadyOpen,
    #[error("you have no open session")]
    NoOpenSession,
    #[error("your session is already active")]
    AlreadyActive,
    #[error("your session is already paused")]
    AlreadyPaused,
}

/// Errors returned by [`Timeclock`] actions. None of them change state.
#[derive(Debug, Error)]
pub enum TimeclockError {
    /// The acting user does not own the session the control belongs to.
    #[error("{actor} cannot act on a session owned by {owner}")]
    Unauthorized { actor: UserId, owner: UserId },
    /// The action is not valid for the session's current state.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// The finished record could not be stored; the session stays open.
    #[error("could not save the finished session for {user}; try finishing again")]
    Persistence {
        user: UserId,
        #[source]
        source: SinkError,
    },
}

impl TimeclockError {
    /// True when retrying the same action later may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start command issued in `channel`.
    Start { channel: ChannelRef },
    /// A card button pressed; `owner` is the user the card belongs to.
    Press { control: Control, owner: UserId },
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started(Session),
    Paused(Session),
    Resumed(Session),
    Finished(FinishedRecord),
}

/// The time clock: owns open sessions and drives their lifecycle.
#[derive(Debug)]
pub struct Timeclock<S, P> {
    registry: SessionRegistry,
    sink: S,
    presenter: P,
    names: DisplayNames,
}

impl<S: RecordSink, P: Presenter> Timeclock<S, P> {
    pub fn new(sink: S, presenter: P, names: DisplayNames) -> Self {
        Self {
            registry: SessionRegistry::new(),
            sink,
            presenter,
            names,
        }
    }

    pub fn session(&self, user: &UserId) -> Option<&Session> {
        self.registry.get(user)
    }

    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Applies one interaction by `actor` at `now`.
    pub fn apply(
        &mut self,
        actor: &UserId,
        action: Action,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        let (control, owner) = match action {
            Action::Start { channel } => return self.start(actor, channel, now),
            Action::Press { control, owner } => (control, owner),
        };

        if *actor != owner {
            tracing::info!(actor = %actor, owner = %owner, %control, "rejected foreign control");
            return Err(TimeclockError::Unauthorized {
                actor: actor.clone(),
                owner,
            });
        }

        let status = self.registry.get(&owner).map(|s| s.status);
        match (status, control) {
            (None, _) => Err(Rejection::NoOpenSession.into()),
            (Some(SessionStatus::Active), Control::Pause) => self.pause_open(&owner, now),
            (Some(SessionStatus::Paused), Control::Resume) => self.resume_open(&owner, now),
            (Some(SessionStatus::Active), Control::Resume) => Err(Rejection::AlreadyActive.into()),
            (Some(SessionStatus::Paused), Control::Pause) => Err(Rejection::AlreadyPaused.into()),
            (Some(_), Control::Finish) => self.finish_open(&owner, now),
        }
    }

    /// Opens a session for `actor`.
    pub fn start(
        &mut self,
        actor: &UserId,
        channel: ChannelRef,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        if self.registry.contains(actor) {
            return Err(Rejection::AlreadyOpen.into());
        }

        let mut session = Session::start(actor.clone(), channel, now);
        session.message = self.presenter.show(&Card::open(&session));
        self.registry.put(actor.clone(), session.clone());

        tracing::info!(user = %actor, started_at = %now, "session started");
        Ok(Transition::Started(session))
    }

    pub fn pause(
        &mut self,
        actor: &UserId,
        owner: &UserId,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        self.press(actor, owner, Control::Pause, now)
    }

    pub fn resume(
        &mut self,
        actor: &UserId,
        owner: &UserId,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        self.press(actor, owner, Control::Resume, now)
    }

    pub fn finish(
        &mut self,
        actor: &UserId,
        owner: &UserId,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        self.press(actor, owner, Control::Finish, now)
    }

    fn press(
        &mut self,
        actor: &UserId,
        owner: &UserId,
        control: Control,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        let action = Action::Press {
            control,
            owner: owner.clone(),
        };
        self.apply(actor, action, now)
    }

    fn pause_open(
        &mut self,
        owner: &UserId,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        let session = self
            .registry
            .get_mut(owner)
            .ok_or(Rejection::NoOpenSession)?;
        session.pause(now);
        if let Some(message) = self.presenter.show(&Card::open(session)) {
            session.message = Some(message);
        }

        tracing::info!(
            user = %owner,
            accumulated_s = session.accumulated.num_seconds(),
            "session paused"
        );
        Ok(Transition::Paused(session.clone()))
    }

    fn resume_open(
        &mut self,
        owner: &UserId,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        let session = self
            .registry
            .get_mut(owner)
            .ok_or(Rejection::NoOpenSession)?;
        session.resume(now);
        if let Some(message) = self.presenter.show(&Card::open(session)) {
            session.message = Some(message);
        }

        tracing::info!(user = %owner, "session resumed");
        Ok(Transition::Resumed(session.clone()))
    }

    /// Records the session, then removes it. The session is left untouched if
    /// the sink refuses the record.
    fn finish_open(
        &mut self,
        owner: &UserId,
        now: DateTime<Local>,
    ) -> Result<Transition, TimeclockError> {
        let Some(session) = self.registry.get(owner) else {
            return Err(Rejection::NoOpenSession.into());
        };

        let total_worked = session.worked(&now);
        let display_name = self.names.resolve(owner, &session.channel);
        let record = FinishedRecord::new(session, display_name, total_worked, &now);

        if let Err(source) = self.sink.append(&record) {
            tracing::warn!(user = %owner, error = %source, "failed to persist finished session");
            return Err(TimeclockError::Persistence {
                user: owner.clone(),
                source,
            });
        }

        if let Some(session) = self.registry.remove(owner) {
            self.presenter.show(&Card::finished(&session, now, total_worked));
        }
        tracing::info!(
            user = %owner,
            name = %record.display_name,
            total = %record.total_worked_text(),
            "session finished"
        );
        Ok(Transition::Finished(record))
    }
}
