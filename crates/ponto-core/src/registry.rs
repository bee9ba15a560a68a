//! In-memory registry of open sessions, keyed by user.

use std::collections::HashMap;

use crate::session::{Session, UserId};

/// Open sessions by owner.
///
/// The registry is the only place an open session lives; nothing here is
/// persisted, so a process restart forgets every open session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<UserId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &UserId) -> Option<&Session> {
        self.sessions.get(user_id)
    }

    pub fn get_mut(&mut self, user_id: &UserId) -> Option<&mut Session> {
        self.sessions.get_mut(user_id)
    }

    /// Inserts a session, returning the one it replaced.
    ///
    /// Callers must check for an open session first; replacing one silently
    /// discards its worked time.
    pub fn put(&mut self, user_id: UserId, session: Session) -> Option<Session> {
        self.sessions.insert(user_id, session)
    }

    /// Removes a user's session. Absent users are a no-op.
    pub fn remove(&mut self, user_id: &UserId) -> Option<Session> {
        self.sessions.remove(user_id)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.sessions.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
