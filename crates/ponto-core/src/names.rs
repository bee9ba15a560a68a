//! Display-name resolution for finished records.
//!
//! Names come from an ordered list of sources (guild nickname, global
//! username, ...). A source that cannot answer returns `None` and the next one
//! is tried; when every source misses, a synthetic label with the raw user id
//! is used.

use crate::session::{ChannelRef, UserId};

/// A single source of display names.
pub trait NameResolver {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Resolves `user` in the context of the channel the session started in.
    fn resolve(&self, user: &UserId, channel: &ChannelRef) -> Option<String>;
}

/// Ordered chain of [`NameResolver`]s.
#[derive(Default)]
pub struct DisplayNames {
    sources: Vec<Box<dyn NameResolver>>,
}

impl DisplayNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source, tried after every source added before it.
    #[must_use]
    pub fn with(mut self, source: impl NameResolver + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Resolves a display name; never fails.
    pub fn resolve(&self, user: &UserId, channel: &ChannelRef) -> String {
        for source in &self.sources {
            match source.resolve(user, channel) {
                Some(name) if !name.trim().is_empty() => {
                    tracing::debug!(user = %user, source = source.name(), "resolved display name");
                    return name;
                }
                _ => tracing::debug!(user = %user, source = source.name(), "display name not found"),
            }
        }
        fallback_label(user)
    }
}

impl std::fmt::Debug for DisplayNames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.name()))
            .finish()
    }
}

/// Label used when no source knows the user.
pub fn fallback_label(user: &UserId) -> String {
    format!("User ID: {user}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Table {
        label: &'static str,
        guild_scoped: bool,
        names: HashMap<&'static str, &'static str>,
    }

    impl NameResolver for Table {
        fn name(&self) -> &'static str {
            self.label
        }

        fn resolve(&self, user: &UserId, channel: &ChannelRef) -> Option<String> {
            if self.guild_scoped && channel.guild_id.is_none() {
                return None;
            }
            self.names.get(user.as_str()).map(|n| (*n).to_string())
        }
    }

    fn chain() -> DisplayNames {
        DisplayNames::new()
            .with(Table {
                label: "nickname",
                guild_scoped: true,
                names: HashMap::from([("1", "Ana (RH)")]),
            })
            .with(Table {
                label: "username",
                guild_scoped: false,
                names: HashMap::from([("1", "ana"), ("2", "bruno"), ("3", " ")]),
            })
    }

    #[test]
    fn earlier_sources_win() {
        let guild = ChannelRef::in_guild("g", "c");
        assert_eq!(chain().resolve(&UserId::new("1"), &guild), "Ana (RH)");
    }

    #[test]
    fn falls_through_missing_sources() {
        let guild = ChannelRef::in_guild("g", "c");
        assert_eq!(chain().resolve(&UserId::new("2"), &guild), "bruno");
        // Outside a guild the nickname source has nothing to say.
        assert_eq!(chain().resolve(&UserId::new("1"), &ChannelRef::direct("dm")), "ana");
    }

    #[test]
    fn synthetic_label_when_everything_misses() {
        let guild = ChannelRef::in_guild("g", "c");
        assert_eq!(chain().resolve(&UserId::new("99"), &guild), "User ID: 99");
        assert_eq!(chain().resolve(&UserId::new("3"), &guild), "User ID: 3");
        assert_eq!(DisplayNames::new().resolve(&UserId::new("5"), &guild), "User ID: 5");
    }
}
