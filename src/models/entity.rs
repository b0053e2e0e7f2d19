// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Glue shared by the four entity collections.
//!
//! - [`EntityKind`] names a collection.
//! - [`Entity`] is implemented by the stored (string-keyed) entity types.
//! - [`EntityDoc`] holds any one stored entity.
//! - [`Link`] names a relationship field and knows its inverse.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use crate::models::{Challenge, DedupSet, Group, Track, User};

/// Stored identifier type.
pub type EntityId = String;

/// One of the four top-level collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Track,
    User,
    Group,
    Challenge,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Track,
        EntityKind::User,
        EntityKind::Group,
        EntityKind::Challenge,
    ];

    /// Collection name, also used as the HTTP path segment.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Track => crate::db::collections::TRACKS,
            EntityKind::User => crate::db::collections::USERS,
            EntityKind::Group => crate::db::collections::GROUPS,
            EntityKind::Challenge => crate::db::collections::CHALLENGES,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Track => "Track",
            EntityKind::User => "User",
            EntityKind::Group => "Group",
            EntityKind::Challenge => "Challenge",
        };
        f.write_str(name)
    }
}

/// A relationship field holding ids of another (or the same) kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// `Track.users`: users who completed the track
    TrackUsers,
    /// `User.users`: friends
    UserFriends,
    /// `User.groups`
    UserGroups,
    /// `User.tracks`: favorite tracks
    UserTracks,
    /// `User.challenges`
    UserChallenges,
    /// `Group.users`: members
    GroupUsers,
    /// `Group.tracks`: favorite tracks
    GroupTracks,
    /// `Challenge.users`: participants
    ChallengeUsers,
    /// `Challenge.tracks`
    ChallengeTracks,
}

impl Link {
    pub const ALL: [Link; 9] = [
        Link::TrackUsers,
        Link::UserFriends,
        Link::UserGroups,
        Link::UserTracks,
        Link::UserChallenges,
        Link::GroupUsers,
        Link::GroupTracks,
        Link::ChallengeUsers,
        Link::ChallengeTracks,
    ];

    /// Kind of entity that holds the field.
    pub fn owner(self) -> EntityKind {
        match self {
            Link::TrackUsers => EntityKind::Track,
            Link::UserFriends | Link::UserGroups | Link::UserTracks | Link::UserChallenges => {
                EntityKind::User
            }
            Link::GroupUsers | Link::GroupTracks => EntityKind::Group,
            Link::ChallengeUsers | Link::ChallengeTracks => EntityKind::Challenge,
        }
    }

    /// Kind of entity the ids in the field refer to.
    pub fn target(self) -> EntityKind {
        match self {
            Link::TrackUsers | Link::UserFriends | Link::GroupUsers | Link::ChallengeUsers => {
                EntityKind::User
            }
            Link::UserGroups => EntityKind::Group,
            Link::UserTracks | Link::GroupTracks | Link::ChallengeTracks => EntityKind::Track,
            Link::UserChallenges => EntityKind::Challenge,
        }
    }

    /// Field on the target that points back, if any.
    pub fn inverse(self) -> Option<Link> {
        match self {
            Link::TrackUsers => Some(Link::UserTracks),
            Link::UserTracks => Some(Link::TrackUsers),
            Link::UserFriends => Some(Link::UserFriends),
            Link::UserGroups => Some(Link::GroupUsers),
            Link::GroupUsers => Some(Link::UserGroups),
            Link::UserChallenges => Some(Link::ChallengeUsers),
            Link::ChallengeUsers => Some(Link::UserChallenges),
            Link::GroupTracks | Link::ChallengeTracks => None,
        }
    }

    /// Fields held by entities of `kind`.
    pub fn owned_by(kind: EntityKind) -> impl Iterator<Item = Link> {
        Self::ALL.into_iter().filter(move |l| l.owner() == kind)
    }

    /// Fields anywhere that refer to entities of `kind`.
    pub fn targeting(kind: EntityKind) -> impl Iterator<Item = Link> {
        Self::ALL.into_iter().filter(move |l| l.target() == kind)
    }
}

/// Any stored entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDoc {
    Track(Track),
    User(User),
    Group(Group),
    Challenge(Challenge),
}

impl EntityDoc {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDoc::Track(_) => EntityKind::Track,
            EntityDoc::User(_) => EntityKind::User,
            EntityDoc::Group(_) => EntityKind::Group,
            EntityDoc::Challenge(_) => EntityKind::Challenge,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityDoc::Track(t) => &t.id,
            EntityDoc::User(u) => &u.id,
            EntityDoc::Group(g) => &g.id,
            EntityDoc::Challenge(c) => &c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityDoc::Track(t) => &t.name,
            EntityDoc::User(u) => &u.name,
            EntityDoc::Group(g) => &g.name,
            EntityDoc::Challenge(c) => &c.name,
        }
    }

    /// The ids held in `link`, or `None` if this entity has no such field.
    pub fn links(&self, link: Link) -> Option<&DedupSet<EntityId>> {
        match (self, link) {
            (EntityDoc::Track(t), Link::TrackUsers) => Some(&t.users),
            (EntityDoc::User(u), Link::UserFriends) => Some(&u.users),
            (EntityDoc::User(u), Link::UserGroups) => Some(&u.groups),
            (EntityDoc::User(u), Link::UserTracks) => Some(&u.tracks),
            (EntityDoc::User(u), Link::UserChallenges) => Some(&u.challenges),
            (EntityDoc::Group(g), Link::GroupUsers) => Some(&g.users),
            (EntityDoc::Group(g), Link::GroupTracks) => Some(&g.tracks),
            (EntityDoc::Challenge(c), Link::ChallengeUsers) => Some(&c.users),
            (EntityDoc::Challenge(c), Link::ChallengeTracks) => Some(&c.tracks),
            _ => None,
        }
    }

    pub fn links_mut(&mut self, link: Link) -> Option<&mut DedupSet<EntityId>> {
        match (self, link) {
            (EntityDoc::Track(t), Link::TrackUsers) => Some(&mut t.users),
            (EntityDoc::User(u), Link::UserFriends) => Some(&mut u.users),
            (EntityDoc::User(u), Link::UserGroups) => Some(&mut u.groups),
            (EntityDoc::User(u), Link::UserTracks) => Some(&mut u.tracks),
            (EntityDoc::User(u), Link::UserChallenges) => Some(&mut u.challenges),
            (EntityDoc::Group(g), Link::GroupUsers) => Some(&mut g.users),
            (EntityDoc::Group(g), Link::GroupTracks) => Some(&mut g.tracks),
            (EntityDoc::Challenge(c), Link::ChallengeUsers) => Some(&mut c.users),
            (EntityDoc::Challenge(c), Link::ChallengeTracks) => Some(&mut c.tracks),
            _ => None,
        }
    }

    /// Bring derived fields up to date.
    pub fn refresh(&mut self) {
        if let EntityDoc::Group(g) = self {
            g.refresh_ranking();
        }
    }
}

/// A stored entity type with a string id and a unique name.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: EntityId);
    fn name(&self) -> &str;
    fn into_doc(self) -> EntityDoc;
    fn from_doc(doc: EntityDoc) -> Option<Self>;

    /// Bring derived fields up to date.
    fn refresh(&mut self) {}

    /// Reset fields a client may not set when creating the entity.
    fn prepare_new(&mut self) {}
}

macro_rules! impl_entity {
    ($ty:ident $(, refresh: $refresh:path)? $(, prepare: $prepare:path)?) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: EntityId) {
                self.id = id;
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn into_doc(self) -> EntityDoc {
                EntityDoc::$ty(self)
            }

            fn from_doc(doc: EntityDoc) -> Option<Self> {
                match doc {
                    EntityDoc::$ty(e) => Some(e),
                    _ => None,
                }
            }

            $(
                fn refresh(&mut self) {
                    $refresh(self);
                }
            )?

            $(
                fn prepare_new(&mut self) {
                    $prepare(self);
                }
            )?
        }
    };
}

impl_entity!(Track);
impl_entity!(User, prepare: User::prepare_new);
impl_entity!(Group, refresh: Group::refresh_ranking, prepare: Group::prepare_new);
impl_entity!(Challenge);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_links_are_consistent() {
        for link in Link::ALL {
            if let Some(inverse) = link.inverse() {
                assert_eq!(inverse.owner(), link.target(), "{:?}", link);
                assert_eq!(inverse.target(), link.owner(), "{:?}", link);
                assert_eq!(inverse.inverse(), Some(link), "{:?}", link);
            }
        }
    }

    #[test]
    fn test_every_link_resolves_on_its_owner() {
        let docs = [
            EntityDoc::Track(serde_json::from_value(serde_json::json!({
                "name": "t", "start": {"lat": 0, "lng": 0}, "end": {"lat": 0, "lng": 0},
                "distance": 1, "slope": 0, "activity": "running"
            })).unwrap()),
            EntityDoc::User(User::new(String::new(), "u", crate::models::Activity::Running)),
            EntityDoc::Group(Group::new(String::new(), "g", Vec::<String>::new())),
            EntityDoc::Challenge(Challenge::new(
                String::new(),
                "c",
                crate::models::Activity::Running,
                Vec::<String>::new(),
            )),
        ];

        for doc in &docs {
            for link in Link::ALL {
                assert_eq!(
                    doc.links(link).is_some(),
                    link.owner() == doc.kind(),
                    "{:?} on {}",
                    link,
                    doc.kind()
                );
            }
        }
    }

    #[test]
    fn test_links_targeting_user() {
        let links: Vec<Link> = Link::targeting(EntityKind::User).collect();
        assert_eq!(
            links,
            vec![
                Link::TrackUsers,
                Link::UserFriends,
                Link::GroupUsers,
                Link::ChallengeUsers
            ]
        );
    }

    #[test]
    fn test_entity_hooks_dispatch_per_kind() {
        let mut group: Group = serde_json::from_value(serde_json::json!({
            "name": "g",
            "users": ["a"],
            "stats": {"daily": {"km": 1, "slope": 0}},
            "records": [{"date": "2024-06-01", "users": ["a"], "km": 2}]
        }))
        .unwrap();
        Entity::prepare_new(&mut group);
        Entity::refresh(&mut group);
        assert_eq!(group.stats, crate::models::Stats::default());
        assert_eq!(group.ranking().as_slice(), &["a".to_string()]);

        // Tracks have neither hook; both calls leave them untouched
        let mut track: Track = serde_json::from_value(serde_json::json!({
            "name": "t", "start": {"lat": 0, "lng": 0}, "end": {"lat": 0, "lng": 0},
            "distance": 1, "slope": 0, "activity": "running"
        }))
        .unwrap();
        let before = track.clone();
        Entity::prepare_new(&mut track);
        Entity::refresh(&mut track);
        assert_eq!(track, before);
    }
}
