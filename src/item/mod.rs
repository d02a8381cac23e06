//! Item records: identity, opaque payload, action, cooldowns and state tags.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::ActionRecord;
use crate::tags::{self, TagStore};

/// Identity of an item record; generated once, never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Entity acting on a grid (a viewer that clicks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// External item description. Opaque to the core apart from tag access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPayload {
    pub material: String,
    pub amount: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ItemPayload {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Free-form label persisted with an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateTag(String);

impl StateTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-actor cooldown deadlines. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    inner: Arc<RwLock<HashMap<ActorId, SystemTime>>>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, actor: ActorId, until: SystemTime) {
        if let Ok(mut guard) = self.inner.write() {
            guard.insert(actor, until);
        }
    }

    pub fn until(&self, actor: ActorId) -> Option<SystemTime> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.get(&actor).copied())
    }

    /// True while `actor` has a deadline later than `now`.
    pub fn is_active(&self, actor: ActorId, now: SystemTime) -> bool {
        self.until(actor).is_some_and(|until| until > now)
    }

    pub fn clear(&self, actor: ActorId) {
        if let Ok(mut guard) = self.inner.write() {
            guard.remove(&actor);
        }
    }

    /// Drop every deadline that has passed.
    pub fn prune(&self, now: SystemTime) {
        if let Ok(mut guard) = self.inner.write() {
            guard.retain(|_, until| *until > now);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One item installed (or installable) in a grid.
///
/// Equality and hashing use only [`ItemId`]. Clones share the action handler
/// and the cooldown table, so the same record placed on several pages keeps
/// one cooldown state per actor.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    id: ItemId,
    payload: ItemPayload,
    action: ActionRecord,
    cooldowns: Cooldowns,
    cooldown: Option<Duration>,
    tags: Vec<StateTag>,
}

impl ItemRecord {
    /// Wrap a payload with a fresh id and the empty action.
    pub fn new(payload: ItemPayload) -> Self {
        Self::restore(ItemId::new(), payload, Vec::new())
    }

    /// Rebuild a record with a known id, e.g. from persisted state.
    pub fn restore(id: ItemId, payload: ItemPayload, tags: Vec<StateTag>) -> Self {
        Self {
            id,
            payload,
            action: ActionRecord::empty(),
            cooldowns: Cooldowns::new(),
            cooldown: None,
            tags,
        }
    }

    pub fn with_action(mut self, action: ActionRecord) -> Self {
        self.action = action;
        self
    }

    /// Cooldown stamped for an actor each time its click is dispatched.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn with_tag(mut self, tag: StateTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Write this record's id onto its payload through `store`.
    pub fn stamped(mut self, store: &dyn TagStore) -> Self {
        self.payload = tags::stamp_item_id(store, self.payload, self.id);
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn payload(&self) -> &ItemPayload {
        &self.payload
    }

    pub fn action(&self) -> &ActionRecord {
        &self.action
    }

    pub fn set_action(&mut self, action: ActionRecord) {
        self.action = action;
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn cooldown(&self) -> Option<Duration> {
        self.cooldown
    }

    pub fn tags(&self) -> &[StateTag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_str() == tag)
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t.as_str() != tag);
    }
}

impl PartialEq for ItemRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ItemRecord {}

impl Hash for ItemRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
