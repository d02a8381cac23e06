//! Identity tag side channel.
//!
//! The core stamps each record's id onto its external payload and reads it
//! back when a click arrives. Storage is behind [`TagStore`] so hosts can map
//! it onto whatever persistent metadata their payloads carry.

use crate::item::{ItemId, ItemPayload};

/// Key under which item ids are stamped.
pub const ITEM_ID_KEY: &str = "item-id";

pub trait TagStore: Send + Sync {
    fn get_tag(&self, payload: &ItemPayload, key: &str) -> Option<String>;
    fn set_tag(&self, payload: ItemPayload, key: &str, value: &str) -> ItemPayload;
}

/// Stores tags in [`ItemPayload::meta`] under `"{namespace}:{key}"`.
#[derive(Debug, Clone)]
pub struct MetaTagStore {
    namespace: String,
}

impl MetaTagStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn qualified(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

impl Default for MetaTagStore {
    fn default() -> Self {
        Self::new("slotgrid")
    }
}

impl TagStore for MetaTagStore {
    fn get_tag(&self, payload: &ItemPayload, key: &str) -> Option<String> {
        payload.meta.get(&self.qualified(key)).cloned()
    }

    fn set_tag(&self, mut payload: ItemPayload, key: &str, value: &str) -> ItemPayload {
        payload.meta.insert(self.qualified(key), value.to_string());
        payload
    }
}

pub fn stamp_item_id(store: &dyn TagStore, payload: ItemPayload, id: ItemId) -> ItemPayload {
    store.set_tag(payload, ITEM_ID_KEY, &id.to_string())
}

pub fn read_item_id(store: &dyn TagStore, payload: &ItemPayload) -> Option<ItemId> {
    store
        .get_tag(payload, ITEM_ID_KEY)
        .and_then(|value| ItemId::parse(&value))
}
