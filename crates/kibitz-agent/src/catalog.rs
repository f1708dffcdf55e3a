// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store of every message entity created during the process lifetime.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kibitz_core::KibitzError;

use crate::entity::{EntityId, MessageEntity};

/// Owns all entities, keyed and ordered by id (creation order).
///
/// Every mutation is keyed by id; an unknown id yields
/// [`KibitzError::NotFound`] and changes nothing.
#[derive(Debug, Default)]
pub struct MessageCatalog {
    entities: BTreeMap<EntityId, MessageEntity>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: MessageEntity) {
        self.entities.insert(entity.id(), entity);
    }

    pub fn get(&self, id: EntityId) -> Option<&MessageEntity> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities neither sent nor deleted, oldest first.
    pub fn list_pending(&self) -> Vec<MessageEntity> {
        self.entities
            .values()
            .filter(|e| e.is_pending())
            .cloned()
            .collect()
    }

    pub fn count_pending(&self) -> usize {
        self.entities.values().filter(|e| e.is_pending()).count()
    }

    pub fn count_generating(&self) -> usize {
        self.entities.values().filter(|e| e.is_generating()).count()
    }

    pub fn select(&mut self, id: EntityId, index: i64) -> Result<&MessageEntity, KibitzError> {
        let entity = self.get_mut(id)?;
        entity.select(index)?;
        Ok(entity)
    }

    pub fn mark_sent(&mut self, id: EntityId) -> Result<&MessageEntity, KibitzError> {
        let entity = self.get_mut(id)?;
        entity.mark_sent()?;
        Ok(entity)
    }

    pub fn mark_deleted(&mut self, id: EntityId) -> Result<&MessageEntity, KibitzError> {
        let entity = self.get_mut(id)?;
        entity.mark_deleted()?;
        Ok(entity)
    }

    pub(crate) fn push_candidate(&mut self, id: EntityId, text: String) -> Result<bool, KibitzError> {
        Ok(self.get_mut(id)?.push_candidate(text))
    }

    pub(crate) fn finish_generation(&mut self, id: EntityId) -> Result<&MessageEntity, KibitzError> {
        let entity = self.get_mut(id)?;
        entity.finish_generation();
        Ok(entity)
    }

    /// Drop entities created before `cutoff`. Entities still generating are kept.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entities.len();
        self.entities
            .retain(|_, e| e.is_generating() || e.created_at() >= cutoff);
        before - self.entities.len()
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut MessageEntity, KibitzError> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| KibitzError::NotFound { id: id.to_string() })
    }
}
