// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message entities: one triggering decision and the candidates generated for it.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use kibitz_core::{KibitzError, MessageKind};
use serde::{Serialize, Serializer};

/// Time-based entity identifier, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = KibitzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(EntityId)
            .map_err(|_| KibitzError::NotFound { id: s.to_string() })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hands out millisecond timestamps, bumped forward when two ids would collide.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> EntityId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return EntityId(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// The incoming message a reply entity answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOrigin {
    pub reply_to_id: String,
    pub original_text: String,
    pub username: String,
}

/// One decision to possibly post something.
///
/// Serializes to the shape the operator dashboard consumes. Mutation goes
/// through the lifecycle methods so `sent` and `deleted` can never both be set.
#[derive(Debug, Clone, Serialize)]
pub struct MessageEntity {
    id: EntityId,
    #[serde(rename = "message_type")]
    kind: MessageKind,
    reply_to_id: Option<String>,
    #[serde(rename = "original_message")]
    original_text: Option<String>,
    #[serde(rename = "username")]
    origin_username: Option<String>,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(rename = "generated_messages")]
    candidates: Vec<String>,
    #[serde(rename = "selected_message")]
    selected: Option<String>,
    sent: bool,
    deleted: bool,
    generating: bool,
}

impl MessageEntity {
    /// A freshly registered entity: no candidates, still generating.
    pub fn new(
        id: EntityId,
        kind: MessageKind,
        origin: Option<ReplyOrigin>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (reply_to_id, original_text, origin_username) = match origin {
            Some(o) => (Some(o.reply_to_id), Some(o.original_text), Some(o.username)),
            None => (None, None, None),
        };
        Self {
            id,
            kind,
            reply_to_id,
            original_text,
            origin_username,
            created_at,
            candidates: Vec::new(),
            selected: None,
            sent: false,
            deleted: false,
            generating: true,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn reply_to_id(&self) -> Option<&str> {
        self.reply_to_id.as_deref()
    }

    pub fn original_text(&self) -> Option<&str> {
        self.original_text.as_deref()
    }

    pub fn origin_username(&self) -> Option<&str> {
        self.origin_username.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Neither sent nor deleted.
    pub fn is_pending(&self) -> bool {
        !self.sent && !self.deleted
    }

    /// Append a candidate. Ignored once generation has finished.
    pub(crate) fn push_candidate(&mut self, text: String) -> bool {
        if !self.generating {
            return false;
        }
        self.candidates.push(text);
        true
    }

    pub(crate) fn finish_generation(&mut self) {
        self.generating = false;
    }

    pub(crate) fn select(&mut self, index: i64) -> Result<(), KibitzError> {
        let out_of_range = || KibitzError::InvalidSelection {
            index,
            len: self.candidates.len(),
        };
        if self.generating {
            return Err(out_of_range());
        }
        if !self.is_pending() {
            return Err(self.transition_error("it is already finalized"));
        }
        let slot = usize::try_from(index).map_err(|_| out_of_range())?;
        let text = self.candidates.get(slot).ok_or_else(out_of_range)?;
        self.selected = Some(text.clone());
        Ok(())
    }

    /// The selected text, if the entity may be delivered now.
    pub fn sendable_text(&self) -> Result<&str, KibitzError> {
        self.ensure_open()?;
        self.selected
            .as_deref()
            .ok_or_else(|| self.transition_error("no candidate has been selected"))
    }

    pub(crate) fn mark_sent(&mut self) -> Result<(), KibitzError> {
        self.sendable_text()?;
        self.sent = true;
        Ok(())
    }

    /// Allowed while generating. That ends generation, so candidates still
    /// in flight are dropped and the entity can be pruned.
    pub(crate) fn mark_deleted(&mut self) -> Result<(), KibitzError> {
        self.ensure_not_final()?;
        self.deleted = true;
        self.generating = false;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), KibitzError> {
        if self.generating {
            return Err(self.transition_error("generation is still running"));
        }
        self.ensure_not_final()
    }

    fn ensure_not_final(&self) -> Result<(), KibitzError> {
        if self.sent {
            return Err(self.transition_error("it was already sent"));
        }
        if self.deleted {
            return Err(self.transition_error("it was already deleted"));
        }
        Ok(())
    }

    fn transition_error(&self, reason: &str) -> KibitzError {
        KibitzError::InvalidTransition {
            id: self.id.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(candidates: &[&str]) -> MessageEntity {
        let mut entity = MessageEntity::new(EntityId(1), MessageKind::Random, None, Utc::now());
        for c in candidates {
            entity.push_candidate(c.to_string());
        }
        entity.finish_generation();
        entity
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let ids = IdGenerator::new();
        let mut prev = ids.next_id();
        for _ in 0..1000 {
            let next = ids.next_id();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn id_serializes_as_string() {
        let json = serde_json::to_string(&EntityId(1_700_000_000_000)).unwrap();
        assert_eq!(json, "\"1700000000000\"");
        assert_eq!("42".parse::<EntityId>().unwrap(), EntityId(42));
        assert!("abc".parse::<EntityId>().is_err());
    }

    #[test]
    fn new_entity_is_generating_and_empty() {
        let entity = MessageEntity::new(EntityId(7), MessageKind::Manual, None, Utc::now());
        assert!(entity.is_generating());
        assert!(entity.candidates().is_empty());
        assert!(entity.selected().is_none());
        assert!(entity.is_pending());
    }

    #[test]
    fn candidates_rejected_after_generation() {
        let mut entity = finished(&["a"]);
        assert!(!entity.push_candidate("late".into()));
        assert_eq!(entity.candidates(), ["a"]);
    }

    #[test]
    fn select_in_range() {
        let mut entity = finished(&["a", "b"]);
        entity.select(1).unwrap();
        assert_eq!(entity.selected(), Some("b"));
    }

    #[test]
    fn select_out_of_range_keeps_previous() {
        let mut entity = finished(&["a", "b"]);
        entity.select(0).unwrap();
        for bad in [-1, 2, 99] {
            let err = entity.select(bad).unwrap_err();
            assert!(matches!(err, KibitzError::InvalidSelection { len: 2, .. }));
        }
        assert_eq!(entity.selected(), Some("a"));
    }

    #[test]
    fn select_while_generating_rejected() {
        let mut entity = MessageEntity::new(EntityId(1), MessageKind::Random, None, Utc::now());
        entity.push_candidate("a".into());
        assert!(entity.select(0).is_err());
        assert!(entity.selected().is_none());
    }

    #[test]
    fn send_requires_selection() {
        let mut entity = finished(&["a"]);
        assert!(matches!(
            entity.mark_sent(),
            Err(KibitzError::InvalidTransition { .. })
        ));
        entity.select(0).unwrap();
        entity.mark_sent().unwrap();
        assert!(entity.is_sent());
    }

    #[test]
    fn terminal_states_are_exclusive() {
        let mut entity = finished(&["a"]);
        entity.select(0).unwrap();
        entity.mark_deleted().unwrap();
        assert!(entity.mark_sent().is_err());
        assert!(entity.is_deleted() && !entity.is_sent());

        let mut entity = finished(&["a"]);
        entity.select(0).unwrap();
        entity.mark_sent().unwrap();
        assert!(entity.mark_deleted().is_err());
        assert!(entity.is_sent() && !entity.is_deleted());
    }

    #[test]
    fn delete_while_generating_drops_late_candidates() {
        let mut entity = MessageEntity::new(EntityId(1), MessageKind::Random, None, Utc::now());
        entity.push_candidate("early".into());
        entity.mark_deleted().unwrap();
        assert!(entity.is_deleted());
        assert!(!entity.is_generating());

        assert!(!entity.push_candidate("late".into()));
        entity.finish_generation();
        assert_eq!(entity.candidates(), ["early"]);
        assert!(entity.mark_deleted().is_err());
        assert!(entity.select(0).is_err());
    }

    #[test]
    fn serializes_dashboard_shape() {
        let origin = ReplyOrigin {
            reply_to_id: "m1".into(),
            original_text: "anyone at the lawn".into(),
            username: "sam".into(),
        };
        let mut entity = MessageEntity::new(EntityId(5), MessageKind::Reply, Some(origin), Utc::now());
        entity.push_candidate("on my way".into());
        entity.finish_generation();

        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["id"], "5");
        assert_eq!(value["message_type"], "reply");
        assert_eq!(value["reply_to_id"], "m1");
        assert_eq!(value["original_message"], "anyone at the lawn");
        assert_eq!(value["username"], "sam");
        assert_eq!(value["generated_messages"][0], "on my way");
        assert!(value["selected_message"].is_null());
        assert_eq!(value["generating"], false);
        assert_eq!(value["sent"], false);
        assert_eq!(value["deleted"], false);
    }
}
