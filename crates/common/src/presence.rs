// Ephemeral presence types exchanged over the pub/sub channel.
//
// Nothing here is ever persisted: payloads exist only while a peer has the
// document open, and the hub's sync events always carry the full topic
// state, never deltas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What each session publishes when it joins a document topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresencePayload {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Full roster of one topic as reported by the hub: opaque peer key to the
/// payloads of that peer's open sessions. A user with two tabs open shows
/// up under one key with two payloads (or two keys with one each — the hub
/// decides); flattening is the consumer's job.
pub type TopicState = BTreeMap<String, Vec<PresencePayload>>;

/// One logical collaborator currently viewing a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collaborator {
    pub id: Uuid,
    pub email: String,
    pub avatar_url: String,
}

impl From<PresencePayload> for Collaborator {
    fn from(payload: PresencePayload) -> Self {
        Self { id: payload.id, email: payload.email, avatar_url: payload.avatar_url }
    }
}

/// Display label for a collaborator: the local part of an email-like
/// identifier, or the whole identifier when it has no `@`.
pub fn display_label(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
