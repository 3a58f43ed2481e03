// Shared error taxonomy for the adapter seams.
//
// Tree-level "not found" is deliberately absent: a lookup miss in the tree
// cache is a benign race handled by fallback snapshots and no-op actions,
// never an error.

use thiserror::Error;
use uuid::Uuid;

use crate::types::EntityKind;

/// Failures from the durable backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind:?} {id} not found in durable store")]
    NotFound { kind: EntityKind, id: Uuid },
    #[error("durable store rejected the operation: {0}")]
    Rejected(String),
    #[error("durable store unavailable: {0}")]
    Unavailable(String),
}

/// Failures from the presence pub/sub transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PresenceError {
    #[error("failed to join topic `{topic}`: {reason}")]
    JoinFailed { topic: String, reason: String },
    #[error("subscription to topic `{topic}` failed: {reason}")]
    SubscriptionFailed { topic: String, reason: String },
    #[error("failed to publish presence payload: {0}")]
    TrackFailed(String),
    #[error("presence channel closed")]
    ChannelClosed,
}

/// Failures from the identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("profile lookup for {user_id} failed: {reason}")]
    ProfileUnavailable { user_id: Uuid, reason: String },
}
