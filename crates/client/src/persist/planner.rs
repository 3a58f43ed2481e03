// Per-entity save planning.
//
// Each edited entity moves through a small state machine:
//   idle → pending (edit observed, timer armed)
//        → saving  (timer fired, write in flight)
//        → idle    (write acknowledged)
// A new edit while pending resets the timer (bursts coalesce into one
// write). A new edit while saving queues behind the in-flight write; the
// planner never hands out two concurrent writes for the same entity.
// A failed write keeps its patch: it is merged back under any newer edits
// and re-armed with exponential backoff, parking as `Unsaved` after the
// attempt budget is spent until the next edit revives it. The tree cache
// keeps the optimistic value throughout — a failed save never rolls back
// what the user typed.
//
// Pure except for the injected clock; the async driver lives in
// `scheduler`.

use std::collections::HashMap;
use std::time::Duration;

use arbor_common::patch::{EntityKey, EntityPatch};
use tokio::time::Instant;

/// Default quiet period after the last keystroke before a write is issued.
pub const DEFAULT_DEBOUNCE_MS: u64 = 850;
/// Minimum allowed debounce window.
const MIN_DEBOUNCE_MS: u64 = 100;
/// Maximum allowed debounce window.
const MAX_DEBOUNCE_MS: u64 = 5_000;

const BASE_RETRY_DELAY_MS: u64 = 250;
const MAX_RETRY_DELAY_MS: u64 = 30_000;
const MAX_ATTEMPTS: u32 = 8;

/// Clamp a configured debounce window into the supported range.
pub fn clamp_debounce_window(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS))
}

/// Exponential backoff delay for a given failed-attempt count (1-based).
pub fn backoff_delay(attempts: u32) -> Duration {
    let exp = attempts.saturating_sub(1).min(7);
    let delay_ms = BASE_RETRY_DELAY_MS.saturating_mul(1u64 << exp).min(MAX_RETRY_DELAY_MS);
    Duration::from_millis(delay_ms)
}

/// Aggregate signal for the UI's saved/saving badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing outstanding.
    Saved,
    /// Edits observed, timer armed.
    Pending,
    /// A write is in flight.
    Saving,
    /// A write failed and its edits are parked until retried.
    Unsaved,
}

#[derive(Debug, Default)]
struct Slot {
    /// Edits not yet handed to a write.
    pending: Option<EntityPatch>,
    /// When the pending patch becomes due.
    deadline: Option<Instant>,
    /// The patch currently being written.
    in_flight: Option<EntityPatch>,
    /// Consecutive failed write attempts.
    attempts: u32,
    /// Attempt budget spent; waiting for the next edit.
    parked: bool,
}

/// Tracks pending and in-flight saves for every edited entity.
#[derive(Debug)]
pub struct SavePlanner {
    window: Duration,
    slots: HashMap<EntityKey, Slot>,
}

impl SavePlanner {
    pub fn new(window: Duration) -> Self {
        Self { window, slots: HashMap::new() }
    }

    /// Record an edit, merging it into the entity's pending patch and
    /// re-arming the debounce timer.
    pub fn note_edit_at(&mut self, key: EntityKey, patch: EntityPatch, now: Instant) {
        if patch.is_empty() {
            return;
        }

        let slot = self.slots.entry(key).or_default();
        match &mut slot.pending {
            Some(pending) => pending.merge(patch),
            None => slot.pending = Some(patch),
        }
        slot.deadline = Some(now + self.window);
        slot.parked = false;
        slot.attempts = 0;
    }

    /// Promote every due pending patch to in-flight and hand it out for
    /// writing. An entity with a write already in flight is skipped — its
    /// queued edits surface once `finish_save_at` resolves the write.
    pub fn take_due_at(&mut self, now: Instant) -> Vec<(EntityKey, EntityPatch)> {
        let mut due = Vec::new();
        for (key, slot) in &mut self.slots {
            if slot.in_flight.is_some() || slot.parked {
                continue;
            }
            let ready = matches!(slot.deadline, Some(deadline) if deadline <= now);
            if !ready {
                continue;
            }
            if let Some(patch) = slot.pending.take() {
                slot.deadline = None;
                slot.in_flight = Some(patch.clone());
                due.push((*key, patch));
            }
        }
        due
    }

    /// Resolve the in-flight write for `key`. On success the slot drains
    /// (or cycles again if edits queued up during the write); on failure
    /// the patch is merged back under any newer edits and re-armed with
    /// backoff.
    pub fn finish_save_at(&mut self, key: EntityKey, success: bool, now: Instant) {
        let Some(slot) = self.slots.get_mut(&key) else {
            return;
        };
        let Some(failed) = slot.in_flight.take() else {
            return;
        };

        if success {
            slot.attempts = 0;
            if slot.pending.is_none() {
                self.slots.remove(&key);
            }
            return;
        }

        // Newer edits win over the failed payload, field by field.
        let mut merged = failed;
        if let Some(newer) = slot.pending.take() {
            merged.merge(newer);
        }
        slot.pending = Some(merged);
        slot.attempts += 1;

        if slot.attempts >= MAX_ATTEMPTS {
            slot.parked = true;
            slot.deadline = None;
        } else {
            slot.deadline = Some(now + backoff_delay(slot.attempts));
        }
    }

    /// Make every pending patch due immediately (explicit save-now).
    /// Parked entities get one more attempt out of it.
    pub fn force_due_at(&mut self, now: Instant) {
        for slot in self.slots.values_mut() {
            if slot.pending.is_some() && slot.in_flight.is_none() {
                slot.deadline = Some(now);
                slot.parked = false;
            }
        }
    }

    /// Drop every armed timer and queued patch. Used on teardown: an
    /// abandoned timer must never fire a write after the owning view is
    /// gone.
    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    /// Earliest armed deadline across all entities.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().filter_map(|slot| slot.deadline).min()
    }

    pub fn is_idle(&self) -> bool {
        self.slots.is_empty()
    }

    /// Aggregate status: an in-flight write shows as saving, parked
    /// failures as unsaved, armed edits as pending.
    pub fn status(&self) -> SaveStatus {
        if self.slots.values().any(|slot| slot.in_flight.is_some()) {
            return SaveStatus::Saving;
        }
        if self.slots.values().any(|slot| slot.parked) {
            return SaveStatus::Unsaved;
        }
        if self.slots.is_empty() {
            SaveStatus::Saved
        } else {
            SaveStatus::Pending
        }
    }
}
