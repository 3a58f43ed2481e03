// Roster computation and cursor diffing.
//
// Every sync event from the hub carries the full topic state and is
// authoritative: the roster is recomputed from scratch, never patched
// incrementally, so delivery order can't corrupt it. A peer joined from
// several sessions appears once — first payload wins within a batch.

use std::collections::HashSet;

use arbor_common::presence::{display_label, Collaborator, TopicState};
use rand::Rng;
use uuid::Uuid;

/// Flatten a topic state into the logical collaborator list.
pub fn flatten_roster(state: &TopicState) -> Vec<Collaborator> {
    let mut seen = HashSet::new();
    let mut roster = Vec::new();
    for payload in state.values().flatten() {
        if seen.insert(payload.id) {
            roster.push(Collaborator::from(payload.clone()));
        }
    }
    roster
}

/// A random `#rrggbb` cursor color. Reassigned on every observation, so a
/// peer's color may drift across resyncs; cosmetic only.
pub fn random_cursor_color(rng: &mut impl Rng) -> String {
    format!("#{:06x}", rng.gen_range(0..0x1000000u32))
}

/// A cursor to create in the editor engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSpec {
    pub collaborator_id: Uuid,
    pub label: String,
    pub color: String,
}

/// What changed between two consecutive rosters, from the editor's point
/// of view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorDiff {
    pub created: Vec<CursorSpec>,
    pub removed: Vec<Uuid>,
}

/// Remembers which remote peers have a cursor, and turns each new roster
/// into create/remove operations. The local user never gets a cursor.
#[derive(Debug, Default)]
pub struct CursorTracker {
    known: HashSet<Uuid>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diff(
        &mut self,
        roster: &[Collaborator],
        local_user_id: Option<Uuid>,
        rng: &mut impl Rng,
    ) -> CursorDiff {
        let current: HashSet<Uuid> = roster
            .iter()
            .map(|collaborator| collaborator.id)
            .filter(|id| Some(*id) != local_user_id)
            .collect();

        let mut diff = CursorDiff::default();
        for collaborator in roster {
            if current.contains(&collaborator.id) && !self.known.contains(&collaborator.id) {
                diff.created.push(CursorSpec {
                    collaborator_id: collaborator.id,
                    label: display_label(&collaborator.email).to_string(),
                    color: random_cursor_color(rng),
                });
            }
        }
        diff.removed = self.known.difference(&current).copied().collect();

        self.known = current;
        diff
    }
}
