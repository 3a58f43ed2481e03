// Document presence.
//
// `roster` holds the pure parts: flattening the hub's topic state into one
// logical collaborator list and diffing rosters into cursor operations.
// `session` owns the channel lifecycle: join, subscribe, the one-shot track
// handshake, and a teardown that always leaves the topic.

pub mod roster;
pub mod session;

pub use roster::{flatten_roster, random_cursor_color, CursorTracker};
pub use session::PresenceSession;
