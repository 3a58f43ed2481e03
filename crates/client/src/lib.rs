// arbor-client: client-side collaboration core.
//
// Owns the normalized workspace/folder/file tree cache, display
// reconciliation, debounced persistence, and document presence. The rich
// text engine, durable store, pub/sub transport, and identity resolution
// plug in through the traits in `adapters`.

pub mod adapters;
pub mod breadcrumb;
pub mod commands;
pub mod config;
pub mod persist;
pub mod presence;
pub mod trash;
pub mod tree;
