// arbor-common: shared types and utilities for the Arbor workspace

pub mod error;
pub mod patch;
pub mod presence;
pub mod route;
pub mod types;
