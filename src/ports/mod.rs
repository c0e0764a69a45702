//! Ports (trait boundaries) for external collaborators.
//!
//! Following hexagonal architecture, these traits are owned by the domain and
//! implemented by adapters: one for the chess rules engine, one for the durable
//! store that keeps encoded trees between sessions.

pub mod rules;
pub mod store;

pub use rules::{AppliedMove, CandidateMove, MoveRequest, RulesEngine};
pub use store::TreeStore;
