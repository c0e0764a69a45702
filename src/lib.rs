//! Branching chess move trees
//!
//! This crate provides:
//! - An owned node repository ([`MoveTree`]) growing main lines and variations
//! - A move applier bridging the tree to a chess rules engine port
//! - An exhaustive structural validator
//! - A canonical JSON wire codec with stable ordering
//! - A session cursor ([`Navigator`]) and an application container with
//!   per-session locking and pluggable stores

pub mod adapters;
pub mod app;
pub mod applier;
pub mod cli;
pub mod codec;
pub mod error;
pub mod identifiers;
pub mod navigator;
pub mod ports;
pub mod tree;
pub mod validation;

pub use applier::{DuplicateMovePolicy, MoveApplier};
pub use codec::{DecodeOptions, PlyPolicy, decode, decode_with, encode, encode_pretty};
pub use error::{Error, Result};
pub use identifiers::{NodeId, SessionId, StorageRef};
pub use navigator::{Navigator, Step};
pub use tree::{IdStrategy, MoveCode, MoveNode, MoveRecord, MoveTree};
pub use validation::{ValidationReport, Violation, validate};
