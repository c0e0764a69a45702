//! Rules-engine port.
//!
//! The crate never decides legality itself. Anything that can validate a move
//! against a position and report the resulting position can back the
//! [`MoveApplier`](crate::applier::MoveApplier).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, error::Error, tree::MoveCode};

/// A move proposed by a player, in coordinate form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveRequest {
    pub move_code: MoveCode,
}

impl MoveRequest {
    pub fn new(move_code: MoveCode) -> Self {
        Self { move_code }
    }
}

impl FromStr for MoveRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::new(s.trim().parse()?))
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.move_code)
    }
}

/// A legal move available in some position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMove {
    pub san: String,
    pub move_code: MoveCode,
}

/// What the engine reports after accepting a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    pub san: String,
    pub move_code: MoveCode,
    pub position: String,
}

/// Port for the external rules engine.
///
/// # Examples
///
/// ```
/// use movetree::ports::{AppliedMove, CandidateMove, MoveRequest, RulesEngine};
///
/// /// Accepts every move and appends it to the position string.
/// struct Permissive;
///
/// impl RulesEngine for Permissive {
///     fn legal_moves(&self, _position: &str) -> movetree::Result<Vec<CandidateMove>> {
///         Ok(Vec::new())
///     }
///
///     fn apply_move(&self, position: &str, request: &MoveRequest) -> movetree::Result<AppliedMove> {
///         Ok(AppliedMove {
///             san: request.to_string(),
///             move_code: request.move_code,
///             position: format!("{position} {request}"),
///         })
///     }
/// }
/// ```
pub trait RulesEngine {
    /// Every legal move in `position`.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` if the engine cannot read the position.
    fn legal_moves(&self, position: &str) -> Result<Vec<CandidateMove>>;

    /// Validate `request` against `position` and play it.
    ///
    /// # Errors
    ///
    /// `IllegalMove` if the engine rejects the move, `InvalidPosition` if it
    /// cannot read the position.
    fn apply_move(&self, position: &str, request: &MoveRequest) -> Result<AppliedMove>;
}
