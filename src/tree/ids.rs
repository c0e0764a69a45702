//! Per-tree node id allocation

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::Error, identifiers::NodeId};

/// How a tree mints ids for new nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `n0`, `n1`, ... counted per tree.
    #[default]
    Sequential,
    /// 16 random hex digits per node.
    Random,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Sequential => write!(f, "sequential"),
            IdStrategy::Random => write!(f, "random"),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(IdStrategy::Sequential),
            "random" | "rand" => Ok(IdStrategy::Random),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown id strategy '{other}' (expected sequential or random)"),
            }),
        }
    }
}

/// Id allocator owned by exactly one tree.
///
/// Candidates already present in the tree are skipped, so a tree restored from
/// the wire can keep growing without colliding with its persisted ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    strategy: IdStrategy,
    next: u64,
}

impl IdAllocator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy, next: 0 }
    }

    pub fn sequential() -> Self {
        Self::new(IdStrategy::Sequential)
    }

    pub fn random() -> Self {
        Self::new(IdStrategy::Random)
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub(crate) fn allocate(&mut self, taken: impl Fn(&str) -> bool) -> NodeId {
        loop {
            let candidate = match self.strategy {
                IdStrategy::Sequential => {
                    let id = format!("n{}", self.next);
                    self.next += 1;
                    id
                }
                IdStrategy::Random => format!("{:016x}", rand::random::<u64>()),
            };
            if !taken(&candidate) {
                return NodeId::new(candidate);
            }
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::sequential()
    }
}
