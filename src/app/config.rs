//! Configuration types for session creation.

use crate::{
    applier::DuplicateMovePolicy,
    codec::{DecodeOptions, PlyPolicy},
    tree::IdStrategy,
};

/// Per-session policies.
///
/// Builder-style configuration handed to the [`App`](super::App) container;
/// each session started or restored afterwards follows it.
///
/// # Examples
///
/// ```
/// use movetree::app::SessionConfig;
/// use movetree::applier::DuplicateMovePolicy;
/// use movetree::codec::PlyPolicy;
/// use movetree::tree::IdStrategy;
///
/// let config = SessionConfig::new()
///     .with_id_strategy(IdStrategy::Random)
///     .with_duplicate_moves(DuplicateMovePolicy::ReuseExisting)
///     .with_ply_policy(PlyPolicy::Strict);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// How new node ids are chosen
    pub id_strategy: IdStrategy,
    /// Whether replaying an existing move appends a sibling or reuses the child
    pub duplicate_moves: DuplicateMovePolicy,
    /// How a restored payload's missing `ply` is treated
    pub ply_policy: PlyPolicy,
}

impl SessionConfig {
    /// Create a configuration with sequential ids, appended duplicates and
    /// lenient ply decoding.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    pub fn with_duplicate_moves(mut self, policy: DuplicateMovePolicy) -> Self {
        self.duplicate_moves = policy;
        self
    }

    pub fn with_ply_policy(mut self, policy: PlyPolicy) -> Self {
        self.ply_policy = policy;
        self
    }

    /// Decode options matching this configuration.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::default()
            .with_ply_policy(self.ply_policy)
            .with_id_strategy(self.id_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_policy() {
        let config = SessionConfig::new()
            .with_id_strategy(IdStrategy::Random)
            .with_duplicate_moves(DuplicateMovePolicy::ReuseExisting)
            .with_ply_policy(PlyPolicy::Strict);

        assert_eq!(config.id_strategy, IdStrategy::Random);
        assert_eq!(config.duplicate_moves, DuplicateMovePolicy::ReuseExisting);

        let options = config.decode_options();
        assert_eq!(options.ply_policy, PlyPolicy::Strict);
        assert_eq!(options.id_strategy, IdStrategy::Random);
    }
}
