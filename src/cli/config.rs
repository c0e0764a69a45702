//! Shared configuration types for CLI commands

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
    app::SessionConfig,
    applier::DuplicateMovePolicy,
    codec::{DecodeOptions, PlyPolicy},
    tree::IdStrategy,
};

/// Options shared by every command that reads or grows a tree
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Reject nodes whose ply is missing instead of defaulting it to 0
    #[arg(long, global = true)]
    pub strict_ply: bool,

    /// How ids are minted for new nodes (sequential, random)
    #[arg(long, global = true, default_value_t = IdStrategy::Sequential)]
    pub id_strategy: IdStrategy,

    /// Replaying an existing move appends a sibling or reuses it (append, reuse)
    #[arg(long, global = true, default_value_t = DuplicateMovePolicy::AppendVariation)]
    pub duplicate_moves: DuplicateMovePolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            strict_ply: false,
            id_strategy: IdStrategy::Sequential,
            duplicate_moves: DuplicateMovePolicy::AppendVariation,
        }
    }
}

impl CliConfig {
    pub fn ply_policy(&self) -> PlyPolicy {
        if self.strict_ply {
            PlyPolicy::Strict
        } else {
            PlyPolicy::DefaultToZero
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        self.session_config().decode_options()
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_id_strategy(self.id_strategy)
            .with_duplicate_moves(self.duplicate_moves)
            .with_ply_policy(self.ply_policy())
    }
}
