//! Move tree data model and node repository

pub mod analysis;
pub mod ids;
pub mod move_code;
pub mod node;
pub mod repository;

pub use analysis::{TreeStats, count_variations, max_depth};
pub use ids::{IdAllocator, IdStrategy};
pub use move_code::{MoveCode, Promotion, Square};
pub use node::{MoveNode, MoveRecord};
pub use repository::MoveTree;
