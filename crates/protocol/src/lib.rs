//! Shared data types for GameVault.
//!
//! Every type here crosses a crate boundary (scanner → library → UI shell)
//! and serializes to camelCase JSON.

pub mod types;

// Re-export primary types.
pub use types::{
    AssetCategory, BackupInfo, DashboardSummary, GameAssets, GameDetails, GameSource,
    GameSummary, ResolvedGame,
};
