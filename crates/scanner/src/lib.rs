//! Installed-game discovery.
//!
//! Walks Steam libraries and user-chosen folders, matches each install
//! folder against the catalog, checks that the install is live and resolves
//! its save locations. Also ranks a game's executables and pulls an icon
//! out of the best one.

pub mod icon;
pub mod pe;
pub mod ranking;
pub mod scanner;
pub mod validity;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

// Re-export primary types.
pub use icon::{ICON_SIZE, extract_icon_candidate, extract_icon_with, icon_from_executable};
pub use ranking::{Candidate, REJECTED, RankingRules, SizeBand, rank_candidates, score_executable};
pub use scanner::{GameScanner, ScanRoots};

/// Errors for scanning and icon extraction.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid PE image: {0}")]
    InvalidPe(&'static str),

    #[error("executable has no icon resource")]
    NoIcon,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
