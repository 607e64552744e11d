//! Save-path template resolution.
//!
//! Catalog entries describe save locations as Windows-oriented templates
//! such as `{{p|userprofile\documents}}\Studio\Game`. [`TemplateResolver`]
//! expands them against a [`HostContext`] captured once at startup.

pub mod context;
pub mod template;

// Re-export primary types.
pub use context::{HostContext, PlatformAccount, encode_account_name};
pub use template::{GAME_TOKEN, Resolution, TemplateResolver};
