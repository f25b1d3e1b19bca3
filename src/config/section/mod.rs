//! Configuration section definitions.

mod assets;
mod build;
mod rewrite;
mod serve;
mod watch;

pub use assets::AssetsConfig;
pub use build::{BuildConfig, VendorEntry};
pub use rewrite::{MarkupRuleEntry, RewriteConfig};
pub use serve::ServeConfig;
pub use watch::{WatchConfig, WatchRuleEntry};
