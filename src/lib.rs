// devdash: data layer for dashboard widgets.
// GitHub and npm accessors sharing a keyed, TTL-based response cache.

pub mod cache;
pub mod error;
pub mod github;
pub mod npm;

pub use cache::{CacheKey, CacheStats, ResponseCache};
pub use error::{DashError, Result};
pub use github::{GitHubClient, GitHubService};
pub use npm::{NpmClient, NpmService};
