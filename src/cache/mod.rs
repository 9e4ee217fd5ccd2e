// In-memory response cache shared by the GitHub and npm accessors.
// Per-key TTL expiry with lazy eviction; no size bound, no background sweep.

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::{CacheStats, ResponseCache};
