// npm accessor module.
// Cache-fronted data fetching from the npm registry, the downloads API,
// and npms.io.

pub mod client;
pub mod service;
pub mod types;

pub use client::NpmClient;
pub use service::NpmService;
pub use types::*;
