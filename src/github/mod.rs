// GitHub accessor module.
// Cache-fronted data fetching from the GitHub REST API.

pub mod client;
pub mod service;
pub mod types;

pub use client::GitHubClient;
pub use service::GitHubService;
pub use types::*;
