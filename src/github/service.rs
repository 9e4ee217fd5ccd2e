// GitHub data accessor.
// Fronts the REST endpoints with a keyed TTL cache so widgets refreshing on
// short intervals do not re-fetch unchanged data.

use tracing::debug;

use crate::cache::{CacheKey, CacheStats, ResponseCache};
use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Contributor, Issue, PullRequest, Release, Repository, StateFilter};

const REPOSITORY_TTL_SECS: i64 = 300;
const ISSUES_TTL_SECS: i64 = 600;
const PULL_REQUESTS_TTL_SECS: i64 = 600;
const CONTRIBUTORS_TTL_SECS: i64 = 86_400;
const RELEASES_TTL_SECS: i64 = 3600;

const PER_PAGE: u32 = 100;

/// Cached payloads, tagged by resource kind.
///
/// One cache instance serves all GitHub resources; the tag mirrors the
/// resource-kind prefix of the cache key, so a key always resolves to its
/// own variant.
#[derive(Debug, Clone)]
enum GitHubData {
    Repository(Repository),
    Issues(Vec<Issue>),
    PullRequests(Vec<PullRequest>),
    Contributors(Vec<Contributor>),
    Releases(Vec<Release>),
}

/// GitHub accessor owning its client and response cache.
///
/// Constructed explicitly by the composition root and passed to consumers;
/// there is no process-global instance.
pub struct GitHubService {
    client: GitHubClient,
    cache: ResponseCache<GitHubData>,
}

impl GitHubService {
    pub fn new(client: GitHubClient) -> Self {
        Self {
            client,
            cache: ResponseCache::new(),
        }
    }

    /// Get repository metadata.
    pub async fn repository(&mut self, owner: &str, repo: &str) -> Result<Repository> {
        let key = CacheKey::new("repo")
            .push(format!("{}/{}", owner, repo))
            .build();
        if let Some(GitHubData::Repository(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let response = self.client.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: Repository = response.json().await?;

        self.cache.set(
            key,
            GitHubData::Repository(repository.clone()),
            REPOSITORY_TTL_SECS,
        );
        Ok(repository)
    }

    /// Get repository issues, filtered by state.
    ///
    /// Pull requests are dropped from the response; the GitHub issues
    /// endpoint returns both.
    pub async fn issues(
        &mut self,
        owner: &str,
        repo: &str,
        state: StateFilter,
    ) -> Result<Vec<Issue>> {
        let key = CacheKey::new("issues")
            .push(format!("{}/{}", owner, repo))
            .push(state.as_str())
            .build();
        if let Some(GitHubData::Issues(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let params = [("state", state.as_str()), ("per_page", &PER_PAGE.to_string())];
        let response = self
            .client
            .get_with_params(&format!("/repos/{}/{}/issues", owner, repo), &params)
            .await?;
        let items: Vec<Issue> = response.json().await?;
        let issues: Vec<Issue> = items
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .collect();

        self.cache
            .set(key, GitHubData::Issues(issues.clone()), ISSUES_TTL_SECS);
        Ok(issues)
    }

    /// Get repository pull requests, filtered by state.
    pub async fn pull_requests(
        &mut self,
        owner: &str,
        repo: &str,
        state: StateFilter,
    ) -> Result<Vec<PullRequest>> {
        let key = CacheKey::new("prs")
            .push(format!("{}/{}", owner, repo))
            .push(state.as_str())
            .build();
        if let Some(GitHubData::PullRequests(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let params = [("state", state.as_str()), ("per_page", &PER_PAGE.to_string())];
        let response = self
            .client
            .get_with_params(&format!("/repos/{}/{}/pulls", owner, repo), &params)
            .await?;
        let pulls: Vec<PullRequest> = response.json().await?;

        self.cache.set(
            key,
            GitHubData::PullRequests(pulls.clone()),
            PULL_REQUESTS_TTL_SECS,
        );
        Ok(pulls)
    }

    /// Get repository contributors.
    pub async fn contributors(&mut self, owner: &str, repo: &str) -> Result<Vec<Contributor>> {
        let key = CacheKey::new("contributors")
            .push(format!("{}/{}", owner, repo))
            .build();
        if let Some(GitHubData::Contributors(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let params = [("per_page", &PER_PAGE.to_string())];
        let response = self
            .client
            .get_with_params(&format!("/repos/{}/{}/contributors", owner, repo), &params)
            .await?;
        let contributors: Vec<Contributor> = response.json().await?;

        self.cache.set(
            key,
            GitHubData::Contributors(contributors.clone()),
            CONTRIBUTORS_TTL_SECS,
        );
        Ok(contributors)
    }

    /// Get repository releases.
    pub async fn releases(&mut self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let key = CacheKey::new("releases")
            .push(format!("{}/{}", owner, repo))
            .build();
        if let Some(GitHubData::Releases(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let params = [("per_page", &PER_PAGE.to_string())];
        let response = self
            .client
            .get_with_params(&format!("/repos/{}/{}/releases", owner, repo), &params)
            .await?;
        let releases: Vec<Release> = response.json().await?;

        self.cache
            .set(key, GitHubData::Releases(releases.clone()), RELEASES_TTL_SECS);
        Ok(releases)
    }

    /// Drop every cached response.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Diagnostic snapshot of the cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
